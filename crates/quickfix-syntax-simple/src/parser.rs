//! Recursive-descent parser for the C++ subset.
//!
//! The parser builds the [`Ast`] bottom-up so parent links are filled as nodes are added. It is
//! deliberately small: no templates, no operator names, no constructor initializer lists. Anything
//! outside the subset is a [`ParseError`] at the offending token.

use crate::ParseError;
use quickfix_syntax::{Ast, NodeId, NodeKind, Token, TokenIndex, TokenKind};

type PResult<T> = Result<T, ParseError>;

/// Parse a token stream into a tree whose root is a `TranslationUnit`.
pub fn parse_tokens(tokens: &[Token], char_count: usize) -> PResult<Ast> {
    let mut parser = Parser {
        tokens,
        pos: 0,
        ast: Ast::new(),
        char_count,
    };
    let mut declarations = Vec::new();
    while !parser.at_end() {
        declarations.push(parser.declaration()?);
    }
    let last = tokens.len().saturating_sub(1);
    let root = parser
        .ast
        .add(NodeKind::TranslationUnit { declarations }, 0, last);
    parser.ast.set_root(root);
    Ok(parser.ast)
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum DeclContext {
    Namespace,
    Class,
    Block,
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    ast: Ast,
    char_count: usize,
}

fn is_simple_specifier(kind: TokenKind) -> bool {
    use TokenKind::*;
    matches!(
        kind,
        KwConst
            | KwVolatile
            | KwStatic
            | KwExtern
            | KwInline
            | KwVirtual
            | KwExplicit
            | KwMutable
            | KwTypedef
            | KwUnsigned
            | KwSigned
            | KwShort
            | KwLong
            | KwInt
            | KwChar
            | KwBool
            | KwVoid
            | KwFloat
            | KwDouble
            | KwAuto
    )
}

fn is_type_keyword(kind: TokenKind) -> bool {
    use TokenKind::*;
    matches!(
        kind,
        KwUnsigned | KwSigned | KwShort | KwLong | KwInt | KwChar | KwBool | KwVoid | KwFloat
            | KwDouble | KwAuto
    )
}

fn binary_precedence(kind: TokenKind) -> Option<u8> {
    use TokenKind::*;
    Some(match kind {
        PipePipe => 1,
        AmpAmp => 2,
        Pipe => 3,
        Caret => 4,
        Amp => 5,
        EqualEqual | ExclaimEqual => 6,
        Less | Greater | LessEqual | GreaterEqual => 7,
        LessLess | GreaterGreater => 8,
        Plus | Minus => 9,
        Star | Slash | Percent => 10,
        _ => return None,
    })
}

impl Parser<'_> {
    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn peek_kind(&self, ahead: usize) -> Option<TokenKind> {
        self.tokens.get(self.pos + ahead).map(|t| t.kind)
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.peek_kind(0) == Some(kind)
    }

    fn bump(&mut self) -> TokenIndex {
        let index = self.pos;
        self.pos += 1;
        index
    }

    fn eat(&mut self, kind: TokenKind) -> Option<TokenIndex> {
        self.at(kind).then(|| self.bump())
    }

    fn error(&self, expected: &'static str) -> ParseError {
        match self.tokens.get(self.pos) {
            Some(token) => ParseError::Expected {
                expected,
                found: token.spelling.clone(),
                offset: token.start(),
            },
            None => ParseError::Expected {
                expected,
                found: "end of file".to_string(),
                offset: self.char_count,
            },
        }
    }

    fn expect(&mut self, kind: TokenKind, expected: &'static str) -> PResult<TokenIndex> {
        self.eat(kind).ok_or_else(|| self.error(expected))
    }

    fn last(&self) -> TokenIndex {
        self.pos.saturating_sub(1)
    }

    fn first_of(&self, node: NodeId) -> TokenIndex {
        self.ast.node(node).first_token
    }

    fn add(&mut self, kind: NodeKind, first: TokenIndex) -> NodeId {
        let last = self.last();
        self.ast.add(kind, first, last)
    }

    fn function_of(&self, declarator: NodeId) -> Option<NodeId> {
        match self.ast.kind(declarator) {
            NodeKind::Declarator { function, .. } => *function,
            _ => None,
        }
    }

    // ---- declarations ----

    fn declaration(&mut self) -> PResult<NodeId> {
        match self.peek_kind(0) {
            Some(TokenKind::KwNamespace) => self.namespace(),
            _ => self.simple_declaration(DeclContext::Namespace),
        }
    }

    fn namespace(&mut self) -> PResult<NodeId> {
        let first = self.bump();
        let identifier = self.eat(TokenKind::Identifier);
        let lbrace = self.expect(TokenKind::LBrace, "`{`")?;
        let mut declarations = Vec::new();
        while !self.at(TokenKind::RBrace) {
            if self.at_end() {
                return Err(self.error("`}`"));
            }
            declarations.push(self.declaration()?);
        }
        let rbrace = self.bump();
        Ok(self.add(
            NodeKind::Namespace {
                namespace_token: first,
                identifier,
                lbrace,
                declarations,
                rbrace,
            },
            first,
        ))
    }

    fn member(&mut self) -> PResult<NodeId> {
        let first = self.pos;
        match self.peek_kind(0) {
            Some(
                TokenKind::KwPublic
                | TokenKind::KwProtected
                | TokenKind::KwPrivate
                | TokenKind::KwSignals,
            ) => {
                let access = self.bump();
                let slots = self.eat(TokenKind::KwSlots);
                let colon = self.expect(TokenKind::Colon, "`:`")?;
                Ok(self.add(
                    NodeKind::AccessDeclaration {
                        access,
                        slots,
                        colon,
                    },
                    first,
                ))
            }
            Some(TokenKind::Identifier)
                if self.tokens[self.pos].spelling == "Q_OBJECT" =>
            {
                let token = self.bump();
                self.eat(TokenKind::Semicolon);
                Ok(self.add(NodeKind::MacroMember { token }, first))
            }
            _ => self.simple_declaration(DeclContext::Class),
        }
    }

    /// Simple declaration, or a function definition outside blocks.
    fn simple_declaration(&mut self, context: DeclContext) -> PResult<NodeId> {
        let first = self.pos;
        let specifiers = self.decl_specifiers()?;
        let mut declarators = Vec::new();

        if !self.at(TokenKind::Semicolon) {
            loop {
                let declarator = self.declarator(false)?;
                declarators.push(declarator);

                if context != DeclContext::Block
                    && declarators.len() == 1
                    && self.at(TokenKind::LBrace)
                    && self.function_of(declarator).is_some()
                {
                    let body = self.compound()?;
                    return Ok(self.add(
                        NodeKind::FunctionDefinition {
                            specifiers,
                            declarator,
                            body,
                        },
                        first,
                    ));
                }

                if self.eat(TokenKind::Comma).is_none() {
                    break;
                }
            }
        }

        let semicolon = Some(self.expect(TokenKind::Semicolon, "`;`")?);
        Ok(self.add(
            NodeKind::SimpleDeclaration {
                specifiers,
                declarators,
                semicolon,
            },
            first,
        ))
    }

    fn decl_specifiers(&mut self) -> PResult<Vec<NodeId>> {
        let mut specifiers = Vec::new();
        let mut seen_type = false;
        loop {
            let Some(kind) = self.peek_kind(0) else {
                break;
            };
            let first = self.pos;
            match kind {
                k if is_simple_specifier(k) => {
                    seen_type |= is_type_keyword(k);
                    let token = self.bump();
                    specifiers.push(self.add(NodeKind::SimpleSpecifier { token }, first));
                }
                TokenKind::KwClass | TokenKind::KwStruct | TokenKind::KwUnion => {
                    seen_type = true;
                    let spec = self.class_specifier()?;
                    specifiers.push(spec);
                }
                TokenKind::KwEnum => {
                    seen_type = true;
                    let spec = self.enum_specifier()?;
                    specifiers.push(spec);
                }
                TokenKind::Identifier | TokenKind::ColonColon if !seen_type => {
                    if self.name_starts_declarator() {
                        break;
                    }
                    seen_type = true;
                    let name = self.name()?;
                    specifiers.push(self.add(NodeKind::NamedTypeSpecifier { name }, first));
                }
                _ => break,
            }
        }
        Ok(specifiers)
    }

    /// Whether the name at the cursor is a constructor or destructor declarator rather than a
    /// type name: `Foo(`, `Foo::Foo(`, `Foo::~Foo(`.
    fn name_starts_declarator(&self) -> bool {
        let mut i = self.pos;
        let kind = |i: usize| self.tokens.get(i).map(|t| t.kind);
        if kind(i) == Some(TokenKind::ColonColon) {
            i += 1;
        }
        loop {
            if kind(i) != Some(TokenKind::Identifier) {
                return false;
            }
            i += 1;
            if kind(i) == Some(TokenKind::ColonColon) {
                if kind(i + 1) == Some(TokenKind::Tilde) {
                    return true;
                }
                i += 1;
                continue;
            }
            return kind(i) == Some(TokenKind::LParen);
        }
    }

    fn class_specifier(&mut self) -> PResult<NodeId> {
        let first = self.pos;
        let key = self.bump();
        let name = if self.at(TokenKind::Identifier) {
            Some(self.name()?)
        } else {
            None
        };

        if !self.at(TokenKind::LBrace) && !self.at(TokenKind::Colon) {
            let name = name.ok_or_else(|| self.error("class name"))?;
            return Ok(self.add(NodeKind::ElaboratedTypeSpecifier { key, name }, first));
        }

        // Base clause: skipped, but covered by the node.
        if self.eat(TokenKind::Colon).is_some() {
            while !self.at(TokenKind::LBrace) {
                if self.at_end() {
                    return Err(self.error("`{`"));
                }
                self.bump();
            }
        }

        let lbrace = self.bump();
        let mut members = Vec::new();
        while !self.at(TokenKind::RBrace) {
            if self.at_end() {
                return Err(self.error("`}`"));
            }
            members.push(self.member()?);
        }
        let rbrace = self.bump();
        Ok(self.add(
            NodeKind::ClassSpecifier {
                key,
                name,
                lbrace,
                members,
                rbrace,
            },
            first,
        ))
    }

    fn enum_specifier(&mut self) -> PResult<NodeId> {
        let first = self.pos;
        let enum_token = self.bump();
        let name = if self.at(TokenKind::Identifier) {
            Some(self.name()?)
        } else {
            None
        };

        let Some(lbrace) = self.eat(TokenKind::LBrace) else {
            let name = name.ok_or_else(|| self.error("enum name"))?;
            return Ok(self.add(
                NodeKind::ElaboratedTypeSpecifier {
                    key: enum_token,
                    name,
                },
                first,
            ));
        };

        let mut enumerators = Vec::new();
        while !self.at(TokenKind::RBrace) {
            let start = self.pos;
            let identifier = self.expect(TokenKind::Identifier, "enumerator")?;
            let equal = self.eat(TokenKind::Equal);
            let value = match equal {
                Some(_) => Some(self.conditional()?),
                None => None,
            };
            enumerators.push(self.add(
                NodeKind::Enumerator {
                    identifier,
                    equal,
                    value,
                },
                start,
            ));
            if self.eat(TokenKind::Comma).is_none() {
                break;
            }
        }
        let rbrace = self.expect(TokenKind::RBrace, "`}`")?;
        Ok(self.add(
            NodeKind::EnumSpecifier {
                enum_token,
                name,
                lbrace,
                enumerators,
                rbrace,
            },
            first,
        ))
    }

    fn declarator(&mut self, in_parameter: bool) -> PResult<NodeId> {
        let first = self.pos;
        let mut ptr_ops = Vec::new();
        while let Some(kind) = self.peek_kind(0) {
            match kind {
                TokenKind::Star | TokenKind::Amp | TokenKind::AmpAmp => ptr_ops.push(self.bump()),
                TokenKind::KwConst if !ptr_ops.is_empty() => ptr_ops.push(self.bump()),
                _ => break,
            }
        }

        let core = match self.peek_kind(0) {
            Some(TokenKind::Identifier | TokenKind::ColonColon | TokenKind::Tilde) => {
                let start = self.pos;
                let name = self.name()?;
                Some(self.add(NodeKind::DeclaratorId { name }, start))
            }
            _ if in_parameter => None,
            _ => return Err(self.error("declarator")),
        };

        let function = if self.at(TokenKind::LParen) && !in_parameter {
            Some(self.function_declarator()?)
        } else {
            None
        };

        // Array dimensions: covered by the node, not modelled.
        while self.eat(TokenKind::LBracket).is_some() {
            while !self.at(TokenKind::RBracket) {
                if self.at_end() {
                    return Err(self.error("`]`"));
                }
                self.bump();
            }
            self.bump();
        }

        let equal = self.eat(TokenKind::Equal);
        let initializer = match equal {
            Some(_) => Some(self.assignment()?),
            None => None,
        };

        Ok(self.add(
            NodeKind::Declarator {
                ptr_ops,
                core,
                function,
                equal,
                initializer,
            },
            first,
        ))
    }

    fn function_declarator(&mut self) -> PResult<NodeId> {
        let first = self.pos;
        let lparen = self.bump();
        let mut parameters = Vec::new();
        if !self.at(TokenKind::RParen) {
            loop {
                parameters.push(self.parameter()?);
                if self.eat(TokenKind::Comma).is_none() {
                    break;
                }
            }
        }
        let rparen = self.expect(TokenKind::RParen, "`)`")?;
        let cv = self.eat(TokenKind::KwConst);
        Ok(self.add(
            NodeKind::FunctionDeclarator {
                lparen,
                parameters,
                rparen,
                cv,
            },
            first,
        ))
    }

    fn parameter(&mut self) -> PResult<NodeId> {
        let first = self.pos;
        let specifiers = self.decl_specifiers()?;
        if specifiers.is_empty() {
            return Err(self.error("parameter type"));
        }
        let declarator = if self.at(TokenKind::Comma) || self.at(TokenKind::RParen) {
            None
        } else {
            Some(self.declarator(true)?)
        };
        Ok(self.add(
            NodeKind::ParameterDeclaration {
                specifiers,
                declarator,
            },
            first,
        ))
    }

    /// `name`, `A::B::name`, `~Name`, `A::~A`, or `::name`.
    fn name(&mut self) -> PResult<NodeId> {
        let first = self.pos;
        self.eat(TokenKind::ColonColon);
        let mut qualifiers = Vec::new();
        let unqualified = loop {
            if self.at(TokenKind::Tilde) {
                let start = self.pos;
                let tilde = self.bump();
                let identifier = self.expect(TokenKind::Identifier, "class name")?;
                break self.add(NodeKind::DestructorName { tilde, identifier }, start);
            }
            let start = self.pos;
            let identifier = self.expect(TokenKind::Identifier, "name")?;
            if self.at(TokenKind::ColonColon)
                && matches!(
                    self.peek_kind(1),
                    Some(TokenKind::Identifier | TokenKind::Tilde)
                )
            {
                qualifiers.push(identifier);
                self.bump();
                continue;
            }
            break self.add(NodeKind::SimpleName { identifier }, start);
        };

        if qualifiers.is_empty() && self.first_of(unqualified) == first {
            return Ok(unqualified);
        }
        Ok(self.add(
            NodeKind::QualifiedName {
                qualifiers,
                name: unqualified,
            },
            first,
        ))
    }

    // ---- statements ----

    fn compound(&mut self) -> PResult<NodeId> {
        let first = self.pos;
        let lbrace = self.expect(TokenKind::LBrace, "`{`")?;
        let mut statements = Vec::new();
        while !self.at(TokenKind::RBrace) {
            if self.at_end() {
                return Err(self.error("`}`"));
            }
            statements.push(self.statement()?);
        }
        let rbrace = self.bump();
        Ok(self.add(
            NodeKind::Compound {
                lbrace,
                statements,
                rbrace,
            },
            first,
        ))
    }

    fn statement(&mut self) -> PResult<NodeId> {
        let first = self.pos;
        let Some(kind) = self.peek_kind(0) else {
            return Err(self.error("statement"));
        };
        match kind {
            TokenKind::LBrace => self.compound(),
            TokenKind::KwIf => self.if_statement(),
            TokenKind::KwWhile => {
                let while_token = self.bump();
                let lparen = self.expect(TokenKind::LParen, "`(`")?;
                let condition = self.condition()?;
                let rparen = self.expect(TokenKind::RParen, "`)`")?;
                let body = self.statement()?;
                Ok(self.add(
                    NodeKind::While {
                        while_token,
                        lparen,
                        condition,
                        rparen,
                        body,
                    },
                    first,
                ))
            }
            TokenKind::KwDo => {
                let do_token = self.bump();
                let body = self.statement()?;
                let while_token = self.expect(TokenKind::KwWhile, "`while`")?;
                let lparen = self.expect(TokenKind::LParen, "`(`")?;
                let expression = self.expression()?;
                let rparen = self.expect(TokenKind::RParen, "`)`")?;
                let semicolon = self.expect(TokenKind::Semicolon, "`;`")?;
                Ok(self.add(
                    NodeKind::Do {
                        do_token,
                        body,
                        while_token,
                        lparen,
                        expression,
                        rparen,
                        semicolon,
                    },
                    first,
                ))
            }
            TokenKind::KwFor => self.for_statement(),
            TokenKind::KwSwitch => {
                let switch_token = self.bump();
                let lparen = self.expect(TokenKind::LParen, "`(`")?;
                let condition = self.condition()?;
                let rparen = self.expect(TokenKind::RParen, "`)`")?;
                let body = self.statement()?;
                Ok(self.add(
                    NodeKind::Switch {
                        switch_token,
                        lparen,
                        condition,
                        rparen,
                        body,
                    },
                    first,
                ))
            }
            TokenKind::KwCase => {
                let case_token = self.bump();
                let expression = self.conditional()?;
                let colon = self.expect(TokenKind::Colon, "`:`")?;
                Ok(self.add(
                    NodeKind::Case {
                        case_token,
                        expression,
                        colon,
                    },
                    first,
                ))
            }
            TokenKind::KwDefault => {
                let default_token = self.bump();
                let colon = self.expect(TokenKind::Colon, "`:`")?;
                Ok(self.add(
                    NodeKind::Default {
                        default_token,
                        colon,
                    },
                    first,
                ))
            }
            TokenKind::KwBreak => {
                let break_token = self.bump();
                let semicolon = self.expect(TokenKind::Semicolon, "`;`")?;
                Ok(self.add(
                    NodeKind::Break {
                        break_token,
                        semicolon,
                    },
                    first,
                ))
            }
            TokenKind::KwContinue => {
                let continue_token = self.bump();
                let semicolon = self.expect(TokenKind::Semicolon, "`;`")?;
                Ok(self.add(
                    NodeKind::Continue {
                        continue_token,
                        semicolon,
                    },
                    first,
                ))
            }
            TokenKind::KwReturn => {
                let return_token = self.bump();
                let expression = if self.at(TokenKind::Semicolon) {
                    None
                } else {
                    Some(self.expression()?)
                };
                let semicolon = self.expect(TokenKind::Semicolon, "`;`")?;
                Ok(self.add(
                    NodeKind::Return {
                        return_token,
                        expression,
                        semicolon,
                    },
                    first,
                ))
            }
            _ if self.looks_like_declaration() => {
                let declaration = self.simple_declaration(DeclContext::Block)?;
                Ok(self.add(NodeKind::DeclarationStatement { declaration }, first))
            }
            _ => self.expression_statement(),
        }
    }

    fn expression_statement(&mut self) -> PResult<NodeId> {
        let first = self.pos;
        let expression = if self.at(TokenKind::Semicolon) {
            None
        } else {
            Some(self.expression()?)
        };
        let semicolon = self.expect(TokenKind::Semicolon, "`;`")?;
        Ok(self.add(
            NodeKind::ExpressionStatement {
                expression,
                semicolon,
            },
            first,
        ))
    }

    fn if_statement(&mut self) -> PResult<NodeId> {
        let first = self.pos;
        let if_token = self.bump();
        let lparen = self.expect(TokenKind::LParen, "`(`")?;
        let condition = self.condition()?;
        let rparen = self.expect(TokenKind::RParen, "`)`")?;
        let then_stmt = self.statement()?;
        let else_token = self.eat(TokenKind::KwElse);
        let else_stmt = match else_token {
            Some(_) => Some(self.statement()?),
            None => None,
        };
        Ok(self.add(
            NodeKind::If {
                if_token,
                lparen,
                condition,
                rparen,
                then_stmt,
                else_token,
                else_stmt,
            },
            first,
        ))
    }

    fn for_statement(&mut self) -> PResult<NodeId> {
        let first = self.pos;
        let for_token = self.bump();
        let lparen = self.expect(TokenKind::LParen, "`(`")?;
        let initializer = if self.looks_like_declaration() {
            let start = self.pos;
            let declaration = self.simple_declaration(DeclContext::Block)?;
            self.add(NodeKind::DeclarationStatement { declaration }, start)
        } else {
            self.expression_statement()?
        };
        let condition = if self.at(TokenKind::Semicolon) {
            None
        } else {
            Some(self.condition()?)
        };
        let semicolon = self.expect(TokenKind::Semicolon, "`;`")?;
        let expression = if self.at(TokenKind::RParen) {
            None
        } else {
            Some(self.expression()?)
        };
        let rparen = self.expect(TokenKind::RParen, "`)`")?;
        let body = self.statement()?;
        Ok(self.add(
            NodeKind::For {
                for_token,
                lparen,
                initializer,
                condition,
                semicolon,
                expression,
                rparen,
                body,
            },
            first,
        ))
    }

    fn condition(&mut self) -> PResult<NodeId> {
        // A declaration in a condition needs an initializer, so `a && b` and `a * b` stay
        // expressions.
        let declares = self.starts_with_specifier()
            || self
                .typed_name_end()
                .is_some_and(|i| self.tokens.get(i).map(|t| t.kind) == Some(TokenKind::Equal));
        if !declares {
            return self.expression();
        }
        let first = self.pos;
        let specifiers = self.decl_specifiers()?;
        let declarator = self.declarator(false)?;
        Ok(self.add(
            NodeKind::Condition {
                specifiers,
                declarator,
            },
            first,
        ))
    }

    /// Declaration-or-expression disambiguation: a leading specifier keyword, or a (qualified)
    /// name followed by pointer operators and another identifier.
    fn looks_like_declaration(&self) -> bool {
        self.starts_with_specifier() || self.typed_name_end().is_some()
    }

    fn starts_with_specifier(&self) -> bool {
        self.tokens.get(self.pos).is_some_and(|t| {
            is_simple_specifier(t.kind)
                || matches!(
                    t.kind,
                    TokenKind::KwClass | TokenKind::KwStruct | TokenKind::KwUnion | TokenKind::KwEnum
                )
        })
    }

    /// For `Type [*&const]... name`, the token index just past `name`.
    fn typed_name_end(&self) -> Option<usize> {
        let kind = |i: usize| self.tokens.get(i).map(|t| t.kind);
        let mut i = self.pos;
        while kind(i) == Some(TokenKind::Identifier) && kind(i + 1) == Some(TokenKind::ColonColon)
        {
            i += 2;
        }
        if kind(i) != Some(TokenKind::Identifier) {
            return None;
        }
        i += 1;
        while matches!(
            kind(i),
            Some(TokenKind::Star | TokenKind::Amp | TokenKind::AmpAmp | TokenKind::KwConst)
        ) {
            i += 1;
        }
        (kind(i) == Some(TokenKind::Identifier)).then_some(i + 1)
    }

    // ---- expressions ----

    fn expression(&mut self) -> PResult<NodeId> {
        self.assignment()
    }

    fn assignment(&mut self) -> PResult<NodeId> {
        let left = self.conditional()?;
        if self.peek_kind(0).is_some_and(TokenKind::is_assignment) {
            let first = self.first_of(left);
            let op = self.bump();
            let right = self.assignment()?;
            return Ok(self.add(NodeKind::Binary { left, op, right }, first));
        }
        Ok(left)
    }

    fn conditional(&mut self) -> PResult<NodeId> {
        let condition = self.binary(1)?;
        let Some(question) = self.eat(TokenKind::Question) else {
            return Ok(condition);
        };
        let first = self.first_of(condition);
        let left = self.assignment()?;
        let colon = self.expect(TokenKind::Colon, "`:`")?;
        let right = self.assignment()?;
        Ok(self.add(
            NodeKind::Conditional {
                condition,
                question,
                left,
                colon,
                right,
            },
            first,
        ))
    }

    fn binary(&mut self, min_precedence: u8) -> PResult<NodeId> {
        let mut left = self.unary()?;
        while let Some(precedence) = self.peek_kind(0).and_then(binary_precedence) {
            if precedence < min_precedence {
                break;
            }
            let first = self.first_of(left);
            let op = self.bump();
            let right = self.binary(precedence + 1)?;
            left = self.add(NodeKind::Binary { left, op, right }, first);
        }
        Ok(left)
    }

    fn unary(&mut self) -> PResult<NodeId> {
        use TokenKind::*;
        let first = self.pos;
        match self.peek_kind(0) {
            Some(Exclaim | Minus | Plus | Tilde | Star | Amp | PlusPlus | MinusMinus) => {
                let op = self.bump();
                let operand = self.unary()?;
                Ok(self.add(NodeKind::Unary { op, operand }, first))
            }
            _ => self.postfix(),
        }
    }

    fn postfix(&mut self) -> PResult<NodeId> {
        let mut expr = self.primary()?;
        loop {
            let first = self.first_of(expr);
            match self.peek_kind(0) {
                Some(TokenKind::LParen) => {
                    let lparen = self.bump();
                    let mut arguments = Vec::new();
                    if !self.at(TokenKind::RParen) {
                        loop {
                            arguments.push(self.assignment()?);
                            if self.eat(TokenKind::Comma).is_none() {
                                break;
                            }
                        }
                    }
                    let rparen = self.expect(TokenKind::RParen, "`)`")?;
                    expr = self.add(
                        NodeKind::Call {
                            callee: expr,
                            lparen,
                            arguments,
                            rparen,
                        },
                        first,
                    );
                }
                Some(TokenKind::Dot | TokenKind::Arrow) => {
                    let access = self.bump();
                    let member = self.name()?;
                    expr = self.add(
                        NodeKind::MemberAccess {
                            base: expr,
                            access,
                            member,
                        },
                        first,
                    );
                }
                Some(TokenKind::LBracket) => {
                    let lbracket = self.bump();
                    let index = self.expression()?;
                    let rbracket = self.expect(TokenKind::RBracket, "`]`")?;
                    expr = self.add(
                        NodeKind::ArrayAccess {
                            base: expr,
                            lbracket,
                            index,
                            rbracket,
                        },
                        first,
                    );
                }
                Some(TokenKind::PlusPlus | TokenKind::MinusMinus) => {
                    let op = self.bump();
                    expr = self.add(NodeKind::Postfix { operand: expr, op }, first);
                }
                _ => return Ok(expr),
            }
        }
    }

    fn primary(&mut self) -> PResult<NodeId> {
        let first = self.pos;
        match self.peek_kind(0) {
            Some(TokenKind::NumericLiteral | TokenKind::CharLiteral) => {
                let token = self.bump();
                Ok(self.add(NodeKind::NumericLiteral { token }, first))
            }
            Some(TokenKind::At) if self.peek_kind(1) == Some(TokenKind::StringLiteral) => {
                let at = Some(self.bump());
                let literal = self.bump();
                Ok(self.add(NodeKind::StringLiteral { at, literal }, first))
            }
            Some(TokenKind::StringLiteral) => {
                let literal = self.bump();
                Ok(self.add(NodeKind::StringLiteral { at: None, literal }, first))
            }
            Some(TokenKind::KwTrue | TokenKind::KwFalse) => {
                let token = self.bump();
                Ok(self.add(NodeKind::BoolLiteral { token }, first))
            }
            Some(TokenKind::KwThis) => {
                let token = self.bump();
                Ok(self.add(NodeKind::This { token }, first))
            }
            Some(TokenKind::LParen) => {
                let lparen = self.bump();
                let expression = self.expression()?;
                let rparen = self.expect(TokenKind::RParen, "`)`")?;
                Ok(self.add(
                    NodeKind::Nested {
                        lparen,
                        expression,
                        rparen,
                    },
                    first,
                ))
            }
            Some(TokenKind::Identifier | TokenKind::ColonColon) => self.name(),
            _ => Err(self.error("expression")),
        }
    }
}
