//! Binder: walks a parsed tree and fills the semantic tables.

use quickfix_syntax::{
    Access, AccessSection, Ast, ClassId, ClassKey, ClassSymbol, EnumSymbol, ForwardClass,
    FunctionId, FunctionSymbol, Include, NodeId, NodeKind, Parameter, Scope, ScopeId, ScopeKind,
    SymbolTable, Token, TokenIndex, TokenKind, Type, VariableSymbol,
};
use std::ops::Range;

/// Build the symbol table for a parsed document.
pub fn bind(tokens: &[Token], ast: &Ast, includes: Vec<Include>, char_count: usize) -> SymbolTable {
    let mut binder = Binder {
        tokens,
        ast,
        table: SymbolTable::default(),
        scope: ScopeId::GLOBAL,
        prefix: Vec::new(),
        access: None,
    };
    binder.table.scopes.push(Scope {
        kind: ScopeKind::Global,
        range: 0..char_count,
        parent: None,
    });
    binder.table.includes = includes;

    if let Some(root) = ast.root()
        && let NodeKind::TranslationUnit { declarations } = ast.kind(root)
    {
        for declaration in declarations {
            binder.declaration(*declaration);
        }
    }

    tracing::trace!(
        classes = binder.table.classes.len(),
        functions = binder.table.functions.len(),
        variables = binder.table.variables.len(),
        "bound"
    );
    binder.table
}

struct Binder<'a> {
    tokens: &'a [Token],
    ast: &'a Ast,
    table: SymbolTable,
    scope: ScopeId,
    /// Enclosing namespace and class names.
    prefix: Vec<String>,
    /// Current access level inside a class body.
    access: Option<Access>,
}

impl<'a> Binder<'a> {
    fn text(&self, token: TokenIndex) -> &'a str {
        self.tokens.get(token).map_or("", |t| t.spelling.as_str())
    }

    fn token_kind(&self, token: TokenIndex) -> Option<TokenKind> {
        self.tokens.get(token).map(|t| t.kind)
    }

    fn start(&self, token: TokenIndex) -> usize {
        self.tokens.get(token).map_or(0, Token::start)
    }

    fn end(&self, token: TokenIndex) -> usize {
        self.tokens.get(token).map_or(0, Token::end)
    }

    fn range(&self, node: NodeId) -> Range<usize> {
        let node = self.ast.node(node);
        self.start(node.first_token)..self.end(node.last_token)
    }

    fn push_scope(&mut self, kind: ScopeKind, range: Range<usize>) -> ScopeId {
        let id = ScopeId(self.table.scopes.len());
        self.table.scopes.push(Scope {
            kind,
            range,
            parent: Some(self.scope),
        });
        id
    }

    fn in_scope(&mut self, scope: ScopeId, f: impl FnOnce(&mut Self)) {
        let saved = std::mem::replace(&mut self.scope, scope);
        f(self);
        self.scope = saved;
    }

    fn name_parts(&self, name: NodeId) -> Vec<String> {
        match self.ast.kind(name) {
            NodeKind::SimpleName { identifier } => vec![self.text(*identifier).to_string()],
            NodeKind::DestructorName { identifier, .. } => {
                vec![format!("~{}", self.text(*identifier))]
            }
            NodeKind::QualifiedName { qualifiers, name } => {
                let mut parts: Vec<String> =
                    qualifiers.iter().map(|q| self.text(*q).to_string()).collect();
                parts.extend(self.name_parts(*name));
                parts
            }
            NodeKind::DeclaratorId { name } => self.name_parts(*name),
            _ => Vec::new(),
        }
    }

    /// Name parts and range of a declarator's name.
    fn declarator_name(&self, declarator: NodeId) -> Option<(Vec<String>, Range<usize>)> {
        let NodeKind::Declarator { core: Some(core), .. } = self.ast.kind(declarator) else {
            return None;
        };
        let parts = self.name_parts(*core);
        (!parts.is_empty()).then(|| (parts, self.range(*core)))
    }

    fn function_of(&self, declarator: NodeId) -> Option<NodeId> {
        match self.ast.kind(declarator) {
            NodeKind::Declarator { function, .. } => *function,
            _ => None,
        }
    }

    fn base_type(&self, specifiers: &[NodeId]) -> Type {
        let mut words = Vec::new();
        for spec in specifiers {
            match self.ast.kind(*spec) {
                NodeKind::SimpleSpecifier { token } => {
                    let storage = matches!(
                        self.token_kind(*token),
                        Some(
                            TokenKind::KwStatic
                                | TokenKind::KwExtern
                                | TokenKind::KwInline
                                | TokenKind::KwVirtual
                                | TokenKind::KwExplicit
                                | TokenKind::KwMutable
                                | TokenKind::KwTypedef
                        )
                    );
                    if !storage {
                        words.push(self.text(*token).to_string());
                    }
                }
                NodeKind::NamedTypeSpecifier { name }
                | NodeKind::ElaboratedTypeSpecifier { name, .. }
                | NodeKind::ClassSpecifier {
                    name: Some(name), ..
                }
                | NodeKind::EnumSpecifier {
                    name: Some(name), ..
                } => words.push(self.name_parts(*name).join("::")),
                _ => {}
            }
        }
        Type::named(words.join(" "))
    }

    fn declarator_type(&self, base: &Type, declarator: NodeId) -> Type {
        let mut ty = base.clone();
        if let NodeKind::Declarator { ptr_ops, .. } = self.ast.kind(declarator) {
            for op in ptr_ops {
                if self.token_kind(*op) != Some(TokenKind::KwConst) {
                    ty.ptr_ops.push_str(self.text(*op));
                }
            }
        }
        ty
    }

    fn parameters(&self, function_declarator: Option<NodeId>) -> (Vec<Parameter>, bool) {
        let Some(function) = function_declarator else {
            return (Vec::new(), false);
        };
        let NodeKind::FunctionDeclarator { parameters, cv, .. } = self.ast.kind(function) else {
            return (Vec::new(), false);
        };
        let mut out: Vec<Parameter> = parameters
            .iter()
            .filter_map(|p| match self.ast.kind(*p) {
                NodeKind::ParameterDeclaration {
                    specifiers,
                    declarator,
                } => {
                    let base = self.base_type(specifiers);
                    Some(match declarator {
                        Some(d) => Parameter {
                            ty: self.declarator_type(&base, *d),
                            name: self
                                .declarator_name(*d)
                                .and_then(|(mut parts, _)| parts.pop()),
                        },
                        None => Parameter {
                            ty: base,
                            name: None,
                        },
                    })
                }
                _ => None,
            })
            .collect();
        // `f(void)` takes no parameters.
        let only_void = matches!(
            out.as_slice(),
            [only] if only.name.is_none() && only.ty == Type::named("void")
        );
        if only_void {
            out.clear();
        }
        (out, cv.is_some())
    }

    fn class_access(&self) -> Option<Access> {
        match self.table.scope(self.scope).map(|s| &s.kind) {
            Some(ScopeKind::Class(_)) => self.access,
            _ => None,
        }
    }

    // ---- declarations ----

    fn declaration(&mut self, id: NodeId) {
        let ast = self.ast;
        match ast.kind(id) {
            NodeKind::Namespace {
                identifier,
                lbrace,
                declarations,
                rbrace,
                ..
            } => {
                let name = identifier.map(|t| self.text(t).to_string());
                let range = self.start(*lbrace)..self.end(*rbrace);
                let scope = self.push_scope(ScopeKind::Namespace(name.clone()), range);
                let pushed = name.is_some();
                self.prefix.extend(name);
                self.in_scope(scope, |this| {
                    for declaration in declarations {
                        this.declaration(*declaration);
                    }
                });
                if pushed {
                    self.prefix.pop();
                }
            }
            NodeKind::SimpleDeclaration {
                specifiers,
                declarators,
                ..
            } => self.simple_declaration(id, specifiers, declarators),
            NodeKind::FunctionDefinition {
                specifiers,
                declarator,
                body,
            } => self.function_definition(id, specifiers, *declarator, *body),
            _ => {}
        }
    }

    fn simple_declaration(&mut self, id: NodeId, specifiers: &[NodeId], declarators: &[NodeId]) {
        let ast = self.ast;
        let mut is_typedef = false;
        for spec in specifiers {
            match ast.kind(*spec) {
                NodeKind::ClassSpecifier { .. } => self.class(*spec),
                NodeKind::EnumSpecifier { .. } => self.enumeration(*spec),
                NodeKind::ElaboratedTypeSpecifier { key, name }
                    if declarators.is_empty()
                        && matches!(
                            self.token_kind(*key),
                            Some(TokenKind::KwClass | TokenKind::KwStruct | TokenKind::KwUnion)
                        ) =>
                {
                    if let Some(name) = self.name_parts(*name).pop() {
                        self.table.forward_classes.push(ForwardClass {
                            name,
                            scope: self.scope,
                            range: self.range(id),
                        });
                    }
                }
                NodeKind::SimpleSpecifier { token } => {
                    is_typedef |= self.token_kind(*token) == Some(TokenKind::KwTypedef);
                }
                _ => {}
            }
        }

        let base = self.base_type(specifiers);
        for declarator in declarators {
            let Some((mut parts, name_range)) = self.declarator_name(*declarator) else {
                continue;
            };
            let Some(name) = parts.pop() else {
                continue;
            };
            if let Some(function) = self.function_of(*declarator) {
                let (parameters, is_const) = self.parameters(Some(function));
                let symbol = FunctionSymbol {
                    name,
                    qualifiers: parts,
                    return_type: self.declarator_type(&base, *declarator),
                    parameters,
                    is_const,
                    scope: self.scope,
                    body_scope: None,
                    is_definition: false,
                    access: self.class_access(),
                    node: *declarator,
                    name_range,
                    range: self.range(id),
                };
                self.table.functions.push(symbol);
            } else if !is_typedef {
                let ty = self.declarator_type(&base, *declarator);
                self.table.variables.push(VariableSymbol {
                    name,
                    ty,
                    scope: self.scope,
                    offset: name_range.start,
                });
            }
        }
    }

    fn function_definition(
        &mut self,
        id: NodeId,
        specifiers: &[NodeId],
        declarator: NodeId,
        body: NodeId,
    ) {
        let Some((mut parts, name_range)) = self.declarator_name(declarator) else {
            return;
        };
        let Some(name) = parts.pop() else {
            return;
        };
        let function_declarator = self.function_of(declarator);
        let (parameters, is_const) = self.parameters(function_declarator);
        let base = self.base_type(specifiers);

        let id_in_table = FunctionId(self.table.functions.len());
        let scope_start = function_declarator.map_or(name_range.start, |f| self.range(f).start);
        let body_scope =
            self.push_scope(ScopeKind::Function(id_in_table), scope_start..self.range(body).end);
        self.table.functions.push(FunctionSymbol {
            name,
            qualifiers: parts,
            return_type: self.declarator_type(&base, declarator),
            parameters,
            is_const,
            scope: self.scope,
            body_scope: Some(body_scope),
            is_definition: true,
            access: self.class_access(),
            node: id,
            name_range,
            range: self.range(id),
        });

        let ast = self.ast;
        self.in_scope(body_scope, |this| {
            let saved_access = this.access.take();
            if let Some(function) = function_declarator
                && let NodeKind::FunctionDeclarator { parameters, .. } = ast.kind(function)
            {
                for parameter in parameters {
                    if let NodeKind::ParameterDeclaration {
                        specifiers,
                        declarator: Some(declarator),
                    } = ast.kind(*parameter)
                    {
                        this.variable(specifiers, *declarator);
                    }
                }
            }
            this.statement(body);
            this.access = saved_access;
        });
    }

    fn variable(&mut self, specifiers: &[NodeId], declarator: NodeId) {
        let Some((mut parts, name_range)) = self.declarator_name(declarator) else {
            return;
        };
        let Some(name) = parts.pop() else {
            return;
        };
        let base = self.base_type(specifiers);
        let ty = self.declarator_type(&base, declarator);
        self.table.variables.push(VariableSymbol {
            name,
            ty,
            scope: self.scope,
            offset: name_range.start,
        });
    }

    fn class(&mut self, spec: NodeId) {
        let ast = self.ast;
        let NodeKind::ClassSpecifier {
            key,
            name,
            lbrace,
            members,
            rbrace,
        } = ast.kind(spec)
        else {
            return;
        };

        let name = name
            .and_then(|n| self.name_parts(n).pop())
            .unwrap_or_default();
        let key = match self.token_kind(*key) {
            Some(TokenKind::KwStruct) => ClassKey::Struct,
            Some(TokenKind::KwUnion) => ClassKey::Union,
            _ => ClassKey::Class,
        };
        let class_id = ClassId(self.table.classes.len());
        let body_scope = self.push_scope(
            ScopeKind::Class(class_id),
            self.start(*lbrace)..self.end(*rbrace),
        );
        let mut qualified_name = self.prefix.clone();
        qualified_name.push(name.clone());
        self.table.classes.push(ClassSymbol {
            name: name.clone(),
            qualified_name,
            key,
            scope: self.scope,
            body_scope,
            node: spec,
            lbrace: self.start(*lbrace),
            rbrace: self.start(*rbrace),
            sections: Vec::new(),
            has_q_object: false,
        });

        let mut sections = vec![AccessSection {
            access: key.default_access(),
            slots: false,
            label: None,
            end: self.end(*lbrace),
            member_count: 0,
        }];
        let mut has_q_object = false;

        self.prefix.push(name);
        let saved_access = self.access.replace(key.default_access());
        self.in_scope(body_scope, |this| {
            for member in members {
                match ast.kind(*member) {
                    NodeKind::AccessDeclaration {
                        access,
                        slots,
                        colon,
                    } => {
                        let level = match this.token_kind(*access) {
                            Some(TokenKind::KwPublic) => Access::Public,
                            Some(TokenKind::KwProtected) => Access::Protected,
                            Some(TokenKind::KwSignals) => Access::Signals,
                            _ => Access::Private,
                        };
                        this.access = Some(level);
                        sections.push(AccessSection {
                            access: level,
                            slots: slots.is_some(),
                            label: Some(this.start(*access)..this.end(*colon)),
                            end: this.end(*colon),
                            member_count: 0,
                        });
                    }
                    NodeKind::MacroMember { token } => {
                        has_q_object |= this.text(*token) == "Q_OBJECT";
                    }
                    _ => {
                        this.declaration(*member);
                        if let Some(section) = sections.last_mut() {
                            section.end = this.range(*member).end;
                            section.member_count += 1;
                        }
                    }
                }
            }
        });
        self.access = saved_access;
        self.prefix.pop();

        sections.retain(|s| s.label.is_some() || s.member_count > 0);
        if let Some(class) = self.table.classes.get_mut(class_id.0) {
            class.sections = sections;
            class.has_q_object = has_q_object;
        }
    }

    fn enumeration(&mut self, spec: NodeId) {
        let NodeKind::EnumSpecifier {
            name, enumerators, ..
        } = self.ast.kind(spec)
        else {
            return;
        };
        let enumerators = enumerators
            .iter()
            .filter_map(|e| match self.ast.kind(*e) {
                NodeKind::Enumerator { identifier, .. } => Some(self.text(*identifier).to_string()),
                _ => None,
            })
            .collect();
        self.table.enums.push(EnumSymbol {
            name: name.and_then(|n| self.name_parts(n).pop()),
            prefix: self.prefix.clone(),
            scope: self.scope,
            enumerators,
            node: spec,
        });
    }

    // ---- statements ----

    fn statement(&mut self, id: NodeId) {
        let ast = self.ast;
        match ast.kind(id) {
            NodeKind::Compound { statements, .. } => {
                let scope = self.push_scope(ScopeKind::Block, self.range(id));
                self.in_scope(scope, |this| {
                    for statement in statements {
                        this.statement(*statement);
                    }
                });
            }
            NodeKind::DeclarationStatement { declaration } => self.declaration(*declaration),
            NodeKind::If {
                condition,
                then_stmt,
                else_stmt,
                ..
            } => {
                let scope = self.push_scope(ScopeKind::Block, self.range(id));
                self.in_scope(scope, |this| {
                    this.condition(*condition);
                    this.statement(*then_stmt);
                    if let Some(else_stmt) = else_stmt {
                        this.statement(*else_stmt);
                    }
                });
            }
            NodeKind::While {
                condition, body, ..
            }
            | NodeKind::Switch {
                condition, body, ..
            } => {
                let scope = self.push_scope(ScopeKind::Block, self.range(id));
                self.in_scope(scope, |this| {
                    this.condition(*condition);
                    this.statement(*body);
                });
            }
            NodeKind::For {
                initializer,
                condition,
                body,
                ..
            } => {
                let scope = self.push_scope(ScopeKind::Block, self.range(id));
                self.in_scope(scope, |this| {
                    this.statement(*initializer);
                    if let Some(condition) = condition {
                        this.condition(*condition);
                    }
                    this.statement(*body);
                });
            }
            NodeKind::Do { body, .. } => self.statement(*body),
            _ => {}
        }
    }

    fn condition(&mut self, id: NodeId) {
        if let NodeKind::Condition {
            specifiers,
            declarator,
        } = self.ast.kind(id)
        {
            self.variable(specifiers, *declarator);
        }
    }
}
