//! Abstract syntax tree.
//!
//! The tree is an arena: nodes live in one `Vec` and refer to each other through [`NodeId`]
//! handles. Every node covers an inclusive token range (`first_token..=last_token`) and carries
//! kind-specific children as handles or token indices. The quick-fix engine never mutates a tree;
//! it only reads positions from it.

use crate::token::{Token, TokenIndex};

/// Handle to a node inside an [`Ast`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    /// Position of the node in the arena.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Node kinds with their children.
///
/// Token fields hold [`TokenIndex`] values into the snapshot's token stream.
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum NodeKind {
    TranslationUnit {
        declarations: Vec<NodeId>,
    },
    Namespace {
        namespace_token: TokenIndex,
        identifier: Option<TokenIndex>,
        lbrace: TokenIndex,
        declarations: Vec<NodeId>,
        rbrace: TokenIndex,
    },
    /// `specifiers declarator, declarator;`. Also covers class and enum definitions, whose
    /// declarator list is usually empty.
    SimpleDeclaration {
        specifiers: Vec<NodeId>,
        declarators: Vec<NodeId>,
        semicolon: Option<TokenIndex>,
    },
    FunctionDefinition {
        specifiers: Vec<NodeId>,
        declarator: NodeId,
        body: NodeId,
    },
    /// A keyword specifier such as `const`, `unsigned` or `int`.
    SimpleSpecifier {
        token: TokenIndex,
    },
    NamedTypeSpecifier {
        name: NodeId,
    },
    /// `class Foo` / `struct Foo` / `enum Foo` without a body.
    ElaboratedTypeSpecifier {
        key: TokenIndex,
        name: NodeId,
    },
    ClassSpecifier {
        key: TokenIndex,
        name: Option<NodeId>,
        lbrace: TokenIndex,
        members: Vec<NodeId>,
        rbrace: TokenIndex,
    },
    /// `public:`, `private slots:`, `signals:`.
    AccessDeclaration {
        access: TokenIndex,
        slots: Option<TokenIndex>,
        colon: TokenIndex,
    },
    /// A bare macro line inside a class body, such as `Q_OBJECT`.
    MacroMember {
        token: TokenIndex,
    },
    EnumSpecifier {
        enum_token: TokenIndex,
        name: Option<NodeId>,
        lbrace: TokenIndex,
        enumerators: Vec<NodeId>,
        rbrace: TokenIndex,
    },
    Enumerator {
        identifier: TokenIndex,
        equal: Option<TokenIndex>,
        value: Option<NodeId>,
    },
    /// `core` is `None` for abstract declarators such as the `*` in `f(int *)`.
    Declarator {
        ptr_ops: Vec<TokenIndex>,
        core: Option<NodeId>,
        function: Option<NodeId>,
        equal: Option<TokenIndex>,
        initializer: Option<NodeId>,
    },
    /// The name part of a declarator.
    DeclaratorId {
        name: NodeId,
    },
    FunctionDeclarator {
        lparen: TokenIndex,
        parameters: Vec<NodeId>,
        rparen: TokenIndex,
        cv: Option<TokenIndex>,
    },
    ParameterDeclaration {
        specifiers: Vec<NodeId>,
        declarator: Option<NodeId>,
    },

    Compound {
        lbrace: TokenIndex,
        statements: Vec<NodeId>,
        rbrace: TokenIndex,
    },
    DeclarationStatement {
        declaration: NodeId,
    },
    ExpressionStatement {
        expression: Option<NodeId>,
        semicolon: TokenIndex,
    },
    If {
        if_token: TokenIndex,
        lparen: TokenIndex,
        condition: NodeId,
        rparen: TokenIndex,
        then_stmt: NodeId,
        else_token: Option<TokenIndex>,
        else_stmt: Option<NodeId>,
    },
    While {
        while_token: TokenIndex,
        lparen: TokenIndex,
        condition: NodeId,
        rparen: TokenIndex,
        body: NodeId,
    },
    Do {
        do_token: TokenIndex,
        body: NodeId,
        while_token: TokenIndex,
        lparen: TokenIndex,
        expression: NodeId,
        rparen: TokenIndex,
        semicolon: TokenIndex,
    },
    For {
        for_token: TokenIndex,
        lparen: TokenIndex,
        initializer: NodeId,
        condition: Option<NodeId>,
        semicolon: TokenIndex,
        expression: Option<NodeId>,
        rparen: TokenIndex,
        body: NodeId,
    },
    Switch {
        switch_token: TokenIndex,
        lparen: TokenIndex,
        condition: NodeId,
        rparen: TokenIndex,
        body: NodeId,
    },
    Case {
        case_token: TokenIndex,
        expression: NodeId,
        colon: TokenIndex,
    },
    Default {
        default_token: TokenIndex,
        colon: TokenIndex,
    },
    Break {
        break_token: TokenIndex,
        semicolon: TokenIndex,
    },
    Continue {
        continue_token: TokenIndex,
        semicolon: TokenIndex,
    },
    Return {
        return_token: TokenIndex,
        expression: Option<NodeId>,
        semicolon: TokenIndex,
    },
    /// A declaration used as a condition: `if (T x = f())`.
    Condition {
        specifiers: Vec<NodeId>,
        declarator: NodeId,
    },

    Binary {
        left: NodeId,
        op: TokenIndex,
        right: NodeId,
    },
    Conditional {
        condition: NodeId,
        question: TokenIndex,
        left: NodeId,
        colon: TokenIndex,
        right: NodeId,
    },
    Unary {
        op: TokenIndex,
        operand: NodeId,
    },
    Postfix {
        operand: NodeId,
        op: TokenIndex,
    },
    Nested {
        lparen: TokenIndex,
        expression: NodeId,
        rparen: TokenIndex,
    },
    Call {
        callee: NodeId,
        lparen: TokenIndex,
        arguments: Vec<NodeId>,
        rparen: TokenIndex,
    },
    MemberAccess {
        base: NodeId,
        access: TokenIndex,
        member: NodeId,
    },
    ArrayAccess {
        base: NodeId,
        lbracket: TokenIndex,
        index: NodeId,
        rbracket: TokenIndex,
    },
    SimpleName {
        identifier: TokenIndex,
    },
    DestructorName {
        tilde: TokenIndex,
        identifier: TokenIndex,
    },
    /// `A::B::name`; `qualifiers` are the identifier tokens before each `::`.
    QualifiedName {
        qualifiers: Vec<TokenIndex>,
        name: NodeId,
    },
    /// Numeric and character literals.
    NumericLiteral {
        token: TokenIndex,
    },
    /// A string literal, optionally preceded by the Objective-C `@`.
    StringLiteral {
        at: Option<TokenIndex>,
        literal: TokenIndex,
    },
    BoolLiteral {
        token: TokenIndex,
    },
    This {
        token: TokenIndex,
    },
}

impl NodeKind {
    /// Child nodes in source order.
    pub fn children(&self) -> Vec<NodeId> {
        use NodeKind::*;
        let mut out = Vec::new();
        match self {
            TranslationUnit { declarations } | Namespace { declarations, .. } => {
                out.extend(declarations)
            }
            SimpleDeclaration {
                specifiers,
                declarators,
                ..
            } => {
                out.extend(specifiers);
                out.extend(declarators);
            }
            FunctionDefinition {
                specifiers,
                declarator,
                body,
            } => {
                out.extend(specifiers);
                out.push(*declarator);
                out.push(*body);
            }
            NamedTypeSpecifier { name } | ElaboratedTypeSpecifier { name, .. } => out.push(*name),
            ClassSpecifier { name, members, .. } => {
                out.extend(name);
                out.extend(members);
            }
            EnumSpecifier {
                name, enumerators, ..
            } => {
                out.extend(name);
                out.extend(enumerators);
            }
            Enumerator { value, .. } => out.extend(value),
            Declarator {
                core,
                function,
                initializer,
                ..
            } => {
                out.extend(core);
                out.extend(function);
                out.extend(initializer);
            }
            DeclaratorId { name } => out.push(*name),
            FunctionDeclarator { parameters, .. } => out.extend(parameters),
            ParameterDeclaration {
                specifiers,
                declarator,
            } => {
                out.extend(specifiers);
                out.extend(declarator);
            }
            Compound { statements, .. } => out.extend(statements),
            DeclarationStatement { declaration } => out.push(*declaration),
            ExpressionStatement { expression, .. } | Return { expression, .. } => {
                out.extend(expression)
            }
            If {
                condition,
                then_stmt,
                else_stmt,
                ..
            } => {
                out.push(*condition);
                out.push(*then_stmt);
                out.extend(else_stmt);
            }
            While {
                condition, body, ..
            }
            | Switch {
                condition, body, ..
            } => {
                out.push(*condition);
                out.push(*body);
            }
            Do {
                body, expression, ..
            } => {
                out.push(*body);
                out.push(*expression);
            }
            For {
                initializer,
                condition,
                expression,
                body,
                ..
            } => {
                out.push(*initializer);
                out.extend(condition);
                out.extend(expression);
                out.push(*body);
            }
            Case { expression, .. } => out.push(*expression),
            Condition {
                specifiers,
                declarator,
            } => {
                out.extend(specifiers);
                out.push(*declarator);
            }
            Binary { left, right, .. } => {
                out.push(*left);
                out.push(*right);
            }
            Conditional {
                condition,
                left,
                right,
                ..
            } => {
                out.push(*condition);
                out.push(*left);
                out.push(*right);
            }
            Unary { operand, .. } | Postfix { operand, .. } => out.push(*operand),
            Nested { expression, .. } => out.push(*expression),
            Call {
                callee, arguments, ..
            } => {
                out.push(*callee);
                out.extend(arguments);
            }
            MemberAccess { base, member, .. } => {
                out.push(*base);
                out.push(*member);
            }
            ArrayAccess { base, index, .. } => {
                out.push(*base);
                out.push(*index);
            }
            QualifiedName { name, .. } => out.push(*name),
            SimpleSpecifier { .. }
            | AccessDeclaration { .. }
            | MacroMember { .. }
            | Default { .. }
            | Break { .. }
            | Continue { .. }
            | SimpleName { .. }
            | DestructorName { .. }
            | NumericLiteral { .. }
            | StringLiteral { .. }
            | BoolLiteral { .. }
            | This { .. } => {}
        }
        out
    }

    /// Returns `true` for name nodes.
    pub fn is_name(&self) -> bool {
        matches!(
            self,
            NodeKind::SimpleName { .. }
                | NodeKind::DestructorName { .. }
                | NodeKind::QualifiedName { .. }
        )
    }
}

/// A node: kind plus inclusive token range and parent link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// Kind and children.
    pub kind: NodeKind,
    /// First token covered by the node.
    pub first_token: TokenIndex,
    /// Last token covered by the node (inclusive).
    pub last_token: TokenIndex,
    /// Enclosing node, `None` for the root.
    pub parent: Option<NodeId>,
}

/// Arena of nodes with a root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ast {
    nodes: Vec<Node>,
    root: Option<NodeId>,
}

impl Ast {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node. Children listed by `kind` get their parent link set to the new node, so nodes
    /// are added bottom-up.
    pub fn add(&mut self, kind: NodeKind, first_token: TokenIndex, last_token: TokenIndex) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        for child in kind.children() {
            if let Some(node) = self.nodes.get_mut(child.index()) {
                node.parent = Some(id);
            }
        }
        self.nodes.push(Node {
            kind,
            first_token,
            last_token: last_token.max(first_token),
            parent: None,
        });
        id
    }

    /// Mark `id` as the root.
    pub fn set_root(&mut self, id: NodeId) {
        self.root = Some(id);
    }

    /// Root node, if any.
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the tree has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Node by handle.
    ///
    /// Handles are only ever produced by this arena, so indexing cannot fail for them.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    /// Node by handle, if it exists.
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Kind of a node.
    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.node(id).kind
    }

    /// Parent of a node.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    /// Children of a node in source order.
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.node(id).kind.children()
    }

    /// `id` followed by its ancestors up to the root.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(Some(id), move |current| self.parent(*current))
    }

    /// All nodes with their handles, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (NodeId(i as u32), node))
    }

    /// Nodes from the root down to the innermost node containing `offset`.
    ///
    /// A node contains an offset when it lies between the start of its first token and the end of
    /// its last token, both ends inclusive. When two siblings touch at `offset`, the earlier one
    /// wins.
    pub fn path_at(&self, tokens: &[Token], offset: usize) -> Vec<NodeId> {
        let mut path = Vec::new();
        let Some(root) = self.root else {
            return path;
        };
        let contains = |id: NodeId| {
            let node = self.node(id);
            match (tokens.get(node.first_token), tokens.get(node.last_token)) {
                (Some(first), Some(last)) => first.start() <= offset && offset <= last.end(),
                _ => false,
            }
        };

        if !contains(root) {
            return path;
        }
        let mut current = root;
        path.push(current);
        while let Some(next) = self.children(current).into_iter().find(|c| contains(*c)) {
            path.push(next);
            current = next;
        }
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenKind;

    // a <= b ;
    fn tokens() -> Vec<Token> {
        vec![
            Token::new(TokenKind::Identifier, 0..1, "a"),
            Token::new(TokenKind::LessEqual, 2..4, "<="),
            Token::new(TokenKind::Identifier, 5..6, "b"),
            Token::new(TokenKind::Semicolon, 6..7, ";"),
        ]
    }

    fn tree() -> (Ast, NodeId, NodeId, NodeId) {
        let mut ast = Ast::new();
        let a = ast.add(NodeKind::SimpleName { identifier: 0 }, 0, 0);
        let b = ast.add(NodeKind::SimpleName { identifier: 2 }, 2, 2);
        let bin = ast.add(
            NodeKind::Binary {
                left: a,
                op: 1,
                right: b,
            },
            0,
            2,
        );
        let stmt = ast.add(
            NodeKind::ExpressionStatement {
                expression: Some(bin),
                semicolon: 3,
            },
            0,
            3,
        );
        let unit = ast.add(
            NodeKind::TranslationUnit {
                declarations: vec![stmt],
            },
            0,
            3,
        );
        ast.set_root(unit);
        (ast, bin, a, b)
    }

    #[test]
    fn test_parent_links_are_set_bottom_up() {
        let (ast, bin, a, b) = tree();
        assert_eq!(ast.parent(a), Some(bin));
        assert_eq!(ast.parent(b), Some(bin));
        assert_eq!(ast.ancestors(a).count(), 4);
    }

    #[test]
    fn test_path_stops_at_operator() {
        let (ast, bin, _, _) = tree();
        let path = ast.path_at(&tokens(), 3);
        assert_eq!(path.len(), 3);
        assert_eq!(path.last(), Some(&bin));
    }

    #[test]
    fn test_path_prefers_earlier_touching_sibling() {
        let (ast, _, _, b) = tree();
        // Offset 6 is both the end of `b` and the start of `;`.
        let path = ast.path_at(&tokens(), 6);
        assert_eq!(path.last(), Some(&b));
    }

    #[test]
    fn test_path_outside_tree_is_empty() {
        let (ast, _, _, _) = tree();
        assert!(ast.path_at(&tokens(), 40).is_empty());
        assert!(Ast::new().path_at(&tokens(), 0).is_empty());
    }
}
