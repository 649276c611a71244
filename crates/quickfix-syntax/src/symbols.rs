//! Semantic tables filled by a binder.
//!
//! Symbols refer to scopes and to each other through small index newtypes. Positions are character
//! offsets into the owning document.

use crate::ast::NodeId;
use std::fmt;
use std::ops::Range;

macro_rules! index_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub usize);
    };
}

index_type!(
    /// Index into [`SymbolTable::scopes`].
    ScopeId
);
index_type!(
    /// Index into [`SymbolTable::classes`].
    ClassId
);
index_type!(
    /// Index into [`SymbolTable::functions`].
    FunctionId
);
index_type!(
    /// Index into [`SymbolTable::variables`].
    VariableId
);
index_type!(
    /// Index into [`SymbolTable::enums`].
    EnumId
);
index_type!(
    /// Index into [`SymbolTable::forward_classes`].
    ForwardId
);

impl ScopeId {
    /// The file scope. A binder always creates it first.
    pub const GLOBAL: ScopeId = ScopeId(0);
}

/// What opened a scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeKind {
    /// The whole file.
    Global,
    /// A namespace body.
    Namespace(Option<String>),
    /// A class body.
    Class(ClassId),
    /// Parameters and body of a function definition.
    Function(FunctionId),
    /// A compound statement or a statement with a condition.
    Block,
}

/// A lexical scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope {
    /// What opened the scope.
    pub kind: ScopeKind,
    /// Characters the scope covers.
    pub range: Range<usize>,
    /// Enclosing scope; `None` only for the global scope.
    pub parent: Option<ScopeId>,
}

/// A spelled type: base specifiers plus pointer/reference operators.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Type {
    /// Specifiers and type name, e.g. `const QString` or `unsigned int`.
    pub base: String,
    /// Declarator operators, e.g. `*`, `**`, `&`.
    pub ptr_ops: String,
}

impl Type {
    /// A type with no pointer operators.
    pub fn named(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            ptr_ops: String::new(),
        }
    }

    /// Returns `true` if the type has no spelling at all (constructors, destructors).
    pub fn is_empty(&self) -> bool {
        self.base.is_empty() && self.ptr_ops.is_empty()
    }

    /// Returns `true` if the outermost operator is `*`.
    pub fn is_pointer(&self) -> bool {
        self.ptr_ops.ends_with('*')
    }

    /// `T *` from `T`.
    pub fn pointer_to(&self) -> Self {
        let mut ptr_ops = self.ptr_ops.clone();
        ptr_ops.push('*');
        Self {
            base: self.base.clone(),
            ptr_ops,
        }
    }

    /// `T` from `T *`; `None` if the type is not a pointer.
    pub fn pointee(&self) -> Option<Self> {
        let ptr_ops = self.ptr_ops.strip_suffix('*')?;
        Some(Self {
            base: self.base.clone(),
            ptr_ops: ptr_ops.to_string(),
        })
    }

    /// The type with references and cv-qualifiers removed.
    pub fn unqualified(&self) -> Self {
        let base = self
            .base
            .split_whitespace()
            .filter(|word| !matches!(*word, "const" | "volatile"))
            .collect::<Vec<_>>()
            .join(" ");
        Self {
            base,
            ptr_ops: self.ptr_ops.trim_end_matches('&').to_string(),
        }
    }

    /// Name components of the base, when it names a class or enum (`A::B` gives `["A", "B"]`).
    pub fn name_components(&self) -> Vec<String> {
        let unqualified = self.unqualified();
        let base = unqualified.base.trim();
        if base.is_empty() || base.contains(' ') {
            return Vec::new();
        }
        base.split("::")
            .filter(|part| !part.is_empty())
            .map(str::to_string)
            .collect()
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.base.is_empty(), self.ptr_ops.is_empty()) {
            (_, true) => write!(f, "{}", self.base),
            (true, false) => write!(f, "{}", self.ptr_ops),
            (false, false) => write!(f, "{} {}", self.base, self.ptr_ops),
        }
    }
}

/// Class access level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Access {
    /// `public`
    Public,
    /// `protected`
    Protected,
    /// `private`
    Private,
    /// `signals` / `Q_SIGNALS`
    Signals,
}

impl Access {
    /// Keyword spelling.
    pub fn keyword(self) -> &'static str {
        match self {
            Access::Public => "public",
            Access::Protected => "protected",
            Access::Private => "private",
            Access::Signals => "signals",
        }
    }
}

/// `class`, `struct` or `union`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassKey {
    /// `class`
    Class,
    /// `struct`
    Struct,
    /// `union`
    Union,
}

impl ClassKey {
    /// Access of members before the first label.
    pub fn default_access(self) -> Access {
        match self {
            ClassKey::Class => Access::Private,
            ClassKey::Struct | ClassKey::Union => Access::Public,
        }
    }
}

/// A run of class members under one access label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessSection {
    /// Access level.
    pub access: Access,
    /// Whether the label carries `slots`.
    pub slots: bool,
    /// Range of the label (`private slots:`); `None` for members before the first label.
    pub label: Option<Range<usize>>,
    /// Offset just past the last member, or past the label when the section is empty.
    pub end: usize,
    /// Number of members in the section.
    pub member_count: usize,
}

/// A class definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassSymbol {
    /// Unqualified name.
    pub name: String,
    /// Enclosing namespace and class names followed by `name`.
    pub qualified_name: Vec<String>,
    /// Class key.
    pub key: ClassKey,
    /// Scope the class is declared in.
    pub scope: ScopeId,
    /// Scope of the class body.
    pub body_scope: ScopeId,
    /// The `ClassSpecifier` node.
    pub node: NodeId,
    /// Offset of `{`.
    pub lbrace: usize,
    /// Offset of `}`.
    pub rbrace: usize,
    /// Access sections in source order.
    pub sections: Vec<AccessSection>,
    /// Whether the body contains `Q_OBJECT`, which declares `tr`.
    pub has_q_object: bool,
}

/// A function parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    /// Parameter type.
    pub ty: Type,
    /// Parameter name, if spelled.
    pub name: Option<String>,
}

/// A function declaration or definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSymbol {
    /// Unqualified name.
    pub name: String,
    /// Qualifiers spelled before the name (`C` in `void C::f()`).
    pub qualifiers: Vec<String>,
    /// Return type; empty for constructors and destructors.
    pub return_type: Type,
    /// Parameters in order.
    pub parameters: Vec<Parameter>,
    /// Trailing `const`.
    pub is_const: bool,
    /// Scope the function is declared in.
    pub scope: ScopeId,
    /// Scope of parameters and body, for definitions.
    pub body_scope: Option<ScopeId>,
    /// Whether this is a definition.
    pub is_definition: bool,
    /// Access level, for functions declared in a class body.
    pub access: Option<Access>,
    /// The `FunctionDefinition` node, or the `Declarator` node of a declaration.
    pub node: NodeId,
    /// Range of the declared name.
    pub name_range: Range<usize>,
    /// Range of the whole declaration or definition, including `;` or the body.
    pub range: Range<usize>,
}

impl FunctionSymbol {
    /// Parameter list as spelled in a declaration: `int a, const QString &b`.
    pub fn parameter_list(&self) -> String {
        self.parameters
            .iter()
            .map(|p| match (&p.name, p.ty.ptr_ops.is_empty()) {
                (Some(name), true) => format!("{} {name}", p.ty),
                (Some(name), false) => format!("{}{name}", p.ty),
                (None, _) => p.ty.to_string(),
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Returns `true` if both functions take the same parameter types.
    pub fn same_signature(&self, other: &FunctionSymbol) -> bool {
        self.name == other.name
            && self.is_const == other.is_const
            && self.parameters.len() == other.parameters.len()
            && self
                .parameters
                .iter()
                .zip(&other.parameters)
                .all(|(a, b)| a.ty == b.ty)
    }
}

/// A variable, parameter or data member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableSymbol {
    /// Name.
    pub name: String,
    /// Declared type.
    pub ty: Type,
    /// Declaring scope.
    pub scope: ScopeId,
    /// Offset of the declared name.
    pub offset: usize,
}

/// An enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumSymbol {
    /// Name; `None` for anonymous enums.
    pub name: Option<String>,
    /// Enclosing namespace and class names.
    pub prefix: Vec<String>,
    /// Declaring scope. Enumerators are visible in this scope.
    pub scope: ScopeId,
    /// Enumerator names in declaration order.
    pub enumerators: Vec<String>,
    /// The `EnumSpecifier` node.
    pub node: NodeId,
}

impl EnumSymbol {
    /// Fully qualified enumerator names (`Foo::A` for an enum declared in class `Foo`).
    pub fn qualified_enumerators(&self) -> Vec<String> {
        self.enumerators
            .iter()
            .map(|e| {
                let mut parts = self.prefix.clone();
                parts.push(e.clone());
                parts.join("::")
            })
            .collect()
    }

    /// Fully qualified enum name.
    pub fn qualified_name(&self) -> Option<String> {
        let name = self.name.as_ref()?;
        let mut parts = self.prefix.clone();
        parts.push(name.clone());
        Some(parts.join("::"))
    }
}

/// `class Foo;`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardClass {
    /// Declared name.
    pub name: String,
    /// Declaring scope.
    pub scope: ScopeId,
    /// Range of the declaration.
    pub range: Range<usize>,
}

/// An `#include` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Include {
    /// Included path as written.
    pub path: String,
    /// `<...>` rather than `"..."`.
    pub angled: bool,
    /// 1-based line number.
    pub line: usize,
    /// Range of the directive.
    pub range: Range<usize>,
}

/// Everything a binder knows about one document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolTable {
    /// Scopes; index 0 is the global scope.
    pub scopes: Vec<Scope>,
    /// Class definitions.
    pub classes: Vec<ClassSymbol>,
    /// Function declarations and definitions.
    pub functions: Vec<FunctionSymbol>,
    /// Variables, parameters and data members.
    pub variables: Vec<VariableSymbol>,
    /// Enumerations.
    pub enums: Vec<EnumSymbol>,
    /// Forward class declarations.
    pub forward_classes: Vec<ForwardClass>,
    /// `#include` lines.
    pub includes: Vec<Include>,
}

impl SymbolTable {
    /// Scope by id.
    pub fn scope(&self, id: ScopeId) -> Option<&Scope> {
        self.scopes.get(id.0)
    }

    /// Class by id.
    pub fn class(&self, id: ClassId) -> Option<&ClassSymbol> {
        self.classes.get(id.0)
    }

    /// Function by id.
    pub fn function(&self, id: FunctionId) -> Option<&FunctionSymbol> {
        self.functions.get(id.0)
    }

    /// Variable by id.
    pub fn variable(&self, id: VariableId) -> Option<&VariableSymbol> {
        self.variables.get(id.0)
    }

    /// Enum by id.
    pub fn enumeration(&self, id: EnumId) -> Option<&EnumSymbol> {
        self.enums.get(id.0)
    }

    /// Forward declaration by id.
    pub fn forward_class(&self, id: ForwardId) -> Option<&ForwardClass> {
        self.forward_classes.get(id.0)
    }

    /// Functions declared directly in `scope`.
    pub fn functions_in(&self, scope: ScopeId) -> impl Iterator<Item = (FunctionId, &FunctionSymbol)> {
        self.functions
            .iter()
            .enumerate()
            .filter(move |(_, f)| f.scope == scope)
            .map(|(i, f)| (FunctionId(i), f))
    }

    /// The function whose declared name covers `offset`, end inclusive.
    pub fn function_named_at(&self, offset: usize) -> Option<FunctionId> {
        self.functions
            .iter()
            .position(|f| f.name_range.start <= offset && offset <= f.name_range.end)
            .map(FunctionId)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_display_matches_declaration_style() {
        assert_eq!(Type::named("int").to_string(), "int");
        assert_eq!(Type::named("Foo").pointer_to().to_string(), "Foo *");
        assert_eq!(
            Type::named("const char").pointer_to().pointee().unwrap(),
            Type::named("const char")
        );
        assert_eq!(Type::named("int").pointee(), None);
    }

    #[test]
    fn test_name_components_strip_qualifiers() {
        let ty = Type {
            base: "const N::Color".to_string(),
            ptr_ops: "&".to_string(),
        };
        assert_eq!(ty.name_components(), vec!["N", "Color"]);
        assert!(Type::named("unsigned int").name_components().is_empty());
    }

    #[test]
    fn test_parameter_list_spelling() {
        let f = FunctionSymbol {
            name: "f".to_string(),
            qualifiers: vec![],
            return_type: Type::named("void"),
            parameters: vec![
                Parameter {
                    ty: Type::named("int"),
                    name: Some("a".to_string()),
                },
                Parameter {
                    ty: Type {
                        base: "const QString".to_string(),
                        ptr_ops: "&".to_string(),
                    },
                    name: Some("b".to_string()),
                },
                Parameter {
                    ty: Type::named("bool"),
                    name: None,
                },
            ],
            is_const: false,
            scope: ScopeId::GLOBAL,
            body_scope: None,
            is_definition: false,
            access: None,
            node: crate::ast::Ast::new().add(crate::ast::NodeKind::This { token: 0 }, 0, 0),
            name_range: 0..1,
            range: 0..1,
        };
        assert_eq!(f.parameter_list(), "int a, const QString &b, bool");
    }
}
