//! Name lookup and expression typing over a [`DocumentSnapshot`].
//!
//! Lookup walks the scope chain from the innermost scope at an offset outward and returns every
//! symbol of the first scope that declares the name. A member function defined out of line
//! (`void C::f() {}`) sees the members of `C` between its own scope and the scope it is written
//! in.

use crate::ast::{NodeId, NodeKind};
use crate::snapshot::{DocumentSnapshot, Snapshot};
use crate::symbols::{ClassId, EnumId, ForwardId, FunctionId, ScopeId, ScopeKind, Type, VariableId};
use crate::token::TokenKind;
use std::sync::Arc;

/// Result of a name lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Symbol {
    /// Variable, parameter or data member.
    Variable(VariableId),
    /// Function or member function.
    Function(FunctionId),
    /// Class definition.
    Class(ClassId),
    /// Enumeration.
    Enum(EnumId),
    /// An enumerator of an enumeration.
    Enumerator {
        /// Owning enumeration.
        enumeration: EnumId,
        /// Position in the enumerator list.
        index: usize,
    },
    /// Forward class declaration.
    ForwardClass(ForwardId),
}

impl Symbol {
    /// Returns `true` for declarations that are not functions.
    pub fn is_object_or_type(&self) -> bool {
        !matches!(self, Symbol::Function(_))
    }
}

impl DocumentSnapshot {
    /// Innermost scope containing `offset`.
    pub fn scope_at(&self, offset: usize) -> ScopeId {
        self.symbols()
            .scopes
            .iter()
            .enumerate()
            .filter(|(_, s)| s.range.start <= offset && offset <= s.range.end)
            .min_by_key(|(i, s)| (s.range.end - s.range.start, std::cmp::Reverse(*i)))
            .map_or(ScopeId::GLOBAL, |(i, _)| ScopeId(i))
    }

    /// `scope` and every scope visible from it, innermost first.
    pub fn scope_chain(&self, scope: ScopeId) -> Vec<ScopeId> {
        let symbols = self.symbols();
        let mut chain = Vec::new();
        let mut current = Some(scope);
        while let Some(id) = current {
            if chain.contains(&id) {
                break;
            }
            chain.push(id);
            let Some(data) = symbols.scope(id) else {
                break;
            };
            current = match data.kind {
                ScopeKind::Function(function) => self
                    .owner_class(function)
                    .and_then(|class| symbols.class(class))
                    .map(|class| class.body_scope)
                    .filter(|body| !chain.contains(body))
                    .or(data.parent),
                _ => data.parent,
            };
        }
        chain
    }

    /// Names of the namespaces and classes enclosing `scope`, outermost first.
    pub fn qualified_scope_names(&self, scope: ScopeId) -> Vec<String> {
        let symbols = self.symbols();
        let mut names: Vec<String> = Vec::new();
        for id in self.scope_chain(scope) {
            match symbols.scope(id).map(|s| &s.kind) {
                Some(ScopeKind::Namespace(Some(name))) => names.push(name.clone()),
                // A class name already carries its enclosing path.
                Some(ScopeKind::Class(class)) => {
                    if let Some(class) = symbols.class(*class) {
                        return class.qualified_name.clone();
                    }
                }
                _ => {}
            }
        }
        names.reverse();
        names
    }

    /// Class a member function belongs to: the class whose body declares it, or the class named
    /// by its qualifiers.
    pub fn owner_class(&self, function: FunctionId) -> Option<ClassId> {
        let symbols = self.symbols();
        let function = symbols.function(function)?;
        if let Some(ScopeKind::Class(class)) = symbols.scope(function.scope).map(|s| &s.kind) {
            return Some(*class);
        }
        if function.qualifiers.is_empty() {
            return None;
        }
        self.find_class(&function.qualifiers)
    }

    /// Class whose qualified name ends with `components`.
    pub fn find_class(&self, components: &[String]) -> Option<ClassId> {
        if components.is_empty() {
            return None;
        }
        let classes = &self.symbols().classes;
        classes
            .iter()
            .position(|c| c.qualified_name == components)
            .or_else(|| {
                classes
                    .iter()
                    .position(|c| c.qualified_name.ends_with(components))
            })
            .map(ClassId)
    }

    /// The function symbol created for a `FunctionDefinition` or declarator node.
    pub fn function_for_node(&self, node: NodeId) -> Option<FunctionId> {
        self.symbols()
            .functions
            .iter()
            .position(|f| f.node == node)
            .map(FunctionId)
    }

    /// Symbols named `name` in the innermost scope (starting at `scope`) that declares it.
    pub fn lookup(&self, name: &str, scope: ScopeId) -> Vec<Symbol> {
        for id in self.scope_chain(scope) {
            let found = self.declared_in(name, id);
            if !found.is_empty() {
                tracing::trace!(name, scope = id.0, count = found.len(), "lookup hit");
                return found;
            }
        }
        Vec::new()
    }

    /// [`DocumentSnapshot::lookup`] from the innermost scope at `offset`.
    pub fn lookup_at(&self, name: &str, offset: usize) -> Vec<Symbol> {
        self.lookup(name, self.scope_at(offset))
    }

    /// Symbols whose fully qualified name ends with `components`. A single component falls back
    /// to scoped lookup from `scope`.
    pub fn lookup_qualified(&self, components: &[String], scope: ScopeId) -> Vec<Symbol> {
        match components {
            [] => Vec::new(),
            [name] => self.lookup(name, scope),
            _ => {
                let symbols = self.symbols();
                let mut found = Vec::new();
                for (i, e) in symbols.enums.iter().enumerate() {
                    if let Some(name) = &e.name {
                        let mut path = e.prefix.clone();
                        path.push(name.clone());
                        if path.ends_with(components) {
                            found.push(Symbol::Enum(EnumId(i)));
                        }
                    }
                    for (index, enumerator) in e.enumerators.iter().enumerate() {
                        let mut path = e.prefix.clone();
                        path.push(enumerator.clone());
                        if path.ends_with(components) {
                            found.push(Symbol::Enumerator {
                                enumeration: EnumId(i),
                                index,
                            });
                        }
                    }
                }
                found.extend(
                    symbols
                        .classes
                        .iter()
                        .enumerate()
                        .filter(|(_, c)| c.qualified_name.ends_with(components))
                        .map(|(i, _)| Symbol::Class(ClassId(i))),
                );
                if let Some((name, qualifiers)) = components.split_last()
                    && let Some(class) = self.find_class(qualifiers)
                    && let Some(class) = symbols.class(class)
                {
                    found.extend(self.declared_in(name, class.body_scope));
                }
                found
            }
        }
    }

    fn declared_in(&self, name: &str, scope: ScopeId) -> Vec<Symbol> {
        let symbols = self.symbols();
        let mut found = Vec::new();
        found.extend(
            symbols
                .variables
                .iter()
                .enumerate()
                .filter(|(_, v)| v.scope == scope && v.name == name)
                .map(|(i, _)| Symbol::Variable(VariableId(i))),
        );
        found.extend(
            symbols
                .functions
                .iter()
                .enumerate()
                .filter(|(_, f)| f.scope == scope && f.qualifiers.is_empty() && f.name == name)
                .map(|(i, _)| Symbol::Function(FunctionId(i))),
        );
        found.extend(
            symbols
                .classes
                .iter()
                .enumerate()
                .filter(|(_, c)| c.scope == scope && c.name == name)
                .map(|(i, _)| Symbol::Class(ClassId(i))),
        );
        for (i, e) in symbols.enums.iter().enumerate() {
            if e.scope != scope {
                continue;
            }
            if e.name.as_deref() == Some(name) {
                found.push(Symbol::Enum(EnumId(i)));
            }
            if let Some(index) = e.enumerators.iter().position(|n| n == name) {
                found.push(Symbol::Enumerator {
                    enumeration: EnumId(i),
                    index,
                });
            }
        }
        found.extend(
            symbols
                .forward_classes
                .iter()
                .enumerate()
                .filter(|(_, f)| f.scope == scope && f.name == name)
                .map(|(i, _)| Symbol::ForwardClass(ForwardId(i))),
        );
        found
    }

    /// Name components of a name node: `["A", "B", "c"]` for `A::B::c`.
    pub fn name_components(&self, node: NodeId) -> Option<Vec<String>> {
        match self.ast().kind(node) {
            NodeKind::SimpleName { identifier } => Some(vec![self.token_text(*identifier).to_string()]),
            NodeKind::DestructorName { identifier, .. } => {
                Some(vec![format!("~{}", self.token_text(*identifier))])
            }
            NodeKind::QualifiedName { qualifiers, name } => {
                let mut parts: Vec<String> = qualifiers
                    .iter()
                    .map(|q| self.token_text(*q).to_string())
                    .collect();
                parts.extend(self.name_components(*name)?);
                Some(parts)
            }
            NodeKind::DeclaratorId { name } | NodeKind::NamedTypeSpecifier { name } => {
                self.name_components(*name)
            }
            _ => None,
        }
    }

    /// Class named by a type, looked up from `scope`.
    pub fn class_for_type(&self, ty: &Type, scope: ScopeId) -> Option<ClassId> {
        let components = ty.name_components();
        if let [name] = components.as_slice() {
            for symbol in self.lookup(name, scope) {
                if let Symbol::Class(class) = symbol {
                    return Some(class);
                }
            }
        }
        self.find_class(&components)
    }

    /// Enumeration named by a type, looked up from `scope`.
    pub fn enum_for_type(&self, ty: &Type, scope: ScopeId) -> Option<EnumId> {
        if !ty.unqualified().ptr_ops.is_empty() {
            return None;
        }
        let components = ty.name_components();
        self.lookup_qualified(&components, scope)
            .into_iter()
            .find_map(|symbol| match symbol {
                Symbol::Enum(id) => Some(id),
                _ => None,
            })
    }

    /// Static type of an expression, as far as the simple type model can tell.
    pub fn type_of(&self, expr: NodeId) -> Option<Type> {
        let ast = self.ast();
        let scope = self.scope_at(self.start_of(expr));
        let ty = match ast.kind(expr) {
            NodeKind::NumericLiteral { token } => match self.token_kind(*token)? {
                TokenKind::CharLiteral => Type::named("char"),
                _ => numeric_literal_type(self.token_text(*token)),
            },
            NodeKind::StringLiteral { at, .. } => match at {
                Some(_) => Type::named("NSString").pointer_to(),
                None => Type::named("const char").pointer_to(),
            },
            NodeKind::BoolLiteral { .. } => Type::named("bool"),
            NodeKind::This { .. } => {
                let function = self.enclosing_function(scope)?;
                let class = self.owner_class(function)?;
                Type::named(self.symbols().class(class)?.name.clone()).pointer_to()
            }
            NodeKind::SimpleName { .. } | NodeKind::QualifiedName { .. } => {
                let components = self.name_components(expr)?;
                self.lookup_qualified(&components, scope)
                    .into_iter()
                    .find_map(|symbol| self.type_of_symbol(symbol))?
            }
            NodeKind::Nested { expression, .. } | NodeKind::Postfix {
                operand: expression,
                ..
            } => self.type_of(*expression)?,
            NodeKind::Unary { op, operand } => match self.token_kind(*op)? {
                TokenKind::Exclaim => Type::named("bool"),
                TokenKind::Amp => self.type_of(*operand)?.pointer_to(),
                TokenKind::Star => self.type_of(*operand)?.pointee()?,
                _ => self.type_of(*operand)?,
            },
            NodeKind::Binary { left, op, right } => {
                let kind = self.token_kind(*op)?;
                if kind.is_comparison() || matches!(kind, TokenKind::AmpAmp | TokenKind::PipePipe) {
                    Type::named("bool")
                } else {
                    self.type_of(*left).or_else(|| self.type_of(*right))?
                }
            }
            NodeKind::Conditional { left, right, .. } => {
                self.type_of(*left).or_else(|| self.type_of(*right))?
            }
            NodeKind::ArrayAccess { base, .. } => self.type_of(*base)?.pointee()?,
            NodeKind::MemberAccess {
                base,
                access,
                member,
            } => {
                let (class, name) = self.member_target(*base, *access, *member)?;
                let body = self.symbols().class(class)?.body_scope;
                self.symbols()
                    .variables
                    .iter()
                    .find(|v| v.scope == body && v.name == name)?
                    .ty
                    .clone()
            }
            NodeKind::Call { callee, .. } => self.type_of_call(*callee, scope)?,
            _ => return None,
        };
        tracing::trace!(expr = expr.index(), ty = %ty, "type_of");
        Some(ty)
    }

    fn type_of_call(&self, callee: NodeId, scope: ScopeId) -> Option<Type> {
        let symbols = self.symbols();
        match self.ast().kind(callee) {
            NodeKind::SimpleName { .. } | NodeKind::QualifiedName { .. } => {
                let components = self.name_components(callee)?;
                self.lookup_qualified(&components, scope)
                    .into_iter()
                    .find_map(|symbol| match symbol {
                        Symbol::Function(f) => symbols
                            .function(f)
                            .map(|f| f.return_type.clone())
                            .filter(|ty| !ty.is_empty()),
                        Symbol::Class(c) => symbols
                            .class(c)
                            .map(|c| Type::named(c.qualified_name.join("::"))),
                        _ => None,
                    })
            }
            NodeKind::MemberAccess {
                base,
                access,
                member,
            } => {
                let (class, name) = self.member_target(*base, *access, *member)?;
                let body = symbols.class(class)?.body_scope;
                symbols
                    .functions_in(body)
                    .find(|(_, f)| f.name == name)
                    .map(|(_, f)| f.return_type.clone())
            }
            _ => None,
        }
    }

    fn member_target(&self, base: NodeId, access: usize, member: NodeId) -> Option<(ClassId, String)> {
        let mut ty = self.type_of(base)?;
        if self.token_kind(access)? == TokenKind::Arrow {
            ty = ty.unqualified().pointee()?;
        }
        let scope = self.scope_at(self.start_of(base));
        let class = self.class_for_type(&ty.unqualified(), scope)?;
        let name = self.name_components(member)?.pop()?;
        Some((class, name))
    }

    fn type_of_symbol(&self, symbol: Symbol) -> Option<Type> {
        let symbols = self.symbols();
        match symbol {
            Symbol::Variable(v) => symbols.variable(v).map(|v| v.ty.clone()),
            Symbol::Enumerator { enumeration, .. } => symbols
                .enumeration(enumeration)?
                .qualified_name()
                .map(Type::named),
            _ => None,
        }
    }

    /// Function whose body scope encloses `scope`.
    pub fn enclosing_function(&self, scope: ScopeId) -> Option<FunctionId> {
        let symbols = self.symbols();
        let mut current = Some(scope);
        while let Some(id) = current {
            let data = symbols.scope(id)?;
            if let ScopeKind::Function(function) = data.kind {
                return Some(function);
            }
            current = data.parent;
        }
        None
    }

    /// Returns `true` if the class declares a member function named `name` (or gets `tr` from
    /// `Q_OBJECT`).
    pub fn class_declares_function(&self, class: ClassId, name: &str) -> bool {
        let symbols = self.symbols();
        let Some(class) = symbols.class(class) else {
            return false;
        };
        (name == "tr" && class.has_q_object)
            || symbols.functions_in(class.body_scope).any(|(_, f)| f.name == name)
    }
}

/// Type of a numeric literal from its spelling and suffix.
pub fn numeric_literal_type(spelling: &str) -> Type {
    let lower = spelling.to_ascii_lowercase();
    let is_hex = lower.starts_with("0x");
    let is_float = !is_hex && (lower.contains('.') || lower.contains('e'));
    if is_float {
        return if lower.ends_with('f') {
            Type::named("float")
        } else {
            Type::named("double")
        };
    }
    let suffix: String = lower
        .chars()
        .rev()
        .take_while(|c| matches!(c, 'u' | 'l'))
        .collect();
    let unsigned = suffix.contains('u');
    let longs = suffix.matches('l').count();
    let base = match longs {
        0 => "int",
        1 => "long",
        _ => "long long",
    };
    if unsigned {
        Type::named(format!("unsigned {base}"))
    } else {
        Type::named(base)
    }
}

impl Snapshot {
    /// The first class definition, in path order, whose qualified name ends with `components`.
    /// Exact matches win over suffix matches.
    pub fn find_class_definition(
        &self,
        components: &[String],
    ) -> Option<(Arc<DocumentSnapshot>, ClassId)> {
        if components.is_empty() {
            return None;
        }
        let exact = self.documents().find_map(|doc| {
            doc.symbols()
                .classes
                .iter()
                .position(|c| c.qualified_name == components)
                .map(|i| (doc.clone(), ClassId(i)))
        });
        exact.or_else(|| {
            self.documents().find_map(|doc| {
                doc.find_class(components)
                    .map(|class| (doc.clone(), class))
            })
        })
    }

    /// Out-of-line definitions anywhere in the snapshot matching a member function of class
    /// `class_name`.
    pub fn find_member_definitions(
        &self,
        class_name: &[String],
        function: &crate::symbols::FunctionSymbol,
    ) -> Vec<(Arc<DocumentSnapshot>, FunctionId)> {
        let mut out = Vec::new();
        for doc in self.documents() {
            for (i, candidate) in doc.symbols().functions.iter().enumerate() {
                if !candidate.is_definition
                    || candidate.qualifiers.is_empty()
                    || !candidate.same_signature(function)
                {
                    continue;
                }
                if class_name.ends_with(&candidate.qualifiers) {
                    out.push((doc.clone(), FunctionId(i)));
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_numeric_literal_types() {
        assert_eq!(numeric_literal_type("42").to_string(), "int");
        assert_eq!(numeric_literal_type("42u").to_string(), "unsigned int");
        assert_eq!(numeric_literal_type("42UL").to_string(), "unsigned long");
        assert_eq!(numeric_literal_type("42ll").to_string(), "long long");
        assert_eq!(numeric_literal_type("0x1F").to_string(), "int");
        assert_eq!(numeric_literal_type("1.5").to_string(), "double");
        assert_eq!(numeric_literal_type("1.5f").to_string(), "float");
        assert_eq!(numeric_literal_type("1e3").to_string(), "double");
    }
}
