#![warn(missing_docs)]
//! `quickfix-syntax` - the syntax data model consumed by the quick-fix engine.
//!
//! The engine does not parse C++ itself. A syntax provider (a real front-end, or the small
//! reference parser in `quickfix-syntax-simple`) produces, per document revision:
//!
//! - a [`Token`] stream with character-offset ranges,
//! - an [`Ast`] arena whose nodes cover inclusive token ranges,
//! - a [`SymbolTable`] with scopes, classes, functions, variables, enums and includes.
//!
//! These are bundled into an immutable [`DocumentSnapshot`] and shared through a [`Snapshot`]
//! keyed by file path. On top of that model this crate computes the cursor [`Ast::path_at`] and
//! answers the semantic questions quick fixes ask: name lookup at an offset, `type_of`, enum and
//! class resolution.

pub mod ast;
pub mod semantic;
pub mod snapshot;
pub mod symbols;
pub mod token;

pub use ast::{Ast, Node, NodeId, NodeKind};
pub use semantic::{Symbol, numeric_literal_type};
pub use snapshot::{DocumentSnapshot, Language, Snapshot};
pub use symbols::{
    Access, AccessSection, ClassId, ClassKey, ClassSymbol, EnumId, EnumSymbol, ForwardClass,
    ForwardId, FunctionId, FunctionSymbol, Include, Parameter, Scope, ScopeId, ScopeKind,
    SymbolTable, Type, VariableId, VariableSymbol,
};
pub use token::{Token, TokenIndex, TokenKind};
