#![warn(missing_docs)]
//! `quickfix-cpp` - C++ quick fixes on top of the rewrite kernel.
//!
//! # Overview
//!
//! Given a parsed [`Snapshot`](quickfix_syntax::Snapshot) and a cursor, the
//! [`QuickFixEngine`] computes the path of AST nodes under the cursor and runs every registered
//! predicate against it. Each predicate that recognizes its pattern returns a [`QuickFix`]: a
//! description, a priority and a closure that records the edits as a [`Rewrite`]. Applying a fix
//! hands the rewrite to a [`Workspace`](quickfix_core::Workspace), which commits all touched files
//! atomically, each as one undo step.
//!
//! # Quick Start
//!
//! ```rust
//! use quickfix_core::{CStyleIndenter, Workspace};
//! use quickfix_cpp::QuickFixEngine;
//! use quickfix_lang::SettingsStore;
//! use quickfix_syntax::Snapshot;
//! use std::sync::Arc;
//!
//! let source = "void f()\n{\n    x = a <= b;\n}\n";
//! let mut workspace = Workspace::new();
//! workspace.open("main.cpp", source);
//!
//! let mut snapshot = Snapshot::new();
//! quickfix_syntax_simple::parse_into(&mut snapshot, "main.cpp", 0, source).unwrap();
//! let snapshot = Arc::new(snapshot);
//!
//! let engine = QuickFixEngine::new(Arc::new(SettingsStore::default()));
//! let cursor = source.find("<=").unwrap();
//! let fixes = engine.list_applicable_operations(&workspace, &snapshot, "main.cpp", cursor, None);
//! assert_eq!(fixes[0].description(), "Rewrite Using >");
//!
//! fixes[0].apply(&mut workspace, &CStyleIndenter::default()).unwrap();
//! assert_eq!(
//!     workspace.get("main.cpp").unwrap().text(),
//!     "void f()\n{\n    x = !(a > b);\n}\n"
//! );
//! ```
//!
//! # Ordering
//!
//! Fixes are listed by priority (the path depth of the node they rewrite, unless a predicate
//! says otherwise), then by depth, then in [`REGISTRY`] order.

pub mod engine;
pub mod error;
pub mod fixes;
pub mod insertion;
pub mod naming;
pub mod numeric;
pub mod rewrite;
pub mod state;

pub use engine::{Matcher, QuickFix, QuickFixEngine, REGISTRY, Registration, sort_fixes};
pub use error::QuickFixError;
pub use insertion::{AccessSpec, InsertionLocation, InsertionPointLocator, paired_files};
pub use rewrite::Rewrite;
pub use state::{MatchState, RewriteContext};
