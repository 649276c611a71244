#![warn(missing_docs)]
//! Quick-fix core - a headless rewrite kernel.
//!
//! # Overview
//!
//! `quickfix-core` is the part of the quick-fix engine that knows nothing about C++: it records
//! edits against an unmodified document, resolves them into one conflict-free plan, and commits the
//! plan to a live document as a single undoable step while keeping the cursor where the user
//! expects it.
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  Workspace (atomic multi-file apply)        │  ← Public API
//! ├─────────────────────────────────────────────┤
//! │  Applier (plan → commit, reindent, cursor)  │
//! ├─────────────────────────────────────────────┤
//! │  Indenter (leading whitespace only)         │
//! ├─────────────────────────────────────────────┤
//! │  Document + EditBlock + undo/redo           │  ← Live Text
//! ├─────────────────────────────────────────────┤
//! │  ChangeSet → TextDelta (original offsets)   │  ← Edit Model
//! ├─────────────────────────────────────────────┤
//! │  Line Index (Rope-based)                    │  ← Line Access
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use quickfix_core::{CStyleIndenter, ChangeSet, Document, FileChange, apply_change_set};
//! use quickfix_lang::QuickFixSettings;
//!
//! let mut doc = Document::new("main.cpp", "x = a <= b;");
//! doc.set_cursor(7);
//!
//! let mut changes = ChangeSet::new();
//! changes.insert(4, "!(").unwrap();
//! changes.replace(6..8, ">").unwrap();
//! changes.insert(10, ")").unwrap();
//!
//! let outcome = apply_change_set(
//!     &mut doc,
//!     &FileChange::new(changes),
//!     &CStyleIndenter::default(),
//!     &QuickFixSettings::default(),
//! )
//! .unwrap();
//!
//! assert_eq!(doc.text(), "x = !(a > b);");
//! assert_eq!(outcome.cursor, 8);
//! ```
//!
//! # Offsets
//!
//! Every offset is a character offset (Unicode scalar values). Ranges are half-open.

pub mod applier;
pub mod change_set;
pub mod delta;
pub mod document;
pub mod indent;
pub mod line_index;
pub mod workspace;

pub use applier::{
    ApplyError, ApplyOutcome, FileChange, apply_change_set, commit_planned, plan_file_change,
};
pub use change_set::{ChangeSet, ChangeSetError, EditOp};
pub use delta::{TextDelta, TextDeltaEdit};
pub use document::{Document, EditBlock, EditError};
pub use indent::{CStyleIndenter, IndentChange, Indenter, reindent_lines};
pub use line_index::LineIndex;
pub use workspace::Workspace;
