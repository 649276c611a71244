//! Errors surfaced by quick-fix rewrites and their application.

use quickfix_core::{ApplyError, ChangeSetError};

/// Errors produced while building or applying a quick fix.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QuickFixError {
    /// The rewrite recorded contradictory edits.
    #[error(transparent)]
    Conflict(#[from] ChangeSetError),

    /// The workspace refused the rewrite.
    #[error(transparent)]
    Apply(#[from] ApplyError),

    /// The snapshot the fix was computed from no longer matches the live document.
    #[error("snapshot of `{path}` is stale: parsed revision {snapshot}, document revision {document}")]
    Stale {
        /// Document path.
        path: String,
        /// Revision the snapshot was parsed at.
        snapshot: u64,
        /// Current revision of the live document.
        document: u64,
    },

    /// No open document has this path.
    #[error("no open document for `{0}`")]
    DocumentNotFound(String),

    /// Apply-time type lookup failed.
    #[error("cannot resolve the type of `{0}`")]
    UnresolvedType(String),

    /// The insertion point locator found no valid location.
    #[error("no valid insertion point for `{0}`")]
    NoInsertionPoint(String),
}
