//! Committing change sets to live documents.
//!
//! Applying is split in two phases so a multi-file rewrite can be validated before any document is
//! touched:
//!
//! 1. [`plan_file_change`] checks the document revision and resolves the change set against the
//!    current text. Conflicts and out-of-range edits surface here.
//! 2. [`commit_planned`] opens one edit block, applies the delta, re-indents the affected lines and
//!    maps the cursor and selection through both.
//!
//! [`apply_change_set`] runs both phases for a single document.

use crate::change_set::{ChangeSet, ChangeSetError};
use crate::delta::TextDelta;
use crate::document::{Document, EditError};
use crate::indent::{Indenter, reindent_lines};
use crate::line_index::LineIndex;
use quickfix_lang::QuickFixSettings;
use std::collections::BTreeSet;
use std::ops::Range;

/// Errors produced while applying a change set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApplyError {
    /// The change set holds contradictory or out-of-range edits.
    #[error(transparent)]
    Conflict(#[from] ChangeSetError),

    /// A mutation inside the edit block failed.
    #[error(transparent)]
    Edit(#[from] EditError),

    /// The document changed since the rewrite was computed.
    #[error("document `{path}` is stale: expected revision {expected}, found {actual}")]
    Stale {
        /// Document path.
        path: String,
        /// Revision the rewrite was computed against.
        expected: u64,
        /// Current document revision.
        actual: u64,
    },

    /// No open document has this path.
    #[error("no open document for `{0}`")]
    DocumentNotFound(String),
}

/// The edits a rewrite makes to one file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileChange {
    /// Edits in original-document offsets.
    pub changes: ChangeSet,
    /// Original-document ranges whose lines should be re-indented after the edit.
    pub reindent: Vec<Range<usize>>,
    /// Revision of the document the edits were computed against.
    pub base_revision: Option<u64>,
}

impl FileChange {
    /// Wrap a change set.
    pub fn new(changes: ChangeSet) -> Self {
        Self {
            changes,
            ..Self::default()
        }
    }

    /// Request re-indentation of the lines spanned by `range`.
    pub fn with_reindent(mut self, range: Range<usize>) -> Self {
        self.reindent.push(range);
        self
    }

    /// Pin the change to a document revision.
    pub fn at_revision(mut self, revision: u64) -> Self {
        self.base_revision = Some(revision);
        self
    }

    /// Returns `true` if re-indentation was requested.
    pub fn wants_reindent(&self) -> bool {
        !self.reindent.is_empty()
    }
}

/// Result of committing a change set to a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyOutcome {
    /// Cursor offset after the edit.
    pub cursor: usize,
    /// Selection after the edit.
    pub selection: Option<Range<usize>>,
    /// The resolved edits, in pre-edit offsets.
    pub delta: TextDelta,
    /// Lines whose leading whitespace was rewritten.
    pub reindented_lines: Vec<usize>,
}

/// Validate `change` against `doc` and resolve it into a delta. Does not modify the document.
pub fn plan_file_change(doc: &Document, change: &FileChange) -> Result<TextDelta, ApplyError> {
    if let Some(expected) = change.base_revision
        && expected != doc.revision()
    {
        tracing::debug!(path = doc.path(), expected, actual = doc.revision(), "stale document");
        return Err(ApplyError::Stale {
            path: doc.path().to_string(),
            expected,
            actual: doc.revision(),
        });
    }

    let delta = change.changes.plan(&doc.text()).inspect_err(|err| {
        tracing::debug!(path = doc.path(), %err, "change set rejected");
    })?;
    Ok(delta)
}

/// Commit a delta produced by [`plan_file_change`] in one edit block.
pub fn commit_planned(
    doc: &mut Document,
    mut delta: TextDelta,
    change: &FileChange,
    indenter: &dyn Indenter,
    settings: &QuickFixSettings,
) -> Result<ApplyOutcome, ApplyError> {
    let reindent = settings.reindent && change.wants_reindent();

    let (cursor, selection, indent_changes) = doc.edit_block(|block| {
        let before_cursor = block.cursor();
        let before_selection = block.selection();

        block.apply_delta(&delta)?;

        let indent_changes = if reindent {
            let lines = lines_to_reindent(block.line_index(), &delta, &change.reindent);
            reindent_lines(block, indenter, &settings.indent, &lines)?
        } else {
            Vec::new()
        };

        let map = |offset: usize| {
            indent_changes
                .iter()
                .fold(delta.map_offset(offset), |acc, c| c.map_offset(acc))
        };
        let cursor = map(before_cursor);
        let selection = before_selection.map(|r| {
            let start = map(r.start);
            start..map(r.end).max(start)
        });

        block.set_cursor(cursor);
        block.set_selection(selection.clone());
        Ok::<_, ApplyError>((cursor, selection, indent_changes))
    })?;

    if !delta.is_empty() {
        delta.undo_group_id = doc.last_undo_group();
    }

    let reindented_lines: Vec<usize> = indent_changes.iter().map(|c| c.line).collect();
    tracing::debug!(
        path = doc.path(),
        edits = delta.edits.len(),
        reindented = reindented_lines.len(),
        cursor,
        "applied change set"
    );

    Ok(ApplyOutcome {
        cursor,
        selection,
        delta,
        reindented_lines,
    })
}

/// Apply `change` to `doc` atomically.
///
/// On error the document is unchanged.
#[tracing::instrument(level = "debug", skip_all, fields(path = doc.path()))]
pub fn apply_change_set(
    doc: &mut Document,
    change: &FileChange,
    indenter: &dyn Indenter,
    settings: &QuickFixSettings,
) -> Result<ApplyOutcome, ApplyError> {
    let delta = plan_file_change(doc, change)?;
    commit_planned(doc, delta, change, indenter, settings)
}

/// Lines of the edited text covered by inserted text, deletion points and requested ranges.
fn lines_to_reindent(
    index: &LineIndex,
    delta: &TextDelta,
    requested: &[Range<usize>],
) -> Vec<usize> {
    let mut lines = BTreeSet::new();
    let mut add = |range: Range<usize>| {
        let first = index.line_of(range.start);
        let last = index.line_of(range.end.max(range.start));
        lines.extend(first..=last);
    };

    for range in delta.after_ranges() {
        add(range);
    }
    for range in requested {
        add(delta.map_range(range.clone()));
    }
    lines.into_iter().collect()
}
