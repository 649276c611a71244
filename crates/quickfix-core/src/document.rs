//! Live documents, edit blocks and undo/redo.
//!
//! A [`Document`] owns the text of one file together with its cursor, selection and revision. All
//! mutation goes through [`Document::edit_block`]: the closure receives an [`EditBlock`] holding
//! the exclusive borrow of the document, so nothing else can touch the text while the block is
//! open. A block that returns `Ok` becomes exactly one undo step; a block that returns `Err` is
//! rolled back and leaves no trace.

use crate::delta::TextDelta;
use crate::line_index::LineIndex;
use std::ops::Range;

/// Errors produced by edit-block mutations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    /// A range lies outside the current document text.
    #[error("edit range {range:?} is out of bounds for a document of {len} characters")]
    OutOfBounds {
        /// Offending range.
        range: Range<usize>,
        /// Current document length in characters.
        len: usize,
    },

    /// A delta was planned against text of a different length.
    #[error("delta expects {expected} characters but the document has {actual}")]
    LengthMismatch {
        /// `before_char_count` of the delta.
        expected: usize,
        /// Current document length.
        actual: usize,
    },
}

/// One primitive mutation, in the coordinates current when it was made.
#[derive(Debug, Clone)]
struct TextEdit {
    start: usize,
    deleted_text: String,
    inserted_text: String,
}

impl TextEdit {
    fn deleted_len(&self) -> usize {
        self.deleted_text.chars().count()
    }

    fn inserted_len(&self) -> usize {
        self.inserted_text.chars().count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CaretSnapshot {
    cursor: usize,
    selection: Option<Range<usize>>,
}

#[derive(Debug, Clone)]
struct UndoStep {
    group_id: usize,
    edits: Vec<TextEdit>,
    before: CaretSnapshot,
    after: CaretSnapshot,
}

#[derive(Debug)]
struct UndoRedoManager {
    undo_stack: Vec<UndoStep>,
    redo_stack: Vec<UndoStep>,
    max_undo: usize,
    next_group_id: usize,
}

impl UndoRedoManager {
    fn new(max_undo: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_undo: max_undo.max(1),
            next_group_id: 0,
        }
    }

    fn push_step(&mut self, mut step: UndoStep) -> usize {
        self.redo_stack.clear();
        if self.undo_stack.len() >= self.max_undo {
            self.undo_stack.remove(0);
        }

        step.group_id = self.next_group_id;
        self.next_group_id = self.next_group_id.wrapping_add(1);
        let group_id = step.group_id;
        self.undo_stack.push(step);
        group_id
    }
}

/// A live text document.
///
/// # Example
///
/// ```rust
/// use quickfix_core::Document;
///
/// let mut doc = Document::new("main.cpp", "int a, b;");
/// doc.edit_block(|block| block.replace(5..6, ";\nint"))?;
/// assert_eq!(doc.text(), "int a;\nint b;");
/// assert!(doc.undo());
/// assert_eq!(doc.text(), "int a, b;");
/// # Ok::<(), quickfix_core::EditError>(())
/// ```
#[derive(Debug)]
pub struct Document {
    path: String,
    index: LineIndex,
    revision: u64,
    cursor: usize,
    selection: Option<Range<usize>>,
    undo_redo: UndoRedoManager,
}

impl Document {
    /// Create a document at revision 0 with the cursor at the start.
    pub fn new(path: impl Into<String>, text: &str) -> Self {
        Self {
            path: path.into(),
            index: LineIndex::from_text(text),
            revision: 0,
            cursor: 0,
            selection: None,
            undo_redo: UndoRedoManager::new(1000),
        }
    }

    /// File path the document is keyed by.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Monotonic revision, bumped by every committed edit block, undo and redo.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Complete text.
    pub fn text(&self) -> String {
        self.index.text()
    }

    /// Line-indexed view of the text.
    pub fn line_index(&self) -> &LineIndex {
        &self.index
    }

    /// Length in characters.
    pub fn char_count(&self) -> usize {
        self.index.char_count()
    }

    /// Text of a character range (clamped).
    pub fn slice(&self, range: Range<usize>) -> String {
        self.index.slice(range)
    }

    /// Cursor offset.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Move the cursor; the offset is clamped to the text.
    pub fn set_cursor(&mut self, offset: usize) {
        self.cursor = offset.min(self.index.char_count());
    }

    /// Current selection, if any.
    pub fn selection(&self) -> Option<Range<usize>> {
        self.selection.clone()
    }

    /// Replace the selection; empty ranges clear it.
    pub fn set_selection(&mut self, selection: Option<Range<usize>>) {
        let len = self.index.char_count();
        self.selection = selection
            .map(|r| r.start.min(len)..r.end.min(len))
            .filter(|r| r.start < r.end);
    }

    /// Run `f` as one atomic edit block.
    ///
    /// All mutations made through the [`EditBlock`] become a single undo step. If `f` fails the
    /// text, cursor and selection are restored and nothing is recorded.
    pub fn edit_block<T, E>(
        &mut self,
        f: impl FnOnce(&mut EditBlock<'_>) -> Result<T, E>,
    ) -> Result<T, E> {
        let before = self.caret();
        let mut block = EditBlock {
            doc: self,
            edits: Vec::new(),
        };
        let result = f(&mut block);
        let EditBlock { edits, .. } = block;

        match result {
            Ok(value) => {
                if !edits.is_empty() {
                    let after = self.caret();
                    let group_id = self.undo_redo.push_step(UndoStep {
                        group_id: 0,
                        edits,
                        before,
                        after,
                    });
                    self.revision += 1;
                    tracing::trace!(path = %self.path, group_id, revision = self.revision, "committed edit block");
                }
                Ok(value)
            }
            Err(err) => {
                self.revert(&edits);
                self.restore_caret(before);
                tracing::debug!(path = %self.path, edits = edits.len(), "rolled back edit block");
                Err(err)
            }
        }
    }

    /// Undo group id of the most recent committed edit block.
    pub fn last_undo_group(&self) -> Option<usize> {
        self.undo_redo.undo_stack.last().map(|step| step.group_id)
    }

    /// Returns `true` if there is an edit block to undo.
    pub fn can_undo(&self) -> bool {
        !self.undo_redo.undo_stack.is_empty()
    }

    /// Returns `true` if there is an undone edit block to redo.
    pub fn can_redo(&self) -> bool {
        !self.undo_redo.redo_stack.is_empty()
    }

    /// Number of undo steps.
    pub fn undo_depth(&self) -> usize {
        self.undo_redo.undo_stack.len()
    }

    /// Undo the most recent edit block. Returns `false` if there was nothing to undo.
    pub fn undo(&mut self) -> bool {
        let Some(step) = self.undo_redo.undo_stack.pop() else {
            return false;
        };
        self.revert(&step.edits);
        self.restore_caret(step.before.clone());
        self.revision += 1;
        self.undo_redo.redo_stack.push(step);
        true
    }

    /// Redo the most recently undone edit block. Returns `false` if there was nothing to redo.
    pub fn redo(&mut self) -> bool {
        let Some(step) = self.undo_redo.redo_stack.pop() else {
            return false;
        };
        for edit in &step.edits {
            let end = edit.start + edit.deleted_len();
            self.index.delete(edit.start..end);
            self.index.insert(edit.start, &edit.inserted_text);
        }
        self.restore_caret(step.after.clone());
        self.revision += 1;
        self.undo_redo.undo_stack.push(step);
        true
    }

    fn revert(&mut self, edits: &[TextEdit]) {
        for edit in edits.iter().rev() {
            let end = edit.start + edit.inserted_len();
            self.index.delete(edit.start..end);
            self.index.insert(edit.start, &edit.deleted_text);
        }
    }

    fn caret(&self) -> CaretSnapshot {
        CaretSnapshot {
            cursor: self.cursor,
            selection: self.selection.clone(),
        }
    }

    fn restore_caret(&mut self, caret: CaretSnapshot) {
        self.set_cursor(caret.cursor);
        self.set_selection(caret.selection);
    }
}

/// Exclusive write access to a [`Document`] for the duration of one edit block.
///
/// Offsets passed to the mutators refer to the text as it is at the time of the call.
#[derive(Debug)]
pub struct EditBlock<'a> {
    doc: &'a mut Document,
    edits: Vec<TextEdit>,
}

impl EditBlock<'_> {
    /// Path of the document being edited.
    pub fn path(&self) -> &str {
        &self.doc.path
    }

    /// Current text, including mutations made so far in this block.
    pub fn line_index(&self) -> &LineIndex {
        &self.doc.index
    }

    /// Length in characters.
    pub fn char_count(&self) -> usize {
        self.doc.index.char_count()
    }

    /// Replace `range` with `text`.
    pub fn replace(&mut self, range: Range<usize>, text: &str) -> Result<(), EditError> {
        let len = self.doc.index.char_count();
        if range.start > range.end || range.end > len {
            return Err(EditError::OutOfBounds { range, len });
        }
        if range.is_empty() && text.is_empty() {
            return Ok(());
        }

        let deleted_text = self.doc.index.slice(range.clone());
        self.doc.index.delete(range.clone());
        self.doc.index.insert(range.start, text);
        self.edits.push(TextEdit {
            start: range.start,
            deleted_text,
            inserted_text: text.to_string(),
        });
        Ok(())
    }

    /// Insert `text` at `at`.
    pub fn insert(&mut self, at: usize, text: &str) -> Result<(), EditError> {
        self.replace(at..at, text)
    }

    /// Remove `range`.
    pub fn remove(&mut self, range: Range<usize>) -> Result<(), EditError> {
        self.replace(range, "")
    }

    /// Apply a delta planned against the text as it was when the block opened.
    pub fn apply_delta(&mut self, delta: &TextDelta) -> Result<(), EditError> {
        let actual = self.doc.index.char_count();
        if delta.before_char_count != actual {
            return Err(EditError::LengthMismatch {
                expected: delta.before_char_count,
                actual,
            });
        }

        // `after_ranges` gives each edit's position once everything before it has been applied.
        for (edit, after) in delta.edits.iter().zip(delta.after_ranges()) {
            let range = after.start..after.start + edit.deleted_len();
            self.replace(range, &edit.inserted_text)?;
        }
        Ok(())
    }

    /// Cursor offset.
    pub fn cursor(&self) -> usize {
        self.doc.cursor
    }

    /// Move the cursor.
    pub fn set_cursor(&mut self, offset: usize) {
        self.doc.set_cursor(offset);
    }

    /// Current selection.
    pub fn selection(&self) -> Option<Range<usize>> {
        self.doc.selection()
    }

    /// Replace the selection.
    pub fn set_selection(&mut self, selection: Option<Range<usize>>) {
        self.doc.set_selection(selection);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ChangeSet;

    #[test]
    fn test_edit_block_is_one_undo_step() {
        let mut doc = Document::new("a.cpp", "abc");
        doc.edit_block(|block| {
            block.insert(0, "1")?;
            block.insert(4, "2")?;
            block.set_cursor(5);
            Ok::<_, EditError>(())
        })
        .unwrap();

        assert_eq!(doc.text(), "1abc2");
        assert_eq!(doc.revision(), 1);
        assert_eq!(doc.undo_depth(), 1);

        assert!(doc.undo());
        assert_eq!(doc.text(), "abc");
        assert_eq!(doc.cursor(), 0);

        assert!(doc.redo());
        assert_eq!(doc.text(), "1abc2");
        assert_eq!(doc.cursor(), 5);
        assert_eq!(doc.revision(), 3);
    }

    #[test]
    fn test_failed_block_rolls_back() {
        let mut doc = Document::new("a.cpp", "abc");
        doc.set_cursor(2);
        let err = doc
            .edit_block(|block| {
                block.insert(0, "xx")?;
                block.set_cursor(0);
                block.remove(3..99)
            })
            .unwrap_err();

        assert!(matches!(err, EditError::OutOfBounds { .. }));
        assert_eq!(doc.text(), "abc");
        assert_eq!(doc.cursor(), 2);
        assert_eq!(doc.revision(), 0);
        assert!(!doc.can_undo());
    }

    #[test]
    fn test_empty_block_records_nothing() {
        let mut doc = Document::new("a.cpp", "abc");
        doc.edit_block(|_| Ok::<_, EditError>(())).unwrap();
        assert_eq!(doc.revision(), 0);
        assert!(!doc.can_undo());
    }

    #[test]
    fn test_apply_delta_handles_shared_anchors() {
        let mut changes = ChangeSet::new();
        changes.insert(0, "<").unwrap();
        changes.replace(0..3, "XYZ").unwrap();
        changes.insert(0, ">").unwrap();
        changes.move_range(4..6, 3).unwrap();
        let original = "abc def";
        let delta = changes.plan(original).unwrap();

        let mut doc = Document::new("a.cpp", original);
        doc.edit_block(|block| block.apply_delta(&delta)).unwrap();
        assert_eq!(doc.text(), delta.apply_to(original));
        assert_eq!(doc.text(), "<XYZ>de f");
    }

    #[test]
    fn test_new_edit_clears_redo() {
        let mut doc = Document::new("a.cpp", "abc");
        doc.edit_block(|block| block.insert(3, "d")).unwrap();
        assert!(doc.undo());
        assert!(doc.can_redo());
        doc.edit_block(|block| block.insert(0, "z")).unwrap();
        assert!(!doc.can_redo());
        assert_eq!(doc.text(), "zabc");
    }
}
