//! Structured text change deltas.
//!
//! A [`TextDelta`] is the resolved form of a [`ChangeSet`](crate::ChangeSet): a sorted list of
//! non-overlapping edits, every one of them addressed in **character offsets of the original
//! document**. Because no edit refers to post-edit coordinates, a delta can be replayed against the
//! same original text any number of times and always produces the same output, and offsets held by
//! the host (cursor, selection, reindent requests) can be mapped through it in one pass.

use ropey::Rope;
use std::ops::Range;

/// A single text edit expressed in original-document character offsets.
///
/// Semantics:
/// - `start` is a character offset in the document **before** the delta is applied.
/// - The deleted range is defined by the length (in `char`s) of `deleted_text`.
/// - Edits inside a [`TextDelta`] are sorted by `start` and never overlap. Several zero-width
///   edits may share a `start`; they apply in list order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextDeltaEdit {
    /// Start character offset of the edit.
    pub start: usize,
    /// Exact deleted text (may be empty).
    pub deleted_text: String,
    /// Exact inserted text (may be empty).
    pub inserted_text: String,
    /// If the deleted text was moved rather than dropped, where its copy starts in the output.
    pub moved_to: Option<usize>,
}

impl TextDeltaEdit {
    /// Length of `deleted_text` in characters.
    pub fn deleted_len(&self) -> usize {
        self.deleted_text.chars().count()
    }

    /// Length of `inserted_text` in characters.
    pub fn inserted_len(&self) -> usize {
        self.inserted_text.chars().count()
    }

    /// Exclusive end character offset in the pre-edit document.
    pub fn end(&self) -> usize {
        self.start.saturating_add(self.deleted_len())
    }
}

/// A structured description of a document text change.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TextDelta {
    /// Character count before applying `edits`.
    pub before_char_count: usize,
    /// Character count after applying `edits`.
    pub after_char_count: usize,
    /// Sorted, non-overlapping edits in original-document offsets.
    pub edits: Vec<TextDeltaEdit>,
    /// If known, the undo group id associated with this change.
    pub undo_group_id: Option<usize>,
}

impl TextDelta {
    /// Returns `true` if this delta contains no edits.
    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    /// Produce the edited text from the original `text`.
    pub fn apply_to(&self, text: &str) -> String {
        let rope = Rope::from_str(text);
        let len = rope.len_chars();
        let mut out = String::with_capacity(text.len());
        let mut last = 0usize;

        for edit in &self.edits {
            let start = edit.start.min(len);
            if start > last {
                out.extend(rope.slice(last..start).chunks());
            }
            out.push_str(&edit.inserted_text);
            last = last.max(edit.end().min(len));
        }
        if last < len {
            out.extend(rope.slice(last..len).chunks());
        }
        out
    }

    /// Map an original-document offset to the corresponding offset in the edited document.
    ///
    /// - An offset inside a removed or replaced range maps to the start of its replacement.
    /// - An offset inside a moved range maps to the start of the moved fragment.
    /// - Any other offset is shifted by the net length change of the edits before it. Text
    ///   inserted exactly at the offset counts as "before".
    pub fn map_offset(&self, offset: usize) -> usize {
        let mut shift: isize = 0;

        for edit in &self.edits {
            if offset < edit.start {
                break;
            }

            if offset < edit.end() {
                if let Some(dest) = edit.moved_to {
                    return dest;
                }
                return shifted(edit.start, shift);
            }

            shift += edit.inserted_len() as isize - edit.deleted_len() as isize;
        }

        shifted(offset, shift)
    }

    /// Map a range; both ends go through [`TextDelta::map_offset`].
    pub fn map_range(&self, range: Range<usize>) -> Range<usize> {
        let start = self.map_offset(range.start);
        let end = self.map_offset(range.end).max(start);
        start..end
    }

    /// Ranges of freshly inserted text in the edited document, one per edit, in order.
    ///
    /// Pure deletions yield an empty range at the deletion point.
    pub fn after_ranges(&self) -> Vec<Range<usize>> {
        // Walks the same way `apply_to` does, so anchors sharing a start with a replacement land
        // after the replacement text.
        let mut consumed = 0usize;
        let mut written = 0usize;
        let mut out = Vec::with_capacity(self.edits.len());
        for edit in &self.edits {
            written += edit.start.saturating_sub(consumed);
            let inserted = edit.inserted_len();
            out.push(written..written + inserted);
            written += inserted;
            consumed = consumed.max(edit.end());
        }
        out
    }
}

fn shifted(offset: usize, shift: isize) -> usize {
    if shift >= 0 {
        offset.saturating_add(shift as usize)
    } else {
        offset.saturating_sub(shift.unsigned_abs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edit(start: usize, deleted: &str, inserted: &str) -> TextDeltaEdit {
        TextDeltaEdit {
            start,
            deleted_text: deleted.to_string(),
            inserted_text: inserted.to_string(),
            moved_to: None,
        }
    }

    #[test]
    fn test_apply_to_uses_original_offsets() {
        let delta = TextDelta {
            before_char_count: 11,
            after_char_count: 13,
            edits: vec![edit(0, "hello", "HELLO!"), edit(6, "world", "there!")],
            undo_group_id: None,
        };
        assert_eq!(delta.apply_to("hello world"), "HELLO! there!");
    }

    #[test]
    fn test_map_offset_shifts_and_anchors() {
        // "abcdef" -> "aXXdef" (replace "bc" with "XX"), then insert "!" at 4 -> "aXXd!ef"
        let delta = TextDelta {
            before_char_count: 6,
            after_char_count: 7,
            edits: vec![edit(1, "bc", "XX"), edit(4, "", "!")],
            undo_group_id: None,
        };
        assert_eq!(delta.map_offset(0), 0);
        assert_eq!(delta.map_offset(2), 1); // inside the replaced range
        assert_eq!(delta.map_offset(3), 3);
        assert_eq!(delta.map_offset(4), 5); // insertion at the caret pushes it right
        assert_eq!(delta.map_offset(6), 7);
    }

    #[test]
    fn test_map_offset_follows_moved_text() {
        let mut removal = edit(4, "tail", "");
        removal.moved_to = Some(0);
        let delta = TextDelta {
            before_char_count: 8,
            after_char_count: 8,
            edits: vec![edit(0, "", "tail"), removal],
            undo_group_id: None,
        };
        assert_eq!(delta.apply_to("headtail"), "tailhead");
        assert_eq!(delta.map_offset(6), 0);
        assert_eq!(delta.map_offset(2), 6);
    }

    #[test]
    fn test_after_ranges_cover_inserted_text() {
        let delta = TextDelta {
            before_char_count: 3,
            after_char_count: 6,
            edits: vec![edit(0, "", "!("), edit(3, "", ")")],
            undo_group_id: None,
        };
        assert_eq!(delta.after_ranges(), vec![0..2, 5..6]);
    }

    #[test]
    fn test_after_ranges_anchor_behind_replacement() {
        let delta = TextDelta {
            before_char_count: 3,
            after_char_count: 5,
            edits: vec![edit(0, "", "<"), edit(0, "abc", "XYZ"), edit(0, "", ">")],
            undo_group_id: None,
        };
        assert_eq!(delta.apply_to("abc"), "<XYZ>");
        assert_eq!(delta.after_ranges(), vec![0..1, 1..4, 4..5]);
    }
}
