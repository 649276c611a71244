//! Change sets: conflict-checked edits against the original document.
//!
//! A [`ChangeSet`] records edit operations (insert, remove, replace, move, copy, flip) whose ranges
//! all refer to the **unmodified** document. Nothing is applied while recording; instead
//! [`ChangeSet::plan`] resolves the operations against the original text into a single
//! [`TextDelta`] that can be committed in one step.
//!
//! # Conflicts
//!
//! Ranges whose content is destroyed (replace, remove, move source, both flip ranges) must be
//! pairwise disjoint; touching ranges are fine. Zero-width anchors (insert, move and copy
//! destinations) may sit on the boundary of a destroyed range but never strictly inside one.
//! Copy sources only read the original text and may overlap anything.
//!
//! A conflicting operation is rejected when it is recorded. The set also remembers the first
//! conflict so a caller that ignored the error still gets it back from [`ChangeSet::plan`], and the
//! document is never partially edited.
//!
//! # Ordering
//!
//! Edits anchored at the same original offset are emitted in the order they were declared, so
//!
//! ```rust
//! use quickfix_core::ChangeSet;
//!
//! let mut changes = ChangeSet::new();
//! changes.insert(0, "if (").unwrap();
//! changes.move_range(4..5, 0).unwrap();
//! changes.insert(0, ") ").unwrap();
//! assert_eq!(changes.apply_to("do; x").unwrap(), "if (x) do; ");
//! ```

use crate::delta::{TextDelta, TextDeltaEdit};
use ropey::Rope;
use std::ops::Range;

/// Errors produced while recording or resolving a [`ChangeSet`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChangeSetError {
    /// Two edits touch overlapping text and nothing explains the overlap.
    #[error("conflicting edits: {existing:?} overlaps {incoming:?}")]
    Overlap {
        /// Range of the edit recorded first.
        existing: Range<usize>,
        /// Range of the rejected edit.
        incoming: Range<usize>,
    },

    /// `start > end`.
    #[error("invalid range {start}..{end}")]
    InvalidRange {
        /// Range start.
        start: usize,
        /// Range end.
        end: usize,
    },

    /// A range or anchor lies beyond the end of the document.
    #[error("range {range:?} is out of bounds for a document of {len} characters")]
    OutOfBounds {
        /// Offending range (zero-width for anchors).
        range: Range<usize>,
        /// Document length in characters.
        len: usize,
    },
}

/// A single recorded edit operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOp {
    /// Insert `text` at `at`.
    Insert {
        /// Anchor offset.
        at: usize,
        /// Inserted text.
        text: String,
    },
    /// Remove `range`.
    Remove {
        /// Removed range.
        range: Range<usize>,
    },
    /// Replace `range` with `text`.
    Replace {
        /// Replaced range.
        range: Range<usize>,
        /// Replacement text.
        text: String,
    },
    /// Move the text of `range` to `to`.
    Move {
        /// Source range (removed).
        range: Range<usize>,
        /// Destination anchor.
        to: usize,
    },
    /// Copy the text of `range` to `to`.
    Copy {
        /// Source range (read only).
        range: Range<usize>,
        /// Destination anchor.
        to: usize,
    },
    /// Exchange the contents of two disjoint ranges.
    Flip {
        /// First range.
        first: Range<usize>,
        /// Second range.
        second: Range<usize>,
    },
}

impl EditOp {
    /// Ranges whose original content this operation destroys.
    fn destroyed(&self) -> Vec<Range<usize>> {
        match self {
            EditOp::Remove { range } | EditOp::Replace { range, .. } | EditOp::Move { range, .. }
                if !range.is_empty() =>
            {
                vec![range.clone()]
            }
            EditOp::Flip { first, second } => [first, second]
                .into_iter()
                .filter(|r| !r.is_empty())
                .cloned()
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Zero-width positions at which this operation inserts text.
    fn anchors(&self) -> Vec<usize> {
        match self {
            EditOp::Insert { at, .. } => vec![*at],
            EditOp::Move { to, .. } | EditOp::Copy { to, .. } => vec![*to],
            EditOp::Replace { range, .. } if range.is_empty() => vec![range.start],
            _ => Vec::new(),
        }
    }

    /// Every range or anchor the operation addresses.
    fn extents(&self) -> Vec<Range<usize>> {
        match self {
            EditOp::Insert { at, .. } => vec![*at..*at],
            EditOp::Remove { range } | EditOp::Replace { range, .. } => vec![range.clone()],
            EditOp::Move { range, to } | EditOp::Copy { range, to } => {
                vec![range.clone(), *to..*to]
            }
            EditOp::Flip { first, second } => vec![first.clone(), second.clone()],
        }
    }
}

fn overlaps(a: &Range<usize>, b: &Range<usize>) -> bool {
    a.start < b.end && b.start < a.end
}

fn strictly_inside(anchor: usize, range: &Range<usize>) -> bool {
    range.start < anchor && anchor < range.end
}

/// An ordered, conflict-checked collection of edits against an original document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    ops: Vec<EditOp>,
    conflict: Option<ChangeSetError>,
}

impl ChangeSet {
    /// Create an empty change set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if no operation has been recorded.
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Number of recorded operations.
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Recorded operations in declaration order.
    pub fn operations(&self) -> &[EditOp] {
        &self.ops
    }

    /// The first conflict encountered while recording, if any.
    pub fn conflict(&self) -> Option<&ChangeSetError> {
        self.conflict.as_ref()
    }

    /// Drop all operations and any remembered conflict.
    pub fn clear(&mut self) {
        self.ops.clear();
        self.conflict = None;
    }

    /// Insert `text` at `at`.
    pub fn insert(&mut self, at: usize, text: impl Into<String>) -> Result<(), ChangeSetError> {
        self.record(EditOp::Insert {
            at,
            text: text.into(),
        })
    }

    /// Remove `range`.
    pub fn remove(&mut self, range: Range<usize>) -> Result<(), ChangeSetError> {
        self.record(EditOp::Remove { range })
    }

    /// Replace `range` with `text`.
    pub fn replace(
        &mut self,
        range: Range<usize>,
        text: impl Into<String>,
    ) -> Result<(), ChangeSetError> {
        self.record(EditOp::Replace {
            range,
            text: text.into(),
        })
    }

    /// Move the text of `range` to the anchor `to`.
    pub fn move_range(&mut self, range: Range<usize>, to: usize) -> Result<(), ChangeSetError> {
        self.record(EditOp::Move { range, to })
    }

    /// Copy the text of `range` to the anchor `to`.
    pub fn copy(&mut self, range: Range<usize>, to: usize) -> Result<(), ChangeSetError> {
        self.record(EditOp::Copy { range, to })
    }

    /// Exchange the contents of two disjoint ranges.
    pub fn flip(&mut self, first: Range<usize>, second: Range<usize>) -> Result<(), ChangeSetError> {
        self.record(EditOp::Flip { first, second })
    }

    fn record(&mut self, op: EditOp) -> Result<(), ChangeSetError> {
        match self.check(&op) {
            Ok(()) => {
                self.ops.push(op);
                Ok(())
            }
            Err(err) => {
                tracing::debug!(%err, ?op, "rejected change set operation");
                if self.conflict.is_none() {
                    self.conflict = Some(err.clone());
                }
                Err(err)
            }
        }
    }

    fn check(&self, op: &EditOp) -> Result<(), ChangeSetError> {
        for extent in op.extents() {
            if extent.start > extent.end {
                return Err(ChangeSetError::InvalidRange {
                    start: extent.start,
                    end: extent.end,
                });
            }
        }

        let destroyed = op.destroyed();
        let anchors = op.anchors();

        match op {
            EditOp::Flip { first, second } if overlaps(first, second) => {
                return Err(ChangeSetError::Overlap {
                    existing: first.clone(),
                    incoming: second.clone(),
                });
            }
            EditOp::Move { range, to } if strictly_inside(*to, range) => {
                return Err(ChangeSetError::Overlap {
                    existing: range.clone(),
                    incoming: *to..*to,
                });
            }
            _ => {}
        }

        for existing in &self.ops {
            let existing_destroyed = existing.destroyed();

            for incoming in &destroyed {
                if let Some(hit) = existing_destroyed.iter().find(|r| overlaps(r, incoming)) {
                    return Err(ChangeSetError::Overlap {
                        existing: hit.clone(),
                        incoming: incoming.clone(),
                    });
                }
            }

            for &anchor in &anchors {
                if let Some(hit) = existing_destroyed
                    .iter()
                    .find(|r| strictly_inside(anchor, r))
                {
                    return Err(ChangeSetError::Overlap {
                        existing: hit.clone(),
                        incoming: anchor..anchor,
                    });
                }
            }

            for anchor in existing.anchors() {
                if let Some(hit) = destroyed.iter().find(|r| strictly_inside(anchor, r)) {
                    return Err(ChangeSetError::Overlap {
                        existing: anchor..anchor,
                        incoming: hit.clone(),
                    });
                }
            }
        }

        Ok(())
    }

    /// Resolve the recorded operations against `original` into a sorted, non-overlapping delta.
    ///
    /// Fails with the remembered conflict, or if any range lies outside the document. On failure
    /// nothing has been modified anywhere.
    pub fn plan(&self, original: &str) -> Result<TextDelta, ChangeSetError> {
        if let Some(conflict) = &self.conflict {
            return Err(conflict.clone());
        }

        let rope = Rope::from_str(original);
        let len = rope.len_chars();
        for op in &self.ops {
            for extent in op.extents() {
                if extent.end > len {
                    return Err(ChangeSetError::OutOfBounds { range: extent, len });
                }
            }
        }

        let text_of = |range: &Range<usize>| rope.slice(range.clone()).to_string();

        // Every operation becomes one or two primitive replacements in original coordinates.
        let mut primitives: Vec<Primitive> = Vec::with_capacity(self.ops.len() * 2);
        for (seq, op) in self.ops.iter().enumerate() {
            match op {
                EditOp::Insert { at, text } => primitives.push(Primitive::new(seq, *at..*at, text)),
                EditOp::Remove { range } => primitives.push(Primitive::new(seq, range.clone(), "")),
                EditOp::Replace { range, text } => {
                    primitives.push(Primitive::new(seq, range.clone(), text))
                }
                EditOp::Move { range, to } => {
                    let moved = text_of(range);
                    let insertion = primitives.len() + 1;
                    let mut removal = Primitive::new(seq, range.clone(), "");
                    removal.moved_to = Some(insertion);
                    primitives.push(removal);
                    primitives.push(Primitive::new(seq, *to..*to, &moved));
                }
                EditOp::Copy { range, to } => {
                    primitives.push(Primitive::new(seq, *to..*to, &text_of(range)))
                }
                EditOp::Flip { first, second } => {
                    let first_text = text_of(first);
                    let second_text = text_of(second);
                    primitives.push(Primitive::new(seq, first.clone(), &second_text));
                    primitives.push(Primitive::new(seq, second.clone(), &first_text));
                }
            }
        }

        let mut order: Vec<usize> = (0..primitives.len()).collect();
        order.sort_by_key(|&i| (primitives[i].range.start, primitives[i].seq));

        let mut position_of = vec![0usize; primitives.len()];
        let mut edits: Vec<TextDeltaEdit> = Vec::with_capacity(primitives.len());
        let mut kept: Vec<usize> = Vec::with_capacity(primitives.len());
        for &i in &order {
            let p = &primitives[i];
            if p.range.is_empty() && p.text.is_empty() {
                continue;
            }
            position_of[i] = edits.len();
            kept.push(i);
            edits.push(TextDeltaEdit {
                start: p.range.start,
                deleted_text: text_of(&p.range),
                inserted_text: p.text.clone(),
                moved_to: None,
            });
        }

        let mut delta = TextDelta {
            before_char_count: len,
            after_char_count: 0,
            edits,
            undo_group_id: None,
        };

        let after = delta.after_ranges();
        for &i in &kept {
            if let Some(target) = primitives[i].moved_to
                && !primitives[target].text.is_empty()
            {
                delta.edits[position_of[i]].moved_to = Some(after[position_of[target]].start);
            }
        }

        let inserted: usize = delta.edits.iter().map(TextDeltaEdit::inserted_len).sum();
        let deleted: usize = delta.edits.iter().map(TextDeltaEdit::deleted_len).sum();
        delta.after_char_count = len + inserted - deleted;

        tracing::trace!(
            operations = self.ops.len(),
            edits = delta.edits.len(),
            "resolved change set"
        );
        Ok(delta)
    }

    /// Resolve and apply to `original`, returning the edited text.
    pub fn apply_to(&self, original: &str) -> Result<String, ChangeSetError> {
        Ok(self.plan(original)?.apply_to(original))
    }
}

#[derive(Debug)]
struct Primitive {
    seq: usize,
    range: Range<usize>,
    text: String,
    moved_to: Option<usize>,
}

impl Primitive {
    fn new(seq: usize, range: Range<usize>, text: &str) -> Self {
        Self {
            seq,
            range,
            text: text.to_string(),
            moved_to: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_replace_and_insert() {
        let mut changes = ChangeSet::new();
        changes.insert(0, "!(").unwrap();
        changes.replace(2..4, ">").unwrap();
        changes.insert(6, ")").unwrap();
        assert_eq!(changes.apply_to("a <= b").unwrap(), "!(a > b)");
    }

    #[test]
    fn test_inserts_at_same_anchor_keep_declaration_order() {
        let mut changes = ChangeSet::new();
        changes.insert(3, "1").unwrap();
        changes.insert(3, "2").unwrap();
        changes.insert(3, "3").unwrap();
        assert_eq!(changes.apply_to("abcdef").unwrap(), "abc123def");
    }

    #[test]
    fn test_insert_before_replace_at_same_start() {
        let mut changes = ChangeSet::new();
        changes.insert(0, "<").unwrap();
        changes.replace(0..3, "XYZ").unwrap();
        changes.insert(0, ">").unwrap();
        assert_eq!(changes.apply_to("abc").unwrap(), "<XYZ>");
    }

    #[test]
    fn test_move_with_prefix_and_suffix() {
        let mut changes = ChangeSet::new();
        changes.insert(0, "[").unwrap();
        changes.move_range(6..9, 0).unwrap();
        changes.insert(0, "]").unwrap();
        assert_eq!(changes.apply_to("alpha beta").unwrap(), "[bet]alpha a");
    }

    #[test]
    fn test_copy_source_may_overlap_removed_text() {
        // Mirrors hoisting a declaration: copy the name, then move the whole condition.
        let text = "if (int x = f()) {}";
        let condition = 4..15;
        let name = 8..9;
        let mut changes = ChangeSet::new();
        changes.copy(name, condition.start).unwrap();
        changes.move_range(condition, 0).unwrap();
        changes.insert(0, ";\n").unwrap();
        assert_eq!(changes.apply_to(text).unwrap(), "int x = f();\nif (x) {}");
    }

    #[test]
    fn test_flip_swaps_contents() {
        let mut changes = ChangeSet::new();
        changes.flip(0..3, 7..12).unwrap();
        assert_eq!(changes.apply_to("foo <= bar()").unwrap(), "bar() <= foo");
    }

    #[test]
    fn test_overlapping_replacements_are_rejected() {
        let mut changes = ChangeSet::new();
        changes.replace(2..6, "x").unwrap();
        let err = changes.remove(4..8).unwrap_err();
        assert_eq!(
            err,
            ChangeSetError::Overlap {
                existing: 2..6,
                incoming: 4..8
            }
        );
        // The remembered conflict poisons the whole set.
        assert_eq!(changes.plan("0123456789").unwrap_err(), err);
        assert_eq!(changes.len(), 1);
    }

    #[test]
    fn test_insert_strictly_inside_removed_range_is_rejected() {
        let mut changes = ChangeSet::new();
        changes.remove(2..6).unwrap();
        assert!(changes.insert(4, "x").is_err());

        let mut changes = ChangeSet::new();
        changes.insert(4, "x").unwrap();
        assert!(changes.replace(2..6, "y").is_err());
    }

    #[test]
    fn test_insert_on_boundary_is_allowed() {
        let mut changes = ChangeSet::new();
        changes.remove(2..6).unwrap();
        changes.insert(2, "<").unwrap();
        changes.insert(6, ">").unwrap();
        assert_eq!(changes.apply_to("01234567").unwrap(), "01<>67");
    }

    #[test]
    fn test_move_into_own_source_is_rejected() {
        let mut changes = ChangeSet::new();
        assert!(changes.move_range(2..8, 4).is_err());
        assert!(changes.conflict().is_some());
    }

    #[test]
    fn test_overlapping_flip_ranges_are_rejected() {
        let mut changes = ChangeSet::new();
        assert!(changes.flip(0..4, 2..6).is_err());
    }

    #[test]
    fn test_out_of_bounds_fails_at_plan_time() {
        let mut changes = ChangeSet::new();
        changes.replace(3..10, "x").unwrap();
        assert_eq!(
            changes.plan("abc").unwrap_err(),
            ChangeSetError::OutOfBounds { range: 3..10, len: 3 }
        );
    }

    #[test]
    fn test_invalid_range_is_rejected() {
        let mut changes = ChangeSet::new();
        #[allow(clippy::reversed_empty_ranges)]
        let err = changes.remove(5..2).unwrap_err();
        assert_eq!(err, ChangeSetError::InvalidRange { start: 5, end: 2 });
    }

    #[test]
    fn test_plan_counts_characters_not_bytes() {
        let mut changes = ChangeSet::new();
        changes.replace(1..2, "ü").unwrap();
        let delta = changes.plan("añb").unwrap();
        assert_eq!(delta.before_char_count, 3);
        assert_eq!(delta.after_char_count, 3);
        assert_eq!(delta.apply_to("añb"), "aüb");
    }

    #[test]
    fn test_plan_is_replayable() {
        let mut changes = ChangeSet::new();
        changes.move_range(0..2, 5).unwrap();
        changes.insert(3, "-").unwrap();
        let first = changes.apply_to("ab cde").unwrap();
        let second = changes.apply_to("ab cde").unwrap();
        assert_eq!(first, second);
        assert_eq!(first, " -cdabe");
    }

    #[test]
    fn test_empty_change_set_is_identity() {
        let changes = ChangeSet::new();
        let delta = changes.plan("text").unwrap();
        assert!(delta.is_empty());
        assert_eq!(delta.apply_to("text"), "text");
    }
}
