//! Rope-backed document text with line/column conversion.
//!
//! Every offset handled here is a **character offset** (Unicode scalar values), the same unit the
//! change set and the syntax snapshot use.

use ropey::Rope;
use std::ops::Range;

/// Logical line index - implemented using Rope data structure
///
/// Rope provides O(log N) line access, insertion, and deletion, so edit blocks can splice text
/// without rebuilding the whole document.
#[derive(Debug, Clone, Default)]
pub struct LineIndex {
    rope: Rope,
}

impl LineIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self { rope: Rope::new() }
    }

    /// Build line index from text
    pub fn from_text(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
        }
    }

    /// Get total line count. An empty document has one (empty) line.
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Get total character count
    pub fn char_count(&self) -> usize {
        self.rope.len_chars()
    }

    /// Character offset of the first character of `line` (clamped to the end of the text).
    pub fn line_start(&self, line: usize) -> usize {
        if line >= self.rope.len_lines() {
            return self.rope.len_chars();
        }
        self.rope.line_to_char(line)
    }

    /// Character range of `line`, excluding its line terminator.
    pub fn line_range(&self, line: usize) -> Range<usize> {
        let start = self.line_start(line);
        let end = start + self.line_len(line);
        start..end
    }

    /// Length of `line` in characters, excluding the line terminator.
    pub fn line_len(&self, line: usize) -> usize {
        if line >= self.rope.len_lines() {
            return 0;
        }
        let slice = self.rope.line(line);
        let mut len = slice.len_chars();
        if len > 0 && slice.char(len - 1) == '\n' {
            len -= 1;
            if len > 0 && slice.char(len - 1) == '\r' {
                len -= 1;
            }
        }
        len
    }

    /// Line containing `char_offset` (clamped).
    pub fn line_of(&self, char_offset: usize) -> usize {
        let char_offset = char_offset.min(self.rope.len_chars());
        self.rope.char_to_line(char_offset)
    }

    /// Get line number and offset within line from character offset (both zero-based).
    pub fn char_offset_to_position(&self, char_offset: usize) -> (usize, usize) {
        let char_offset = char_offset.min(self.rope.len_chars());

        let line_idx = self.rope.char_to_line(char_offset);
        let line_start_char = self.rope.line_to_char(line_idx);
        (line_idx, char_offset - line_start_char)
    }

    /// Get character offset from zero-based line and column; the column is clamped to the line.
    pub fn position_to_char_offset(&self, line: usize, column: usize) -> usize {
        if line >= self.rope.len_lines() {
            return self.rope.len_chars();
        }
        self.line_start(line) + column.min(self.line_len(line))
    }

    /// Get text of the specified line (excluding newline)
    pub fn line_text(&self, line: usize) -> Option<String> {
        if line >= self.rope.len_lines() {
            return None;
        }
        let range = self.line_range(line);
        Some(self.rope.slice(range).to_string())
    }

    /// Text of a character range. Out-of-range bounds are clamped.
    pub fn slice(&self, range: Range<usize>) -> String {
        let len = self.rope.len_chars();
        let end = range.end.min(len);
        let start = range.start.min(end);
        self.rope.slice(start..end).to_string()
    }

    /// Character at `char_offset`, if any.
    pub fn char_at(&self, char_offset: usize) -> Option<char> {
        (char_offset < self.rope.len_chars()).then(|| self.rope.char(char_offset))
    }

    /// Insert text (at specified character offset)
    pub fn insert(&mut self, char_offset: usize, text: &str) {
        let char_offset = char_offset.min(self.rope.len_chars());
        self.rope.insert(char_offset, text);
    }

    /// Delete a character range.
    pub fn delete(&mut self, range: Range<usize>) {
        let len = self.rope.len_chars();
        let end = range.end.min(len);
        let start = range.start.min(end);
        if start < end {
            self.rope.remove(start..end);
        }
    }

    /// Get complete text
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// Compare the whole text without allocating.
    pub fn text_eq(&self, text: &str) -> bool {
        self.rope == text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_line_index() {
        let index = LineIndex::new();
        assert_eq!(index.line_count(), 1); // Rope empty document has 1 line
        assert_eq!(index.char_count(), 0);
        assert_eq!(index.line_text(0).as_deref(), Some(""));
    }

    #[test]
    fn test_line_ranges_exclude_terminators() {
        let index = LineIndex::from_text("ab\r\ncd\nef");
        assert_eq!(index.line_count(), 3);
        assert_eq!(index.line_range(0), 0..2);
        assert_eq!(index.line_range(1), 4..6);
        assert_eq!(index.line_range(2), 7..9);
        assert_eq!(index.line_text(1).as_deref(), Some("cd"));
    }

    #[test]
    fn test_char_offset_to_position() {
        let index = LineIndex::from_text("ABC\nDEF\nGHI");

        assert_eq!(index.char_offset_to_position(0), (0, 0));
        assert_eq!(index.char_offset_to_position(2), (0, 2));
        assert_eq!(index.char_offset_to_position(4), (1, 0));
        assert_eq!(index.char_offset_to_position(8), (2, 0));
        assert_eq!(index.char_offset_to_position(100), (2, 3));
    }

    #[test]
    fn test_position_to_char_offset_clamps_column() {
        let index = LineIndex::from_text("ABC\nDEF\nGHI");

        assert_eq!(index.position_to_char_offset(1, 0), 4);
        assert_eq!(index.position_to_char_offset(1, 99), 7);
        assert_eq!(index.position_to_char_offset(9, 0), 11);
    }

    #[test]
    fn test_utf8_cjk_offsets_are_chars() {
        let index = LineIndex::from_text("你好\n世界");

        assert_eq!(index.line_count(), 2);
        assert_eq!(index.char_count(), 5);
        assert_eq!(index.char_offset_to_position(3), (1, 0));
        assert_eq!(index.slice(3..5), "世界");
        assert_eq!(index.char_at(1), Some('好'));
        assert_eq!(index.char_at(5), None);
    }

    #[test]
    fn test_insert_and_delete() {
        let mut index = LineIndex::from_text("Hello World");

        index.insert(6, "Beautiful ");
        assert_eq!(index.text(), "Hello Beautiful World");

        index.delete(6..16);
        assert!(index.text_eq("Hello World"));
    }
}
