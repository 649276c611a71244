//! Indentation engine used to re-indent rewritten code.
//!
//! The engine answers one question: how many columns of leading whitespace should a line have?
//! [`CStyleIndenter`] answers it for brace languages by scanning the lines above, tracking open
//! braces and parentheses while skipping comments, string literals and preprocessor lines.
//! [`reindent_lines`] then rewrites leading whitespace only; token content is never touched.

use crate::document::{EditBlock, EditError};
use crate::line_index::LineIndex;
use quickfix_lang::IndentConfig;

/// Computes the indentation of a line.
pub trait Indenter {
    /// Desired indentation of `line` in columns, or `None` to leave the line alone.
    fn indent_for_line(&self, index: &LineIndex, line: usize) -> Option<usize>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BraceKind {
    Block,
    Switch,
    Class,
    Namespace,
}

#[derive(Debug, Clone, Copy)]
struct OpenBrace {
    kind: BraceKind,
    /// Indentation of the line holding the `{`.
    line_indent: usize,
}

#[derive(Debug, Default)]
struct ScanState {
    braces: Vec<OpenBrace>,
    /// Visual column just after each unclosed `(` or `[`.
    parens: Vec<usize>,
    in_block_comment: bool,
    /// Significant text of the statement being scanned.
    head: String,
    /// Indentation of the last non-blank line.
    last_indent: usize,
    /// The last non-blank line was a control header without a body (`if (x)`, `else`).
    pending_header: bool,
}

/// Indenter for C-family code.
#[derive(Debug, Clone, Default)]
pub struct CStyleIndenter {
    config: IndentConfig,
}

impl CStyleIndenter {
    /// Create an indenter using `config`.
    pub fn new(config: IndentConfig) -> Self {
        Self { config }
    }

    /// Active indentation style.
    pub fn config(&self) -> &IndentConfig {
        &self.config
    }

    fn content_indent(&self, brace: &OpenBrace) -> usize {
        let levels = match brace.kind {
            BraceKind::Namespace => 0,
            BraceKind::Block => 1,
            BraceKind::Switch => 1 + usize::from(self.config.indent_case_labels),
            BraceKind::Class => 1 + usize::from(self.config.indent_access_specifiers),
        };
        brace.line_indent + levels * self.config.width
    }

    fn label_indent(&self, brace: &OpenBrace) -> usize {
        let nested = match brace.kind {
            BraceKind::Switch => self.config.indent_case_labels,
            BraceKind::Class => self.config.indent_access_specifiers,
            _ => false,
        };
        brace.line_indent + usize::from(nested) * self.config.width
    }

    fn scan(&self, index: &LineIndex, upto: usize) -> ScanState {
        let mut state = ScanState::default();
        for line in 0..upto {
            let Some(text) = index.line_text(line) else {
                break;
            };
            self.scan_line(&mut state, &text);
        }
        state
    }

    fn scan_line(&self, state: &mut ScanState, text: &str) {
        let trimmed = text.trim_start();
        if !state.in_block_comment && trimmed.starts_with('#') {
            return;
        }
        if trimmed.is_empty() {
            return;
        }

        let line_indent = self.config.columns_of(&text[..text.len() - trimmed.len()]);
        let starts_in_comment = state.in_block_comment;

        let chars: Vec<char> = text.chars().collect();
        let mut column = 0usize;
        let mut i = 0usize;
        let mut quote: Option<char> = None;
        while i < chars.len() {
            let ch = chars[i];
            let next = chars.get(i + 1).copied();

            if state.in_block_comment {
                if ch == '*' && next == Some('/') {
                    state.in_block_comment = false;
                    i += 2;
                    column += 2;
                    continue;
                }
            } else if let Some(q) = quote {
                if ch == '\\' {
                    i += 2;
                    column += 2;
                    continue;
                }
                if ch == q {
                    quote = None;
                }
            } else {
                match ch {
                    '/' if next == Some('/') => break,
                    '/' if next == Some('*') => {
                        state.in_block_comment = true;
                        i += 2;
                        column += 2;
                        continue;
                    }
                    '"' | '\'' => {
                        quote = Some(ch);
                        state.head.push(ch);
                    }
                    '{' => {
                        let kind = brace_kind(&state.head);
                        state.braces.push(OpenBrace { kind, line_indent });
                        state.head.clear();
                    }
                    '}' => {
                        state.braces.pop();
                        state.head.clear();
                    }
                    ';' if state.parens.is_empty() => state.head.clear(),
                    '(' | '[' => {
                        state.parens.push(column + 1);
                        state.head.push(ch);
                    }
                    ')' | ']' => {
                        state.parens.pop();
                        state.head.push(ch);
                    }
                    ':' if is_label(state.head.trim()) => state.head.clear(),
                    _ => state.head.push(ch),
                }
            }

            column = if ch == '\t' {
                let tab = self.config.tab_width.max(1);
                (column / tab + 1) * tab
            } else {
                column + 1
            };
            i += 1;
        }

        if state.in_block_comment && starts_in_comment {
            return;
        }
        state.head.push(' ');
        state.last_indent = line_indent;
        state.pending_header = state.parens.is_empty() && is_control_header(state.head.trim());
    }
}

impl Indenter for CStyleIndenter {
    fn indent_for_line(&self, index: &LineIndex, line: usize) -> Option<usize> {
        let text = index.line_text(line)?;
        let state = self.scan(index, line);
        if state.in_block_comment {
            return None;
        }

        let trimmed = text.trim_start();
        if trimmed.starts_with('#') {
            return Some(0);
        }
        if let Some(&column) = state.parens.last() {
            return Some(column);
        }

        let top = state.braces.last();
        if trimmed.starts_with('}') {
            return Some(top.map_or(0, |brace| brace.line_indent));
        }

        if let Some(brace) = top {
            if brace.kind == BraceKind::Switch && is_case_label(trimmed) {
                return Some(self.label_indent(brace));
            }
            if brace.kind == BraceKind::Class && is_access_specifier(trimmed) {
                return Some(self.label_indent(brace));
            }
        }

        if state.pending_header && !trimmed.starts_with('{') {
            return Some(state.last_indent + self.config.width);
        }
        if state.pending_header {
            return Some(state.last_indent);
        }

        Some(top.map_or(0, |brace| self.content_indent(brace)))
    }
}

/// Rewrite the leading whitespace of `lines` (ascending, deduplicated) inside an edit block.
///
/// Blank lines and lines the indenter declines are left alone. Returns, for every changed line,
/// its start offset together with the old and new whitespace lengths, in the order applied, so
/// callers can map offsets through the adjustment.
pub fn reindent_lines(
    block: &mut EditBlock<'_>,
    indenter: &dyn Indenter,
    config: &IndentConfig,
    lines: &[usize],
) -> Result<Vec<IndentChange>, EditError> {
    let mut changes = Vec::new();
    for &line in lines {
        let index = block.line_index();
        if line >= index.line_count() {
            break;
        }
        let Some(text) = index.line_text(line) else {
            continue;
        };
        let trimmed = text.trim_start();
        if trimmed.is_empty() {
            continue;
        }
        let Some(columns) = indenter.indent_for_line(index, line) else {
            continue;
        };

        let old_ws = &text[..text.len() - trimmed.len()];
        let new_ws = config.render(columns);
        if old_ws == new_ws {
            continue;
        }

        let start = index.line_start(line);
        let old_len = old_ws.chars().count();
        block.replace(start..start + old_len, &new_ws)?;
        changes.push(IndentChange {
            line,
            start,
            old_len,
            new_len: new_ws.chars().count(),
        });
    }
    Ok(changes)
}

/// A leading-whitespace adjustment made by [`reindent_lines`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndentChange {
    /// Line index.
    pub line: usize,
    /// Offset of the line start when the change was made.
    pub start: usize,
    /// Old whitespace length in characters.
    pub old_len: usize,
    /// New whitespace length in characters.
    pub new_len: usize,
}

impl IndentChange {
    /// Map an offset taken just before this change.
    ///
    /// Offsets inside the old whitespace move to the end of the new whitespace.
    pub fn map_offset(&self, offset: usize) -> usize {
        if offset <= self.start {
            offset
        } else if offset < self.start + self.old_len {
            self.start + self.new_len
        } else {
            offset + self.new_len - self.old_len
        }
    }
}

fn brace_kind(head: &str) -> BraceKind {
    let words: Vec<&str> = head
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|w| !w.is_empty())
        .collect();
    match words.first().copied() {
        Some("switch") => BraceKind::Switch,
        Some("namespace") => BraceKind::Namespace,
        Some("class" | "struct" | "union") if !head.contains('(') => BraceKind::Class,
        Some("template") if words.contains(&"class") && !head.contains('(') => BraceKind::Class,
        _ => BraceKind::Block,
    }
}

fn first_word(text: &str) -> &str {
    let end = text
        .find(|c: char| !(c.is_alphanumeric() || c == '_'))
        .unwrap_or(text.len());
    &text[..end]
}

fn is_case_label(trimmed: &str) -> bool {
    matches!(first_word(trimmed), "case" | "default")
}

fn is_access_specifier(trimmed: &str) -> bool {
    matches!(
        first_word(trimmed),
        "public" | "protected" | "private" | "signals" | "slots" | "Q_SIGNALS" | "Q_SLOTS"
    ) && trimmed.contains(':')
        && !trimmed.contains("::")
}

/// `case X`, `default`, `public`, `private slots` and friends; `:` after them ends a label.
fn is_label(head: &str) -> bool {
    is_case_label(head) || is_access_specifier(&format!("{head}:"))
}

fn is_control_header(head: &str) -> bool {
    match first_word(head) {
        "if" | "while" | "for" => head.ends_with(')'),
        "else" => head == "else" || (head.starts_with("else if") && head.ends_with(')')),
        "do" => head == "do",
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Document;
    use pretty_assertions::assert_eq;

    fn reindent_all(text: &str) -> String {
        let mut doc = Document::new("t.cpp", text);
        let lines: Vec<usize> = (0..doc.line_index().line_count()).collect();
        let indenter = CStyleIndenter::default();
        let config = IndentConfig::default();
        doc.edit_block(|block| reindent_lines(block, &indenter, &config, &lines))
            .unwrap();
        doc.text()
    }

    #[test]
    fn test_braces_and_unbraced_bodies() {
        let text = "void f()\n{\nif (a)\nb();\nif (c) {\nd();\n}\n}";
        assert_eq!(
            reindent_all(text),
            "void f()\n{\n    if (a)\n        b();\n    if (c) {\n        d();\n    }\n}"
        );
    }

    #[test]
    fn test_switch_labels_stay_at_switch_level() {
        let text = "switch (x) {\ncase A:\nbreak;\n  default:\nbreak;\n}";
        assert_eq!(
            reindent_all(text),
            "switch (x) {\ncase A:\n    break;\ndefault:\n    break;\n}"
        );
    }

    #[test]
    fn test_case_labels_can_be_indented() {
        let index = LineIndex::from_text("switch (x) {\ncase A:\n");
        let indenter = CStyleIndenter::new(IndentConfig {
            indent_case_labels: true,
            ..IndentConfig::default()
        });
        assert_eq!(indenter.indent_for_line(&index, 1), Some(4));
    }

    #[test]
    fn test_access_specifiers_and_members() {
        let text = "class C\n{\npublic:\nvoid f();\nprivate slots:\nvoid g();\n};";
        assert_eq!(
            reindent_all(text),
            "class C\n{\npublic:\n    void f();\nprivate slots:\n    void g();\n};"
        );
    }

    #[test]
    fn test_open_paren_aligns_continuation() {
        assert_eq!(reindent_all("foo(a,\nb);\nbar();"), "foo(a,\n    b);\nbar();");
    }

    #[test]
    fn test_comments_and_strings_do_not_count() {
        let text = "{\nx = \"{\"; // {\n/* {\n   */\ny;\n}";
        assert_eq!(
            reindent_all(text),
            "{\n    x = \"{\"; // {\n    /* {\n   */\n    y;\n}"
        );
    }

    #[test]
    fn test_block_comment_lines_are_left_alone() {
        let index = LineIndex::from_text("/*\n  text\n*/");
        let indenter = CStyleIndenter::default();
        assert_eq!(indenter.indent_for_line(&index, 1), None);
    }

    #[test]
    fn test_preprocessor_lines_go_to_column_zero() {
        assert_eq!(
            reindent_all("{\n    #include <a>\nx;\n}"),
            "{\n#include <a>\n    x;\n}"
        );
    }

    #[test]
    fn test_namespace_contents_are_not_indented() {
        assert_eq!(
            reindent_all("namespace N {\n  int x;\n}"),
            "namespace N {\nint x;\n}"
        );
    }

    #[test]
    fn test_reindent_only_touches_leading_whitespace() {
        let text = "{\nint   a ,  b;\n}";
        let out = reindent_all(text);
        assert_eq!(out, "{\n    int   a ,  b;\n}");
        assert_eq!(
            out.split_whitespace().collect::<Vec<_>>(),
            text.split_whitespace().collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_indent_change_maps_offsets() {
        let change = IndentChange {
            line: 1,
            start: 10,
            old_len: 2,
            new_len: 4,
        };
        assert_eq!(change.map_offset(5), 5);
        assert_eq!(change.map_offset(10), 10);
        assert_eq!(change.map_offset(11), 14);
        assert_eq!(change.map_offset(12), 14);
        assert_eq!(change.map_offset(20), 22);
    }
}
