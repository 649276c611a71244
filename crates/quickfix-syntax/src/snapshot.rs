//! Parsed-document snapshots.
//!
//! A [`DocumentSnapshot`] bundles everything a syntax provider produced for one revision of one
//! file: source text, tokens, tree and symbols. Snapshots are immutable and shared through `Arc`;
//! a [`Snapshot`] maps file paths to the latest parsed revision of each file.

use crate::ast::{Ast, NodeId};
use crate::symbols::SymbolTable;
use crate::token::{Token, TokenIndex, TokenKind};
use std::collections::BTreeMap;
use std::ops::Range;
use std::sync::Arc;

/// Source language of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Language {
    /// C++.
    #[default]
    Cpp,
    /// Objective-C++ (`@"..."` literals are meaningful).
    ObjectiveCpp,
}

impl Language {
    /// Guess the language from a file name.
    pub fn from_path(path: &str) -> Self {
        if path.ends_with(".mm") {
            Language::ObjectiveCpp
        } else {
            Language::Cpp
        }
    }
}

/// One parsed revision of one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSnapshot {
    path: String,
    revision: u64,
    language: Language,
    source: String,
    /// Byte offset of every char, plus the total byte length.
    char_starts: Vec<usize>,
    /// Char offset of every line start.
    line_starts: Vec<usize>,
    tokens: Vec<Token>,
    ast: Ast,
    symbols: SymbolTable,
}

impl DocumentSnapshot {
    /// Assemble a snapshot from provider output.
    pub fn new(
        path: impl Into<String>,
        revision: u64,
        language: Language,
        source: impl Into<String>,
        tokens: Vec<Token>,
        ast: Ast,
        symbols: SymbolTable,
    ) -> Self {
        let source = source.into();
        let mut char_starts: Vec<usize> = source.char_indices().map(|(i, _)| i).collect();
        char_starts.push(source.len());
        let mut line_starts = vec![0];
        line_starts.extend(
            source
                .chars()
                .enumerate()
                .filter(|(_, ch)| *ch == '\n')
                .map(|(i, _)| i + 1),
        );

        Self {
            path: path.into(),
            revision,
            language,
            source,
            char_starts,
            line_starts,
            tokens,
            ast,
            symbols,
        }
    }

    /// File path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Document revision the snapshot was parsed from.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Source language.
    pub fn language(&self) -> Language {
        self.language
    }

    /// Returns `true` for Objective-C++ documents.
    pub fn is_objective_cpp(&self) -> bool {
        self.language == Language::ObjectiveCpp
    }

    /// Full source text.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Length of the source in characters.
    pub fn char_count(&self) -> usize {
        self.char_starts.len() - 1
    }

    /// Token stream.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Syntax tree.
    pub fn ast(&self) -> &Ast {
        &self.ast
    }

    /// Semantic tables.
    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    /// Token by index.
    pub fn token(&self, index: TokenIndex) -> Option<&Token> {
        self.tokens.get(index)
    }

    /// Kind of a token, if the index is valid.
    pub fn token_kind(&self, index: TokenIndex) -> Option<TokenKind> {
        self.token(index).map(|t| t.kind)
    }

    /// Spelling of a token; empty for an invalid index.
    pub fn token_text(&self, index: TokenIndex) -> &str {
        self.token(index).map_or("", |t| t.spelling.as_str())
    }

    /// Start offset of a token. An index past the end maps to the end of the text.
    pub fn start_of_token(&self, index: TokenIndex) -> usize {
        self.token(index).map_or(self.char_count(), Token::start)
    }

    /// End offset of a token. An index past the end maps to the end of the text.
    pub fn end_of_token(&self, index: TokenIndex) -> usize {
        self.token(index).map_or(self.char_count(), Token::end)
    }

    /// Start offset of a node.
    pub fn start_of(&self, node: NodeId) -> usize {
        self.start_of_token(self.ast.node(node).first_token)
    }

    /// End offset of a node.
    pub fn end_of(&self, node: NodeId) -> usize {
        self.end_of_token(self.ast.node(node).last_token)
    }

    /// Character range of a node.
    pub fn range_of(&self, node: NodeId) -> Range<usize> {
        self.start_of(node)..self.end_of(node)
    }

    /// Source text in a character range. Out-of-range ends are clamped.
    pub fn text(&self, range: Range<usize>) -> &str {
        let len = self.char_count();
        let start = range.start.min(len);
        let end = range.end.clamp(start, len);
        &self.source[self.char_starts[start]..self.char_starts[end]]
    }

    /// Source text of a node.
    pub fn node_text(&self, node: NodeId) -> &str {
        self.text(self.range_of(node))
    }

    /// Returns `true` if `offset` lies on token `index`, end inclusive.
    pub fn is_offset_on(&self, offset: usize, index: TokenIndex) -> bool {
        self.token(index).is_some_and(|t| t.touches(offset))
    }

    /// Nodes from the root down to the innermost node containing `offset`.
    pub fn path_at(&self, offset: usize) -> Vec<NodeId> {
        self.ast.path_at(&self.tokens, offset)
    }

    /// Number of lines.
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// 0-based line containing `offset`.
    pub fn line_of(&self, offset: usize) -> usize {
        self.line_starts
            .partition_point(|start| *start <= offset)
            .saturating_sub(1)
    }

    /// Offset of the first character of a 0-based line; past the last line maps to the end.
    pub fn line_start(&self, line: usize) -> usize {
        self.line_starts
            .get(line)
            .copied()
            .unwrap_or(self.char_count())
    }

    /// 0-based `(line, column)` of an offset.
    pub fn position(&self, offset: usize) -> (usize, usize) {
        let offset = offset.min(self.char_count());
        let line = self.line_of(offset);
        (line, offset - self.line_start(line))
    }

    /// Offset of a 0-based `(line, column)`, clamped to the line.
    pub fn offset_at(&self, line: usize, column: usize) -> usize {
        let start = self.line_start(line);
        let end = self
            .line_starts
            .get(line + 1)
            .map_or(self.char_count(), |next| next - 1);
        (start + column).min(end.max(start))
    }

    /// Index of the first token starting at or after `offset`.
    pub fn token_at_or_after(&self, offset: usize) -> TokenIndex {
        self.tokens.partition_point(|t| t.start() < offset)
    }
}

/// Parsed documents keyed by path.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    documents: BTreeMap<String, Arc<DocumentSnapshot>>,
}

impl Snapshot {
    /// Create an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a document.
    pub fn insert(&mut self, document: DocumentSnapshot) -> Arc<DocumentSnapshot> {
        let document = Arc::new(document);
        self.documents
            .insert(document.path().to_string(), document.clone());
        document
    }

    /// Document by path.
    pub fn document(&self, path: &str) -> Option<&Arc<DocumentSnapshot>> {
        self.documents.get(path)
    }

    /// All documents in path order.
    pub fn documents(&self) -> impl Iterator<Item = &Arc<DocumentSnapshot>> {
        self.documents.values()
    }

    /// Number of documents.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Returns `true` if no document has been added.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}
