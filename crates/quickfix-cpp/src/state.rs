//! Per-query match context.

use quickfix_lang::QuickFixSettings;
use quickfix_syntax::{DocumentSnapshot, NodeId, NodeKind, Snapshot, TokenIndex, TokenKind};
use std::ops::Range;
use std::sync::Arc;

/// Everything a fix needs once it has been chosen: the snapshot it was matched against and the
/// settings in force at query time.
#[derive(Debug, Clone)]
pub struct RewriteContext {
    /// All parsed documents.
    pub snapshot: Arc<Snapshot>,
    /// The document the query ran on.
    pub document: Arc<DocumentSnapshot>,
    /// Settings read at query time.
    pub settings: Arc<QuickFixSettings>,
}

impl RewriteContext {
    /// Path of the queried document.
    pub fn path(&self) -> &str {
        self.document.path()
    }
}

/// Context of one "which fixes apply here?" query.
///
/// The path runs from the translation unit down to the innermost node containing the cursor and
/// is computed once per query.
#[derive(Debug, Clone)]
pub struct MatchState {
    context: RewriteContext,
    cursor: usize,
    selection: Option<Range<usize>>,
    path: Vec<NodeId>,
}

impl MatchState {
    /// Build the state for a cursor (and optional selection) in `document`.
    pub fn new(
        snapshot: Arc<Snapshot>,
        document: Arc<DocumentSnapshot>,
        settings: Arc<QuickFixSettings>,
        cursor: usize,
        selection: Option<Range<usize>>,
    ) -> Self {
        let path = document.path_at(cursor);
        Self {
            context: RewriteContext {
                snapshot,
                document,
                settings,
            },
            cursor,
            selection,
            path,
        }
    }

    /// Context handed to the fixes this query produces.
    pub fn context(&self) -> &RewriteContext {
        &self.context
    }

    /// All parsed documents.
    pub fn snapshot(&self) -> &Arc<Snapshot> {
        &self.context.snapshot
    }

    /// The queried document.
    pub fn document(&self) -> &DocumentSnapshot {
        &self.context.document
    }

    /// Settings read at query time.
    pub fn settings(&self) -> &QuickFixSettings {
        &self.context.settings
    }

    /// Cursor offset.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Selected range, if any.
    pub fn selection(&self) -> Option<Range<usize>> {
        self.selection.clone()
    }

    /// Start of the selection, or the cursor when nothing is selected.
    pub fn selection_start(&self) -> usize {
        self.selection.as_ref().map_or(self.cursor, |s| s.start)
    }

    /// Nodes from the root to the innermost node at the cursor.
    pub fn path(&self) -> &[NodeId] {
        &self.path
    }

    /// Kind of a node.
    pub fn kind(&self, node: NodeId) -> &NodeKind {
        self.document().ast().kind(node)
    }

    /// Kind of a token.
    pub fn token_kind(&self, token: TokenIndex) -> Option<TokenKind> {
        self.document().token_kind(token)
    }

    /// Spelling of a token.
    pub fn token_text(&self, token: TokenIndex) -> &str {
        self.document().token_text(token)
    }

    /// Returns `true` if the selection start lies on `token`, end inclusive.
    pub fn is_cursor_on(&self, token: TokenIndex) -> bool {
        self.document().is_offset_on(self.selection_start(), token)
    }

    /// Returns `true` if the selection start lies within `node`, end inclusive.
    pub fn is_cursor_on_node(&self, node: NodeId) -> bool {
        let doc = self.document();
        let at = self.selection_start();
        doc.start_of(node) <= at && at <= doc.end_of(node)
    }

    /// Callee name of the call directly enclosing the innermost node, if the callee is a plain
    /// name.
    pub fn enclosing_call_name(&self) -> Option<(NodeId, &str)> {
        let [.., call, _] = self.path.as_slice() else {
            return None;
        };
        let NodeKind::Call { callee, .. } = self.kind(*call) else {
            return None;
        };
        match self.kind(*callee) {
            NodeKind::SimpleName { identifier } => Some((*call, self.token_text(*identifier))),
            _ => None,
        }
    }
}
