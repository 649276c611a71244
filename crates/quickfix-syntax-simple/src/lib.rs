#![warn(missing_docs)]
//! `quickfix-syntax-simple` - a small reference syntax provider for the quick-fix engine.
//!
//! The engine consumes [`quickfix_syntax`] snapshots and does not care who produced them. This
//! crate produces them for a C++ subset so the engine can be exercised end to end without a real
//! front-end:
//!
//! - namespaces, classes with access sections (including `signals` and `slots`), enums, forward
//!   declarations;
//! - simple declarations with several declarators, function declarations and definitions
//!   (including `C::f` definitions);
//! - compound, `if`, `while`, `do`, `for`, `switch`/`case`/`default`, `return`, `break` and
//!   expression statements, conditions with declarations;
//! - binary, unary, nested, call, member, qualified-name and literal expressions;
//! - `#include` lines.
//!
//! It is *not* intended to be a C++ front-end. Templates, operator names and initializer lists
//! are out of scope.
//!
//! ```
//! use quickfix_syntax::NodeKind;
//!
//! let doc = quickfix_syntax_simple::parse_document("a.cpp", 0, "void f() { x = a <= b; }").unwrap();
//! let path = doc.path_at(17);
//! assert!(matches!(doc.ast().kind(*path.last().unwrap()), NodeKind::Binary { .. }));
//! ```

pub mod binder;
pub mod lexer;
pub mod parser;

use quickfix_syntax::{DocumentSnapshot, Language, Snapshot};
use std::sync::Arc;

/// Errors produced while lexing or parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// A character that starts no token.
    #[error("unexpected character `{ch}` at offset {offset}")]
    UnexpectedChar {
        /// The character.
        ch: char,
        /// Its character offset.
        offset: usize,
    },

    /// A comment or literal runs past the end of its line or file.
    #[error("unterminated {what} starting at offset {offset}")]
    Unterminated {
        /// What was left open.
        what: &'static str,
        /// Offset of the opening delimiter.
        offset: usize,
    },

    /// The parser found a token it cannot use here.
    #[error("expected {expected} at offset {offset}, found `{found}`")]
    Expected {
        /// What the grammar wanted.
        expected: &'static str,
        /// Spelling of the token found.
        found: String,
        /// Character offset of the token found.
        offset: usize,
    },
}

impl ParseError {
    /// Character offset the error points at.
    pub fn offset(&self) -> usize {
        match self {
            ParseError::UnexpectedChar { offset, .. }
            | ParseError::Unterminated { offset, .. }
            | ParseError::Expected { offset, .. } => *offset,
        }
    }
}

/// Parse one document, guessing the language from its path.
pub fn parse_document(path: &str, revision: u64, source: &str) -> Result<DocumentSnapshot, ParseError> {
    parse_with_language(path, revision, Language::from_path(path), source)
}

/// Parse one document in an explicit language.
#[tracing::instrument(level = "debug", skip(source), fields(chars = source.chars().count()))]
pub fn parse_with_language(
    path: &str,
    revision: u64,
    language: Language,
    source: &str,
) -> Result<DocumentSnapshot, ParseError> {
    let char_count = source.chars().count();
    let lexed = lexer::lex(source)?;
    let ast = parser::parse_tokens(&lexed.tokens, char_count).inspect_err(|err| {
        tracing::debug!(%err, "parse failed");
    })?;
    let symbols = binder::bind(&lexed.tokens, &ast, lexed.includes, char_count);
    tracing::debug!(
        tokens = lexed.tokens.len(),
        nodes = ast.len(),
        "parsed document"
    );
    Ok(DocumentSnapshot::new(
        path,
        revision,
        language,
        source,
        lexed.tokens,
        ast,
        symbols,
    ))
}

/// Parse a document and add it to `snapshot`, replacing any earlier revision.
pub fn parse_into(
    snapshot: &mut Snapshot,
    path: &str,
    revision: u64,
    source: &str,
) -> Result<Arc<DocumentSnapshot>, ParseError> {
    Ok(snapshot.insert(parse_document(path, revision, source)?))
}
