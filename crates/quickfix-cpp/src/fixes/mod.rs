//! The fix predicates, grouped by what they rewrite.
//!
//! Every predicate has the [`Matcher`](crate::engine::Matcher) signature and is registered in
//! [`REGISTRY`](crate::engine::REGISTRY). Predicates only read the match state; the closures they
//! return compute edits from the captured node and token handles.

pub mod comparison;
pub mod control_flow;
pub mod declaration;
pub mod literals;
pub mod members;
pub mod names;

use quickfix_syntax::{DocumentSnapshot, TokenIndex};
use std::ops::Range;

pub(crate) fn token_range(doc: &DocumentSnapshot, token: TokenIndex) -> Range<usize> {
    doc.start_of_token(token)..doc.end_of_token(token)
}
