//! Rewrites of binary operators: inverse comparison, operand swap and the `&&` De Morgan form.

use super::token_range;
use crate::engine::QuickFix;
use crate::rewrite::Rewrite;
use crate::state::MatchState;
use quickfix_syntax::{NodeKind, TokenKind};

/// Fix id of [`use_inverse_operator`].
pub const USE_INVERSE_OPERATOR: &str = "use-inverse-operator";
/// Fix id of [`flip_binary_operands`].
pub const FLIP_BINARY_OPERANDS: &str = "flip-binary-operands";
/// Fix id of [`rewrite_logical_and`].
pub const REWRITE_LOGICAL_AND: &str = "rewrite-logical-and";

fn inverse(kind: TokenKind) -> Option<&'static str> {
    Some(match kind {
        TokenKind::LessEqual => ">",
        TokenKind::Less => ">=",
        TokenKind::Greater => "<=",
        TokenKind::GreaterEqual => "<",
        TokenKind::EqualEqual => "!=",
        TokenKind::ExclaimEqual => "==",
        _ => return None,
    })
}

/// Operator to use once the operands are swapped; empty when the operator is symmetric.
fn mirrored(kind: TokenKind) -> Option<&'static str> {
    Some(match kind {
        TokenKind::LessEqual => ">=",
        TokenKind::GreaterEqual => "<=",
        TokenKind::Less => ">",
        TokenKind::Greater => "<",
        TokenKind::EqualEqual
        | TokenKind::ExclaimEqual
        | TokenKind::AmpAmp
        | TokenKind::PipePipe => "",
        _ => return None,
    })
}

/// `a <= b` → `!(a > b)`, `(a <= b)` → `!(a > b)`, `!(a <= b)` → `(a > b)`.
///
/// Offered with the cursor on the operator of the innermost comparison.
pub fn use_inverse_operator(state: &MatchState) -> Vec<QuickFix> {
    let path = state.path();
    let Some((&binary, outer)) = path.split_last() else {
        return Vec::new();
    };
    let NodeKind::Binary { op, .. } = *state.kind(binary) else {
        return Vec::new();
    };
    if !state.is_cursor_on(op) {
        return Vec::new();
    }
    let Some(replacement) = state.token_kind(op).and_then(inverse) else {
        return Vec::new();
    };

    let nested = outer
        .last()
        .copied()
        .filter(|n| matches!(state.kind(*n), NodeKind::Nested { .. }));
    let negation = nested.and_then(|_| {
        let unary = *outer.iter().rev().nth(1)?;
        match *state.kind(unary) {
            NodeKind::Unary { op, .. } if state.token_kind(op) == Some(TokenKind::Exclaim) => {
                Some(op)
            }
            _ => None,
        }
    });

    let index = path.len() - 1;
    let fix = QuickFix::new(
        USE_INVERSE_OPERATOR,
        format!("Rewrite Using {replacement}"),
        state,
        move |ctx| {
            let doc = &ctx.document;
            let mut rewrite = Rewrite::new();
            let changes = rewrite.changes(ctx.path());
            if let Some(negation) = negation {
                changes.remove(token_range(doc, negation))?;
            } else if let Some(nested) = nested {
                changes.insert(doc.start_of(nested), "!")?;
            } else {
                changes.insert(doc.start_of(binary), "!(")?;
                changes.insert(doc.end_of(binary), ")")?;
            }
            changes.replace(token_range(doc, op), replacement)?;
            Ok(rewrite)
        },
    )
    .with_priority(index as i32)
    .at_depth(index);
    vec![fix]
}

/// `a < b` → `b > a`; `==`, `!=`, `&&` and `||` only swap their operands.
pub fn flip_binary_operands(state: &MatchState) -> Vec<QuickFix> {
    let path = state.path();
    let Some(&binary) = path.last() else {
        return Vec::new();
    };
    let NodeKind::Binary { left, op, right } = *state.kind(binary) else {
        return Vec::new();
    };
    if !state.is_cursor_on(op) {
        return Vec::new();
    }
    let Some(replacement) = state.token_kind(op).and_then(mirrored) else {
        return Vec::new();
    };

    let description = if replacement.is_empty() {
        "Swap Operands".to_string()
    } else {
        format!("Rewrite Using {replacement}")
    };
    let index = path.len() - 1;
    let fix = QuickFix::new(FLIP_BINARY_OPERANDS, description, state, move |ctx| {
        let doc = &ctx.document;
        let mut rewrite = Rewrite::new();
        let changes = rewrite.changes(ctx.path());
        changes.flip(doc.range_of(left), doc.range_of(right))?;
        if !replacement.is_empty() {
            changes.replace(token_range(doc, op), replacement)?;
        }
        Ok(rewrite)
    })
    .with_priority(index as i32)
    .at_depth(index);
    vec![fix]
}

/// `!a && !b` → `!(a || b)`.
///
/// Looks for the innermost binary expression on the path; the cursor must be on its `&&` and both
/// operands must be `!` expressions.
pub fn rewrite_logical_and(state: &MatchState) -> Vec<QuickFix> {
    let path = state.path();
    let Some((index, binary)) = path
        .iter()
        .enumerate()
        .rev()
        .find(|(_, n)| matches!(state.kind(**n), NodeKind::Binary { .. }))
    else {
        return Vec::new();
    };
    let binary = *binary;
    let NodeKind::Binary { left, op, right } = *state.kind(binary) else {
        return Vec::new();
    };
    if !state.is_cursor_on(op) || state.token_kind(op) != Some(TokenKind::AmpAmp) {
        return Vec::new();
    }
    let negation = |node| match *state.kind(node) {
        NodeKind::Unary { op, .. } if state.token_kind(op) == Some(TokenKind::Exclaim) => Some(op),
        _ => None,
    };
    let (Some(left_not), Some(right_not)) = (negation(left), negation(right)) else {
        return Vec::new();
    };

    let fix = QuickFix::new(
        REWRITE_LOGICAL_AND,
        "Rewrite Condition Using ||",
        state,
        move |ctx| {
            let doc = &ctx.document;
            let path = ctx.path();
            let mut rewrite = Rewrite::new();
            let changes = rewrite.changes(path);
            changes.replace(token_range(doc, op), "||")?;
            changes.remove(token_range(doc, left_not))?;
            changes.remove(token_range(doc, right_not))?;
            changes.insert(doc.start_of(binary), "!(")?;
            changes.insert(doc.end_of(binary), ")")?;
            rewrite.reindent(path, doc.range_of(binary));
            Ok(rewrite)
        },
    )
    .with_priority(index as i32)
    .at_depth(index);
    vec![fix]
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickfix_core::ChangeSet;

    #[test]
    fn test_inverse_table_round_trips() {
        for (kind, spelling) in [
            (TokenKind::Less, "<"),
            (TokenKind::LessEqual, "<="),
            (TokenKind::Greater, ">"),
            (TokenKind::GreaterEqual, ">="),
            (TokenKind::EqualEqual, "=="),
            (TokenKind::ExclaimEqual, "!="),
        ] {
            let once = inverse(kind).unwrap();
            let back = inverse(TokenKind::punctuator(once).unwrap()).unwrap();
            assert_eq!(back, spelling);
        }
        assert_eq!(inverse(TokenKind::AmpAmp), None);
    }

    #[test]
    fn test_mirrored_operators() {
        assert_eq!(mirrored(TokenKind::Less), Some(">"));
        assert_eq!(mirrored(TokenKind::PipePipe), Some(""));
        assert_eq!(mirrored(TokenKind::Plus), None);
    }

    #[test]
    fn test_flip_twice_restores_text() {
        let original = "x = alpha < b;";
        let mut first = ChangeSet::new();
        first.flip(4..9, 12..13).unwrap();
        let once = first.apply_to(original).unwrap();
        assert_eq!(once, "x = b < alpha;");
        let mut second = ChangeSet::new();
        second.flip(4..5, 8..13).unwrap();
        assert_eq!(second.apply_to(&once).unwrap(), original);
    }
}
