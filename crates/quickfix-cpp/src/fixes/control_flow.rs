//! Rewrites of `if` and `switch` statements.

use crate::engine::QuickFix;
use crate::rewrite::Rewrite;
use crate::state::MatchState;
use quickfix_syntax::{NodeId, NodeKind, Symbol, TokenKind};

/// Fix id of [`add_braces_to_if`].
pub const ADD_BRACES_TO_IF: &str = "add-braces-to-if";
/// Fix id of [`split_if_statement`].
pub const SPLIT_IF_STATEMENT: &str = "split-if-statement";
/// Fix id of [`complete_switch_case`].
pub const COMPLETE_SWITCH_CASE: &str = "complete-switch-case";

/// `if (a) b;` → `if (a) {\nb;\n}`
///
/// Offered with the cursor on the `if` keyword, or anywhere in a body that is not a compound
/// statement.
pub fn add_braces_to_if(state: &MatchState) -> Vec<QuickFix> {
    let path = state.path();
    let Some(&innermost) = path.last() else {
        return Vec::new();
    };
    let is_compound = |node| matches!(state.kind(node), NodeKind::Compound { .. });

    if let NodeKind::If {
        if_token,
        then_stmt,
        ..
    } = *state.kind(innermost)
        && state.is_cursor_on(if_token)
        && !is_compound(then_stmt)
    {
        return vec![add_braces_fix(state, then_stmt, path.len() - 1)];
    }

    for (index, &node) in path.iter().enumerate().rev() {
        if let NodeKind::If { then_stmt, .. } = *state.kind(node)
            && state.is_cursor_on_node(then_stmt)
            && !is_compound(then_stmt)
        {
            return vec![add_braces_fix(state, then_stmt, index)];
        }
    }
    Vec::new()
}

fn add_braces_fix(state: &MatchState, statement: NodeId, index: usize) -> QuickFix {
    QuickFix::new(ADD_BRACES_TO_IF, "Add Curly Braces", state, move |ctx| {
        let doc = &ctx.document;
        let path = ctx.path();
        let mut rewrite = Rewrite::new();
        let first = doc.ast().node(statement).first_token;
        let start = doc.end_of_token(first.saturating_sub(1));
        let end = doc.end_of(statement);
        let changes = rewrite.changes(path);
        changes.insert(start, " {")?;
        changes.insert(end, "\n}")?;
        rewrite.reindent(path, start..end);
        Ok(rewrite)
    })
    .with_priority(index as i32)
    .at_depth(index)
}

/// `if (a && b) s` → `if (a) {\nif (b) s\n}`, `if (a || b) s` → `if (a) s\nelse if (b) s`.
///
/// The cursor must be on an operator of a chain made only of `&&` or only of `||`. An `&&` chain
/// is not split when the `if` has an `else` branch.
pub fn split_if_statement(state: &MatchState) -> Vec<QuickFix> {
    let path = state.path();
    let Some((if_index, &if_node)) = path
        .iter()
        .enumerate()
        .rev()
        .find(|(_, n)| matches!(state.kind(**n), NodeKind::If { .. }))
    else {
        return Vec::new();
    };
    let NodeKind::If { else_stmt, .. } = *state.kind(if_node) else {
        return Vec::new();
    };

    let mut split_kind = None;
    for (index, &node) in path.iter().enumerate().skip(if_index + 1) {
        let NodeKind::Binary { op, .. } = *state.kind(node) else {
            return Vec::new();
        };
        let Some(kind) = state.token_kind(op) else {
            return Vec::new();
        };
        match split_kind {
            None => {
                if !matches!(kind, TokenKind::AmpAmp | TokenKind::PipePipe) {
                    return Vec::new();
                }
                if kind == TokenKind::AmpAmp && else_stmt.is_some() {
                    return Vec::new();
                }
                split_kind = Some(kind);
            }
            Some(expected) if expected != kind => return Vec::new(),
            Some(_) => {}
        }
        if state.is_cursor_on(op) {
            return vec![split_if_fix(state, if_node, node, kind, index)];
        }
    }
    Vec::new()
}

fn split_if_fix(
    state: &MatchState,
    if_node: NodeId,
    condition: NodeId,
    kind: TokenKind,
    index: usize,
) -> QuickFix {
    QuickFix::new(SPLIT_IF_STATEMENT, "Split if Statement", state, move |ctx| {
        let doc = &ctx.document;
        let path = ctx.path();
        let mut rewrite = Rewrite::new();
        let (
            NodeKind::Binary { left, right, .. },
            NodeKind::If {
                rparen, then_stmt, ..
            },
        ) = (doc.ast().kind(condition), doc.ast().kind(if_node))
        else {
            return Ok(rewrite);
        };
        let (left, right, rparen, then_stmt) = (*left, *right, *rparen, *then_stmt);

        let changes = rewrite.changes(path);
        if kind == TokenKind::AmpAmp {
            let start = doc.start_of(if_node);
            changes.insert(start, "if (")?;
            changes.move_range(doc.range_of(left), start)?;
            changes.insert(start, ") {\n")?;
            changes.remove(doc.end_of(left)..doc.start_of(right))?;
            changes.insert(doc.end_of(if_node), "\n}")?;
        } else {
            let compound = matches!(doc.ast().kind(then_stmt), NodeKind::Compound { .. });
            let insert_pos = doc.end_of(then_stmt);
            changes.insert(insert_pos, if compound { " " } else { "\n" })?;
            changes.insert(insert_pos, "else if (")?;
            changes.move_range(doc.start_of(right)..doc.start_of_token(rparen), insert_pos)?;
            changes.insert(insert_pos, ")")?;
            changes.copy(doc.end_of_token(rparen)..doc.end_of(then_stmt), insert_pos)?;
            changes.remove(doc.end_of(left)..doc.start_of(right))?;
        }
        rewrite.reindent(path, doc.range_of(if_node));
        Ok(rewrite)
    })
    .with_priority(index as i32)
    .at_depth(index)
}

/// Adds a `case` for every enumerator of the switch condition's enum type that has none yet.
///
/// The cursor must be on the `switch` keyword and the body must be a compound statement.
pub fn complete_switch_case(state: &MatchState) -> Vec<QuickFix> {
    let doc = state.document();
    for (depth, &node) in state.path().iter().enumerate().rev() {
        let NodeKind::Switch {
            switch_token,
            condition,
            body,
            ..
        } = *state.kind(node)
        else {
            continue;
        };
        if !state.is_cursor_on(switch_token) {
            return Vec::new();
        }
        let NodeKind::Compound { statements, .. } = state.kind(body) else {
            return Vec::new();
        };

        let scope = doc.scope_at(doc.start_of(condition));
        let Some(target) = doc
            .type_of(condition)
            .and_then(|ty| doc.enum_for_type(&ty, scope))
            .and_then(|e| doc.symbols().enumeration(e))
        else {
            return Vec::new();
        };

        let used: Vec<String> = statements
            .iter()
            .filter_map(|stmt| match state.kind(*stmt) {
                NodeKind::Case { expression, .. } => Some(*expression),
                _ => None,
            })
            .flat_map(|expression| {
                let components = doc.name_components(expression).unwrap_or_default();
                doc.lookup_qualified(&components, doc.scope_at(doc.start_of(expression)))
            })
            .filter_map(|symbol| match symbol {
                Symbol::Enumerator { enumeration, index } => doc
                    .symbols()
                    .enumeration(enumeration)
                    .and_then(|e| e.qualified_enumerators().into_iter().nth(index)),
                _ => None,
            })
            .collect();
        let mut values = target.qualified_enumerators();
        values.retain(|v| !used.contains(v));
        if values.is_empty() {
            return Vec::new();
        }

        tracing::trace!(missing = values.len(), "switch is missing cases");
        let fix = QuickFix::new(
            COMPLETE_SWITCH_CASE,
            "Complete Switch Statement",
            state,
            move |ctx| {
                let doc = &ctx.document;
                let path = ctx.path();
                let mut rewrite = Rewrite::new();
                let NodeKind::Compound { lbrace, .. } = *doc.ast().kind(body) else {
                    return Ok(rewrite);
                };
                let text = format!("\ncase {}:\nbreak;", values.join(":\nbreak;\ncase "));
                rewrite.changes(path).insert(doc.end_of_token(lbrace), text)?;
                rewrite.reindent(path, doc.range_of(body));
                Ok(rewrite)
            },
        )
        .with_priority(depth as i32)
        .at_depth(depth);
        return vec![fix];
    }
    Vec::new()
}
