//! Rewrites of declarations: splitting, hoisting out of conditions and inferring local types.

use crate::engine::QuickFix;
use crate::error::QuickFixError;
use crate::rewrite::Rewrite;
use crate::state::MatchState;
use quickfix_syntax::{NodeId, NodeKind, Symbol, TokenKind};

/// Fix id of [`split_declaration`].
pub const SPLIT_DECLARATION: &str = "split-declaration";
/// Fix id of [`move_declaration_out_of_if`].
pub const MOVE_DECLARATION_OUT_OF_IF: &str = "move-declaration-out-of-if";
/// Fix id of [`move_declaration_out_of_while`].
pub const MOVE_DECLARATION_OUT_OF_WHILE: &str = "move-declaration-out-of-while";
/// Fix id of [`add_local_declaration`].
pub const ADD_LOCAL_DECLARATION: &str = "add-local-declaration";

fn is_splittable(state: &MatchState, declaration: NodeId) -> bool {
    let NodeKind::SimpleDeclaration {
        specifiers,
        declarators,
        semicolon,
    } = state.kind(declaration)
    else {
        return false;
    };
    semicolon.is_some()
        && !specifiers.is_empty()
        && !specifiers.iter().any(|s| {
            matches!(
                state.kind(*s),
                NodeKind::ClassSpecifier { .. } | NodeKind::EnumSpecifier { .. }
            )
        })
        && declarators.len() > 1
}

/// `int a, b;` → `int a;\nint b;`
///
/// Offered with the cursor on the specifiers or on a declarator name. Declarations that define a
/// class or enum are left alone.
pub fn split_declaration(state: &MatchState) -> Vec<QuickFix> {
    let path = state.path();
    let mut core = None;
    for (index, &node) in path.iter().enumerate().rev() {
        match state.kind(node) {
            NodeKind::DeclaratorId { .. } => core = Some(node),
            NodeKind::SimpleDeclaration { specifiers, .. } => {
                if !is_splittable(state, node) {
                    return Vec::new();
                }
                let doc = state.document();
                let (Some(first), Some(last)) = (specifiers.first(), specifiers.last()) else {
                    return Vec::new();
                };
                let at = state.selection_start();
                let on_specifiers = doc.start_of(*first) <= at && at <= doc.end_of(*last);
                let on_core = core.is_some_and(|c| state.is_cursor_on_node(c));
                if !on_specifiers && !on_core {
                    return Vec::new();
                }
                return vec![split_declaration_fix(state, node, index)];
            }
            _ => {}
        }
    }
    Vec::new()
}

fn split_declaration_fix(state: &MatchState, declaration: NodeId, index: usize) -> QuickFix {
    QuickFix::new(SPLIT_DECLARATION, "Split Declaration", state, move |ctx| {
        let doc = &ctx.document;
        let path = ctx.path();
        let mut rewrite = Rewrite::new();
        let NodeKind::SimpleDeclaration {
            specifiers,
            declarators,
            semicolon: Some(semicolon),
        } = doc.ast().kind(declaration)
        else {
            return Ok(rewrite);
        };
        let (Some(first), Some(last)) = (specifiers.first(), specifiers.last()) else {
            return Ok(rewrite);
        };
        let specifier_range = doc.start_of(*first)..doc.end_of(*last);
        let insert_pos = doc.end_of_token(*semicolon);

        let changes = rewrite.changes(path);
        let mut previous = declarators[0];
        for &declarator in &declarators[1..] {
            changes.insert(insert_pos, "\n")?;
            changes.copy(specifier_range.clone(), insert_pos)?;
            changes.insert(insert_pos, " ")?;
            changes.move_range(doc.range_of(declarator), insert_pos)?;
            changes.insert(insert_pos, ";")?;
            changes.remove(doc.end_of(previous)..doc.start_of(declarator))?;
            previous = declarator;
        }
        rewrite.reindent(path, doc.range_of(declaration));
        Ok(rewrite)
    })
    .with_priority(index as i32)
    .at_depth(index)
}

/// Declarator core and whether the declarator has an initializer, for a condition that declares
/// a variable.
fn condition_declarator(state: &MatchState, condition: NodeId) -> Option<(NodeId, bool)> {
    let NodeKind::Condition { declarator, .. } = state.kind(condition) else {
        return None;
    };
    let NodeKind::Declarator {
        core,
        equal,
        initializer,
        ..
    } = state.kind(*declarator)
    else {
        return None;
    };
    Some(((*core)?, equal.is_some() && initializer.is_some()))
}

/// `if (Foo *f = get()) …` → `Foo *f = get();\nif (f) …`
pub fn move_declaration_out_of_if(state: &MatchState) -> Vec<QuickFix> {
    for (index, &node) in state.path().iter().enumerate().rev() {
        let NodeKind::If { condition, .. } = *state.kind(node) else {
            continue;
        };
        if !matches!(state.kind(condition), NodeKind::Condition { .. }) {
            continue;
        }
        let Some((core, _)) = condition_declarator(state, condition) else {
            return Vec::new();
        };
        if !state.is_cursor_on_node(core) {
            continue;
        }

        let fix = QuickFix::new(
            MOVE_DECLARATION_OUT_OF_IF,
            "Move Declaration out of Condition",
            state,
            move |ctx| {
                let doc = &ctx.document;
                let path = ctx.path();
                let mut rewrite = Rewrite::new();
                let changes = rewrite.changes(path);
                changes.copy(doc.range_of(core), doc.start_of(condition))?;
                let insert_pos = doc.start_of(node);
                changes.move_range(doc.range_of(condition), insert_pos)?;
                changes.insert(insert_pos, ";\n")?;
                rewrite.reindent(path, doc.range_of(node));
                Ok(rewrite)
            },
        )
        .with_priority(index as i32)
        .at_depth(index);
        return vec![fix];
    }
    Vec::new()
}

/// `while (Foo *f = next()) …` → `Foo *f;\nwhile ((f = next()) != 0) …`
///
/// The declaration must have an initializer.
pub fn move_declaration_out_of_while(state: &MatchState) -> Vec<QuickFix> {
    for (index, &node) in state.path().iter().enumerate().rev() {
        let NodeKind::While { condition, .. } = *state.kind(node) else {
            continue;
        };
        if !matches!(state.kind(condition), NodeKind::Condition { .. }) {
            continue;
        }
        let Some((core, initialized)) = condition_declarator(state, condition) else {
            return Vec::new();
        };
        if !initialized {
            return Vec::new();
        }
        if !state.is_cursor_on_node(core) {
            continue;
        }

        let fix = QuickFix::new(
            MOVE_DECLARATION_OUT_OF_WHILE,
            "Move Declaration out of Condition",
            state,
            move |ctx| {
                let doc = &ctx.document;
                let path = ctx.path();
                let mut rewrite = Rewrite::new();
                let changes = rewrite.changes(path);
                let condition_start = doc.start_of(condition);
                changes.insert(condition_start, "(")?;
                changes.insert(doc.end_of(condition), ") != 0")?;
                let insert_pos = doc.start_of(node);
                changes.move_range(condition_start..doc.start_of(core), insert_pos)?;
                changes.copy(doc.range_of(core), insert_pos)?;
                changes.insert(insert_pos, ";\n")?;
                rewrite.reindent(path, doc.range_of(node));
                Ok(rewrite)
            },
        )
        .with_priority(index as i32)
        .at_depth(index);
        return vec![fix];
    }
    Vec::new()
}

/// `x = make();` with `x` undeclared → `Foo *x = make();`
///
/// The type of the right-hand side is looked up again when the fix is applied.
pub fn add_local_declaration(state: &MatchState) -> Vec<QuickFix> {
    let doc = state.document();
    for (index, &node) in state.path().iter().enumerate().rev() {
        let NodeKind::Binary { left, op, right } = *state.kind(node) else {
            continue;
        };
        if state.token_kind(op) != Some(TokenKind::Equal) || !state.is_cursor_on_node(left) {
            continue;
        }
        let NodeKind::SimpleName { identifier } = *state.kind(left) else {
            continue;
        };
        let declared = doc
            .lookup_at(state.token_text(identifier), doc.start_of(left))
            .into_iter()
            .any(|s| matches!(s, Symbol::Variable(_) | Symbol::Enumerator { .. }));
        if declared {
            continue;
        }

        let fix = QuickFix::new(
            ADD_LOCAL_DECLARATION,
            "Add Local Declaration",
            state,
            move |ctx| {
                let doc = &ctx.document;
                let mut ty = doc
                    .type_of(right)
                    .map(|ty| ty.to_string())
                    .filter(|ty| !ty.is_empty())
                    .ok_or_else(|| QuickFixError::UnresolvedType(doc.node_text(right).to_string()))?;
                if ty
                    .chars()
                    .last()
                    .is_some_and(|c| c.is_alphanumeric() || c == ' ' || c == '>')
                {
                    ty.push(' ');
                }
                let mut rewrite = Rewrite::new();
                rewrite.changes(ctx.path()).insert(doc.start_of(node), ty)?;
                Ok(rewrite)
            },
        )
        .with_priority(index as i32)
        .at_depth(index);
        return vec![fix];
    }
    Vec::new()
}
