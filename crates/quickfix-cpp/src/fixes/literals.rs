//! Rewrites of string, character and numeric literals.

use super::token_range;
use crate::engine::QuickFix;
use crate::numeric::IntegerLiteral;
use crate::rewrite::Rewrite;
use crate::state::MatchState;
use quickfix_syntax::{NodeKind, TokenKind};

/// Fix id of [`wrap_string_literal`].
pub const WRAP_STRING_LITERAL: &str = "wrap-string-literal";
/// Fix id of [`translate_string_literal`].
pub const TRANSLATE_STRING_LITERAL: &str = "translate-string-literal";
/// Fix id of [`convert_cstring_to_nsstring`].
pub const CONVERT_CSTRING_TO_NSSTRING: &str = "convert-cstring-to-nsstring";
/// Fix id of [`convert_numeric_literal`].
pub const CONVERT_NUMERIC_LITERAL: &str = "convert-numeric-literal";

const LATIN1_LITERAL: &str = "QLatin1Literal";

/// Returns `true` if the innermost node is the argument of a call that already wraps or
/// translates literals.
fn inside_wrapping_call(state: &MatchState) -> bool {
    state
        .enclosing_call_name()
        .is_some_and(|(_, name)| state.settings().qt.is_wrapped_call(name))
}

/// `"abc"` → `QLatin1String("abc")`, `'a'` → `QLatin1Char('a')`.
///
/// An Objective-C `@"abc"` loses its `@`.
pub fn wrap_string_literal(state: &MatchState) -> Vec<QuickFix> {
    let Some(&literal) = state.path().last() else {
        return Vec::new();
    };
    let (is_char, at) = match *state.kind(literal) {
        NodeKind::StringLiteral { at, .. } => (false, at),
        NodeKind::NumericLiteral { token }
            if state.token_kind(token) == Some(TokenKind::CharLiteral) =>
        {
            (true, None)
        }
        _ => return Vec::new(),
    };
    if inside_wrapping_call(state) {
        return Vec::new();
    }

    let qt = &state.settings().qt;
    let wrapper = if is_char {
        qt.latin1_char.clone()
    } else {
        qt.latin1_string.clone()
    };
    let description = format!("Enclose in {wrapper}(...)");
    vec![QuickFix::new(WRAP_STRING_LITERAL, description, state, move |ctx| {
        let doc = &ctx.document;
        let mut rewrite = Rewrite::new();
        let changes = rewrite.changes(ctx.path());
        let replacement = format!("{wrapper}(");
        match at {
            Some(at) => changes.replace(token_range(doc, at), replacement)?,
            None => changes.insert(doc.start_of(literal), replacement)?,
        }
        changes.insert(doc.end_of(literal), ")")?;
        Ok(rewrite)
    })]
}

/// Marks a string literal for translation.
///
/// Inside a member function of a class with `tr` the literal becomes `tr("…")`. Inside any other
/// function it becomes `QCoreApplication::translate("Context", "…")`, where the context is the
/// function's enclosing namespaces and classes (or the global context). Outside functions it
/// becomes `QT_TRANSLATE_NOOP("GLOBAL", "…")`.
pub fn translate_string_literal(state: &MatchState) -> Vec<QuickFix> {
    let Some(&literal) = state.path().last() else {
        return Vec::new();
    };
    if !matches!(state.kind(literal), NodeKind::StringLiteral { .. }) || inside_wrapping_call(state)
    {
        return Vec::new();
    }

    let doc = state.document();
    let qt = &state.settings().qt;
    let scope = doc.scope_at(doc.start_of(literal));
    let replacement = match doc
        .enclosing_function(scope)
        .and_then(|f| doc.symbols().function(f).map(|s| (f, s)))
    {
        Some((function, symbol)) => {
            let mut context = doc.qualified_scope_names(symbol.scope);
            context.extend(symbol.qualifiers.iter().cloned());

            let in_document = doc
                .owner_class(function)
                .is_some_and(|class| doc.class_declares_function(class, &qt.translate));
            let has_tr = in_document
                || state
                    .snapshot()
                    .find_class_definition(&context)
                    .is_some_and(|(class_doc, class)| {
                        class_doc.class_declares_function(class, &qt.translate)
                    });
            if has_tr {
                format!("{}(", qt.translate)
            } else {
                let context = if context.is_empty() {
                    qt.global_context.clone()
                } else {
                    context.join("::")
                };
                format!("{}(\"{context}\", ", qt.translate_with_context)
            }
        }
        None => format!("{}(\"{}\", ", qt.translate_noop, qt.global_context),
    };

    vec![QuickFix::new(
        TRANSLATE_STRING_LITERAL,
        "Mark as Translatable",
        state,
        move |ctx| {
            let doc = &ctx.document;
            let mut rewrite = Rewrite::new();
            let changes = rewrite.changes(ctx.path());
            changes.insert(doc.start_of(literal), replacement.as_str())?;
            changes.insert(doc.end_of(literal), ")")?;
            Ok(rewrite)
        },
    )]
}

/// `"abc"` → `@"abc"` in Objective-C++ documents; `QLatin1String("abc")` → `@"abc"`.
pub fn convert_cstring_to_nsstring(state: &MatchState) -> Vec<QuickFix> {
    if !state.document().is_objective_cpp() {
        return Vec::new();
    }
    let Some(&literal) = state.path().last() else {
        return Vec::new();
    };
    // Already an Objective-C literal when `at` is set.
    if !matches!(state.kind(literal), NodeKind::StringLiteral { at: None, .. }) {
        return Vec::new();
    }
    let latin1_call = state
        .enclosing_call_name()
        .filter(|(_, name)| *name == state.settings().qt.latin1_string || *name == LATIN1_LITERAL)
        .map(|(call, _)| call);

    vec![QuickFix::new(
        CONVERT_CSTRING_TO_NSSTRING,
        "Convert to Objective-C String Literal",
        state,
        move |ctx| {
            let doc = &ctx.document;
            let mut rewrite = Rewrite::new();
            let changes = rewrite.changes(ctx.path());
            match latin1_call {
                Some(call) => {
                    changes.replace(doc.start_of(call)..doc.start_of(literal), "@")?;
                    changes.remove(doc.end_of(literal)..doc.end_of(call))?;
                }
                None => changes.insert(doc.start_of(literal), "@")?,
            }
            Ok(rewrite)
        },
    )]
}

/// Offers the other bases for an integer literal, hex first, then octal, then decimal. Type
/// suffixes are kept.
pub fn convert_numeric_literal(state: &MatchState) -> Vec<QuickFix> {
    let Some(&literal) = state.path().last() else {
        return Vec::new();
    };
    let NodeKind::NumericLiteral { token } = *state.kind(literal) else {
        return Vec::new();
    };
    if state.token_kind(token) != Some(TokenKind::NumericLiteral) {
        return Vec::new();
    }
    let Some(parsed) = IntegerLiteral::parse(state.token_text(token)) else {
        return Vec::new();
    };

    let depth = state.path().len() - 1;
    let digits_len = parsed.digits_len;
    parsed
        .conversions()
        .into_iter()
        .map(|conversion| {
            QuickFix::new(
                CONVERT_NUMERIC_LITERAL,
                conversion.radix.description(),
                state,
                move |ctx| {
                    let start = ctx.document.start_of_token(token);
                    let mut rewrite = Rewrite::new();
                    rewrite
                        .changes(ctx.path())
                        .replace(start..start + digits_len, conversion.replacement.as_str())?;
                    Ok(rewrite)
                },
            )
            .with_priority(depth as i32)
            .at_depth(depth)
        })
        .collect()
}
