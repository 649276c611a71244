//! Fixes driven by names: missing includes for forward-declared classes, and camel-case renames.

use super::token_range;
use crate::engine::QuickFix;
use crate::naming::{can_convert_to_camel_case, to_camel_case};
use crate::rewrite::Rewrite;
use crate::state::MatchState;
use quickfix_syntax::{
    DocumentSnapshot, NodeKind, ScopeKind, Snapshot, Symbol, TokenIndex, TokenKind,
};

/// Fix id of [`fix_forward_declaration`].
pub const FIX_FORWARD_DECLARATION: &str = "fix-forward-declaration";
/// Fix id of [`convert_to_camel_case`].
pub const CONVERT_TO_CAMEL_CASE: &str = "convert-to-camel-case";

/// Offers `#include <header>` for a type name that is only forward-declared here but defined in
/// another document of the snapshot.
///
/// The include goes after the last `#include` above the cursor line, or before the first token.
pub fn fix_forward_declaration(state: &MatchState) -> Vec<QuickFix> {
    let doc = state.document();
    for (index, &node) in state.path().iter().enumerate().rev() {
        let name = match *state.kind(node) {
            NodeKind::NamedTypeSpecifier { name } | NodeKind::ElaboratedTypeSpecifier { name, .. } => {
                name
            }
            _ => continue,
        };
        if !state.is_cursor_on_node(name) {
            continue;
        }
        let Some(components) = doc.name_components(name) else {
            continue;
        };

        let mut forward = None;
        let mut defined_here = false;
        for symbol in doc.lookup_qualified(&components, doc.scope_at(doc.start_of(name))) {
            match symbol {
                Symbol::ForwardClass(id) => forward = doc.symbols().forward_class(id),
                Symbol::Class(_) => defined_here = true,
                _ => {}
            }
        }
        let Some(forward) = forward.filter(|_| !defined_here) else {
            continue;
        };

        let mut qualified = doc.qualified_scope_names(forward.scope);
        qualified.push(forward.name.clone());
        let Some((class_doc, class)) = state.snapshot().find_class_definition(&qualified) else {
            continue;
        };
        let Some(class_name) = class_doc.symbols().class(class).map(|c| c.name.clone()) else {
            continue;
        };
        let header = best_header(state.snapshot(), class_doc.path(), &class_name);
        let include = format!("#include <{}>\n", file_name(&header));
        tracing::trace!(header, "forward declaration has a definition");

        let cursor_line = doc.line_of(state.cursor()) + 1;
        let fix = QuickFix::new(
            FIX_FORWARD_DECLARATION,
            "#include Header File",
            state,
            move |ctx| {
                let doc = &ctx.document;
                let pos = include_position(doc, cursor_line);
                let mut rewrite = Rewrite::new();
                rewrite.changes(ctx.path()).insert(pos, include.as_str())?;
                Ok(rewrite)
            },
        )
        .with_priority(index as i32)
        .at_depth(index);
        return vec![fix];
    }
    Vec::new()
}

fn file_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// Start of the line after the last include above `cursor_line` (1-based), else the first token.
fn include_position(doc: &DocumentSnapshot, cursor_line: usize) -> usize {
    let best_line = doc
        .symbols()
        .includes
        .iter()
        .filter(|include| include.line < cursor_line)
        .map(|include| include.line)
        .last();
    match best_line {
        Some(line) => doc.line_start(line),
        None if doc.tokens().is_empty() => 0,
        None => doc.start_of_token(0),
    }
}

/// Prefers a forwarding header (a file without suffix, or one that only includes the real
/// header) named like the class, then one starting with an upper-case letter, then the
/// shallowest path. Falls back to the defining header itself.
fn best_header(snapshot: &Snapshot, header: &str, class_name: &str) -> String {
    let header_name = file_name(header);
    let forwarding = snapshot.documents().filter(|doc| {
        let symbols = doc.symbols();
        let includes_header = symbols
            .includes
            .iter()
            .any(|include| file_name(&include.path) == header_name);
        let no_suffix = !file_name(doc.path()).contains('.');
        let only_includes = doc.tokens().is_empty() && symbols.includes.len() == 1;
        includes_header && (no_suffix || only_includes)
    });

    let mut best: Option<&str> = None;
    for candidate in forwarding {
        let path = candidate.path();
        let name = file_name(path);
        if name == class_name {
            best = Some(path);
            break;
        }
        if name.chars().next().is_some_and(char::is_uppercase) {
            best = Some(path);
        } else if let Some(current) = best
            && path.matches('/').count() < current.matches('/').count()
        {
            best = Some(path);
        }
    }
    best.unwrap_or(header).to_string()
}

/// Symbol a name token refers to, following `A::b` qualification.
fn resolve_token(doc: &DocumentSnapshot, token: TokenIndex) -> Option<Symbol> {
    let mut components = vec![doc.token_text(token).to_string()];
    let mut first = token;
    while first >= 2
        && doc.token_kind(first - 1) == Some(TokenKind::ColonColon)
        && doc.token_kind(first - 2) == Some(TokenKind::Identifier)
    {
        components.insert(0, doc.token_text(first - 2).to_string());
        first -= 2;
    }
    let scope = doc.scope_at(doc.start_of_token(first));
    doc.lookup_qualified(&components, scope).into_iter().next()
}

fn is_member(doc: &DocumentSnapshot, symbol: Symbol) -> bool {
    let symbols = doc.symbols();
    let scope = match symbol {
        Symbol::Variable(v) => symbols.variable(v).map(|v| v.scope),
        Symbol::Function(f) => symbols.function(f).map(|f| f.scope),
        _ => None,
    };
    scope
        .and_then(|s| symbols.scope(s))
        .is_some_and(|s| matches!(s.kind, ScopeKind::Class(_)))
}

/// Tokens in `doc` that name the same entity as `target`.
fn usages(doc: &DocumentSnapshot, target: TokenIndex) -> Vec<TokenIndex> {
    let name = doc.token_text(target);
    let resolved = resolve_token(doc, target);
    let member = resolved.is_some_and(|s| is_member(doc, s));
    (0..doc.tokens().len())
        .filter(|&i| doc.token_kind(i) == Some(TokenKind::Identifier) && doc.token_text(i) == name)
        .filter(|&i| {
            let after_access = i > 0
                && matches!(
                    doc.token_kind(i - 1),
                    Some(TokenKind::Dot | TokenKind::Arrow)
                );
            if after_access {
                member
            } else {
                resolve_token(doc, i) == resolved
            }
        })
        .collect()
}

/// `foo_bar` → `fooBar`, renaming every usage in the document.
pub fn convert_to_camel_case(state: &MatchState) -> Vec<QuickFix> {
    let Some(&node) = state.path().last() else {
        return Vec::new();
    };
    let token = match *state.kind(node) {
        NodeKind::SimpleName { identifier } => identifier,
        NodeKind::Namespace {
            identifier: Some(identifier),
            ..
        } => identifier,
        _ => return Vec::new(),
    };
    let name = state.token_text(token);
    if !can_convert_to_camel_case(name) {
        return Vec::new();
    }
    let new_name = to_camel_case(name);

    vec![QuickFix::new(
        CONVERT_TO_CAMEL_CASE,
        "Convert to Camel Case",
        state,
        move |ctx| {
            let doc = &ctx.document;
            let mut rewrite = Rewrite::new();
            let changes = rewrite.changes(ctx.path());
            for usage in usages(doc, token) {
                changes.replace(token_range(doc, usage), new_name.as_str())?;
            }
            Ok(rewrite)
        },
    )]
}
