//! Member functions: declaring an out-of-line definition in its class, and defining a declared
//! member.

use crate::engine::QuickFix;
use crate::error::QuickFixError;
use crate::insertion::{AccessSpec, InsertionLocation, InsertionPointLocator};
use crate::rewrite::Rewrite;
use crate::state::{MatchState, RewriteContext};
use quickfix_syntax::{FunctionSymbol, Type};

/// Fix id of [`insert_declaration_from_definition`].
pub const INSERT_DECLARATION_FROM_DEFINITION: &str = "insert-declaration-from-definition";
/// Fix id of [`insert_definition_from_declaration`].
pub const INSERT_DEFINITION_FROM_DECLARATION: &str = "insert-definition-from-declaration";

const DECLARATION_SECTIONS: [AccessSpec; 6] = [
    AccessSpec::Public,
    AccessSpec::PublicSlot,
    AccessSpec::Protected,
    AccessSpec::ProtectedSlot,
    AccessSpec::Private,
    AccessSpec::PrivateSlot,
];

/// `Foo *` followed directly by the name, `void` followed by a space, nothing for constructors.
fn return_type_prefix(ty: &Type) -> String {
    let spelled = ty.to_string();
    if spelled.is_empty() || spelled.ends_with('*') || spelled.ends_with('&') {
        spelled
    } else {
        format!("{spelled} ")
    }
}

fn signature(function: &FunctionSymbol, name: &str) -> String {
    let mut out = format!(
        "{}{name}({})",
        return_type_prefix(&function.return_type),
        function.parameter_list()
    );
    if function.is_const {
        out.push_str(" const");
    }
    out
}

fn file_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// Inserts `code` at `location`, which may be in any document of the snapshot.
fn insert_at(
    ctx: &RewriteContext,
    location: &InsertionLocation,
    code: &str,
) -> Result<Rewrite, QuickFixError> {
    let target = ctx
        .snapshot
        .document(location.file())
        .ok_or_else(|| QuickFixError::DocumentNotFound(location.file().to_string()))?;
    let offset = location.offset_in(target);
    let mut rewrite = Rewrite::new();
    rewrite
        .changes(location.file())
        .insert(offset, location.wrap(code))?;
    rewrite.reindent(location.file(), offset..offset);
    Ok(rewrite)
}

/// `void C::f(int a) {}` with no `f(int)` in `C` → adds `void f(int a);` to the class.
///
/// One fix per access section, public first. The class may be defined in another document of
/// the snapshot.
pub fn insert_declaration_from_definition(state: &MatchState) -> Vec<QuickFix> {
    let doc = state.document();
    let symbols = doc.symbols();
    let Some(function) = symbols
        .function_named_at(state.selection_start())
        .and_then(|f| symbols.function(f))
    else {
        return Vec::new();
    };
    if !function.is_definition || function.qualifiers.is_empty() {
        return Vec::new();
    }
    let Some((class_doc, class)) = state.snapshot().find_class_definition(&function.qualifiers)
    else {
        return Vec::new();
    };
    let Some(class_symbol) = class_doc.symbols().class(class) else {
        return Vec::new();
    };
    let declared = class_doc
        .symbols()
        .functions_in(class_symbol.body_scope)
        .any(|(_, member)| member.same_signature(function));
    if declared {
        return Vec::new();
    }

    let declaration = format!("{};", signature(function, &function.name));
    let class_file = class_doc.path().to_string();
    let depth = state.path().len().saturating_sub(1);
    DECLARATION_SECTIONS
        .iter()
        .map(|&spec| {
            let declaration = declaration.clone();
            let class_file = class_file.clone();
            let description = format!("Add {} Declaration", spec.label().trim_end_matches(':'));
            QuickFix::new(
                INSERT_DECLARATION_FROM_DEFINITION,
                description,
                state,
                move |ctx| {
                    let location = InsertionPointLocator::new(&ctx.snapshot)
                        .method_declaration_in_class(&class_file, class, spec)
                        .ok_or_else(|| QuickFixError::NoInsertionPoint(class_file.clone()))?;
                    insert_at(ctx, &location, &declaration)
                },
            )
            .with_priority(depth as i32)
            .at_depth(depth)
        })
        .collect()
}

/// `void f(int a);` inside `class C` with no definition anywhere → adds
/// `void C::f(int a)\n{\n}` at the best definition location.
pub fn insert_definition_from_declaration(state: &MatchState) -> Vec<QuickFix> {
    let doc = state.document();
    let symbols = doc.symbols();
    let Some(declaration) = symbols.function_named_at(state.selection_start()) else {
        return Vec::new();
    };
    let Some(function) = symbols.function(declaration) else {
        return Vec::new();
    };
    if function.is_definition || !function.qualifiers.is_empty() {
        return Vec::new();
    }
    let Some(class) = doc.owner_class(declaration).and_then(|c| symbols.class(c)) else {
        return Vec::new();
    };
    if !state
        .snapshot()
        .find_member_definitions(&class.qualified_name, function)
        .is_empty()
    {
        return Vec::new();
    }

    let locator = InsertionPointLocator::new(state.snapshot());
    let Some(location) = locator
        .method_definition(doc.path(), declaration)
        .into_iter()
        .next()
    else {
        return Vec::new();
    };
    let qualified = format!("{}::{}", class.qualified_name.join("::"), function.name);
    let definition = format!("{}\n{{\n}}", signature(function, &qualified));
    let description = format!("Add Definition in {}", file_name(location.file()));
    tracing::trace!(file = location.file(), "definition location");

    let depth = state.path().len().saturating_sub(1);
    vec![
        QuickFix::new(
            INSERT_DEFINITION_FROM_DECLARATION,
            description,
            state,
            move |ctx| insert_at(ctx, &location, &definition),
        )
        .with_priority(depth as i32)
        .at_depth(depth),
    ]
}
