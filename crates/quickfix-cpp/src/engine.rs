//! Match engine: runs every registered predicate against a [`MatchState`] and orders the results.
//!
//! A predicate is a plain function from the match state to zero or more [`QuickFix`] values. Each
//! fix carries its description, its priority and a boxed closure that turns the node handles it
//! captured into a [`Rewrite`]. Nothing is edited until [`QuickFix::apply`] is called.

use crate::error::QuickFixError;
use crate::fixes;
use crate::rewrite::Rewrite;
use crate::state::{MatchState, RewriteContext};
use quickfix_core::{ApplyOutcome, Indenter, Workspace};
use quickfix_lang::SettingsStore;
use quickfix_syntax::{DocumentSnapshot, Snapshot};
use std::collections::BTreeMap;
use std::fmt;
use std::ops::Range;
use std::sync::Arc;

type Action = dyn Fn(&RewriteContext) -> Result<Rewrite, QuickFixError> + Send + Sync;

/// Predicate producing the fixes of one kind that apply at a match state.
pub type Matcher = fn(&MatchState) -> Vec<QuickFix>;

/// A registered fix kind.
#[derive(Debug, Clone, Copy)]
pub struct Registration {
    /// Stable id, used by `disabled_fixes` in the settings.
    pub id: &'static str,
    /// The predicate.
    pub matcher: Matcher,
}

/// Every fix kind, in registration order. Registration order breaks priority ties.
pub const REGISTRY: &[Registration] = &[
    Registration {
        id: fixes::comparison::USE_INVERSE_OPERATOR,
        matcher: fixes::comparison::use_inverse_operator,
    },
    Registration {
        id: fixes::comparison::FLIP_BINARY_OPERANDS,
        matcher: fixes::comparison::flip_binary_operands,
    },
    Registration {
        id: fixes::comparison::REWRITE_LOGICAL_AND,
        matcher: fixes::comparison::rewrite_logical_and,
    },
    Registration {
        id: fixes::declaration::SPLIT_DECLARATION,
        matcher: fixes::declaration::split_declaration,
    },
    Registration {
        id: fixes::control_flow::ADD_BRACES_TO_IF,
        matcher: fixes::control_flow::add_braces_to_if,
    },
    Registration {
        id: fixes::declaration::MOVE_DECLARATION_OUT_OF_IF,
        matcher: fixes::declaration::move_declaration_out_of_if,
    },
    Registration {
        id: fixes::declaration::MOVE_DECLARATION_OUT_OF_WHILE,
        matcher: fixes::declaration::move_declaration_out_of_while,
    },
    Registration {
        id: fixes::control_flow::SPLIT_IF_STATEMENT,
        matcher: fixes::control_flow::split_if_statement,
    },
    Registration {
        id: fixes::literals::WRAP_STRING_LITERAL,
        matcher: fixes::literals::wrap_string_literal,
    },
    Registration {
        id: fixes::literals::TRANSLATE_STRING_LITERAL,
        matcher: fixes::literals::translate_string_literal,
    },
    Registration {
        id: fixes::literals::CONVERT_CSTRING_TO_NSSTRING,
        matcher: fixes::literals::convert_cstring_to_nsstring,
    },
    Registration {
        id: fixes::literals::CONVERT_NUMERIC_LITERAL,
        matcher: fixes::literals::convert_numeric_literal,
    },
    Registration {
        id: fixes::control_flow::COMPLETE_SWITCH_CASE,
        matcher: fixes::control_flow::complete_switch_case,
    },
    Registration {
        id: fixes::names::FIX_FORWARD_DECLARATION,
        matcher: fixes::names::fix_forward_declaration,
    },
    Registration {
        id: fixes::declaration::ADD_LOCAL_DECLARATION,
        matcher: fixes::declaration::add_local_declaration,
    },
    Registration {
        id: fixes::names::CONVERT_TO_CAMEL_CASE,
        matcher: fixes::names::convert_to_camel_case,
    },
    Registration {
        id: fixes::members::INSERT_DECLARATION_FROM_DEFINITION,
        matcher: fixes::members::insert_declaration_from_definition,
    },
    Registration {
        id: fixes::members::INSERT_DEFINITION_FROM_DECLARATION,
        matcher: fixes::members::insert_definition_from_declaration,
    },
];

/// One applicable rewrite, ready to be shown and applied.
pub struct QuickFix {
    id: &'static str,
    description: String,
    priority: i32,
    depth: usize,
    order: usize,
    context: RewriteContext,
    action: Box<Action>,
}

impl QuickFix {
    /// Create a fix for the current match. Priority and depth default to the depth of the
    /// innermost path node.
    pub fn new(
        id: &'static str,
        description: impl Into<String>,
        state: &MatchState,
        action: impl Fn(&RewriteContext) -> Result<Rewrite, QuickFixError> + Send + Sync + 'static,
    ) -> Self {
        let depth = state.path().len().saturating_sub(1);
        Self {
            id,
            description: description.into(),
            priority: depth as i32,
            depth,
            order: 0,
            context: state.context().clone(),
            action: Box::new(action),
        }
    }

    /// Set the priority.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Set the path depth of the node the fix rewrites.
    pub fn at_depth(mut self, depth: usize) -> Self {
        self.depth = depth;
        self
    }

    /// Fix kind id.
    pub fn id(&self) -> &'static str {
        self.id
    }

    /// Text shown to the user.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Higher priorities are listed first.
    pub fn priority(&self) -> i32 {
        self.priority
    }

    /// Path depth of the rewritten node.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Position of the fix kind in [`REGISTRY`].
    pub fn order(&self) -> usize {
        self.order
    }

    /// Compute the rewrite without touching any document.
    pub fn rewrite(&self) -> Result<Rewrite, QuickFixError> {
        (self.action)(&self.context)
    }

    /// Compute the rewrite and commit it to `workspace`.
    ///
    /// Every touched file must still hold the revision and text it was parsed from; otherwise the
    /// apply fails with a stale error and no document is modified.
    #[tracing::instrument(level = "debug", skip_all, fields(fix = self.id))]
    pub fn apply(
        &self,
        workspace: &mut Workspace,
        indenter: &dyn Indenter,
    ) -> Result<BTreeMap<String, ApplyOutcome>, QuickFixError> {
        ensure_fresh(workspace, self.context.path(), &self.context.document)?;

        let mut files = self.rewrite()?.into_files();
        for (path, change) in &mut files {
            let Some(doc) = self.context.snapshot.document(path) else {
                continue;
            };
            ensure_fresh(workspace, path, doc)?;
            if change.base_revision.is_none() {
                change.base_revision = Some(doc.revision());
            }
        }
        tracing::debug!(files = files.len(), "applying quick fix");
        Ok(workspace.apply(&files, indenter, &self.context.settings)?)
    }
}

impl fmt::Debug for QuickFix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuickFix")
            .field("id", &self.id)
            .field("description", &self.description)
            .field("priority", &self.priority)
            .field("depth", &self.depth)
            .field("order", &self.order)
            .finish_non_exhaustive()
    }
}

fn ensure_fresh(
    workspace: &Workspace,
    path: &str,
    parsed: &DocumentSnapshot,
) -> Result<(), QuickFixError> {
    let live = workspace
        .get(path)
        .ok_or_else(|| QuickFixError::DocumentNotFound(path.to_string()))?;
    if live.revision() != parsed.revision() || live.text() != parsed.source() {
        tracing::debug!(
            path,
            snapshot = parsed.revision(),
            document = live.revision(),
            "stale snapshot"
        );
        return Err(QuickFixError::Stale {
            path: path.to_string(),
            snapshot: parsed.revision(),
            document: live.revision(),
        });
    }
    Ok(())
}

/// Entry point for hosts: lists fixes at a cursor.
#[derive(Debug)]
pub struct QuickFixEngine {
    settings: Arc<SettingsStore>,
}

impl QuickFixEngine {
    /// An engine running every registered fix kind.
    pub fn new(settings: Arc<SettingsStore>) -> Self {
        Self { settings }
    }

    /// The settings store read by each query.
    pub fn settings(&self) -> &Arc<SettingsStore> {
        &self.settings
    }

    /// Fixes applicable at `cursor` in `path`, best first.
    ///
    /// Nothing is listed when the document is not open, has no snapshot, or the snapshot is older
    /// than the live text.
    #[tracing::instrument(level = "debug", skip(self, workspace, snapshot, selection))]
    pub fn list_applicable_operations(
        &self,
        workspace: &Workspace,
        snapshot: &Arc<Snapshot>,
        path: &str,
        cursor: usize,
        selection: Option<Range<usize>>,
    ) -> Vec<QuickFix> {
        let Some(document) = snapshot.document(path) else {
            tracing::debug!("no snapshot for document");
            return Vec::new();
        };
        let settings = self.settings.snapshot();
        let state = MatchState::new(
            snapshot.clone(),
            document.clone(),
            settings,
            cursor,
            selection,
        );
        if ensure_fresh(workspace, state.context().path(), &state.context().document).is_err() {
            return Vec::new();
        }
        self.matches(&state)
    }

    /// Run every enabled predicate against `state` and sort the results.
    pub fn matches(&self, state: &MatchState) -> Vec<QuickFix> {
        if state.path().is_empty() {
            return Vec::new();
        }

        let mut found = Vec::new();
        for (order, registration) in REGISTRY.iter().enumerate() {
            if !state.settings().is_enabled(registration.id) {
                continue;
            }
            for mut fix in (registration.matcher)(state) {
                fix.order = order;
                tracing::trace!(fix = fix.id, priority = fix.priority, "matched");
                found.push(fix);
            }
        }
        sort_fixes(&mut found);
        found
    }
}

/// Priority first, then deeper nodes, then registration order. The sort is stable, so fixes a
/// single predicate emits keep their relative order.
pub fn sort_fixes(fixes: &mut [QuickFix]) {
    fixes.sort_by(|a, b| {
        b.priority
            .cmp(&a.priority)
            .then(b.depth.cmp(&a.depth))
            .then(a.order.cmp(&b.order))
    });
}
