//! Open documents keyed by path, and atomic multi-file application.
//!
//! A rewrite can touch more than one file (adding a declaration to a class header while the cursor
//! sits in the source file, for example). [`Workspace::apply`] validates every file's change set
//! before committing any of them, so either all files change or none do.

use crate::applier::{ApplyError, ApplyOutcome, FileChange, commit_planned, plan_file_change};
use crate::document::Document;
use crate::indent::Indenter;
use quickfix_lang::QuickFixSettings;
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

/// A set of open documents.
#[derive(Debug, Default)]
pub struct Workspace {
    documents: BTreeMap<String, Document>,
}

impl Workspace {
    /// Create an empty workspace.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of open documents.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Returns `true` if no document is open.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Open (or replace) the document at `path` and return it.
    pub fn open(&mut self, path: impl Into<String>, text: &str) -> &mut Document {
        let path = path.into();
        let doc = Document::new(path.clone(), text);
        match self.documents.entry(path) {
            Entry::Occupied(mut entry) => {
                entry.insert(doc);
                entry.into_mut()
            }
            Entry::Vacant(entry) => entry.insert(doc),
        }
    }

    /// Close the document at `path`.
    pub fn close(&mut self, path: &str) -> Option<Document> {
        self.documents.remove(path)
    }

    /// Document at `path`.
    pub fn get(&self, path: &str) -> Option<&Document> {
        self.documents.get(path)
    }

    /// Mutable document at `path`.
    pub fn get_mut(&mut self, path: &str) -> Option<&mut Document> {
        self.documents.get_mut(path)
    }

    /// Paths of all open documents, in order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.documents.keys().map(String::as_str)
    }

    /// Apply per-file changes atomically.
    ///
    /// Every file is planned first; any missing document, stale revision or conflict aborts before
    /// a single character changes. Files are then committed in path order, each in its own edit
    /// block. If a commit still fails, files committed earlier are undone.
    #[tracing::instrument(level = "debug", skip_all, fields(files = files.len()))]
    pub fn apply(
        &mut self,
        files: &BTreeMap<String, FileChange>,
        indenter: &dyn Indenter,
        settings: &QuickFixSettings,
    ) -> Result<BTreeMap<String, ApplyOutcome>, ApplyError> {
        let mut planned = Vec::with_capacity(files.len());
        for (path, change) in files {
            let doc = self
                .documents
                .get(path)
                .ok_or_else(|| ApplyError::DocumentNotFound(path.clone()))?;
            planned.push((path, change, plan_file_change(doc, change)?));
        }

        let mut outcomes = BTreeMap::new();
        let mut committed: Vec<&String> = Vec::new();
        for (path, change, delta) in planned {
            let Some(doc) = self.documents.get_mut(path) else {
                return Err(ApplyError::DocumentNotFound(path.clone()));
            };
            let had_edits = !delta.is_empty();
            match commit_planned(doc, delta, change, indenter, settings) {
                Ok(outcome) => {
                    if had_edits {
                        committed.push(path);
                    }
                    outcomes.insert(path.clone(), outcome);
                }
                Err(err) => {
                    tracing::debug!(%err, path = %path, "rolling back multi-file apply");
                    for done in committed.iter().rev() {
                        if let Some(doc) = self.documents.get_mut(*done) {
                            doc.undo();
                        }
                    }
                    return Err(err);
                }
            }
        }

        Ok(outcomes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ChangeSet;
    use crate::indent::CStyleIndenter;

    fn change(f: impl FnOnce(&mut ChangeSet)) -> FileChange {
        let mut changes = ChangeSet::new();
        f(&mut changes);
        FileChange::new(changes)
    }

    #[test]
    fn test_apply_touches_every_file() {
        let mut ws = Workspace::new();
        ws.open("a.h", "class A {\n};\n");
        ws.open("a.cpp", "void A::f() {}\n");

        let mut files = BTreeMap::new();
        files.insert(
            "a.h".to_string(),
            change(|c| c.insert(10, "    void f();\n").unwrap()),
        );
        files.insert(
            "a.cpp".to_string(),
            change(|c| c.insert(0, "// impl\n").unwrap()),
        );

        let outcomes = ws
            .apply(&files, &CStyleIndenter::default(), &QuickFixSettings::default())
            .unwrap();
        assert_eq!(outcomes.len(), 2);
        assert_eq!(ws.get("a.h").unwrap().text(), "class A {\n    void f();\n};\n");
        assert_eq!(ws.get("a.cpp").unwrap().text(), "// impl\nvoid A::f() {}\n");
    }

    #[test]
    fn test_missing_document_aborts_everything() {
        let mut ws = Workspace::new();
        ws.open("a.cpp", "x");

        let mut files = BTreeMap::new();
        files.insert("a.cpp".to_string(), change(|c| c.insert(0, "y").unwrap()));
        files.insert("b.h".to_string(), change(|c| c.insert(0, "z").unwrap()));

        let err = ws
            .apply(&files, &CStyleIndenter::default(), &QuickFixSettings::default())
            .unwrap_err();
        assert_eq!(err, ApplyError::DocumentNotFound("b.h".to_string()));
        assert_eq!(ws.get("a.cpp").unwrap().text(), "x");
    }

    #[test]
    fn test_stale_file_aborts_everything() {
        let mut ws = Workspace::new();
        ws.open("a.cpp", "x");
        let b = ws.open("b.cpp", "y");
        b.edit_block(|block| block.insert(0, "!")).unwrap();

        let mut files = BTreeMap::new();
        files.insert(
            "a.cpp".to_string(),
            change(|c| c.insert(0, "1").unwrap()).at_revision(0),
        );
        files.insert(
            "b.cpp".to_string(),
            change(|c| c.insert(0, "2").unwrap()).at_revision(0),
        );

        let err = ws
            .apply(&files, &CStyleIndenter::default(), &QuickFixSettings::default())
            .unwrap_err();
        assert!(matches!(err, ApplyError::Stale { .. }));
        assert_eq!(ws.get("a.cpp").unwrap().text(), "x");
        assert_eq!(ws.get("b.cpp").unwrap().text(), "!y");
    }

    #[test]
    fn test_open_replaces_and_close_removes() {
        let mut ws = Workspace::new();
        ws.open("a.cpp", "one");
        ws.open("a.cpp", "two");
        assert_eq!(ws.len(), 1);
        assert_eq!(ws.get("a.cpp").unwrap().text(), "two");
        assert_eq!(ws.paths().collect::<Vec<_>>(), vec!["a.cpp"]);
        assert!(ws.close("a.cpp").is_some());
        assert!(ws.is_empty());
    }
}
