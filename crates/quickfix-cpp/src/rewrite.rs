//! The edits one quick fix makes, per file.

use quickfix_core::{ChangeSet, FileChange};
use std::collections::BTreeMap;
use std::ops::Range;

/// Per-file change sets produced by a fix.
///
/// Offsets are in the coordinates of the snapshot the fix was matched against. Files are kept in
/// path order so a multi-file rewrite commits deterministically.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rewrite {
    files: BTreeMap<String, FileChange>,
}

impl Rewrite {
    /// An empty rewrite.
    pub fn new() -> Self {
        Self::default()
    }

    /// The file change for `path`, created on first use.
    pub fn file(&mut self, path: &str) -> &mut FileChange {
        self.files.entry(path.to_string()).or_default()
    }

    /// The change set for `path`, created on first use.
    pub fn changes(&mut self, path: &str) -> &mut ChangeSet {
        &mut self.file(path).changes
    }

    /// Request re-indentation of the lines spanned by `range` in `path`.
    pub fn reindent(&mut self, path: &str, range: Range<usize>) {
        self.file(path).reindent.push(range);
    }

    /// Returns `true` if no file has any edit.
    pub fn is_empty(&self) -> bool {
        self.files.values().all(|f| f.changes.is_empty())
    }

    /// Files touched, in path order.
    pub fn files(&self) -> &BTreeMap<String, FileChange> {
        &self.files
    }

    /// Consume the rewrite.
    pub fn into_files(self) -> BTreeMap<String, FileChange> {
        self.files
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_files_are_created_on_demand() {
        let mut rewrite = Rewrite::new();
        assert!(rewrite.is_empty());
        rewrite.changes("b.cpp").insert(0, "x").unwrap();
        rewrite.reindent("a.h", 0..1);
        assert!(!rewrite.is_empty());
        let paths: Vec<&str> = rewrite.files().keys().map(String::as_str).collect();
        assert_eq!(paths, vec!["a.h", "b.cpp"]);
        assert!(rewrite.files()["a.h"].wants_reindent());
    }
}
