//! Where to put generated declarations and definitions.
//!
//! Locations are 1-based line/column pairs plus the text to emit before and after the generated
//! code. A location is valid only with a non-empty file name and positive line and column.

use quickfix_syntax::{Access, ClassId, DocumentSnapshot, FunctionId, Snapshot};
use regex::Regex;
use std::sync::LazyLock;

static HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.*)\.(h|hh|hpp|hxx)$").expect("valid header regex"));
static SOURCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.*)\.(c|cc|cpp|cxx|mm)$").expect("valid source regex"));

const SOURCE_SUFFIXES: &[&str] = &["cpp", "cc", "cxx", "mm", "c"];
const HEADER_SUFFIXES: &[&str] = &["h", "hpp", "hh", "hxx"];

/// A place to insert generated code.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InsertionLocation {
    file: String,
    prefix: String,
    suffix: String,
    line: usize,
    column: usize,
}

impl InsertionLocation {
    /// Create a location. `line` and `column` are 1-based.
    pub fn new(
        file: impl Into<String>,
        prefix: impl Into<String>,
        suffix: impl Into<String>,
        line: usize,
        column: usize,
    ) -> Self {
        Self {
            file: file.into(),
            prefix: prefix.into(),
            suffix: suffix.into(),
            line,
            column,
        }
    }

    /// Target file.
    pub fn file(&self) -> &str {
        &self.file
    }

    /// Text to insert before the generated code.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Text to insert after the generated code.
    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// 1-based line.
    pub fn line(&self) -> usize {
        self.line
    }

    /// 1-based column.
    pub fn column(&self) -> usize {
        self.column
    }

    /// Returns `true` if the location names a file and a positive line and column.
    pub fn is_valid(&self) -> bool {
        !self.file.is_empty() && self.line > 0 && self.column > 0
    }

    /// Character offset of the location in `doc`.
    pub fn offset_in(&self, doc: &DocumentSnapshot) -> usize {
        doc.offset_at(self.line.saturating_sub(1), self.column.saturating_sub(1))
    }

    /// `prefix + code + suffix`.
    pub fn wrap(&self, code: &str) -> String {
        format!("{}{}{}", self.prefix, code, self.suffix)
    }

    fn at_offset(
        doc: &DocumentSnapshot,
        offset: usize,
        prefix: impl Into<String>,
        suffix: impl Into<String>,
    ) -> Self {
        let (line, column) = doc.position(offset);
        Self::new(doc.path(), prefix, suffix, line + 1, column + 1)
    }
}

/// Access specifier of a class section, with the Qt `signals`/`slots` variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessSpec {
    /// `signals:`
    Signals,
    /// `public:`
    Public,
    /// `protected:`
    Protected,
    /// `private:`
    Private,
    /// `public slots:`
    PublicSlot,
    /// `protected slots:`
    ProtectedSlot,
    /// `private slots:`
    PrivateSlot,
}

impl AccessSpec {
    /// The plain access level.
    pub fn access(self) -> Access {
        match self {
            AccessSpec::Signals => Access::Signals,
            AccessSpec::Public | AccessSpec::PublicSlot => Access::Public,
            AccessSpec::Protected | AccessSpec::ProtectedSlot => Access::Protected,
            AccessSpec::Private | AccessSpec::PrivateSlot => Access::Private,
        }
    }

    /// Returns `true` for the `slots` variants.
    pub fn is_slot(self) -> bool {
        matches!(
            self,
            AccessSpec::PublicSlot | AccessSpec::ProtectedSlot | AccessSpec::PrivateSlot
        )
    }

    /// Section header, e.g. `private slots:`.
    pub fn label(self) -> String {
        if self.is_slot() {
            format!("{} slots:", self.access().keyword())
        } else {
            format!("{}:", self.access().keyword())
        }
    }
}

/// Computes insertion locations against a snapshot.
#[derive(Debug, Clone, Copy)]
pub struct InsertionPointLocator<'a> {
    snapshot: &'a Snapshot,
}

impl<'a> InsertionPointLocator<'a> {
    /// Locator over `snapshot`.
    pub fn new(snapshot: &'a Snapshot) -> Self {
        Self { snapshot }
    }

    /// Where to declare a new member of `class` (defined in `file`) under `spec`.
    ///
    /// With a section of that access, the location is the end of its last such section.
    /// Otherwise it is just before the closing brace, and the prefix opens a new section. `None`
    /// if the file or class is unknown.
    pub fn method_declaration_in_class(
        &self,
        file: &str,
        class: ClassId,
        spec: AccessSpec,
    ) -> Option<InsertionLocation> {
        let doc = self.snapshot.document(file)?;
        let class = doc.symbols().class(class)?;

        if let Some(section) = class
            .sections
            .iter()
            .rev()
            .find(|s| s.access == spec.access() && s.slots == spec.is_slot())
        {
            return Some(InsertionLocation::at_offset(doc, section.end, "\n", ""));
        }

        let line_start = doc.line_start(doc.line_of(class.rbrace));
        let at_line_start = doc
            .text(line_start..class.rbrace)
            .chars()
            .all(char::is_whitespace);
        let location = if at_line_start {
            InsertionLocation::at_offset(doc, line_start, format!("{}\n", spec.label()), "\n")
        } else {
            InsertionLocation::at_offset(doc, class.rbrace, format!("\n{}\n", spec.label()), "\n")
        };
        Some(location)
    }

    /// Candidate places for the out-of-line definition of `declaration` (declared in `file`),
    /// best first: after the definition of the nearest preceding member that has one, at the end
    /// of the declaring file, at the end of the paired source file.
    pub fn method_definition(&self, file: &str, declaration: FunctionId) -> Vec<InsertionLocation> {
        let Some(doc) = self.snapshot.document(file) else {
            return Vec::new();
        };
        let Some(function) = doc.symbols().function(declaration) else {
            return Vec::new();
        };

        let mut out = Vec::new();
        if let Some(class) = doc.owner_class(declaration).and_then(|c| doc.symbols().class(c)) {
            let preceding = doc
                .symbols()
                .functions_in(class.body_scope)
                .filter(|(_, f)| !f.is_definition && f.name_range.start < function.name_range.start)
                .collect::<Vec<_>>();
            for (_, sibling) in preceding.into_iter().rev() {
                let definitions = self
                    .snapshot
                    .find_member_definitions(&class.qualified_name, sibling);
                if let Some((def_doc, def)) = definitions.first()
                    && let Some(def) = def_doc.symbols().function(*def)
                {
                    out.push(InsertionLocation::at_offset(def_doc, def.range.end, "\n\n", ""));
                    break;
                }
            }
        }

        out.push(end_of_file(doc));
        if let Some(source) = paired_files(file)
            .iter()
            .find_map(|p| self.snapshot.document(p))
        {
            out.push(end_of_file(source));
        }

        out.retain(InsertionLocation::is_valid);
        out.dedup();
        out
    }
}

fn end_of_file(doc: &DocumentSnapshot) -> InsertionLocation {
    let prefix = if doc.source().is_empty() || doc.source().ends_with('\n') {
        "\n"
    } else {
        "\n\n"
    };
    InsertionLocation::at_offset(doc, doc.char_count(), prefix, "\n")
}

/// Candidate paths of the file paired with `path` (`a.h` ↔ `a.cpp`), most likely first.
pub fn paired_files(path: &str) -> Vec<String> {
    if let Some(caps) = HEADER.captures(path) {
        return SOURCE_SUFFIXES
            .iter()
            .map(|suffix| format!("{}.{suffix}", &caps[1]))
            .collect();
    }
    if let Some(caps) = SOURCE.captures(path) {
        return HEADER_SUFFIXES
            .iter()
            .map(|suffix| format!("{}.{suffix}", &caps[1]))
            .collect();
    }
    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validity() {
        assert!(InsertionLocation::new("a.h", "", "", 1, 1).is_valid());
        assert!(!InsertionLocation::new("", "", "", 1, 1).is_valid());
        assert!(!InsertionLocation::new("a.h", "", "", 0, 1).is_valid());
        assert!(!InsertionLocation::new("a.h", "", "", 1, 0).is_valid());
        assert!(!InsertionLocation::default().is_valid());
    }

    #[test]
    fn test_access_labels() {
        assert_eq!(AccessSpec::PrivateSlot.label(), "private slots:");
        assert_eq!(AccessSpec::Signals.label(), "signals:");
        assert_eq!(AccessSpec::Protected.label(), "protected:");
        assert!(AccessSpec::PublicSlot.is_slot());
        assert_eq!(AccessSpec::PublicSlot.access(), Access::Public);
    }

    #[test]
    fn test_paired_files() {
        assert_eq!(paired_files("src/a.h")[0], "src/a.cpp");
        assert_eq!(paired_files("a.cpp")[0], "a.h");
        assert!(paired_files("README").is_empty());
    }
}
