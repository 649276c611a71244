#![warn(missing_docs)]
//! `quickfix-lang` - data-driven configuration for the quick-fix engine.
//!
//! This crate intentionally stays lightweight and does **not** depend on any parser or editor
//! types. It provides small structs that hosts can use to configure the engine: indentation style,
//! the names of the Qt helpers the literal rewrites emit, and which fixes are enabled.
//!
//! Settings are plain values. The engine never mutates them; a host that wants a process-wide
//! configuration keeps one in a [`SettingsStore`] and the engine reads a snapshot once per query.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::{Arc, RwLock};

/// Errors produced while loading settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// The settings document was not valid JSON or did not match the schema.
    #[error("invalid settings: {0}")]
    Json(#[from] serde_json::Error),

    /// A value was syntactically valid but out of range.
    #[error("invalid value for `{field}`: {message}")]
    InvalidValue {
        /// Offending field.
        field: &'static str,
        /// Human-readable reason.
        message: String,
    },
}

/// Indentation style used when re-indenting rewritten code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndentConfig {
    /// Columns per indentation level.
    pub width: usize,
    /// Emit tabs instead of spaces for leading whitespace.
    pub use_tabs: bool,
    /// Visual width of a tab character.
    pub tab_width: usize,
    /// Indent `case`/`default` labels one level deeper than their `switch`.
    pub indent_case_labels: bool,
    /// Indent `public:`/`private slots:` style labels one level deeper than their `class`.
    pub indent_access_specifiers: bool,
}

impl Default for IndentConfig {
    fn default() -> Self {
        Self {
            width: 4,
            use_tabs: false,
            tab_width: 8,
            indent_case_labels: false,
            indent_access_specifiers: false,
        }
    }
}

impl IndentConfig {
    /// Render `columns` of indentation using this style.
    ///
    /// With `use_tabs`, as many tabs as fit are emitted and the remainder is padded with spaces.
    pub fn render(&self, columns: usize) -> String {
        if self.use_tabs && self.tab_width > 0 {
            let tabs = columns / self.tab_width;
            let spaces = columns % self.tab_width;
            let mut out = "\t".repeat(tabs);
            out.push_str(&" ".repeat(spaces));
            out
        } else {
            " ".repeat(columns)
        }
    }

    /// Visual width of a run of leading whitespace.
    pub fn columns_of(&self, whitespace: &str) -> usize {
        let tab_width = self.tab_width.max(1);
        whitespace.chars().fold(0, |col, ch| match ch {
            '\t' => (col / tab_width + 1) * tab_width,
            _ => col + 1,
        })
    }
}

/// Names of the Qt helpers used by the literal rewrites.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QtNames {
    /// Wrapper for string literals (`QLatin1String`).
    pub latin1_string: String,
    /// Wrapper for character literals (`QLatin1Char`).
    pub latin1_char: String,
    /// Member translation function (`tr`).
    pub translate: String,
    /// Free translation function taking a context (`QCoreApplication::translate`).
    pub translate_with_context: String,
    /// Macro used outside any function (`QT_TRANSLATE_NOOP`).
    pub translate_noop: String,
    /// Context used when no enclosing class or function provides one.
    pub global_context: String,
    /// Calls whose string arguments are already wrapped or marked for translation.
    pub wrapped_calls: BTreeSet<String>,
}

impl Default for QtNames {
    fn default() -> Self {
        let wrapped_calls = [
            "QT_TRANSLATE_NOOP",
            "tr",
            "trUtf8",
            "translate",
            "QLatin1String",
            "QLatin1Literal",
            "QLatin1Char",
        ]
        .into_iter()
        .map(str::to_string)
        .collect();

        Self {
            latin1_string: "QLatin1String".to_string(),
            latin1_char: "QLatin1Char".to_string(),
            translate: "tr".to_string(),
            translate_with_context: "QCoreApplication::translate".to_string(),
            translate_noop: "QT_TRANSLATE_NOOP".to_string(),
            global_context: "GLOBAL".to_string(),
            wrapped_calls,
        }
    }
}

impl QtNames {
    /// Returns `true` if a call to `name` already wraps or translates its literal argument.
    pub fn is_wrapped_call(&self, name: &str) -> bool {
        self.wrapped_calls.contains(name)
    }
}

/// Complete quick-fix configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuickFixSettings {
    /// Indentation style for re-indentation after a rewrite.
    pub indent: IndentConfig,
    /// Qt helper names.
    pub qt: QtNames,
    /// Fix ids (e.g. `"convert-numeric-literal"`) that are never offered.
    pub disabled_fixes: BTreeSet<String>,
    /// Whether rewrites that request re-indentation get it.
    pub reindent: bool,
}

impl Default for QuickFixSettings {
    fn default() -> Self {
        Self {
            indent: IndentConfig::default(),
            qt: QtNames::default(),
            disabled_fixes: BTreeSet::new(),
            reindent: true,
        }
    }
}

impl QuickFixSettings {
    /// Parse settings from a JSON document. Missing fields take their default values.
    pub fn from_json(text: &str) -> Result<Self, SettingsError> {
        let settings: Self = serde_json::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Serialize settings to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check value ranges that the schema cannot express.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.indent.width == 0 {
            return Err(SettingsError::InvalidValue {
                field: "indent.width",
                message: "must be at least 1".to_string(),
            });
        }
        if self.indent.use_tabs && self.indent.tab_width == 0 {
            return Err(SettingsError::InvalidValue {
                field: "indent.tab_width",
                message: "must be at least 1 when use_tabs is set".to_string(),
            });
        }
        Ok(())
    }

    /// Returns `true` unless the fix id is listed in `disabled_fixes`.
    pub fn is_enabled(&self, fix_id: &str) -> bool {
        !self.disabled_fixes.contains(fix_id)
    }

    /// Disable a fix by id.
    pub fn with_disabled(mut self, fix_id: impl Into<String>) -> Self {
        self.disabled_fixes.insert(fix_id.into());
        self
    }
}

/// Process-wide settings holder.
///
/// Readers take a cheap [`Arc`] snapshot; a host replaces the whole value when the user changes
/// preferences. The engine only ever calls [`SettingsStore::snapshot`].
#[derive(Debug, Default)]
pub struct SettingsStore {
    current: RwLock<Arc<QuickFixSettings>>,
}

impl SettingsStore {
    /// Create a store holding `settings`.
    pub fn new(settings: QuickFixSettings) -> Self {
        Self {
            current: RwLock::new(Arc::new(settings)),
        }
    }

    /// Current settings.
    pub fn snapshot(&self) -> Arc<QuickFixSettings> {
        match self.current.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Replace the current settings. Snapshots taken earlier keep the old value.
    pub fn replace(&self, settings: QuickFixSettings) {
        let next = Arc::new(settings);
        match self.current.write() {
            Ok(mut guard) => *guard = next,
            Err(poisoned) => *poisoned.into_inner() = next,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults_match_qt_style() {
        let settings = QuickFixSettings::default();
        assert_eq!(settings.indent.width, 4);
        assert!(!settings.indent.use_tabs);
        assert_eq!(settings.qt.latin1_string, "QLatin1String");
        assert!(settings.qt.is_wrapped_call("trUtf8"));
        assert!(settings.reindent);
    }

    #[test]
    fn test_from_json_fills_missing_fields() {
        let settings = QuickFixSettings::from_json(
            r#"{ "indent": { "width": 2 }, "disabled_fixes": ["convert-to-camel-case"] }"#,
        )
        .unwrap();
        assert_eq!(settings.indent.width, 2);
        assert_eq!(settings.indent.tab_width, 8);
        assert!(!settings.is_enabled("convert-to-camel-case"));
        assert!(settings.is_enabled("flip-binary-operands"));
    }

    #[test]
    fn test_from_json_rejects_zero_width() {
        let err = QuickFixSettings::from_json(r#"{ "indent": { "width": 0 } }"#).unwrap_err();
        assert!(matches!(
            err,
            SettingsError::InvalidValue {
                field: "indent.width",
                ..
            }
        ));
    }

    #[test]
    fn test_json_roundtrip_preserves_disabled_set() {
        let settings = QuickFixSettings::default().with_disabled("split-declaration");
        let json = settings.to_json().unwrap();
        assert_eq!(QuickFixSettings::from_json(&json).unwrap(), settings);
    }

    #[test]
    fn test_render_with_tabs_pads_remainder() {
        let config = IndentConfig {
            use_tabs: true,
            tab_width: 4,
            ..IndentConfig::default()
        };
        assert_eq!(config.render(10), "\t\t  ");
        assert_eq!(config.columns_of("\t\t  "), 10);
        assert_eq!(config.columns_of(" \t"), 4);
    }

    #[test]
    fn test_store_snapshot_is_stable_across_replace() {
        let store = SettingsStore::new(QuickFixSettings::default());
        let before = store.snapshot();
        store.replace(QuickFixSettings::default().with_disabled("wrap-string-literal"));
        assert!(before.is_enabled("wrap-string-literal"));
        assert!(!store.snapshot().is_enabled("wrap-string-literal"));
    }
}
