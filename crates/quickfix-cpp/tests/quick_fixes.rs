use pretty_assertions::assert_eq;
use quickfix_core::{CStyleIndenter, Workspace};
use quickfix_cpp::{QuickFix, QuickFixEngine, QuickFixError};
use quickfix_lang::{QuickFixSettings, SettingsStore};
use quickfix_syntax::Snapshot;
use std::sync::Arc;

struct Fixture {
    workspace: Workspace,
    snapshot: Arc<Snapshot>,
    engine: QuickFixEngine,
}

impl Fixture {
    fn new(files: &[(&str, &str)]) -> Self {
        Self::with_settings(files, QuickFixSettings::default())
    }

    fn with_settings(files: &[(&str, &str)], settings: QuickFixSettings) -> Self {
        let mut workspace = Workspace::new();
        let mut snapshot = Snapshot::new();
        for (path, source) in files {
            workspace.open(*path, source);
            quickfix_syntax_simple::parse_into(&mut snapshot, path, 0, source).unwrap();
        }
        Self {
            workspace,
            snapshot: Arc::new(snapshot),
            engine: QuickFixEngine::new(Arc::new(SettingsStore::new(settings))),
        }
    }

    fn text(&self, path: &str) -> String {
        self.workspace.get(path).unwrap().text()
    }

    /// Fixes with the cursor `delta` characters into the first occurrence of `needle`.
    fn fixes(&self, path: &str, needle: &str, delta: usize) -> Vec<QuickFix> {
        let cursor = offset_of(&self.text(path), needle) + delta;
        self.engine
            .list_applicable_operations(&self.workspace, &self.snapshot, path, cursor, None)
    }

    fn fix(&self, path: &str, needle: &str, id: &str) -> QuickFix {
        self.fixes(path, needle, 0)
            .into_iter()
            .find(|f| f.id() == id)
            .unwrap_or_else(|| panic!("`{id}` not offered at `{needle}`"))
    }

    /// Apply fix `id` at `needle` and return the new text of `path`.
    fn apply(&mut self, path: &str, needle: &str, id: &str) -> String {
        let fix = self.fix(path, needle, id);
        fix.apply(&mut self.workspace, &CStyleIndenter::default())
            .unwrap();
        self.text(path)
    }
}

fn offset_of(source: &str, needle: &str) -> usize {
    let byte = source
        .find(needle)
        .unwrap_or_else(|| panic!("`{needle}` not in source"));
    source[..byte].chars().count()
}

fn in_function(body: &str) -> String {
    format!("void g()\n{{\n{body}}}\n")
}

fn ids(fixes: &[QuickFix]) -> Vec<&'static str> {
    fixes.iter().map(QuickFix::id).collect()
}

#[test]
fn inverse_operator_wraps_plain_comparison() {
    let source = in_function("    x = a <= b;\n");
    let mut fx = Fixture::new(&[("main.cpp", &source)]);
    let fixes = fx.fixes("main.cpp", "<=", 0);
    assert_eq!(fixes[0].description(), "Rewrite Using >");
    assert_eq!(
        fx.apply("main.cpp", "<=", "use-inverse-operator"),
        in_function("    x = !(a > b);\n")
    );
}

#[test]
fn inverse_operator_negates_parenthesized_comparison() {
    let source = in_function("    x = (a <= b);\n");
    let mut fx = Fixture::new(&[("main.cpp", &source)]);
    assert_eq!(
        fx.apply("main.cpp", "<=", "use-inverse-operator"),
        in_function("    x = !(a > b);\n")
    );
}

#[test]
fn inverse_operator_drops_existing_negation() {
    let source = in_function("    x = !(a <= b);\n");
    let mut fx = Fixture::new(&[("main.cpp", &source)]);
    assert_eq!(
        fx.apply("main.cpp", "<=", "use-inverse-operator"),
        in_function("    x = (a > b);\n")
    );
}

#[test]
fn comparison_fixes_are_listed_in_registration_order() {
    let source = in_function("    if (a <= b)\n        f();\n");
    let fx = Fixture::new(&[("main.cpp", &source)]);
    let fixes = fx.fixes("main.cpp", "<=", 0);
    let descriptions: Vec<&str> = fixes.iter().map(QuickFix::description).collect();
    assert_eq!(descriptions, vec!["Rewrite Using >", "Rewrite Using >="]);
    assert_eq!(fixes[0].priority(), fixes[1].priority());
    assert!(fixes[0].order() < fixes[1].order());
}

#[test]
fn flip_operands_mirrors_the_operator() {
    let source = in_function("    x = a < b;\n");
    let mut fx = Fixture::new(&[("main.cpp", &source)]);
    assert_eq!(
        fx.apply("main.cpp", "<", "flip-binary-operands"),
        in_function("    x = b > a;\n")
    );
}

#[test]
fn flip_operands_of_equality_keeps_operator() {
    let source = in_function("    x = left == right;\n");
    let fx = Fixture::new(&[("main.cpp", &source)]);
    let fix = fx.fix("main.cpp", "==", "flip-binary-operands");
    assert_eq!(fix.description(), "Swap Operands");
}

#[test]
fn logical_and_of_negations_becomes_negated_or() {
    let source = in_function("    if (!a && !b)\n        f();\n");
    let mut fx = Fixture::new(&[("main.cpp", &source)]);
    assert_eq!(
        fx.apply("main.cpp", "&&", "rewrite-logical-and"),
        in_function("    if (!(a || b))\n        f();\n")
    );
}

#[test]
fn split_declaration_gives_each_declarator_its_own_line() {
    let source = in_function("    int a, b;\n");
    let mut fx = Fixture::new(&[("main.cpp", &source)]);
    assert_eq!(
        fx.apply("main.cpp", "int", "split-declaration"),
        in_function("    int a;\n    int b;\n")
    );
}

#[test]
fn add_braces_reindents_the_body() {
    let source = in_function("    if (a)\n        b();\n");
    let mut fx = Fixture::new(&[("main.cpp", &source)]);
    let fix = fx.fix("main.cpp", "if", "add-braces-to-if");
    assert_eq!(fix.description(), "Add Curly Braces");
    assert_eq!(
        fx.apply("main.cpp", "if", "add-braces-to-if"),
        in_function("    if (a) {\n        b();\n    }\n")
    );
}

#[test]
fn add_braces_not_offered_for_compound_body() {
    let source = in_function("    if (a) {\n        b();\n    }\n");
    let fx = Fixture::new(&[("main.cpp", &source)]);
    assert!(!ids(&fx.fixes("main.cpp", "if", 0)).contains(&"add-braces-to-if"));
}

#[test]
fn declaration_moves_out_of_if_condition() {
    let source = in_function("    if (Foo *f = get())\n        f->run();\n");
    let mut fx = Fixture::new(&[("main.cpp", &source)]);
    assert_eq!(
        fx.apply("main.cpp", "f = get", "move-declaration-out-of-if"),
        in_function("    Foo *f = get();\n    if (f)\n        f->run();\n")
    );
}

#[test]
fn declaration_moves_out_of_while_condition() {
    let source = in_function("    while (Foo *f = next())\n        f->run();\n");
    let mut fx = Fixture::new(&[("main.cpp", &source)]);
    assert_eq!(
        fx.apply("main.cpp", "f = next", "move-declaration-out-of-while"),
        in_function("    Foo *f;\n    while ((f = next()) != 0)\n        f->run();\n")
    );
}

#[test]
fn split_if_with_logical_and_nests_statements() {
    let source = in_function("    if (a && b)\n        f();\n");
    let mut fx = Fixture::new(&[("main.cpp", &source)]);
    assert_eq!(
        fx.apply("main.cpp", "&&", "split-if-statement"),
        in_function("    if (a) {\n        if (b)\n            f();\n    }\n")
    );
}

#[test]
fn split_if_on_and_chain_splits_at_the_chosen_operator() {
    let source = in_function("    if (a && b && c)\n        f();\n");
    let mut fx = Fixture::new(&[("main.cpp", &source)]);
    assert_eq!(
        fx.apply("main.cpp", "&& c", "split-if-statement"),
        in_function("    if (a && b) {\n        if (c)\n            f();\n    }\n")
    );

    let mut fx = Fixture::new(&[("main.cpp", &source)]);
    assert_eq!(
        fx.apply("main.cpp", "&& b", "split-if-statement"),
        in_function("    if (a) {\n        if (b && c)\n            f();\n    }\n")
    );
}

#[test]
fn split_if_with_logical_or_adds_else_branch() {
    let source = in_function("    if (a || b)\n        f();\n");
    let mut fx = Fixture::new(&[("main.cpp", &source)]);
    assert_eq!(
        fx.apply("main.cpp", "||", "split-if-statement"),
        in_function("    if (a)\n        f();\n    else if (b)\n        f();\n")
    );
}

#[test]
fn split_if_refuses_and_chain_with_else() {
    let source = in_function("    if (a && b)\n        f();\n    else\n        h();\n");
    let fx = Fixture::new(&[("main.cpp", &source)]);
    assert!(!ids(&fx.fixes("main.cpp", "&&", 0)).contains(&"split-if-statement"));
}

#[test]
fn switch_gets_missing_enumerators() {
    let source = "enum Color { Red, Green, Blue };\nvoid g(Color c)\n{\n    switch (c) {\n    case Red:\n        break;\n    }\n}\n";
    let mut fx = Fixture::new(&[("main.cpp", source)]);
    assert_eq!(
        fx.apply("main.cpp", "switch", "complete-switch-case"),
        "enum Color { Red, Green, Blue };\nvoid g(Color c)\n{\n    switch (c) {\n    case Green:\n        break;\n    case Blue:\n        break;\n    case Red:\n        break;\n    }\n}\n"
    );
}

#[test]
fn complete_switch_not_offered_when_every_case_exists() {
    let source = "enum Mode { On, Off };\nvoid g(Mode m)\n{\n    switch (m) {\n    case On:\n    case Off:\n        break;\n    }\n}\n";
    let fx = Fixture::new(&[("main.cpp", source)]);
    assert!(!ids(&fx.fixes("main.cpp", "switch", 0)).contains(&"complete-switch-case"));
}

#[test]
fn numeric_literal_offers_other_bases() {
    let source = in_function("    x = 32;\n");
    let mut fx = Fixture::new(&[("main.cpp", &source)]);
    let descriptions: Vec<String> = fx
        .fixes("main.cpp", "32", 0)
        .iter()
        .filter(|f| f.id() == "convert-numeric-literal")
        .map(|f| f.description().to_string())
        .collect();
    assert_eq!(descriptions, vec!["Convert to Hexadecimal", "Convert to Octal"]);
    assert_eq!(
        fx.apply("main.cpp", "32", "convert-numeric-literal"),
        in_function("    x = 0x20;\n")
    );
}

#[test]
fn string_literal_is_wrapped() {
    let source = in_function("    s = \"abc\";\n");
    let mut fx = Fixture::new(&[("main.cpp", &source)]);
    let fix = fx.fix("main.cpp", "\"abc\"", "wrap-string-literal");
    assert_eq!(fix.description(), "Enclose in QLatin1String(...)");
    assert_eq!(
        fx.apply("main.cpp", "\"abc\"", "wrap-string-literal"),
        in_function("    s = QLatin1String(\"abc\");\n")
    );
}

#[test]
fn literal_inside_wrapping_call_is_left_alone() {
    let source = in_function("    s = QLatin1String(\"abc\");\n");
    let fx = Fixture::new(&[("main.cpp", &source)]);
    let found = ids(&fx.fixes("main.cpp", "\"abc\"", 1));
    assert!(!found.contains(&"wrap-string-literal"));
    assert!(!found.contains(&"translate-string-literal"));
}

#[test]
fn translation_in_free_function_uses_global_context() {
    let source = in_function("    s = \"abc\";\n");
    let mut fx = Fixture::new(&[("main.cpp", &source)]);
    assert_eq!(
        fx.apply("main.cpp", "\"abc\"", "translate-string-literal"),
        in_function("    s = QCoreApplication::translate(\"GLOBAL\", \"abc\");\n")
    );
}

#[test]
fn translation_in_qobject_member_uses_tr() {
    let source = "class Dialog\n{\n    Q_OBJECT\npublic:\n    void setup();\n};\nvoid Dialog::setup()\n{\n    title = \"Hello\";\n}\n";
    let mut fx = Fixture::new(&[("dialog.cpp", source)]);
    let text = fx.apply("dialog.cpp", "\"Hello\"", "translate-string-literal");
    assert!(text.contains("    title = tr(\"Hello\");\n"), "{text}");
}

#[test]
fn translation_outside_functions_uses_noop_macro() {
    let source = "const char *s = \"abc\";\n";
    let mut fx = Fixture::new(&[("main.cpp", source)]);
    assert_eq!(
        fx.apply("main.cpp", "\"abc\"", "translate-string-literal"),
        "const char *s = QT_TRANSLATE_NOOP(\"GLOBAL\", \"abc\");\n"
    );
}

#[test]
fn cstring_becomes_objective_c_literal_only_in_objective_cpp() {
    let source = in_function("    s = \"abc\";\n");
    let mut fx = Fixture::new(&[("main.mm", &source), ("main.cpp", &source)]);
    assert!(!ids(&fx.fixes("main.cpp", "\"abc\"", 0)).contains(&"convert-cstring-to-nsstring"));
    assert_eq!(
        fx.apply("main.mm", "\"abc\"", "convert-cstring-to-nsstring"),
        in_function("    s = @\"abc\";\n")
    );
}

#[test]
fn forward_declared_class_gets_its_header() {
    let header = "class Button\n{\npublic:\n    void click();\n};\n";
    let source = "#include \"widget.h\"\n\nclass Button;\n\nvoid g(Button *b)\n{\n    b->click();\n}\n";
    let mut fx = Fixture::new(&[("button.h", header), ("main.cpp", source)]);
    let fix = fx.fix("main.cpp", "Button *b", "fix-forward-declaration");
    assert_eq!(fix.description(), "#include Header File");
    assert_eq!(
        fx.apply("main.cpp", "Button *b", "fix-forward-declaration"),
        "#include \"widget.h\"\n#include <button.h>\n\nclass Button;\n\nvoid g(Button *b)\n{\n    b->click();\n}\n"
    );
}

#[test]
fn forward_declaration_prefers_forwarding_header() {
    let header = "class Button\n{\npublic:\n    void click();\n};\n";
    let forwarding = "#include \"button.h\"\n";
    let source = "class Button;\nvoid g(Button *b)\n{\n}\n";
    let mut fx = Fixture::new(&[
        ("Button", forwarding),
        ("button.h", header),
        ("main.cpp", source),
    ]);
    let text = fx.apply("main.cpp", "Button *b", "fix-forward-declaration");
    assert!(text.starts_with("#include <Button>\nclass Button;"), "{text}");
}

#[test]
fn forward_declaration_without_definition_offers_nothing() {
    let source = "class Button;\nvoid g(Button *b)\n{\n}\n";
    let fx = Fixture::new(&[("main.cpp", source)]);
    assert!(!ids(&fx.fixes("main.cpp", "Button *b", 0)).contains(&"fix-forward-declaration"));
}

#[test]
fn local_declaration_uses_the_initializer_type() {
    let source = "class Foo { public: Foo *next(); };\nFoo *make();\nvoid g()\n{\n    x = make();\n}\n";
    let mut fx = Fixture::new(&[("main.cpp", source)]);
    let text = fx.apply("main.cpp", "x = make", "add-local-declaration");
    assert!(text.contains("\n    Foo *x = make();\n"), "{text}");
}

#[test]
fn local_declaration_not_offered_for_declared_variable() {
    let source = in_function("    int x;\n    x = 1;\n");
    let fx = Fixture::new(&[("main.cpp", &source)]);
    assert!(!ids(&fx.fixes("main.cpp", "x = 1", 0)).contains(&"add-local-declaration"));
}

#[test]
fn local_declaration_with_unknown_type_fails_at_apply_time() {
    let source = in_function("    x = unknown();\n");
    let mut fx = Fixture::new(&[("main.cpp", &source)]);
    let fix = fx.fix("main.cpp", "x = unknown", "add-local-declaration");
    let err = fix
        .apply(&mut fx.workspace, &CStyleIndenter::default())
        .unwrap_err();
    assert!(matches!(err, QuickFixError::UnresolvedType(_)), "{err}");
    assert_eq!(fx.text("main.cpp"), source);
}

#[test]
fn camel_case_renames_every_usage() {
    let source = in_function("    int foo_bar = 1;\n    foo_bar = foo_bar + 2;\n");
    let mut fx = Fixture::new(&[("main.cpp", &source)]);
    assert_eq!(
        fx.apply("main.cpp", "foo_bar = foo", "convert-to-camel-case"),
        in_function("    int fooBar = 1;\n    fooBar = fooBar + 2;\n")
    );
}

#[test]
fn camel_case_not_offered_for_plain_names() {
    let source = in_function("    int value = 1;\n");
    let fx = Fixture::new(&[("main.cpp", &source)]);
    assert!(!ids(&fx.fixes("main.cpp", "value", 0)).contains(&"convert-to-camel-case"));
}

#[test]
fn declaration_from_definition_edits_the_class_header() {
    let header = "class Widget\n{\npublic:\n    void show();\n};\n";
    let source = "#include \"widget.h\"\n\nvoid Widget::show()\n{\n}\n\nvoid Widget::hide()\n{\n}\n";
    let mut fx = Fixture::new(&[("widget.h", header), ("widget.cpp", source)]);

    let offered: Vec<String> = fx
        .fixes("widget.cpp", "hide", 0)
        .iter()
        .filter(|f| f.id() == "insert-declaration-from-definition")
        .map(|f| f.description().to_string())
        .collect();
    assert_eq!(offered[0], "Add public Declaration");
    assert_eq!(offered.len(), 6);

    fx.apply("widget.cpp", "hide", "insert-declaration-from-definition");
    assert_eq!(
        fx.text("widget.h"),
        "class Widget\n{\npublic:\n    void show();\n    void hide();\n};\n"
    );
    assert_eq!(fx.text("widget.cpp"), source);
}

#[test]
fn reloaded_header_with_new_text_is_stale() {
    let header = "class Widget\n{\npublic:\n    void show();\n};\n";
    let source = "#include \"widget.h\"\n\nvoid Widget::show()\n{\n}\n\nvoid Widget::hide()\n{\n}\n";
    let mut fx = Fixture::new(&[("widget.h", header), ("widget.cpp", source)]);
    let fix = fx.fix("widget.cpp", "hide", "insert-declaration-from-definition");

    let reloaded = format!("// widget\n// api\n{header}");
    fx.workspace.open("widget.h", &reloaded);
    let err = fix
        .apply(&mut fx.workspace, &CStyleIndenter::default())
        .unwrap_err();
    assert!(
        matches!(&err, QuickFixError::Stale { path, .. } if path == "widget.h"),
        "{err}"
    );
    assert_eq!(fx.text("widget.h"), reloaded);
    assert_eq!(fx.text("widget.cpp"), source);
}

#[test]
fn declaration_from_definition_not_offered_when_declared() {
    let header = "class Widget\n{\npublic:\n    void show();\n};\n";
    let source = "void Widget::show()\n{\n}\n";
    let fx = Fixture::new(&[("widget.h", header), ("widget.cpp", source)]);
    assert!(
        !ids(&fx.fixes("widget.cpp", "show", 0)).contains(&"insert-declaration-from-definition")
    );
}

#[test]
fn definition_from_declaration_follows_previous_member() {
    let header = "class Widget\n{\npublic:\n    void show();\n    int size() const;\n};\n";
    let source = "#include \"widget.h\"\n\nvoid Widget::show()\n{\n}\n";
    let mut fx = Fixture::new(&[("widget.h", header), ("widget.cpp", source)]);

    let fix = fx.fix("widget.h", "size", "insert-definition-from-declaration");
    assert_eq!(fix.description(), "Add Definition in widget.cpp");
    fx.apply("widget.h", "size", "insert-definition-from-declaration");
    assert_eq!(
        fx.text("widget.cpp"),
        "#include \"widget.h\"\n\nvoid Widget::show()\n{\n}\n\nint Widget::size() const\n{\n}\n"
    );
    assert_eq!(fx.text("widget.h"), header);
}

#[test]
fn nothing_is_offered_outside_the_tree() {
    let source = "void g()\n{\n}\n\n\n";
    let fx = Fixture::new(&[("main.cpp", source)]);
    let cursor = source.chars().count();
    assert!(
        fx.engine
            .list_applicable_operations(&fx.workspace, &fx.snapshot, "main.cpp", cursor, None)
            .is_empty()
    );
}

#[test]
fn disabled_fixes_are_not_listed() {
    let source = in_function("    x = a <= b;\n");
    let settings = QuickFixSettings::default().with_disabled("use-inverse-operator");
    let fx = Fixture::with_settings(&[("main.cpp", &source)], settings);
    let found = ids(&fx.fixes("main.cpp", "<=", 0));
    assert!(!found.contains(&"use-inverse-operator"));
    assert!(found.contains(&"flip-binary-operands"));
}

#[test]
fn stale_snapshot_is_refused() {
    let source = in_function("    x = a <= b;\n");
    let mut fx = Fixture::new(&[("main.cpp", &source)]);
    let fix = fx.fix("main.cpp", "<=", "use-inverse-operator");

    let edited = in_function("    x = a <= b + 1;\n");
    fx.workspace.open("main.cpp", &edited);
    assert!(fx.fixes("main.cpp", "<=", 0).is_empty());

    let err = fix
        .apply(&mut fx.workspace, &CStyleIndenter::default())
        .unwrap_err();
    assert!(matches!(err, QuickFixError::Stale { .. }), "{err}");
    assert_eq!(fx.text("main.cpp"), edited);
}

#[test]
fn applied_fix_is_one_undo_step() {
    let source = in_function("    if (a)\n        b();\n");
    let mut fx = Fixture::new(&[("main.cpp", &source)]);
    fx.apply("main.cpp", "if", "add-braces-to-if");
    let doc = fx.workspace.get_mut("main.cpp").unwrap();
    assert!(doc.undo());
    assert_eq!(doc.text(), source);
    assert!(!doc.can_undo());
}

#[test]
fn rewrite_does_not_touch_documents() {
    let source = in_function("    x = a <= b;\n");
    let fx = Fixture::new(&[("main.cpp", &source)]);
    let rewrite = fx.fix("main.cpp", "<=", "use-inverse-operator").rewrite().unwrap();
    assert_eq!(rewrite.files().len(), 1);
    assert!(!rewrite.is_empty());
    assert_eq!(fx.text("main.cpp"), source);
}
