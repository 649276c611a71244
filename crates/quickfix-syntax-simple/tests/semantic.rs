use pretty_assertions::assert_eq;
use quickfix_syntax::{Access, DocumentSnapshot, NodeId, NodeKind, Snapshot, Symbol};
use quickfix_syntax_simple::{parse_document, parse_into};

fn parse(source: &str) -> DocumentSnapshot {
    parse_document("test.cpp", 0, source).unwrap()
}

/// Innermost node at the first occurrence of `needle` (plus `delta` characters).
fn node_at(doc: &DocumentSnapshot, needle: &str, delta: usize) -> NodeId {
    let byte = doc.source().find(needle).unwrap();
    let offset = doc.source()[..byte].chars().count() + delta;
    *doc.path_at(offset).last().unwrap()
}

/// Type of the right-hand side of the assignment whose left side is `lhs`.
fn rhs_type(doc: &DocumentSnapshot, lhs: &str) -> String {
    let name = node_at(doc, lhs, 0);
    let binary = doc.ast().parent(name).unwrap();
    let NodeKind::Binary { right, .. } = doc.ast().kind(binary) else {
        panic!("`{lhs}` is not the left side of an assignment");
    };
    doc.type_of(*right).unwrap().to_string()
}

#[test]
fn out_of_line_member_sees_class_members() {
    let doc = parse(
        "class Widget {\npublic:\n    void paint();\n    int width;\n    enum Mode { Fast, Slow };\n    Mode mode;\n};\nvoid Widget::paint()\n{\n    int local = width;\n    switch (mode) {\n    }\n}\n",
    );
    let in_body = doc.source().find("int local").unwrap();
    let found = doc.lookup_at("width", in_body);
    let [Symbol::Variable(width)] = found.as_slice() else {
        panic!("unexpected lookup result {found:?}");
    };
    assert_eq!(doc.symbols().variable(*width).unwrap().ty.to_string(), "int");
    assert_eq!(doc.qualified_scope_names(doc.scope_at(in_body)), vec!["Widget"]);

    let mode = node_at(&doc, "mode)", 0);
    let ty = doc.type_of(mode).unwrap();
    assert_eq!(ty.to_string(), "Mode");
    let enumeration = doc.enum_for_type(&ty, doc.scope_at(doc.start_of(mode))).unwrap();
    assert_eq!(
        doc.symbols()
            .enumeration(enumeration)
            .unwrap()
            .qualified_enumerators(),
        vec!["Widget::Fast", "Widget::Slow"]
    );
}

#[test]
fn expression_types() {
    let doc = parse(
        "class Foo { public: Foo *next(); int size() const; };\nFoo *make();\nvoid f(Foo *p)\n{\n    x = make();\n    y = p->next();\n    z = p->size();\n    w = \"abc\";\n    v = 1.5f;\n    u = a < b;\n    t = Foo();\n    s = !p;\n}\n",
    );
    assert_eq!(rhs_type(&doc, "x ="), "Foo *");
    assert_eq!(rhs_type(&doc, "y ="), "Foo *");
    assert_eq!(rhs_type(&doc, "z ="), "int");
    assert_eq!(rhs_type(&doc, "w ="), "const char *");
    assert_eq!(rhs_type(&doc, "v ="), "float");
    assert_eq!(rhs_type(&doc, "u ="), "bool");
    assert_eq!(rhs_type(&doc, "t ="), "Foo");
    assert_eq!(rhs_type(&doc, "s ="), "bool");
}

#[test]
fn enumerators_in_namespace_are_qualified() {
    let doc = parse(
        "namespace N {\nenum Color { Red, Green };\nvoid f(Color c) { switch (c) { case Red: break; } }\n}\n",
    );
    let c = node_at(&doc, "(c) {", 1);
    let ty = doc.type_of(c).unwrap();
    let enumeration = doc.enum_for_type(&ty, doc.scope_at(doc.start_of(c))).unwrap();
    let e = doc.symbols().enumeration(enumeration).unwrap();
    assert_eq!(e.qualified_enumerators(), vec!["N::Red", "N::Green"]);
    assert_eq!(e.qualified_name().as_deref(), Some("N::Color"));

    let red = node_at(&doc, "Red:", 0);
    assert_eq!(doc.type_of(red).unwrap().to_string(), "N::Color");
}

#[test]
fn forward_declarations_and_includes() {
    let doc = parse("#include \"a.h\"\nclass Fwd;\nvoid f() { Fwd *p = 0; }\n");
    let in_body = doc.source().find("Fwd *p").unwrap();
    let found = doc.lookup_at("Fwd", in_body);
    assert!(matches!(found.as_slice(), [Symbol::ForwardClass(_)]));
    assert_eq!(doc.symbols().includes.len(), 1);
    assert_eq!(doc.symbols().includes[0].line, 1);
    assert_eq!(doc.symbols().includes[0].path, "a.h");
}

#[test]
fn class_sections_follow_labels() {
    let doc = parse(
        "class A\n{\n    Q_OBJECT\npublic:\n    A();\n    void f();\nsignals:\n    void changed();\nprivate slots:\n    void onClick();\n};\n",
    );
    let class = &doc.symbols().classes[0];
    assert!(class.has_q_object);
    let summary: Vec<(Access, bool, usize)> = class
        .sections
        .iter()
        .map(|s| (s.access, s.slots, s.member_count))
        .collect();
    assert_eq!(
        summary,
        vec![
            (Access::Public, false, 2),
            (Access::Signals, false, 1),
            (Access::Private, true, 1),
        ]
    );
    let after_f = doc.source().find("void f();").unwrap() + "void f();".len();
    assert_eq!(class.sections[0].end, after_f);
    assert!(doc.class_declares_function(quickfix_syntax::ClassId(0), "tr"));
    assert!(doc.class_declares_function(quickfix_syntax::ClassId(0), "onClick"));

    let on_click = doc
        .symbols()
        .functions
        .iter()
        .find(|f| f.name == "onClick")
        .unwrap();
    assert_eq!(on_click.access, Some(Access::Private));
}

#[test]
fn snapshot_finds_classes_and_definitions_across_files() {
    let mut snapshot = Snapshot::new();
    let header = parse_into(
        &mut snapshot,
        "a.h",
        0,
        "class A {\npublic:\n    void f(int x);\n    void g();\n};\n",
    )
    .unwrap();
    parse_into(
        &mut snapshot,
        "a.cpp",
        0,
        "#include \"a.h\"\nvoid A::f(int y)\n{\n}\n",
    )
    .unwrap();

    let (doc, class) = snapshot.find_class_definition(&["A".to_string()]).unwrap();
    assert_eq!(doc.path(), "a.h");
    assert_eq!(doc.symbols().class(class).unwrap().name, "A");

    let f = header.symbols().functions.iter().find(|f| f.name == "f").unwrap();
    let g = header.symbols().functions.iter().find(|f| f.name == "g").unwrap();
    let defs = snapshot.find_member_definitions(&["A".to_string()], f);
    assert_eq!(defs.len(), 1);
    assert_eq!(defs[0].0.path(), "a.cpp");
    assert!(snapshot.find_member_definitions(&["A".to_string()], g).is_empty());
}

#[test]
fn parse_errors_report_offsets() {
    let err = parse_document("a.cpp", 0, "int x = ;").unwrap_err();
    assert_eq!(err.offset(), 8);
    assert!(err.to_string().contains("offset 8"));
}

#[test]
fn conditions_without_initializer_bind_no_variables() {
    let doc = parse(
        "void f(int a, int b, int c)\n{\n    if (a && b) c = 1;\n    if (a * b) c = 2;\n    if (a && b == c) c = 3;\n    if (a && b && c) c = 4;\n    if (int d = a) c = d;\n}\n",
    );
    let names: Vec<&str> = doc
        .symbols()
        .variables
        .iter()
        .map(|v| v.name.as_str())
        .collect();
    assert_eq!(names, vec!["a", "b", "c", "d"]);
}
