use pretty_assertions::assert_eq;
use quickfix_cpp::{AccessSpec, InsertionLocation, InsertionPointLocator};
use quickfix_syntax::{ClassId, FunctionId, Snapshot};
use quickfix_syntax_simple::parse_into;

fn snapshot(files: &[(&str, &str)]) -> Snapshot {
    let mut snapshot = Snapshot::new();
    for (path, source) in files {
        parse_into(&mut snapshot, path, 0, source).unwrap();
    }
    snapshot
}

fn function_named(snapshot: &Snapshot, path: &str, name: &str) -> FunctionId {
    let doc = snapshot.document(path).unwrap();
    let index = doc
        .symbols()
        .functions
        .iter()
        .position(|f| f.name == name)
        .unwrap();
    FunctionId(index)
}

#[test]
fn new_section_opens_before_closing_brace_on_its_own_line() {
    let snapshot = snapshot(&[("foo.h", "class Foo\n{\npublic:\n    void a();\n};\n")]);
    let location = InsertionPointLocator::new(&snapshot).method_declaration_in_class(
        "foo.h",
        ClassId(0),
        AccessSpec::PrivateSlot,
    );
    assert_eq!(
        location,
        Some(InsertionLocation::new("foo.h", "private slots:\n", "\n", 5, 1))
    );
}

#[test]
fn existing_section_is_extended() {
    let snapshot = snapshot(&[("foo.h", "class Foo\n{\npublic:\n    void a();\n};\n")]);
    let location = InsertionPointLocator::new(&snapshot).method_declaration_in_class(
        "foo.h",
        ClassId(0),
        AccessSpec::Public,
    );
    let location = location.unwrap();
    assert_eq!(location, InsertionLocation::new("foo.h", "\n", "", 4, 14));
    assert_eq!(location.wrap("void b();"), "\nvoid b();");
}

#[test]
fn new_section_before_brace_sharing_a_line() {
    let snapshot = snapshot(&[("foo.h", "class Foo { public: void a(); };\n")]);
    let location = InsertionPointLocator::new(&snapshot).method_declaration_in_class(
        "foo.h",
        ClassId(0),
        AccessSpec::Protected,
    );
    assert_eq!(
        location,
        Some(InsertionLocation::new("foo.h", "\nprotected:\n", "\n", 1, 31))
    );
}

#[test]
fn unknown_class_gives_no_location() {
    let snapshot = snapshot(&[("foo.h", "int x;\n")]);
    let locator = InsertionPointLocator::new(&snapshot);
    assert_eq!(
        locator.method_declaration_in_class("foo.h", ClassId(3), AccessSpec::Public),
        None
    );
    assert_eq!(
        locator.method_declaration_in_class("missing.h", ClassId(0), AccessSpec::Public),
        None
    );
}

#[test]
fn definition_candidates_follow_preceding_member_then_files() {
    let header = "class Foo\n{\npublic:\n    void a();\n    void b();\n};\n";
    let source = "#include \"foo.h\"\n\nvoid Foo::a()\n{\n}\n";
    let snapshot = snapshot(&[("foo.h", header), ("foo.cpp", source)]);
    let b = function_named(&snapshot, "foo.h", "b");

    let locations = InsertionPointLocator::new(&snapshot).method_definition("foo.h", b);
    assert_eq!(
        locations,
        vec![
            InsertionLocation::new("foo.cpp", "\n\n", "", 5, 2),
            InsertionLocation::new("foo.h", "\n", "\n", 7, 1),
            InsertionLocation::new("foo.cpp", "\n", "\n", 6, 1),
        ]
    );
}

#[test]
fn definition_without_paired_file_goes_to_declaring_file() {
    let header = "class Foo\n{\npublic:\n    void a();\n};";
    let snapshot = snapshot(&[("foo.h", header)]);
    let a = function_named(&snapshot, "foo.h", "a");

    let locations = InsertionPointLocator::new(&snapshot).method_definition("foo.h", a);
    assert_eq!(
        locations,
        vec![InsertionLocation::new("foo.h", "\n\n", "\n", 5, 3)]
    );
}
