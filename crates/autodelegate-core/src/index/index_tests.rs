#![allow(non_snake_case)]

use super::*;
use serde_json::json;

fn index(types: serde_json::Value) -> DeclarationIndex {
    DeclarationIndex::from_json_str(&json!({ "types": types }).to_string()).unwrap()
}

#[test]
fn DeclarationIndex___from_json_str___indexes_by_qualified_name() {
    let index = index(json!([
        { "package": "foo.bar", "name": "I", "kind": "interface" },
        { "package": "foo.bar", "name": "Enclosing.C", "kind": "class" },
    ]));

    assert_eq!(index.len(), 2);
    assert!(index.lookup("foo.bar.I").is_some());
    assert!(index.lookup("foo.bar.Enclosing.C").is_some());
    assert!(index.lookup("foo.bar.C").is_none());
}

#[test]
fn DeclarationIndex___from_json_str___rejects_duplicates() {
    let json = json!({ "types": [
        { "package": "a", "name": "I", "kind": "interface" },
        { "package": "a", "name": "I", "kind": "class" },
    ]});

    let result = DeclarationIndex::from_json_str(&json.to_string());

    assert!(matches!(result, Err(ModelError::DuplicateDeclaration(name)) if name == "a.I"));
}

#[test]
fn DeclarationIndex___from_json_str___rejects_interface_constructors() {
    let json = json!({ "types": [
        { "package": "a", "name": "I", "kind": "interface", "constructors": [{}] },
    ]});

    let result = DeclarationIndex::from_json_str(&json.to_string());

    assert!(matches!(result, Err(ModelError::InvalidDeclaration { .. })));
}

#[test]
fn DeclarationIndex___from_json_str___rejects_bad_type_strings() {
    let json = json!({ "types": [
        { "package": "a", "name": "I", "kind": "interface",
          "methods": [{ "name": "m", "returns": "java.util.List<" }] },
    ]});

    let result = DeclarationIndex::from_json_str(&json.to_string());

    assert!(matches!(result, Err(ModelError::Json(_))));
}

#[test]
fn DeclarationIndex___normalize___interface_methods_become_public_abstract() {
    let index = index(json!([{
        "package": "a", "name": "I", "kind": "interface",
        "methods": [
            { "name": "size", "returns": "int" },
            { "name": "isEmpty", "returns": "boolean", "modifiers": ["default"] },
            { "name": "of", "returns": "a.I", "modifiers": ["static"] },
            { "name": "helper", "visibility": "private" },
        ],
    }]));

    let decl = index.lookup("a.I").unwrap();
    let size = &decl.methods[0];
    assert!(size.is_abstract());
    assert_eq!(size.visibility, Visibility::Public);
    assert!(!decl.methods[1].is_abstract());
    assert!(!decl.methods[2].is_abstract());
    assert!(!decl.methods[3].is_abstract());
    assert_eq!(decl.methods[3].visibility, Visibility::Private);
}

#[test]
fn DeclarationIndex___normalize___types_nested_in_interfaces_are_public_static() {
    let index = index(json!([
        { "package": "a", "name": "Outer", "kind": "interface" },
        { "package": "a", "name": "Outer.Inner", "kind": "class" },
    ]));

    let inner = index.lookup("a.Outer.Inner").unwrap();

    assert!(inner.is_static());
    assert_eq!(inner.visibility, Visibility::Public);
}

#[test]
fn DeclarationIndex___normalize___nested_interfaces_are_static() {
    let index = index(json!([
        { "package": "a", "name": "Outer", "kind": "class" },
        { "package": "a", "name": "Outer.I", "kind": "interface" },
        { "package": "a", "name": "Outer.C", "kind": "class" },
    ]));

    assert!(index.lookup("a.Outer.I").unwrap().is_static());
    assert!(!index.lookup("a.Outer.C").unwrap().is_static());
}

#[test]
fn DeclarationIndex___bind___class_and_method_type_vars() {
    let index = index(json!([{
        "package": "a", "name": "Box", "kind": "interface",
        "type_params": [{ "name": "T", "bounds": ["java.lang.Comparable<T>"] }],
        "methods": [{
            "name": "map",
            "type_params": [{ "name": "U" }],
            "params": [{ "name": "value", "type": "T" }],
            "returns": "a.Box<U>",
        }],
    }]));

    let decl = index.lookup("a.Box").unwrap();
    let method = &decl.methods[0];
    assert_eq!(method.params[0].ty, TypeRef::Var("T".into()));
    assert_eq!(method.return_type.type_args(), &[TypeRef::Var("U".into())]);
    assert_eq!(
        decl.type_params[0].bounds[0].type_args(),
        &[TypeRef::Var("T".into())]
    );
}

#[test]
fn DeclarationSource___is_subtype___follows_superclass_and_interfaces() {
    let index = index(json!([
        { "package": "a", "name": "Base", "kind": "interface" },
        { "package": "a", "name": "Mid", "kind": "interface", "interfaces": ["a.Base"] },
        { "package": "a", "name": "Impl", "kind": "class", "interfaces": ["a.Mid"] },
        { "package": "a", "name": "Sub", "kind": "class", "superclass": "a.Impl" },
    ]));

    assert!(index.is_subtype("a.Sub", "a.Base"));
    assert!(index.is_subtype("a.Sub", OBJECT));
    assert!(!index.is_subtype("a.Base", "a.Sub"));
    assert!(!index.is_subtype("x.Unknown", "a.Base"));
}

#[test]
fn DeclarationSource___is_erased_subtype___arrays_are_covariant() {
    let index = index(json!([
        { "package": "a", "name": "Base", "kind": "interface" },
        { "package": "a", "name": "Impl", "kind": "class", "interfaces": ["a.Base"] },
    ]));
    let impls = TypeRef::Array(Box::new(TypeRef::declared("a.Impl")));
    let bases = TypeRef::Array(Box::new(TypeRef::declared("a.Base")));
    let ints = TypeRef::parse("int[]").unwrap();
    let longs = TypeRef::parse("long[]").unwrap();

    assert!(index.is_erased_subtype(&impls, &bases));
    assert!(index.is_erased_subtype(&ints, &TypeRef::object()));
    assert!(!index.is_erased_subtype(&ints, &longs));
}

#[test]
fn DeclarationSource___is_accessible_from___checks_enclosing_chain() {
    let index = index(json!([
        { "package": "a", "name": "Outer", "kind": "class", "visibility": "private" },
        { "package": "a", "name": "Outer.Pub", "kind": "class", "visibility": "public" },
        { "package": "a", "name": "Open", "kind": "class", "visibility": "public" },
        { "package": "a", "name": "Open.Hidden", "kind": "class", "visibility": "private" },
        { "package": "a", "name": "Local", "kind": "class" },
    ]));

    let lookup = |n: &str| index.lookup(n).unwrap();
    assert!(!index.is_accessible_from(lookup("a.Outer.Pub"), "a"));
    assert!(!index.is_accessible_from(lookup("a.Open.Hidden"), "a"));
    assert!(index.is_accessible_from(lookup("a.Open"), "b"));
    assert!(index.is_accessible_from(lookup("a.Local"), "a"));
    assert!(!index.is_accessible_from(lookup("a.Local"), "b"));
}

#[test]
fn DeclarationSource___annotated_with___keeps_export_order() {
    let index = index(json!([
        { "package": "a", "name": "Z", "kind": "class", "annotations": [{ "name": "x.Gen" }] },
        { "package": "a", "name": "B", "kind": "class" },
        { "package": "a", "name": "A", "kind": "class", "annotations": [{ "name": "x.Gen" }] },
    ]));

    let names: Vec<String> = index
        .annotated_with("x.Gen")
        .iter()
        .map(|d| d.qualified_name())
        .collect();

    assert_eq!(names, vec!["a.Z", "a.A"]);
}

#[test]
fn DeclarationIndex___from_file___reads_export() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.json");
    std::fs::write(
        &path,
        json!({ "types": [{ "package": "a", "name": "I", "kind": "interface" }] }).to_string(),
    )
    .unwrap();

    let index = DeclarationIndex::from_file(&path).unwrap();

    assert_eq!(index.len(), 1);
}
