//! Declaration-model fixtures shared by the unit tests.

use autodelegate_core::{DeclarationIndex, DeclarationSource, GeneratorConfig, TypeDecl};
use serde_json::{Value, json};

/// Build an index from a JSON array of type declarations.
pub fn index(types: Value) -> DeclarationIndex {
    DeclarationIndex::from_json_str(&json!({ "types": types }).to_string()).unwrap()
}

pub fn config() -> GeneratorConfig {
    GeneratorConfig::default()
}

/// Look up a declaration that must exist.
pub fn decl<'a>(index: &'a DeclarationIndex, name: &str) -> &'a TypeDecl {
    index.lookup(name).unwrap()
}

/// `foo.bar.Bag` with `int size()` and `void add(String)`.
pub fn bag() -> Value {
    json!({
        "package": "foo.bar",
        "name": "Bag",
        "kind": "interface",
        "visibility": "public",
        "methods": [
            { "name": "size", "returns": "int" },
            { "name": "add", "params": [{ "name": "item", "type": "java.lang.String" }] }
        ]
    })
}

/// `foo.bar.C extends AutoDelegate_C`, delegating to `contracts`.
pub fn delegate(contracts: &[&str], methods: Value, constructors: Value) -> Value {
    json!({
        "package": "foo.bar",
        "name": "C",
        "kind": "class",
        "superclass": "foo.bar.AutoDelegate_C",
        "annotations": [
            { "name": "autodelegate.AutoDelegate", "values": { "value": contracts } }
        ],
        "methods": methods,
        "constructors": constructors,
        "location": { "file": "foo/bar/C.java", "line": 7, "column": 1 }
    })
}

/// A single constructor taking one parameter of type `ty`.
pub fn wrapping_constructor(ty: &str) -> Value {
    json!([{ "params": [{ "name": "wrapped", "type": ty }] }])
}

/// A public method overriding `name` with the given parameter types.
pub fn user_method(name: &str, params: &[&str], returns: &str) -> Value {
    let params: Vec<Value> = params
        .iter()
        .enumerate()
        .map(|(i, ty)| json!({ "name": format!("p{i}"), "type": ty }))
        .collect();
    json!({
        "name": name,
        "params": params,
        "returns": returns,
        "visibility": "public",
        "annotations": [{ "name": "java.lang.Override" }]
    })
}
