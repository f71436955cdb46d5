#![allow(non_snake_case)]

use super::*;
use crate::check::check;
use crate::extract::extract;
use crate::resolve::resolve;
use crate::test_support::{bag, config, decl, delegate, index, user_method, wrapping_constructor};
use serde_json::{Value, json};

fn generate_named(types: Value, name: &str, config: &GeneratorConfig) -> GeneratedFile {
    let index = index(types);
    let c = decl(&index, name);
    let model = extract(c, &index, config).unwrap();
    let plan = resolve(&model, c, &index, config);
    let outcome = check(&model, plan, &index, config);
    assert!(outcome.conflicts.is_empty(), "{:?}", outcome.conflicts);
    emit(outcome.plan.as_ref().unwrap(), &index, config)
}

fn generate(types: Value) -> String {
    generate_named(types, "foo.bar.C", &config()).contents
}

fn bag_delegate(methods: Value) -> Value {
    delegate(&["foo.bar.Bag"], methods, wrapping_constructor("foo.bar.Bag"))
}

fn with_extend(extend: &str) -> Value {
    let mut c = bag_delegate(json!([]));
    c["annotations"][0]["values"]["extend"] = json!(extend);
    c
}

// ============================================================================
// Class layout
// ============================================================================

#[test]
fn emit___bag_contract___forwards_every_member() {
    let file = generate_named(json!([bag(), bag_delegate(json!([]))]), "foo.bar.C", &config());

    assert_eq!(file.qualified_name, "foo.bar.AutoDelegate_C");
    assert_eq!(file.relative_path, PathBuf::from("foo/bar/AutoDelegate_C.java"));
    assert_eq!(
        file.contents,
        r#"package foo.bar;

import javax.annotation.processing.Generated;

@Generated("autodelegate.AutoDelegateProcessor")
abstract class AutoDelegate_C implements Bag {
    private final Bag wrapped$Bag;

    AutoDelegate_C(Bag wrapped$Bag) {
        this.wrapped$Bag = wrapped$Bag;
    }

    @Override
    public int size() {
        return this.wrapped$Bag.size();
    }

    @Override
    public void add(String item) {
        this.wrapped$Bag.add(item);
    }
}
"#
    );
}

#[test]
fn emit___overridden_member___is_not_generated() {
    let code = generate(json!([
        bag(),
        bag_delegate(json!([user_method("add", &["java.lang.String"], "void")]))
    ]));

    assert!(code.contains("public int size()"));
    assert!(!code.contains("add("));
    assert_eq!(code.matches("@Override").count(), 1);
}

#[test]
fn emit___accessor_access___declares_abstract_accessor_without_constructor() {
    let accessor = json!({
        "name": "bag",
        "returns": "foo.bar.Bag",
        "visibility": "protected",
        "annotations": [{ "name": "autodelegate.AutoDelegate.Wrapped" }]
    });
    let code = generate(json!([bag(), delegate(&["foo.bar.Bag"], json!([accessor]), json!([]))]));

    assert!(code.contains("    abstract Bag bag();\n"));
    assert!(code.contains("        return this.bag().size();\n"));
    assert!(code.contains("        this.bag().add(item);\n"));
    assert!(!code.contains("private final"));
    assert!(!code.contains("AutoDelegate_C("));
}

#[test]
fn emit___superclass___gets_one_constructor_per_accessible_constructor() {
    let code = generate(json!([
        bag(),
        {
            "package": "foo.bar", "name": "Base", "kind": "class", "visibility": "public",
            "modifiers": ["abstract"],
            "constructors": [
                {
                    "params": [{ "name": "capacity", "type": "int" }],
                    "throws": ["java.io.IOException"],
                    "visibility": "protected"
                },
                {
                    "params": [{ "name": "names", "type": "java.lang.String[]" }],
                    "varargs": true,
                    "visibility": "public"
                }
            ]
        },
        with_extend("foo.bar.Base")
    ]));

    assert!(code.contains("abstract class AutoDelegate_C extends Base implements Bag {\n"));
    assert!(code.contains(
        "    AutoDelegate_C(Bag wrapped$Bag, int capacity) throws java.io.IOException {\n\
         \x20       super(capacity);\n\
         \x20       this.wrapped$Bag = wrapped$Bag;\n\
         \x20   }\n"
    ));
    assert!(code.contains("    AutoDelegate_C(Bag wrapped$Bag, String... names) {\n        super(names);\n"));
}

#[test]
fn emit___superclass_parameter_named_like_field___is_renamed() {
    let code = generate(json!([
        bag(),
        {
            "package": "foo.bar", "name": "Base", "kind": "class", "visibility": "public",
            "constructors": [{ "params": [{ "name": "wrapped$Bag", "type": "long" }], "visibility": "public" }]
        },
        with_extend("foo.bar.Base")
    ]));

    assert!(code.contains("AutoDelegate_C(Bag wrapped$Bag, long wrapped$Bag2) {"));
    assert!(code.contains("super(wrapped$Bag2);"));
}

#[test]
fn emit___superclass_without_fields___still_calls_super() {
    let accessor = json!({
        "name": "bag",
        "returns": "foo.bar.Bag",
        "annotations": [{ "name": "autodelegate.AutoDelegate.Wrapped" }]
    });
    let mut c = delegate(&["foo.bar.Bag"], json!([accessor]), json!([]));
    c["annotations"][0]["values"]["extend"] = json!("foo.bar.Base");
    let code = generate(json!([
        bag(),
        { "package": "foo.bar", "name": "Base", "kind": "class", "visibility": "public" },
        c
    ]));

    assert!(code.contains("    AutoDelegate_C() {\n        super();\n    }\n"));
}

// ============================================================================
// Signatures
// ============================================================================

#[test]
fn emit___generic_contract___copies_type_parameters_and_bounds() {
    let code = generate(json!([
        {
            "package": "foo.bar", "name": "Box", "kind": "interface", "visibility": "public",
            "type_params": [{ "name": "T", "bounds": ["java.lang.Comparable<T>"] }],
            "methods": [
                { "name": "get", "returns": "T" },
                {
                    "name": "map",
                    "type_params": [{ "name": "R" }],
                    "params": [{ "name": "f", "type": "java.util.function.Function<? super T, ? extends R>" }],
                    "returns": "R"
                }
            ]
        },
        delegate(&["foo.bar.Box"], json!([]), wrapping_constructor("foo.bar.Box"))
    ]));

    assert!(code.contains("abstract class AutoDelegate_C<T extends Comparable<T>> implements Box<T> {\n"));
    assert!(code.contains("    private final Box<T> wrapped$Box;\n"));
    assert!(code.contains("    public T get() {\n        return this.wrapped$Box.get();\n"));
    assert!(code.contains(
        "    public <R> R map(java.util.function.Function<? super T, ? extends R> f) {\n\
         \x20       return this.wrapped$Box.map(f);\n"
    ));
}

#[test]
fn emit___varargs_and_throws___are_echoed() {
    let code = generate(json!([
        {
            "package": "foo.bar", "name": "Sink", "kind": "interface", "visibility": "public",
            "methods": [{
                "name": "write",
                "params": [
                    { "name": "prefix", "type": "char" },
                    { "name": "chunks", "type": "byte[][]" }
                ],
                "varargs": true,
                "throws": ["java.io.IOException", "java.lang.InterruptedException"]
            }]
        },
        delegate(&["foo.bar.Sink"], json!([]), wrapping_constructor("foo.bar.Sink"))
    ]));

    assert!(code.contains(
        "    public void write(char prefix, byte[]... chunks) throws java.io.IOException, InterruptedException {\n\
         \x20       this.wrapped$Sink.write(prefix, chunks);\n"
    ));
}

#[test]
fn emit___illegal_parameter_names___are_sanitised() {
    let code = generate(json!([
        {
            "package": "foo.bar", "name": "Odd", "kind": "interface", "visibility": "public",
            "methods": [{
                "name": "put",
                "params": [
                    { "name": "default", "type": "int" },
                    { "name": "", "type": "int" },
                    { "name": "", "type": "int" }
                ]
            }]
        },
        delegate(&["foo.bar.Odd"], json!([]), wrapping_constructor("foo.bar.Odd"))
    ]));

    assert!(code.contains("public void put(int default_, int arg, int arg2) {"));
    assert!(code.contains("this.wrapped$Odd.put(default_, arg, arg2);"));
}

// ============================================================================
// Type names
// ============================================================================

#[test]
fn emit___types_from_other_packages___are_fully_qualified() {
    let code = generate(json!([
        {
            "package": "baz", "name": "Api", "kind": "interface", "visibility": "public",
            "methods": [{ "name": "items", "returns": "java.util.List<baz.Api>" }]
        },
        delegate(&["baz.Api"], json!([]), wrapping_constructor("baz.Api"))
    ]));

    assert!(code.contains("implements baz.Api {"));
    assert!(code.contains("private final baz.Api wrapped$Api;"));
    assert!(code.contains("public java.util.List<baz.Api> items()"));
}

#[test]
fn emit___same_package_type_named_like_java_lang___forces_qualification() {
    let code = generate(json!([
        bag(),
        { "package": "foo.bar", "name": "String", "kind": "class", "visibility": "public" },
        bag_delegate(json!([]))
    ]));

    assert!(code.contains("public void add(java.lang.String item)"));
}

#[test]
fn emit___type_variable_named_like_package_type___forces_qualification() {
    let code = generate(json!([
        { "package": "foo.bar", "name": "T", "kind": "class", "visibility": "public" },
        {
            "package": "foo.bar", "name": "Holder", "kind": "interface", "visibility": "public",
            "methods": [{
                "name": "convert",
                "type_params": [{ "name": "T" }],
                "params": [{ "name": "raw", "type": "foo.bar.T" }],
                "returns": "T"
            }]
        },
        delegate(&["foo.bar.Holder"], json!([]), wrapping_constructor("foo.bar.Holder"))
    ]));

    assert!(code.contains("public <T> T convert(foo.bar.T raw)"));
}

#[test]
fn emit___generated_annotation_shadowed___is_written_qualified() {
    let code = generate(json!([
        bag(),
        { "package": "foo.bar", "name": "Generated", "kind": "class", "visibility": "public" },
        bag_delegate(json!([]))
    ]));

    assert!(!code.contains("import "));
    assert!(code.contains("@javax.annotation.processing.Generated(\"autodelegate.AutoDelegateProcessor\")\n"));
}

#[test]
fn emit___release_8___uses_legacy_generated_annotation() {
    let config = GeneratorConfig {
        release: 8,
        ..GeneratorConfig::default()
    };
    let file = generate_named(json!([bag(), bag_delegate(json!([]))]), "foo.bar.C", &config);

    assert!(file.contents.contains("import javax.annotation.Generated;\n"));
}

#[test]
fn emit___generator_name___is_escaped() {
    let config = GeneratorConfig {
        generator_name: r#"my "gen" \ v1"#.to_string(),
        ..GeneratorConfig::default()
    };
    let file = generate_named(json!([bag(), bag_delegate(json!([]))]), "foo.bar.C", &config);

    assert!(file.contents.contains(r#"@Generated("my \"gen\" \\ v1")"#));
}

#[test]
fn emit___unnamed_package___omits_package_declaration() {
    let mut bag = bag();
    bag["package"] = json!("");
    let mut c = delegate(&["Bag"], json!([]), wrapping_constructor("Bag"));
    c["package"] = json!("");
    c["superclass"] = json!("AutoDelegate_C");
    let file = generate_named(json!([bag, c]), "C", &config());

    assert_eq!(file.relative_path, PathBuf::from("AutoDelegate_C.java"));
    assert!(file.contents.starts_with("import javax.annotation.processing.Generated;\n"));
    assert!(file.contents.contains("implements Bag {"));
}

#[test]
fn emit___contracts_with_same_simple_name___get_distinct_fields() {
    let api = |package: &str, method: &str| {
        json!({
            "package": package, "name": "Api", "kind": "interface", "visibility": "public",
            "methods": [{ "name": method }]
        })
    };
    let code = generate(json!([
        api("a", "first"),
        api("b", "second"),
        delegate(&["a.Api", "b.Api"], json!([]), json!([
            { "params": [{ "name": "x", "type": "a.Api" }, { "name": "y", "type": "b.Api" }] }
        ]))
    ]));

    assert!(code.contains("    private final a.Api wrapped$Api;\n    private final b.Api wrapped$Api2;\n"));
    assert!(code.contains("AutoDelegate_C(a.Api wrapped$Api, b.Api wrapped$Api2) {"));
    assert!(code.contains("this.wrapped$Api.first();"));
    assert!(code.contains("this.wrapped$Api2.second();"));
}

#[test]
fn emit___same_input_twice___is_byte_identical() {
    let types = json!([bag(), bag_delegate(json!([]))]);

    assert_eq!(generate(types.clone()), generate(types));
}

#[test]
fn java_string___control_characters___are_unicode_escaped() {
    assert_eq!(java_string("a\tb\u{1}"), "\"a\\tb\\u0001\"");
}
