//! Naming conventions for generated code.
//!
//! | Input | Function | Output |
//! |-------|----------|--------|
//! | `foo.Outer.C` | [`target_name`] | `foo.AutoDelegate_Outer_C` |
//! | `Queue` | [`wrapped_field_name`] | `wrapped$Queue` |
//! | `class` | [`NameAllocator::new_name`] | `class_` |

use crate::model::TargetName;
use autodelegate_core::{GeneratorConfig, TypeDecl};
use std::collections::BTreeSet;

const JAVA_KEYWORDS: &[&str] = &[
    "abstract", "assert", "boolean", "break", "byte", "case", "catch", "char", "class", "const",
    "continue", "default", "do", "double", "else", "enum", "extends", "false", "final", "finally",
    "float", "for", "goto", "if", "implements", "import", "instanceof", "int", "interface", "long",
    "native", "new", "null", "package", "private", "protected", "public", "return", "short",
    "static", "strictfp", "super", "switch", "synchronized", "this", "throw", "throws",
    "transient", "true", "try", "void", "volatile", "while", "_",
];

/// Whether `name` is reserved in Java source.
pub fn is_java_keyword(name: &str) -> bool {
    JAVA_KEYWORDS.contains(&name)
}

/// The class generated for `decl`: same package, configured prefix, nested
/// names joined with `_`.
///
/// # Examples
///
/// ```
/// use autodelegate::naming::target_name;
/// use autodelegate_core::{GeneratorConfig, TypeDecl};
///
/// let decl: TypeDecl = serde_json::from_value(serde_json::json!({
///     "package": "foo.bar", "name": "Outer.C", "kind": "class"
/// })).unwrap();
///
/// let target = target_name(&decl, &GeneratorConfig::default());
/// assert_eq!(target.qualified_name(), "foo.bar.AutoDelegate_Outer_C");
/// ```
pub fn target_name(decl: &TypeDecl, config: &GeneratorConfig) -> TargetName {
    TargetName {
        package: decl.package.clone(),
        simple_name: format!("{}{}", config.class_prefix, decl.simple_names().join("_")),
    }
}

/// Suggested name of the field holding the wrapped instance of a contract.
///
/// The `$` keeps it clear of names users write by hand.
pub fn wrapped_field_name(contract_simple_name: &str) -> String {
    format!("wrapped${contract_simple_name}")
}

/// Hands out unique, legal Java identifiers.
#[derive(Debug, Clone, Default)]
pub struct NameAllocator {
    taken: BTreeSet<String>,
}

impl NameAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `name` as used without allocating it.
    pub fn reserve(&mut self, name: &str) {
        self.taken.insert(name.to_string());
    }

    pub fn is_taken(&self, name: &str) -> bool {
        self.taken.contains(name)
    }

    /// A name derived from `suggestion` that is a legal identifier and not
    /// yet taken. Collisions get a numeric suffix starting at 2.
    pub fn new_name(&mut self, suggestion: &str) -> String {
        let base = to_identifier(suggestion);
        let mut name = base.clone();
        let mut n = 2;
        while self.taken.contains(&name) {
            name = format!("{base}{n}");
            n += 1;
        }
        self.taken.insert(name.clone());
        name
    }
}

/// Replace characters that cannot appear in a Java identifier.
fn to_identifier(suggestion: &str) -> String {
    let mut out: String = suggestion
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '_' || c == '$' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if out.is_empty() {
        out.push_str("arg");
    } else if out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    if is_java_keyword(&out) {
        out.push('_');
    }
    out
}
