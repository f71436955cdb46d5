//! Declarations exported by the host's static-analysis layer.
//!
//! These types deserialize directly from the JSON model export. Signatures are
//! type strings (see [`TypeRef`]); everything else is plain data.

use crate::types::TypeRef;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Top-level shape of a model export.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelFile {
    #[serde(default)]
    pub types: Vec<TypeDecl>,
}

/// Kind of a type declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeclKind {
    Class,
    Interface,
    Enum,
    Record,
    Annotation,
}

impl fmt::Display for DeclKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeclKind::Class => write!(f, "class"),
            DeclKind::Interface => write!(f, "interface"),
            DeclKind::Enum => write!(f, "enum"),
            DeclKind::Record => write!(f, "record"),
            DeclKind::Annotation => write!(f, "annotation type"),
        }
    }
}

/// Access level of a declaration or member.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Protected,
    #[default]
    Package,
    Private,
}

/// Non-access modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modifier {
    Abstract,
    Static,
    Final,
    Default,
}

/// Position of a declaration in its source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    pub file: String,
    pub line: u32,
    pub column: u32,
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// A type parameter with its bounds, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeParam {
    pub name: String,

    #[serde(default)]
    pub bounds: Vec<TypeRef>,
}

/// A method or constructor parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Param {
    pub name: String,

    #[serde(rename = "type")]
    pub ty: TypeRef,
}

/// Value of an annotation element; class literals are written as type strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnnotationValue {
    One(String),
    Many(Vec<String>),
}

impl AnnotationValue {
    /// All values, treating a single value as a one-element list.
    pub fn as_list(&self) -> Vec<&str> {
        match self {
            AnnotationValue::One(value) => vec![value.as_str()],
            AnnotationValue::Many(values) => values.iter().map(String::as_str).collect(),
        }
    }
}

/// An annotation applied to a declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationDecl {
    /// Qualified annotation type name.
    pub name: String,

    #[serde(default)]
    pub values: BTreeMap<String, AnnotationValue>,

    #[serde(default)]
    pub location: Option<SourceLocation>,
}

impl AnnotationDecl {
    pub fn value(&self, element: &str) -> Option<&AnnotationValue> {
        self.values.get(element)
    }
}

/// A method declared directly on a type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDecl {
    pub name: String,

    #[serde(default)]
    pub type_params: Vec<TypeParam>,

    #[serde(default)]
    pub params: Vec<Param>,

    #[serde(rename = "returns", default = "void_type")]
    pub return_type: TypeRef,

    #[serde(default)]
    pub throws: Vec<TypeRef>,

    #[serde(default)]
    pub visibility: Visibility,

    #[serde(default)]
    pub modifiers: BTreeSet<Modifier>,

    /// Whether the last parameter is variable-arity.
    #[serde(default)]
    pub varargs: bool,

    #[serde(default)]
    pub annotations: Vec<AnnotationDecl>,

    #[serde(default)]
    pub location: Option<SourceLocation>,
}

fn void_type() -> TypeRef {
    TypeRef::Void
}

impl MethodDecl {
    pub fn is_abstract(&self) -> bool {
        self.modifiers.contains(&Modifier::Abstract)
    }

    pub fn is_static(&self) -> bool {
        self.modifiers.contains(&Modifier::Static)
    }

    pub fn is_final(&self) -> bool {
        self.modifiers.contains(&Modifier::Final)
    }

    pub fn is_default(&self) -> bool {
        self.modifiers.contains(&Modifier::Default)
    }

    pub fn is_private(&self) -> bool {
        self.visibility == Visibility::Private
    }

    /// Whether the method carries an annotation, by qualified or simple name.
    pub fn has_annotation(&self, name: &str) -> bool {
        let simple = crate::types::simple_name(name);
        self.annotations
            .iter()
            .any(|a| a.name == name || a.name == simple)
    }
}

/// A constructor declared directly on a class.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConstructorDecl {
    #[serde(default)]
    pub params: Vec<Param>,

    #[serde(default)]
    pub throws: Vec<TypeRef>,

    #[serde(default)]
    pub visibility: Visibility,

    #[serde(default)]
    pub varargs: bool,

    #[serde(default)]
    pub location: Option<SourceLocation>,
}

/// A class, interface, enum, record or annotation type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDecl {
    /// Package name; empty for the unnamed package.
    #[serde(default)]
    pub package: String,

    /// Name relative to the package; nested types use `Outer.Inner`.
    pub name: String,

    pub kind: DeclKind,

    #[serde(default)]
    pub visibility: Visibility,

    #[serde(default)]
    pub modifiers: BTreeSet<Modifier>,

    #[serde(default)]
    pub type_params: Vec<TypeParam>,

    #[serde(default)]
    pub superclass: Option<TypeRef>,

    #[serde(default)]
    pub interfaces: Vec<TypeRef>,

    #[serde(default)]
    pub methods: Vec<MethodDecl>,

    #[serde(default)]
    pub constructors: Vec<ConstructorDecl>,

    #[serde(default)]
    pub annotations: Vec<AnnotationDecl>,

    #[serde(default)]
    pub location: Option<SourceLocation>,
}

impl TypeDecl {
    pub fn qualified_name(&self) -> String {
        if self.package.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.package, self.name)
        }
    }

    pub fn simple_name(&self) -> &str {
        crate::types::simple_name(&self.name)
    }

    /// Simple names from the outermost enclosing type down to this one.
    pub fn simple_names(&self) -> Vec<&str> {
        self.name.split('.').collect()
    }

    pub fn is_nested(&self) -> bool {
        self.name.contains('.')
    }

    /// Qualified name of the directly enclosing type, if nested.
    pub fn enclosing_name(&self) -> Option<String> {
        let (outer, _) = self.name.rsplit_once('.')?;
        if self.package.is_empty() {
            Some(outer.to_string())
        } else {
            Some(format!("{}.{}", self.package, outer))
        }
    }

    pub fn is_static(&self) -> bool {
        self.modifiers.contains(&Modifier::Static)
    }

    pub fn is_final(&self) -> bool {
        self.modifiers.contains(&Modifier::Final)
    }

    pub fn annotation(&self, name: &str) -> Option<&AnnotationDecl> {
        self.annotations.iter().find(|a| a.name == name)
    }

    /// This type, parameterized by its own type variables.
    pub fn as_type(&self) -> TypeRef {
        TypeRef::Declared {
            name: self.qualified_name(),
            args: self
                .type_params
                .iter()
                .map(|p| TypeRef::Var(p.name.clone()))
                .collect(),
        }
    }
}
