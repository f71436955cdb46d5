//! The structural model of one delegate declaration.
//!
//! Built by the extractor, read by every later phase, dropped once the
//! declaration has been processed.

use crate::filer::source_path;
use autodelegate_core::{
    ConstructorDecl, Param, SourceLocation, TypeParam, TypeRef, TypeScope, Visibility,
};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// Erasure-level identity of a method: its name and erased parameter types.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ErasedSignature {
    pub name: String,
    pub params: Vec<TypeRef>,
}

impl ErasedSignature {
    pub fn new(name: impl Into<String>, params: Vec<TypeRef>) -> Self {
        Self {
            name: name.into(),
            params,
        }
    }

    /// Erase `params` in `scope`.
    pub fn of<'a>(
        name: &str,
        params: impl IntoIterator<Item = &'a TypeRef>,
        scope: &TypeScope,
    ) -> Self {
        Self::new(name, params.into_iter().map(|t| t.erasure(scope)).collect())
    }

    /// `equals(Object)`, `hashCode()` and `toString()`, which every class
    /// already implements through `java.lang.Object`.
    pub fn is_object_method(&self) -> bool {
        match (self.name.as_str(), self.params.as_slice()) {
            ("hashCode" | "toString", []) => true,
            ("equals", [param]) => param == &TypeRef::object(),
            _ => false,
        }
    }

    /// Object methods a subclass may override, including the protected ones.
    pub fn is_overridable_object_method(&self) -> bool {
        self.is_object_method()
            || matches!(
                (self.name.as_str(), self.params.as_slice()),
                ("clone" | "finalize", [])
            )
    }
}

impl fmt::Display for ErasedSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params: Vec<String> = self.params.iter().map(ToString::to_string).collect();
        write!(f, "{}({})", self.name, params.join(", "))
    }
}

/// Name and on-disk location of the class to generate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetName {
    pub package: String,
    pub simple_name: String,
}

impl TargetName {
    pub fn qualified_name(&self) -> String {
        if self.package.is_empty() {
            self.simple_name.clone()
        } else {
            format!("{}.{}", self.package, self.simple_name)
        }
    }

    /// `<package dirs>/<simple name>.java`
    pub fn relative_path(&self) -> PathBuf {
        source_path(&self.qualified_name())
    }
}

/// One interface the generated class implements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contract {
    pub qualified_name: String,

    /// The parameterized type written in the `implements` clause.
    pub reference: TypeRef,
}

impl Contract {
    pub fn simple_name(&self) -> &str {
        autodelegate_core::simple_name(&self.qualified_name)
    }
}

/// An instance method of the `extend` superclass chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InheritedMethod {
    pub name: String,
    pub type_params: Vec<TypeParam>,

    /// Parameter types, substituted into the generated class's view.
    pub params: Vec<TypeRef>,

    pub declaring_type: String,

    /// Public and concrete, so it already implements a contract member.
    pub implements_members: bool,
}

impl InheritedMethod {
    pub fn erased(&self, scope: &TypeScope) -> ErasedSignature {
        let mut scope = scope.clone();
        scope.push_params(&self.type_params);
        ErasedSignature::of(&self.name, &self.params, &scope)
    }

    pub fn erased_with(&self, bindings: &BTreeMap<String, TypeRef>, scope: &TypeScope) -> ErasedSignature {
        let params: Vec<TypeRef> = self.params.iter().map(|p| p.substitute(bindings)).collect();
        let mut scope = scope.clone();
        scope.push_params(&self.type_params);
        ErasedSignature::of(&self.name, &params, &scope)
    }
}

/// The class named by `extend`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Superclass {
    pub qualified_name: String,
    pub reference: TypeRef,

    /// Constructors the generated class may call, parameters substituted.
    pub constructors: Vec<ConstructorDecl>,

    pub methods: Vec<InheritedMethod>,
}

/// A contract member the generated class may have to forward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberSignature {
    pub name: String,
    pub type_params: Vec<TypeParam>,
    pub params: Vec<Param>,
    pub return_type: TypeRef,
    pub throws: Vec<TypeRef>,
    pub varargs: bool,

    /// Identity in the generated class's view.
    pub erased: ErasedSignature,

    /// Index into [`ContractModel::contracts`].
    pub contract: usize,

    /// Every type that declares this member, closest first.
    pub declaring_types: Vec<String>,

    pub location: Option<SourceLocation>,

    /// Types declaring an override-equivalent member this one cannot be
    /// reconciled with.
    pub ambiguous_with: Vec<String>,

    /// Why the member cannot legally be overridden, if it cannot.
    pub unsupported: Option<String>,
}

impl MemberSignature {
    pub fn declaring_type(&self) -> &str {
        self.declaring_types
            .first()
            .map(String::as_str)
            .unwrap_or_default()
    }

    /// `DeclaringType#name(erased, params)`, used to name the member in
    /// diagnostics.
    pub fn element(&self) -> String {
        format!("{}#{}", self.declaring_type(), self.erased)
    }

    /// Whether `other` has the same signature once its method type
    /// parameters are renamed to ours.
    pub fn same_signature(&self, other: &MemberSignature) -> bool {
        self.same_parameters(other) && self.return_type == self.aligned_return_type(other)
    }

    /// Whether `other` takes the same type parameters and parameters.
    pub fn same_parameters(&self, other: &MemberSignature) -> bool {
        if self.name != other.name
            || self.type_params.len() != other.type_params.len()
            || self.params.len() != other.params.len()
            || self.varargs != other.varargs
        {
            return false;
        }
        let renaming = self.renaming_of(other);

        let bounds_match = self.type_params.iter().zip(&other.type_params).all(|(a, b)| {
            let theirs: Vec<TypeRef> = b.bounds.iter().map(|t| t.substitute(&renaming)).collect();
            a.bounds == theirs
        });
        bounds_match
            && self
                .params
                .iter()
                .zip(&other.params)
                .all(|(a, b)| a.ty == b.ty.substitute(&renaming))
    }

    /// `other`'s return type with its method type parameters renamed to ours.
    pub fn aligned_return_type(&self, other: &MemberSignature) -> TypeRef {
        other.return_type.substitute(&self.renaming_of(other))
    }

    fn renaming_of(&self, other: &MemberSignature) -> BTreeMap<String, TypeRef> {
        other
            .type_params
            .iter()
            .zip(&self.type_params)
            .map(|(theirs, ours)| (theirs.name.clone(), TypeRef::Var(ours.name.clone())))
            .collect()
    }

    /// Scope for erasing this member's types within the generated class.
    pub fn scope(&self, class_scope: &TypeScope) -> TypeScope {
        let mut scope = class_scope.clone();
        scope.push_params(&self.type_params);
        scope
    }

    /// Every declared type name the member's signature mentions.
    pub fn referenced_types(&self) -> Vec<String> {
        let mut names = Vec::new();
        let mut push = |name: &str| {
            if !names.iter().any(|n: &String| n == name) {
                names.push(name.to_string());
            }
        };
        for tp in &self.type_params {
            for bound in &tp.bounds {
                bound.for_each_declared(&mut push);
            }
        }
        for param in &self.params {
            param.ty.for_each_declared(&mut push);
        }
        self.return_type.for_each_declared(&mut push);
        for thrown in &self.throws {
            thrown.for_each_declared(&mut push);
        }
        names
    }
}

/// Everything known about one delegate declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractModel {
    /// Qualified name of the annotated declaration.
    pub declaration: String,
    pub location: Option<SourceLocation>,
    pub visibility: Visibility,

    pub target: TargetName,

    /// Type parameters of the generated class, copied from raw references
    /// to generic contracts and superclass.
    pub type_params: Vec<TypeParam>,

    pub contracts: Vec<Contract>,
    pub superclass: Option<Superclass>,

    /// The canonical member surface in declaration order.
    pub members: Vec<MemberSignature>,

    /// Contract methods that already have a default body. Never forwarded,
    /// but the annotated class may override them.
    pub default_members: Vec<MemberSignature>,
}

impl ContractModel {
    pub fn scope(&self) -> TypeScope {
        TypeScope::with_params(&self.type_params)
    }
}

#[cfg(test)]
#[path = "model/model_tests.rs"]
mod model_tests;
