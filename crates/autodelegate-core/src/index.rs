//! The queryable declaration model.
//!
//! [`DeclarationSource`] is the read-only interface the generator works
//! against; [`DeclarationIndex`] is the in-memory implementation loaded from a
//! JSON export. Loading normalises the implicit modifiers Java gives to
//! interface members and nested types, and binds type variables.

use crate::decl::{DeclKind, Modifier, ModelFile, TypeDecl, TypeParam, Visibility};
use crate::error::ModelError;
use crate::types::{OBJECT, TypeRef};
use std::collections::{BTreeSet, HashMap, VecDeque};
use std::path::Path;

/// Read-only access to declarations, keyed by qualified name.
pub trait DeclarationSource {
    /// Look up a declaration by qualified name.
    fn lookup(&self, qualified_name: &str) -> Option<&TypeDecl>;

    /// All declarations, in a stable order.
    fn declarations(&self) -> Vec<&TypeDecl>;

    /// Declarations carrying the given annotation.
    fn annotated_with(&self, annotation: &str) -> Vec<&TypeDecl> {
        self.declarations()
            .into_iter()
            .filter(|d| d.annotation(annotation).is_some())
            .collect()
    }

    /// Whether the declared type `sub` is `sup` or one of its subtypes.
    ///
    /// Types missing from the model only relate to themselves and `Object`.
    fn is_subtype(&self, sub: &str, sup: &str) -> bool {
        if sub == sup || sup == OBJECT {
            return true;
        }
        let mut queue = VecDeque::from([sub.to_string()]);
        let mut seen = BTreeSet::new();
        while let Some(name) = queue.pop_front() {
            if name == sup {
                return true;
            }
            if !seen.insert(name.clone()) {
                continue;
            }
            if let Some(decl) = self.lookup(&name) {
                for parent in decl.superclass.iter().chain(decl.interfaces.iter()) {
                    if let Some(parent) = parent.declared_name() {
                        queue.push_back(parent.to_string());
                    }
                }
            }
        }
        false
    }

    /// Subtyping between erased types, with array covariance.
    fn is_erased_subtype(&self, sub: &TypeRef, sup: &TypeRef) -> bool {
        if sub == sup {
            return true;
        }
        match (sub, sup) {
            (TypeRef::Declared { name: a, .. }, TypeRef::Declared { name: b, .. }) => {
                self.is_subtype(a, b)
            }
            (TypeRef::Array(_), TypeRef::Declared { name, .. }) => matches!(
                name.as_str(),
                OBJECT | "java.lang.Cloneable" | "java.io.Serializable"
            ),
            (TypeRef::Array(a), TypeRef::Array(b)) => {
                a.is_reference() && b.is_reference() && self.is_erased_subtype(a, b)
            }
            _ => false,
        }
    }

    /// Whether code in `package` (outside the declaration's top-level type)
    /// may name `decl`.
    fn is_accessible_from(&self, decl: &TypeDecl, package: &str) -> bool {
        let own = match decl.visibility {
            Visibility::Public => true,
            Visibility::Protected | Visibility::Package => decl.package == package,
            Visibility::Private => false,
        };
        own && decl.enclosing_name().is_none_or(|enclosing| {
            self.lookup(&enclosing)
                .is_none_or(|outer| self.is_accessible_from(outer, package))
        })
    }
}

/// In-memory declaration model.
#[derive(Debug, Clone, Default)]
pub struct DeclarationIndex {
    decls: Vec<TypeDecl>,
    by_name: HashMap<String, usize>,
}

impl DeclarationIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a model export from a file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    /// Parse a model export from a JSON string.
    pub fn from_json_str(content: &str) -> Result<Self, ModelError> {
        let model: ModelFile = serde_json::from_str(content)?;
        Self::from_model(model)
    }

    /// Build the index from already-deserialized declarations.
    pub fn from_model(model: ModelFile) -> Result<Self, ModelError> {
        let mut kinds = HashMap::new();
        for decl in &model.types {
            validate_decl(decl)?;
            let name = decl.qualified_name();
            if kinds.insert(name.clone(), decl.kind).is_some() {
                return Err(ModelError::DuplicateDeclaration(name));
            }
        }

        let mut index = Self::new();
        for mut decl in model.types {
            let enclosing_kind = decl.enclosing_name().and_then(|n| kinds.get(&n).copied());
            normalize(&mut decl, enclosing_kind);
            bind_decl(&mut decl);
            index.by_name.insert(decl.qualified_name(), index.decls.len());
            index.decls.push(decl);
        }
        Ok(index)
    }

    pub fn len(&self) -> usize {
        self.decls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TypeDecl> {
        self.decls.iter()
    }
}

impl DeclarationSource for DeclarationIndex {
    fn lookup(&self, qualified_name: &str) -> Option<&TypeDecl> {
        self.by_name.get(qualified_name).map(|&i| &self.decls[i])
    }

    fn declarations(&self) -> Vec<&TypeDecl> {
        self.decls.iter().collect()
    }
}

fn validate_decl(decl: &TypeDecl) -> Result<(), ModelError> {
    let invalid = |reason: &str| ModelError::InvalidDeclaration {
        name: decl.qualified_name(),
        reason: reason.to_string(),
    };
    if decl.name.is_empty() || decl.name.split('.').any(str::is_empty) {
        return Err(invalid("name must be a non-empty dotted path"));
    }
    if decl.kind == DeclKind::Interface && !decl.constructors.is_empty() {
        return Err(invalid("interfaces cannot declare constructors"));
    }
    let mut seen = BTreeSet::new();
    for param in &decl.type_params {
        if !seen.insert(param.name.as_str()) {
            return Err(invalid("duplicate type parameter"));
        }
    }
    Ok(())
}

/// Apply the modifiers the language implies but an export may omit.
fn normalize(decl: &mut TypeDecl, enclosing_kind: Option<DeclKind>) {
    if decl.is_nested() {
        if decl.kind != DeclKind::Class {
            decl.modifiers.insert(Modifier::Static);
        }
        if matches!(
            enclosing_kind,
            Some(DeclKind::Interface | DeclKind::Annotation)
        ) {
            decl.modifiers.insert(Modifier::Static);
            if decl.visibility == Visibility::Package {
                decl.visibility = Visibility::Public;
            }
        }
    }

    if matches!(decl.kind, DeclKind::Interface | DeclKind::Annotation) {
        decl.modifiers.insert(Modifier::Abstract);
        for method in &mut decl.methods {
            let has_body = method.is_default() || method.is_static() || method.is_private();
            if !has_body {
                method.modifiers.insert(Modifier::Abstract);
            }
            if method.visibility == Visibility::Package {
                method.visibility = Visibility::Public;
            }
        }
    }
}

fn scope_names(params: &[TypeParam]) -> BTreeSet<String> {
    params.iter().map(|p| p.name.clone()).collect()
}

fn bind_params(params: &mut [TypeParam], vars: &BTreeSet<String>) {
    for param in params {
        for bound in &mut param.bounds {
            *bound = bound.bind_type_vars(vars);
        }
    }
}

/// Turn names of in-scope type parameters into type variables.
fn bind_decl(decl: &mut TypeDecl) {
    let class_vars = scope_names(&decl.type_params);
    bind_params(&mut decl.type_params, &class_vars);
    if let Some(superclass) = &mut decl.superclass {
        *superclass = superclass.bind_type_vars(&class_vars);
    }
    for iface in &mut decl.interfaces {
        *iface = iface.bind_type_vars(&class_vars);
    }

    for method in &mut decl.methods {
        let mut vars = class_vars.clone();
        vars.extend(scope_names(&method.type_params));
        bind_params(&mut method.type_params, &vars);
        for param in &mut method.params {
            param.ty = param.ty.bind_type_vars(&vars);
        }
        method.return_type = method.return_type.bind_type_vars(&vars);
        for thrown in &mut method.throws {
            *thrown = thrown.bind_type_vars(&vars);
        }
    }

    for ctor in &mut decl.constructors {
        for param in &mut ctor.params {
            param.ty = param.ty.bind_type_vars(&class_vars);
        }
        for thrown in &mut ctor.throws {
            *thrown = thrown.bind_type_vars(&class_vars);
        }
    }
}

#[cfg(test)]
#[path = "index/index_tests.rs"]
mod index_tests;
