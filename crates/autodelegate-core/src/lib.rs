//! autodelegate-core - Declaration model, type syntax and configuration
//!
//! This crate provides the read-only view of the host compilation that the
//! delegate generator works from:
//! - [`TypeRef`] Java type references, their parser, erasure and substitution
//! - [`TypeDecl`] and friends, the declarations exported by the host
//! - [`DeclarationSource`] the queryable model, implemented by [`DeclarationIndex`]
//! - [`GeneratorConfig`] generator settings loaded from `autodelegate.toml`

mod config;
mod decl;
mod error;
mod index;
mod types;

pub use config::GeneratorConfig;
pub use decl::{
    AnnotationDecl, AnnotationValue, ConstructorDecl, DeclKind, MethodDecl, ModelFile, Modifier,
    Param, SourceLocation, TypeDecl, TypeParam, Visibility,
};
pub use error::{ConfigError, ModelError};
pub use index::{DeclarationIndex, DeclarationSource};
pub use types::{
    OBJECT, Primitive, TypeParseError, TypeRef, TypeScope, WildcardBound, bindings, simple_name,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        DeclKind, DeclarationIndex, DeclarationSource, GeneratorConfig, MethodDecl, SourceLocation,
        TypeDecl, TypeRef, Visibility,
    };
}
