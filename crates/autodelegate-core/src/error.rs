//! Error types for loading the declaration model and configuration

use thiserror::Error;

/// Errors raised while loading a declaration model export.
#[derive(Debug, Error)]
pub enum ModelError {
    /// I/O error while reading the export.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed JSON, including unparsable type strings.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Two declarations share a qualified name.
    #[error("duplicate declaration: {0}")]
    DuplicateDeclaration(String),

    /// A declaration is structurally invalid.
    #[error("invalid declaration {name}: {reason}")]
    InvalidDeclaration { name: String, reason: String },
}

/// Errors raised while loading or validating generator configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error while reading the configuration file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed TOML.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// A setting has an unusable value.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}
