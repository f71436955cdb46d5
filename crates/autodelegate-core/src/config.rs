//! Generator configuration

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Settings for the delegate generator, usually read from `autodelegate.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Qualified name of the trigger annotation.
    #[serde(default = "default_annotation")]
    pub annotation: String,

    /// Qualified name of the annotation marking a wrapped-instance accessor.
    #[serde(default = "default_accessor_annotation")]
    pub accessor_annotation: String,

    /// Prefix of generated class names (`<prefix>Outer_Inner`).
    #[serde(default = "default_class_prefix")]
    pub class_prefix: String,

    /// Java release the generated sources target.
    ///
    /// Selects which `@Generated` annotation is emitted.
    #[serde(default = "default_release")]
    pub release: u32,

    /// Package prefixes whose types are assumed to exist and be public even
    /// when absent from the model.
    #[serde(default = "default_platform_packages")]
    pub platform_packages: Vec<String>,

    /// Value of the `@Generated` annotation.
    #[serde(default = "default_generator_name")]
    pub generator_name: String,

    /// Default log level when `RUST_LOG` is not set
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_annotation() -> String {
    "autodelegate.AutoDelegate".to_string()
}

fn default_accessor_annotation() -> String {
    "autodelegate.AutoDelegate.Wrapped".to_string()
}

fn default_class_prefix() -> String {
    "AutoDelegate_".to_string()
}

fn default_release() -> u32 {
    17
}

fn default_platform_packages() -> Vec<String> {
    vec!["java.".to_string(), "javax.".to_string()]
}

fn default_generator_name() -> String {
    "autodelegate.AutoDelegateProcessor".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            annotation: default_annotation(),
            accessor_annotation: default_accessor_annotation(),
            class_prefix: default_class_prefix(),
            release: default_release(),
            platform_packages: default_platform_packages(),
            generator_name: default_generator_name(),
            log_level: default_log_level(),
        }
    }
}

impl GeneratorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(toml::from_str(content)?)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.annotation.trim().is_empty() {
            return Err(ConfigError::Invalid("annotation cannot be empty".into()));
        }
        if self.accessor_annotation.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "accessor_annotation cannot be empty".into(),
            ));
        }
        if self.annotation == self.accessor_annotation {
            return Err(ConfigError::Invalid(
                "annotation and accessor_annotation must differ".into(),
            ));
        }

        let mut chars = self.class_prefix.chars();
        let starts_identifier = chars
            .next()
            .is_some_and(|c| c.is_alphabetic() || c == '_' || c == '$');
        if !starts_identifier || !chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$') {
            return Err(ConfigError::Invalid(format!(
                "class_prefix `{}` is not a valid Java identifier prefix",
                self.class_prefix
            )));
        }

        if self.release < 6 {
            return Err(ConfigError::Invalid(format!(
                "release {} is not supported (minimum 6)",
                self.release
            )));
        }
        if self.platform_packages.iter().any(|p| p.trim().is_empty()) {
            return Err(ConfigError::Invalid(
                "platform_packages entries cannot be empty".into(),
            ));
        }
        if self.generator_name.trim().is_empty() {
            return Err(ConfigError::Invalid("generator_name cannot be empty".into()));
        }

        Ok(())
    }

    /// Whether `qualified_name` lives under a platform package.
    pub fn is_platform_type(&self, qualified_name: &str) -> bool {
        self.platform_packages
            .iter()
            .any(|prefix| qualified_name.starts_with(prefix.as_str()))
    }

    /// Qualified name of the `@Generated` annotation for the target release.
    ///
    /// `javax.annotation.Generated` was removed from the JDK after release 8.
    pub fn generated_annotation(&self) -> &'static str {
        if self.release > 8 {
            "javax.annotation.processing.Generated"
        } else {
            "javax.annotation.Generated"
        }
    }
}
