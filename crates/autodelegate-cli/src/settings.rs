//! Configuration file discovery.

use anyhow::{Context, Result};
use autodelegate_core::GeneratorConfig;
use std::path::Path;

/// Looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "autodelegate.toml";

/// Load and validate the configuration.
///
/// An explicit path must exist. Without one, `./autodelegate.toml` is used if
/// present, else the defaults.
pub fn load(path: Option<&Path>) -> Result<GeneratorConfig> {
    load_from(path, Path::new(DEFAULT_CONFIG_FILE))
}

fn load_from(path: Option<&Path>, fallback: &Path) -> Result<GeneratorConfig> {
    let config = match path {
        Some(path) => GeneratorConfig::from_file(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None if fallback.exists() => GeneratorConfig::from_file(fallback)
            .with_context(|| format!("Failed to load config: {}", fallback.display()))?,
        None => GeneratorConfig::default(),
    };
    config.validate().context("Invalid configuration")?;
    Ok(config)
}
