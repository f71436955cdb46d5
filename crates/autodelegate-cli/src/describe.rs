//! `autodelegate describe`

use anyhow::{Context, Result};
use autodelegate::AutoDelegateProcessor;
use autodelegate_core::GeneratorConfig;

/// Print the descriptor a build tool needs to register the processor.
pub fn run(config: &GeneratorConfig) -> Result<()> {
    let json = AutoDelegateProcessor::new(config.clone())
        .descriptor()
        .to_json()
        .context("Failed to serialize processor descriptor")?;
    println!("{json}");
    Ok(())
}
