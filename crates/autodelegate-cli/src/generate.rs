//! `autodelegate generate`

use anyhow::{Context, Result, bail};
use autodelegate::{
    AutoDelegateProcessor, CollectingMessager, Diagnostic, DirectoryFiler, Round, RoundSummary,
};
use autodelegate_core::{DeclarationIndex, GeneratorConfig};
use std::path::Path;

/// What one generation run produced.
#[derive(Debug)]
pub struct GenerateReport {
    pub summary: RoundSummary,
    pub diagnostics: Vec<Diagnostic>,
}

/// Generate delegate classes for `model` under `output`.
///
/// Fails if any diagnostic was reported; files for declarations without
/// errors are still written.
pub fn run(model: &Path, output: &Path, config: &GeneratorConfig, elements: Vec<String>) -> Result<()> {
    let index = DeclarationIndex::from_file(model)
        .with_context(|| format!("Failed to load model: {}", model.display()))?;
    tracing::debug!(declarations = index.len(), model = %model.display(), "loaded declaration model");

    let report = generate(&index, output, config, elements);

    for diagnostic in &report.diagnostics {
        eprintln!("{diagnostic}");
    }
    for name in &report.summary.generated {
        println!("✓ Generated {name}");
    }

    if !report.diagnostics.is_empty() {
        bail!(
            "{} error(s) reported for {} declaration(s)",
            report.diagnostics.len(),
            report.summary.failed.len()
        );
    }
    Ok(())
}

/// Run one round plus the final round against a directory filer.
pub fn generate(
    index: &DeclarationIndex,
    output: &Path,
    config: &GeneratorConfig,
    elements: Vec<String>,
) -> GenerateReport {
    let round = if elements.is_empty() {
        Round::annotated(index, config)
    } else {
        Round::new(elements)
    };

    let mut processor = AutoDelegateProcessor::new(config.clone());
    let mut filer = DirectoryFiler::new(output);
    let mut messager = CollectingMessager::new();
    let summary = processor.process(&round, index, &mut filer, &mut messager);
    processor.process(&Round::over(), index, &mut filer, &mut messager);

    GenerateReport {
        summary,
        diagnostics: messager.into_diagnostics(),
    }
}
