//! `autodelegate check`

use anyhow::{Context, Result, bail};
use autodelegate::{CollectingMessager, Diagnostic, diagnostic, process_declaration};
use autodelegate_core::{DeclarationIndex, DeclarationSource, GeneratorConfig};
use std::path::Path;

/// Counts and diagnostics from a dry run over a model.
#[derive(Debug, Default)]
pub struct ModelReport {
    pub declarations: usize,
    pub annotated: usize,
    pub would_generate: usize,
    pub diagnostics: Vec<Diagnostic>,
}

/// Report the validated configuration and, when given, dry-run the model.
pub fn run(config: &GeneratorConfig, model: Option<&Path>) -> Result<()> {
    println!("✓ Configuration valid");
    println!("  Annotation: {}", config.annotation);
    println!("  Class prefix: {}", config.class_prefix);
    println!("  Release: {}", config.release);

    let Some(model) = model else {
        return Ok(());
    };

    let index = DeclarationIndex::from_file(model)
        .with_context(|| format!("Failed to load model: {}", model.display()))?;
    let report = dry_run(&index, config);

    println!("✓ Model loaded: {}", model.display());
    println!("  Declarations: {}", report.declarations);
    println!("  Annotated: {}", report.annotated);
    println!("  Would generate: {}", report.would_generate);

    for diagnostic in &report.diagnostics {
        eprintln!("{diagnostic}");
    }
    if !report.diagnostics.is_empty() {
        bail!("{} error(s) found in model", report.diagnostics.len());
    }
    Ok(())
}

/// Run the pipeline on every annotated declaration without writing anything.
pub fn dry_run(index: &DeclarationIndex, config: &GeneratorConfig) -> ModelReport {
    let annotated = index.annotated_with(&config.annotation);
    let mut report = ModelReport {
        declarations: index.len(),
        annotated: annotated.len(),
        ..ModelReport::default()
    };

    let mut messager = CollectingMessager::new();
    for decl in annotated {
        let outcome = process_declaration(decl, index, config);
        if outcome.file.is_some() {
            report.would_generate += 1;
        }
        diagnostic::report(&mut messager, &outcome.conflicts);
    }
    report.diagnostics = messager.into_diagnostics();
    report
}
