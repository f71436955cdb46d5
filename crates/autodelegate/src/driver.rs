//! Processing-round driver.
//!
//! Each round moves through `Collecting` (root elements carrying the trigger
//! annotation) and `Processing` (every collected declaration on its own)
//! before returning to `Idle`. The only state kept between rounds is the set
//! of declarations already processed, so a host that hands the same element
//! over twice gets an internal diagnostic instead of a duplicate file.

use crate::check::check;
use crate::diagnostic::{self, Conflict, ConflictKind, Messager};
use crate::emit::{GeneratedFile, emit};
use crate::extract::extract;
use crate::filer::Filer;
use crate::resolve::resolve;
use autodelegate_core::{DeclarationSource, GeneratorConfig, TypeDecl};
use serde::Serialize;
use std::any::Any;
use std::collections::BTreeSet;
use std::panic::{self, AssertUnwindSafe};

/// How the processor's output depends on its input, as declared to
/// incremental builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IncrementalKind {
    /// Each output depends on one annotated declaration and the types it
    /// references.
    Isolating,
    /// Outputs depend on the whole compilation.
    Aggregating,
}

/// What the host needs to discover and schedule the processor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessorDescriptor {
    pub processor: String,
    pub supported_annotations: Vec<String>,
    pub incremental: IncrementalKind,
}

impl ProcessorDescriptor {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// One build round as handed over by the host.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Round {
    /// Qualified names of the round's root elements.
    pub root_elements: Vec<String>,

    /// Set on the final round, after which nothing new is generated.
    pub processing_over: bool,
}

impl Round {
    pub fn new<S: Into<String>>(root_elements: impl IntoIterator<Item = S>) -> Self {
        Self {
            root_elements: root_elements.into_iter().map(Into::into).collect(),
            processing_over: false,
        }
    }

    /// The final, empty round.
    pub fn over() -> Self {
        Self {
            root_elements: Vec::new(),
            processing_over: true,
        }
    }

    /// A round whose root elements are every declaration in `source`
    /// carrying the trigger annotation.
    pub fn annotated(source: &dyn DeclarationSource, config: &GeneratorConfig) -> Self {
        Self::new(
            source
                .annotated_with(&config.annotation)
                .into_iter()
                .map(TypeDecl::qualified_name),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RoundState {
    #[default]
    Idle,
    Collecting,
    Processing,
}

/// Result of one round.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoundSummary {
    /// Qualified names of the classes written.
    pub generated: Vec<String>,

    /// Declarations that produced at least one diagnostic.
    pub failed: Vec<String>,
}

/// Result of running the pipeline on one declaration.
#[derive(Debug, Clone)]
pub struct DeclarationOutcome {
    /// `None` when extraction failed or a class-fatal conflict was found.
    pub file: Option<GeneratedFile>,
    pub conflicts: Vec<Conflict>,
}

/// Extract, resolve, check and emit one declaration.
///
/// Pure: nothing is written or reported.
pub fn process_declaration(
    decl: &TypeDecl,
    source: &dyn DeclarationSource,
    config: &GeneratorConfig,
) -> DeclarationOutcome {
    let model = match extract(decl, source, config) {
        Ok(model) => model,
        Err(conflicts) => {
            return DeclarationOutcome {
                file: None,
                conflicts,
            };
        }
    };
    let plan = resolve(&model, decl, source, config);
    let outcome = check(&model, plan, source, config);
    let file = outcome.plan.as_ref().map(|plan| emit(plan, source, config));

    DeclarationOutcome {
        file,
        conflicts: outcome.conflicts,
    }
}

/// The delegate annotation processor.
#[derive(Debug)]
pub struct AutoDelegateProcessor {
    config: GeneratorConfig,
    processed: BTreeSet<String>,
    state: RoundState,
}

impl AutoDelegateProcessor {
    pub fn new(config: GeneratorConfig) -> Self {
        Self {
            config,
            processed: BTreeSet::new(),
            state: RoundState::Idle,
        }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn state(&self) -> RoundState {
        self.state
    }

    /// Output depends only on the annotated declaration's own hierarchy.
    pub fn incremental_kind(&self) -> IncrementalKind {
        IncrementalKind::Isolating
    }

    pub fn descriptor(&self) -> ProcessorDescriptor {
        ProcessorDescriptor {
            processor: self.config.generator_name.clone(),
            supported_annotations: vec![self.config.annotation.clone()],
            incremental: self.incremental_kind(),
        }
    }

    /// Run one round.
    ///
    /// Every conflict is reported through `messager`; nothing is returned as
    /// an error, and one declaration's failure never stops the others.
    pub fn process(
        &mut self,
        round: &Round,
        source: &dyn DeclarationSource,
        filer: &mut dyn Filer,
        messager: &mut dyn Messager,
    ) -> RoundSummary {
        let mut summary = RoundSummary::default();
        if round.processing_over {
            tracing::debug!("final round, nothing to do");
            return summary;
        }

        self.state = RoundState::Collecting;
        let collected = self.collect(round, source);

        self.state = RoundState::Processing;
        for decl in collected {
            let name = decl.qualified_name();
            let outcome = if self.processed.insert(name.clone()) {
                self.generate(decl, source, filer)
            } else {
                DeclarationOutcome {
                    file: None,
                    conflicts: vec![
                        Conflict::new(
                            ConflictKind::InternalReprocessing,
                            &name,
                            format!("{name} was already processed in an earlier round"),
                        )
                        .at(decl.location.as_ref()),
                    ],
                }
            };

            if let Some(file) = &outcome.file {
                summary.generated.push(file.qualified_name.clone());
            }
            if !outcome.conflicts.is_empty() {
                summary.failed.push(name);
                diagnostic::report(messager, &outcome.conflicts);
            }
        }

        self.state = RoundState::Idle;
        tracing::info!(
            generated = summary.generated.len(),
            failed = summary.failed.len(),
            "round complete"
        );
        summary
    }

    fn collect<'s>(&self, round: &Round, source: &'s dyn DeclarationSource) -> Vec<&'s TypeDecl> {
        let mut collected = Vec::new();
        for name in &round.root_elements {
            match source.lookup(name) {
                None => tracing::warn!(element = %name, "root element not found in declaration model"),
                Some(decl) if decl.annotation(&self.config.annotation).is_none() => {
                    tracing::debug!(element = %name, "not annotated, skipping");
                }
                Some(decl) => collected.push(decl),
            }
        }
        tracing::debug!(count = collected.len(), "collected annotated declarations");
        collected
    }

    /// Run the pipeline on one declaration and write its file.
    fn generate(
        &self,
        decl: &TypeDecl,
        source: &dyn DeclarationSource,
        filer: &mut dyn Filer,
    ) -> DeclarationOutcome {
        let name = decl.qualified_name();
        tracing::debug!(declaration = %name, "processing");

        let config = &self.config;
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            process_declaration(decl, source, config)
        }));
        let mut outcome = match result {
            Ok(outcome) => outcome,
            Err(payload) => {
                let message = panic_to_string(payload.as_ref());
                tracing::error!(declaration = %name, "panic while processing: {message}");
                return DeclarationOutcome {
                    file: None,
                    conflicts: vec![
                        Conflict::new(ConflictKind::InternalError, &name, message)
                            .at(decl.location.as_ref()),
                    ],
                };
            }
        };

        if let Some(file) = &outcome.file {
            match filer.create_source_file(&file.qualified_name, &file.contents) {
                Ok(()) => tracing::debug!(class = %file.qualified_name, "wrote delegate class"),
                Err(err) => {
                    outcome.conflicts.push(
                        Conflict::new(
                            ConflictKind::FileWrite,
                            &name,
                            format!("could not create {}: {err}", file.qualified_name),
                        )
                        .at(decl.location.as_ref()),
                    );
                    outcome.file = None;
                }
            }
        }
        outcome
    }
}

/// Human-readable text of a panic payload.
fn panic_to_string(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("processor panicked: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("processor panicked: {s}")
    } else {
        "processor panicked with unknown payload".to_string()
    }
}

#[cfg(test)]
#[path = "driver/driver_tests.rs"]
mod driver_tests;
