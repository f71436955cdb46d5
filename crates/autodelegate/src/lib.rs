//! autodelegate - forwarding delegate generation
//!
//! Given a class annotated with the trigger annotation, the processor
//! generates its abstract superclass: an implementation of every contract
//! interface that forwards each abstract member to a wrapped instance, minus
//! the members the annotated class already implements.
//!
//! # Architecture
//!
//! ```text
//! DeclarationSource
//!     ↓
//!  [extract]  → ContractModel
//!     ↓
//!  [resolve]  → ResolutionPlan (to_forward / satisfied / inherited)
//!     ↓
//!  [check]    → CheckedPlan   ──→ conflicts ──→ [report] → Messager
//!     ↓
//!  [emit]     → GeneratedFile ──→ Filer
//! ```
//!
//! [`AutoDelegateProcessor`] drives the pipeline once per build round.
//!
//! # Example
//!
//! ```no_run
//! use autodelegate::{AutoDelegateProcessor, CollectingMessager, MemoryFiler, Round};
//! use autodelegate_core::{DeclarationIndex, GeneratorConfig};
//!
//! let index = DeclarationIndex::from_file("model.json")?;
//! let config = GeneratorConfig::default();
//! let mut processor = AutoDelegateProcessor::new(config.clone());
//! let mut filer = MemoryFiler::new();
//! let mut messager = CollectingMessager::new();
//!
//! processor.process(&Round::annotated(&index, &config), &index, &mut filer, &mut messager);
//! # Ok::<(), autodelegate_core::ModelError>(())
//! ```

pub mod check;
pub mod diagnostic;
pub mod driver;
pub mod emit;
pub mod extract;
pub mod filer;
pub mod model;
pub mod naming;
pub mod resolve;

#[cfg(test)]
mod test_support;

pub use check::{CheckOutcome, CheckedPlan, WrappedAccess, check};
pub use diagnostic::{CollectingMessager, Conflict, ConflictKind, Diagnostic, Messager, Severity};
pub use driver::{
    AutoDelegateProcessor, DeclarationOutcome, IncrementalKind, ProcessorDescriptor, Round,
    RoundState, RoundSummary, process_declaration,
};
pub use emit::{GeneratedClassSpec, GeneratedFile, emit};
pub use extract::extract;
pub use filer::{DirectoryFiler, Filer, FilerError, MemoryFiler};
pub use model::{ContractModel, ErasedSignature, MemberSignature};
pub use resolve::{OverrideSet, ResolutionPlan, resolve};
