#![allow(non_snake_case)]

use super::*;
use crate::diagnostic::CollectingMessager;
use crate::filer::MemoryFiler;
use crate::test_support::{bag, config, delegate, index, wrapping_constructor};
use autodelegate_core::DeclarationIndex;
use serde_json::{Value, json};

fn bag_index() -> DeclarationIndex {
    index(json!([
        bag(),
        delegate(&["foo.bar.Bag"], json!([]), wrapping_constructor("foo.bar.Bag"))
    ]))
}

/// A second delegate `foo.bar.D` with no way to reach its wrapped instance.
fn broken_delegate() -> Value {
    let mut d = delegate(&["foo.bar.Bag"], json!([]), json!([]));
    d["name"] = json!("D");
    d["superclass"] = json!("foo.bar.AutoDelegate_D");
    d
}

fn run(processor: &mut AutoDelegateProcessor, round: &Round, source: &dyn DeclarationSource) -> (RoundSummary, MemoryFiler, CollectingMessager) {
    let mut filer = MemoryFiler::new();
    let mut messager = CollectingMessager::new();
    let summary = processor.process(round, source, &mut filer, &mut messager);
    (summary, filer, messager)
}

// ============================================================================
// Discovery
// ============================================================================

#[test]
fn descriptor___default_config___declares_isolating_trigger_annotation() {
    let processor = AutoDelegateProcessor::new(config());

    let descriptor = processor.descriptor();

    assert_eq!(descriptor.supported_annotations, vec!["autodelegate.AutoDelegate"]);
    assert_eq!(descriptor.incremental, IncrementalKind::Isolating);
    assert_eq!(descriptor.processor, "autodelegate.AutoDelegateProcessor");
}

#[test]
fn descriptor___to_json___uses_lowercase_incremental_kind() {
    let json = AutoDelegateProcessor::new(config()).descriptor().to_json().unwrap();
    let value: Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["incremental"], "isolating");
    assert_eq!(value["supported_annotations"][0], "autodelegate.AutoDelegate");
}

#[test]
fn round_annotated___lists_only_annotated_declarations() {
    let round = Round::annotated(&bag_index(), &config());

    assert_eq!(round.root_elements, vec!["foo.bar.C"]);
    assert!(!round.processing_over);
}

// ============================================================================
// Rounds
// ============================================================================

#[test]
fn process___valid_declaration___writes_one_file() {
    let index = bag_index();
    let mut processor = AutoDelegateProcessor::new(config());

    let (summary, filer, messager) = run(&mut processor, &Round::new(["foo.bar.C"]), &index);

    assert_eq!(summary.generated, vec!["foo.bar.AutoDelegate_C"]);
    assert!(summary.failed.is_empty());
    assert_eq!(filer.len(), 1);
    assert!(filer.get("foo.bar.AutoDelegate_C").unwrap().contains("public int size()"));
    assert!(!messager.has_errors());
    assert_eq!(processor.state(), RoundState::Idle);
}

#[test]
fn process___final_round___does_nothing() {
    let index = bag_index();
    let mut processor = AutoDelegateProcessor::new(config());

    let mut round = Round::over();
    round.root_elements.push("foo.bar.C".into());
    let (summary, filer, messager) = run(&mut processor, &round, &index);

    assert_eq!(summary, RoundSummary::default());
    assert!(filer.is_empty());
    assert!(messager.diagnostics().is_empty());
}

#[test]
fn process___same_element_in_later_round___reports_internal_reprocessing() {
    let index = bag_index();
    let mut processor = AutoDelegateProcessor::new(config());
    let round = Round::new(["foo.bar.C"]);
    run(&mut processor, &round, &index);

    let (summary, filer, messager) = run(&mut processor, &round, &index);

    assert!(summary.generated.is_empty());
    assert!(filer.is_empty());
    assert_eq!(messager.diagnostics().len(), 1);
    let diagnostic = &messager.diagnostics()[0];
    assert_eq!(diagnostic.kind, ConflictKind::InternalReprocessing);
    assert!(diagnostic.message.starts_with("internal error in delegate generator"));
}

#[test]
fn process___failing_declaration___does_not_affect_others() {
    let index = index(json!([
        bag(),
        delegate(&["foo.bar.Bag"], json!([]), wrapping_constructor("foo.bar.Bag")),
        broken_delegate()
    ]));
    let mut processor = AutoDelegateProcessor::new(config());

    let (summary, filer, messager) = run(&mut processor, &Round::new(["foo.bar.D", "foo.bar.C"]), &index);

    assert_eq!(summary.generated, vec!["foo.bar.AutoDelegate_C"]);
    assert_eq!(summary.failed, vec!["foo.bar.D"]);
    assert_eq!(filer.len(), 1);
    assert_eq!(messager.diagnostics().len(), 1);
    assert_eq!(messager.count(ConflictKind::MissingWrappedInstanceAccess), 1);
}

#[test]
fn process___unknown_or_unannotated_elements___are_skipped() {
    let index = bag_index();
    let mut processor = AutoDelegateProcessor::new(config());

    let (summary, filer, messager) = run(
        &mut processor,
        &Round::new(["foo.bar.Missing", "foo.bar.Bag"]),
        &index,
    );

    assert_eq!(summary, RoundSummary::default());
    assert!(filer.is_empty());
    assert!(messager.diagnostics().is_empty());
}

#[test]
fn process___existing_output___reports_file_write() {
    let index = bag_index();
    let mut processor = AutoDelegateProcessor::new(config());
    let mut filer = MemoryFiler::new();
    filer.create_source_file("foo.bar.AutoDelegate_C", "// mine").unwrap();
    let mut messager = CollectingMessager::new();

    let summary = processor.process(&Round::new(["foo.bar.C"]), &index, &mut filer, &mut messager);

    assert!(summary.generated.is_empty());
    assert_eq!(summary.failed, vec!["foo.bar.C"]);
    assert_eq!(filer.get("foo.bar.AutoDelegate_C"), Some("// mine"));
    assert_eq!(messager.count(ConflictKind::FileWrite), 1);
}

/// Delegates to an index but panics when asked for every declaration,
/// which only code generation does.
struct PanickingSource(DeclarationIndex);

impl DeclarationSource for PanickingSource {
    fn lookup(&self, qualified_name: &str) -> Option<&TypeDecl> {
        self.0.lookup(qualified_name)
    }

    fn declarations(&self) -> Vec<&TypeDecl> {
        panic!("declaration listing unavailable")
    }
}

#[test]
fn process___panic_in_pipeline___is_reported_as_internal_error() {
    let source = PanickingSource(bag_index());
    let mut processor = AutoDelegateProcessor::new(config());

    let (summary, filer, messager) = run(&mut processor, &Round::new(["foo.bar.C"]), &source);

    assert!(summary.generated.is_empty());
    assert!(filer.is_empty());
    assert_eq!(messager.count(ConflictKind::InternalError), 1);
    assert!(messager.diagnostics()[0].message.contains("declaration listing unavailable"));
    assert_eq!(processor.state(), RoundState::Idle);
}

// ============================================================================
// process_declaration and panic_to_string
// ============================================================================

#[test]
fn process_declaration___missing_access___returns_no_file() {
    let index = index(json!([bag(), broken_delegate()]));

    let outcome = process_declaration(index.lookup("foo.bar.D").unwrap(), &index, &config());

    assert!(outcome.file.is_none());
    assert_eq!(outcome.conflicts.len(), 1);
}

#[test]
fn panic_to_string___str_payload___formats_correctly() {
    let payload: Box<dyn Any + Send> = Box::new("boom");

    assert_eq!(panic_to_string(payload.as_ref()), "processor panicked: boom");
}

#[test]
fn panic_to_string___string_payload___formats_correctly() {
    let payload: Box<dyn Any + Send> = Box::new("owned".to_string());

    assert_eq!(panic_to_string(payload.as_ref()), "processor panicked: owned");
}

#[test]
fn panic_to_string___unknown_payload___returns_fallback() {
    let payload: Box<dyn Any + Send> = Box::new(42);

    assert_eq!(panic_to_string(payload.as_ref()), "processor panicked with unknown payload");
}
