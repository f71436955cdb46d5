//! Conflicts and the diagnostics reported for them.
//!
//! Every pipeline failure is a [`Conflict`]. The reporter turns conflicts into
//! [`Diagnostic`]s and pushes them to the host's [`Messager`]; nothing in the
//! processor surfaces errors any other way.

use autodelegate_core::SourceLocation;
use std::fmt;
use thiserror::Error;

/// Kinds of conflicts, in the order they are documented to users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ConflictKind {
    /// The declaration or one of its members cannot be generated for.
    UnsupportedDeclarationKind,
    /// Override-equivalent members with incompatible signatures.
    AmbiguousOverride,
    /// No constructor parameter or accessor supplies a wrapped instance.
    MissingWrappedInstanceAccess,
    /// A forwarded signature names a type the generated package cannot see.
    InaccessibleReferencedType,
    /// A user method matches a member but cannot override it.
    IncompatibleOverrideSignature,
    /// A referenced type is absent from the declaration model.
    UndefinedType,
    /// The same element was handed to the processor twice.
    InternalReprocessing,
    /// The host refused or failed to create the generated file.
    FileWrite,
    /// Processing a declaration panicked.
    InternalError,
}

impl ConflictKind {
    pub fn tag(self) -> &'static str {
        match self {
            ConflictKind::UnsupportedDeclarationKind => "UnsupportedDeclarationKind",
            ConflictKind::AmbiguousOverride => "AmbiguousOverride",
            ConflictKind::MissingWrappedInstanceAccess => "MissingWrappedInstanceAccess",
            ConflictKind::InaccessibleReferencedType => "InaccessibleReferencedType",
            ConflictKind::IncompatibleOverrideSignature => "IncompatibleOverrideSignature",
            ConflictKind::UndefinedType => "UndefinedType",
            ConflictKind::InternalReprocessing => "InternalReprocessing",
            ConflictKind::FileWrite => "FileWrite",
            ConflictKind::InternalError => "InternalError",
        }
    }

    /// Whether a conflict of this kind suppresses emission for the whole
    /// declaration when it reaches the checker.
    pub fn is_class_fatal(self) -> bool {
        matches!(self, ConflictKind::MissingWrappedInstanceAccess)
    }

    /// Whether the conflict signals a processor or host fault rather than a
    /// problem in user code.
    pub fn is_internal(self) -> bool {
        matches!(
            self,
            ConflictKind::InternalReprocessing | ConflictKind::InternalError
        )
    }
}

impl fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A single failure found while processing one declaration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("[{kind}] {message}")]
pub struct Conflict {
    pub kind: ConflictKind,
    pub message: String,

    /// Qualified name of the offending element; members are written
    /// `Type#name(erased, params)`.
    pub element: String,

    pub location: Option<SourceLocation>,
}

impl Conflict {
    pub fn new(kind: ConflictKind, element: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            element: element.into(),
            location: None,
        }
    }

    /// Attach a source location.
    pub fn at(mut self, location: Option<&SourceLocation>) -> Self {
        self.location = location.cloned();
        self
    }

    pub fn unsupported(element: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ConflictKind::UnsupportedDeclarationKind, element, message)
    }

    pub fn undefined(element: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ConflictKind::UndefinedType, element, message)
    }

    pub fn inaccessible(element: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ConflictKind::InaccessibleReferencedType, element, message)
    }

    pub fn incompatible(element: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ConflictKind::IncompatibleOverrideSignature, element, message)
    }
}

/// Severity of a reported diagnostic.
///
/// Conflicts always leave the generated class incomplete or absent, so every
/// diagnostic is an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
        }
    }
}

/// A message for the host's compiler-message sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub kind: ConflictKind,
    pub message: String,
    pub element: String,
    pub location: Option<SourceLocation>,
}

impl From<&Conflict> for Diagnostic {
    fn from(conflict: &Conflict) -> Self {
        let message = if conflict.kind.is_internal() {
            format!(
                "internal error in delegate generator: {conflict} (please report this)"
            )
        } else {
            conflict.to_string()
        };
        Self {
            severity: Severity::Error,
            kind: conflict.kind,
            message,
            element: conflict.element.clone(),
            location: conflict.location.clone(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.location {
            Some(location) => write!(f, "{location}: {}: {}", self.severity, self.message),
            None => write!(f, "{}: {} ({})", self.severity, self.message, self.element),
        }
    }
}

/// The host's compiler-message channel.
pub trait Messager {
    fn report(&mut self, diagnostic: Diagnostic);
}

/// A [`Messager`] that keeps every diagnostic in report order.
#[derive(Debug, Default)]
pub struct CollectingMessager {
    diagnostics: Vec<Diagnostic>,
}

impl CollectingMessager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    /// Number of diagnostics of the given kind.
    pub fn count(&self, kind: ConflictKind) -> usize {
        self.diagnostics.iter().filter(|d| d.kind == kind).count()
    }
}

impl Messager for CollectingMessager {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }
}

/// Report every conflict, in order.
pub fn report(messager: &mut dyn Messager, conflicts: &[Conflict]) {
    for conflict in conflicts {
        tracing::debug!(element = %conflict.element, kind = %conflict.kind, "reporting conflict");
        messager.report(Diagnostic::from(conflict));
    }
}
