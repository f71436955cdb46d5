//! Validity checks run between resolution and emission.
//!
//! Per member, the first failing check wins: ambiguity, then an unsupported
//! member kind, then an unreachable referenced type. Failures of different
//! members are all collected. A contract without any way to obtain its
//! wrapped instance fails the whole declaration.

use crate::diagnostic::{Conflict, ConflictKind};
use crate::model::{ContractModel, MemberSignature};
use crate::resolve::ResolutionPlan;
use autodelegate_core::{DeclarationSource, GeneratorConfig, simple_name};

/// How the generated class reaches one contract's wrapped instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WrappedAccess {
    /// A `private final` field set by the generated constructors.
    Field,
    /// An abstract accessor the annotated class implements.
    Accessor { method: String },
}

/// A plan that passed checking, ready for emission.
#[derive(Debug, Clone)]
pub struct CheckedPlan<'m> {
    pub model: &'m ContractModel,

    /// Members to forward, in declaration order, without failing members.
    pub to_forward: Vec<&'m MemberSignature>,

    /// One entry per contract, in contract order.
    pub access: Vec<WrappedAccess>,
}

#[derive(Debug, Clone)]
pub struct CheckOutcome<'m> {
    pub conflicts: Vec<Conflict>,

    /// `None` when a class-fatal conflict suppresses emission.
    pub plan: Option<CheckedPlan<'m>>,
}

impl CheckOutcome<'_> {
    pub fn is_fatal(&self) -> bool {
        self.plan.is_none()
    }
}

/// Check `plan`, keeping the resolver's conflicts ahead of the checker's own.
pub fn check<'m>(
    model: &'m ContractModel,
    plan: ResolutionPlan<'m>,
    source: &dyn DeclarationSource,
    config: &GeneratorConfig,
) -> CheckOutcome<'m> {
    let ResolutionPlan {
        to_forward: candidates,
        overrides,
        conflicts: mut resolved,
        ..
    } = plan;

    let mut ambiguous = Vec::new();
    let mut unsupported = Vec::new();
    let mut unreachable = Vec::new();
    let mut to_forward = Vec::new();
    for member in candidates {
        if !member.ambiguous_with.is_empty() {
            ambiguous.push(ambiguity(model, member));
        } else if let Some(reason) = &member.unsupported {
            unsupported.push(member_conflict(
                model,
                member,
                ConflictKind::UnsupportedDeclarationKind,
                format!("{} is {reason} and cannot be overridden", member.element()),
            ));
        } else if let Some(conflict) = unreachable_type(model, member, source, config) {
            unreachable.push(conflict);
        } else {
            to_forward.push(member);
        }
    }

    let mut missing = Vec::new();
    let access: Vec<WrappedAccess> = model
        .contracts
        .iter()
        .enumerate()
        .map(|(i, contract)| {
            if let Some(method) = overrides.accessors.get(&i) {
                WrappedAccess::Accessor {
                    method: method.clone(),
                }
            } else {
                if !overrides.constructor_access.contains(&i) {
                    missing.push(
                        Conflict::new(
                            ConflictKind::MissingWrappedInstanceAccess,
                            &model.declaration,
                            format!(
                                "{} has no constructor taking a {} and no @{} accessor returning one",
                                model.declaration,
                                contract.qualified_name,
                                simple_name(&config.accessor_annotation)
                            ),
                        )
                        .at(model.location.as_ref()),
                    );
                }
                WrappedAccess::Field
            }
        })
        .collect();

    resolved.extend(ambiguous);
    resolved.extend(missing);
    resolved.extend(unsupported);
    resolved.extend(unreachable);
    let fatal = resolved.iter().any(|c| c.kind.is_class_fatal());

    tracing::debug!(
        declaration = %model.declaration,
        forward = to_forward.len(),
        conflicts = resolved.len(),
        fatal,
        "checked plan"
    );

    CheckOutcome {
        conflicts: resolved,
        plan: (!fatal).then(|| CheckedPlan {
            model,
            to_forward,
            access,
        }),
    }
}

/// A conflict on `member`, located at the member or else the declaration.
fn member_conflict(
    model: &ContractModel,
    member: &MemberSignature,
    kind: ConflictKind,
    message: String,
) -> Conflict {
    Conflict::new(kind, member.element(), message)
        .at(member.location.as_ref().or(model.location.as_ref()))
}

fn ambiguity(model: &ContractModel, member: &MemberSignature) -> Conflict {
    let message = format!(
        "{} in {} clashes with a member of {} that has the same erasure",
        member.erased,
        member.declaring_type(),
        member.ambiguous_with.join(", ")
    );
    member_conflict(model, member, ConflictKind::AmbiguousOverride, message)
}

/// The first referenced type the generated package cannot name.
fn unreachable_type(
    model: &ContractModel,
    member: &MemberSignature,
    source: &dyn DeclarationSource,
    config: &GeneratorConfig,
) -> Option<Conflict> {
    let package = &model.target.package;
    member.referenced_types().into_iter().find_map(|name| {
        match source.lookup(&name) {
            Some(decl) if source.is_accessible_from(decl, package) => None,
            Some(_) => Some(member_conflict(
                model,
                member,
                ConflictKind::InaccessibleReferencedType,
                format!(
                    "{name} in the signature of {} is not accessible from {}",
                    member.element(),
                    model.target.qualified_name()
                ),
            )),
            None if config.is_platform_type(&name) => None,
            None => Some(member_conflict(
                model,
                member,
                ConflictKind::UndefinedType,
                format!("{name} in the signature of {} is not defined", member.element()),
            )),
        }
    })
}
