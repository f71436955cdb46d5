//! Override resolution.
//!
//! Matches the annotated class's own methods against the contract members,
//! in the view the user has of the generated class (its type parameters
//! replaced by the arguments of the user's `extends` clause), and partitions
//! the members into those still needing a forwarding method and those already
//! implemented. Also collects the user's ways of supplying wrapped instances.

use crate::diagnostic::Conflict;
use crate::model::{ContractModel, ErasedSignature, MemberSignature};
use autodelegate_core::{
    DeclarationSource, GeneratorConfig, MethodDecl, OBJECT, TypeDecl, TypeParam, TypeRef,
    TypeScope, Visibility, bindings, simple_name,
};
use std::collections::{BTreeMap, BTreeSet};

const OVERRIDE: &str = "java.lang.Override";

/// Superclasses of the platform exceptions commonly thrown by contracts, so
/// their checked-ness is known without them being in the model.
const PLATFORM_EXCEPTIONS: &[(&str, &str)] = &[
    ("java.lang.Exception", "java.lang.Throwable"),
    ("java.lang.Error", "java.lang.Throwable"),
    ("java.lang.RuntimeException", "java.lang.Exception"),
    ("java.lang.InterruptedException", "java.lang.Exception"),
    ("java.lang.CloneNotSupportedException", "java.lang.Exception"),
    ("java.lang.ReflectiveOperationException", "java.lang.Exception"),
    ("java.io.IOException", "java.lang.Exception"),
    ("java.io.FileNotFoundException", "java.io.IOException"),
    ("java.io.EOFException", "java.io.IOException"),
    ("java.util.concurrent.TimeoutException", "java.lang.Exception"),
    ("java.util.concurrent.ExecutionException", "java.lang.Exception"),
    ("java.lang.IllegalArgumentException", "java.lang.RuntimeException"),
    ("java.lang.IllegalStateException", "java.lang.RuntimeException"),
    ("java.lang.UnsupportedOperationException", "java.lang.RuntimeException"),
    ("java.lang.NullPointerException", "java.lang.RuntimeException"),
    ("java.lang.IndexOutOfBoundsException", "java.lang.RuntimeException"),
    ("java.lang.ClassCastException", "java.lang.RuntimeException"),
    ("java.lang.ArithmeticException", "java.lang.RuntimeException"),
    ("java.util.NoSuchElementException", "java.lang.RuntimeException"),
    ("java.util.ConcurrentModificationException", "java.lang.RuntimeException"),
    ("java.io.UncheckedIOException", "java.lang.RuntimeException"),
    ("java.lang.AssertionError", "java.lang.Error"),
];

/// What the annotated class itself provides.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverrideSet {
    /// Members the user implements, by erased signature in the generated
    /// class's view.
    pub overrides: BTreeSet<ErasedSignature>,

    /// Accessor method name per contract index.
    pub accessors: BTreeMap<usize, String>,

    /// Contracts whose wrapped instance some user constructor accepts.
    pub constructor_access: BTreeSet<usize>,
}

/// The partition of a model's members.
#[derive(Debug, Clone)]
pub struct ResolutionPlan<'m> {
    pub to_forward: Vec<&'m MemberSignature>,
    pub satisfied: Vec<&'m MemberSignature>,

    /// Already implemented by a public method of the `extend` superclass.
    pub inherited: Vec<&'m MemberSignature>,

    pub overrides: OverrideSet,
    pub conflicts: Vec<Conflict>,
}

/// Partition `model`'s members against the methods of `delegate`.
pub fn resolve<'m>(
    model: &'m ContractModel,
    delegate: &TypeDecl,
    source: &dyn DeclarationSource,
    config: &GeneratorConfig,
) -> ResolutionPlan<'m> {
    let mut resolver = Resolver {
        model,
        delegate,
        source,
        config,
        view: UserView::new(model, delegate),
        overrides: OverrideSet::default(),
        rejected: BTreeSet::new(),
        conflicts: Vec::new(),
    };
    resolver.check_view_arity();
    resolver.match_methods();
    resolver.collect_constructor_access();

    let implemented_by_superclass: BTreeSet<ErasedSignature> = model
        .superclass
        .iter()
        .flat_map(|s| &s.methods)
        .filter(|m| m.implements_members)
        .map(|m| m.erased(&model.scope()))
        .collect();

    let mut plan = ResolutionPlan {
        to_forward: Vec::new(),
        satisfied: Vec::new(),
        inherited: Vec::new(),
        overrides: resolver.overrides,
        conflicts: resolver.conflicts,
    };
    for (i, member) in model.members.iter().enumerate() {
        if resolver.rejected.contains(&i) {
            continue;
        }
        if plan.overrides.overrides.contains(&member.erased) {
            plan.satisfied.push(member);
        } else if implemented_by_superclass.contains(&member.erased) {
            plan.inherited.push(member);
        } else {
            plan.to_forward.push(member);
        }
    }

    tracing::debug!(
        declaration = %model.declaration,
        forward = plan.to_forward.len(),
        satisfied = plan.satisfied.len(),
        inherited = plan.inherited.len(),
        "resolved overrides"
    );
    plan
}

/// The generated class as seen from the annotated class.
struct UserView {
    bindings: BTreeMap<String, TypeRef>,
    scope: TypeScope,
    arity_mismatch: Option<(usize, usize)>,
}

impl UserView {
    fn new(model: &ContractModel, delegate: &TypeDecl) -> Self {
        let args = delegate
            .superclass
            .as_ref()
            .map(TypeRef::type_args)
            .unwrap_or_default();
        let class_scope = model.scope();
        let erased = || {
            model
                .type_params
                .iter()
                .map(|p| (p.name.clone(), TypeRef::Var(p.name.clone()).erasure(&class_scope)))
                .collect()
        };

        let (bindings, arity_mismatch) = if args.is_empty() {
            (erased(), None)
        } else if args.len() == model.type_params.len() {
            (bindings(&model.type_params, args), None)
        } else {
            (erased(), Some((model.type_params.len(), args.len())))
        };

        Self {
            bindings,
            scope: TypeScope::with_params(&delegate.type_params),
            arity_mismatch,
        }
    }

    /// A member's signature substituted into the user's view.
    fn member(&self, member: &MemberSignature) -> ViewedMember {
        let mut b = self.bindings.clone();
        for tp in &member.type_params {
            b.remove(&tp.name);
        }
        let type_params: Vec<TypeParam> = member
            .type_params
            .iter()
            .map(|tp| TypeParam {
                name: tp.name.clone(),
                bounds: tp.bounds.iter().map(|t| t.substitute(&b)).collect(),
            })
            .collect();
        let mut scope = self.scope.clone();
        scope.push_params(&type_params);

        let params: Vec<TypeRef> = member.params.iter().map(|p| p.ty.substitute(&b)).collect();
        ViewedMember {
            erased: ErasedSignature::of(&member.name, &params, &scope),
            return_type: member.return_type.substitute(&b),
            throws: member.throws.iter().map(|t| t.substitute(&b)).collect(),
            scope,
        }
    }

    /// Scope of a user method: the annotated class's type parameters plus
    /// the method's own.
    fn method_scope(&self, method: &MethodDecl) -> TypeScope {
        let mut scope = self.scope.clone();
        scope.push_params(&method.type_params);
        scope
    }
}

struct ViewedMember {
    erased: ErasedSignature,
    return_type: TypeRef,
    throws: Vec<TypeRef>,
    scope: TypeScope,
}

struct Resolver<'m, 'a> {
    model: &'m ContractModel,
    delegate: &'a TypeDecl,
    source: &'a dyn DeclarationSource,
    config: &'a GeneratorConfig,
    view: UserView,
    overrides: OverrideSet,
    rejected: BTreeSet<usize>,
    conflicts: Vec<Conflict>,
}

impl Resolver<'_, '_> {
    fn method_element(&self, key: &ErasedSignature) -> String {
        format!("{}#{key}", self.model.declaration)
    }

    fn check_view_arity(&mut self) {
        if let Some((expected, found)) = self.view.arity_mismatch {
            self.conflicts.push(
                Conflict::unsupported(
                    &self.model.declaration,
                    format!(
                        "{} takes {expected} type argument(s), found {found}",
                        self.model.target.simple_name
                    ),
                )
                .at(self.model.location.as_ref()),
            );
        }
    }

    fn match_methods(&mut self) {
        let by_key: BTreeMap<ErasedSignature, usize> = self
            .model
            .members
            .iter()
            .enumerate()
            .map(|(i, m)| (self.view.member(m).erased, i))
            .collect();
        let superclass_keys: BTreeSet<ErasedSignature> = self
            .model
            .superclass
            .iter()
            .flat_map(|s| &s.methods)
            .map(|m| m.erased_with(&self.view.bindings, &self.view.scope))
            .collect();
        let default_keys: BTreeSet<ErasedSignature> = self
            .model
            .default_members
            .iter()
            .map(|m| self.view.member(m).erased)
            .collect();

        let (model, delegate) = (self.model, self.delegate);
        for method in &delegate.methods {
            if method.has_annotation(&self.config.accessor_annotation) {
                self.accessor(method);
                continue;
            }

            let scope = self.view.method_scope(method);
            let key = ErasedSignature::of(&method.name, method.params.iter().map(|p| &p.ty), &scope);

            if let Some(&i) = by_key.get(&key) {
                let member = &model.members[i];
                match self.check_override(method, &key, &scope, member) {
                    Ok(()) => {
                        self.overrides.overrides.insert(member.erased.clone());
                    }
                    Err(conflict) => {
                        self.rejected.insert(i);
                        self.conflicts.push(conflict);
                    }
                }
            } else if method.has_annotation(OVERRIDE)
                && !method.is_static()
                && !key.is_overridable_object_method()
                && !superclass_keys.contains(&key)
                && !default_keys.contains(&key)
            {
                let contracts: Vec<&str> = self
                    .model
                    .contracts
                    .iter()
                    .map(|c| c.qualified_name.as_str())
                    .collect();
                self.conflicts.push(
                    Conflict::incompatible(
                        self.method_element(&key),
                        format!(
                            "{key} is annotated @Override but matches no member of {}",
                            contracts.join(", ")
                        ),
                    )
                    .at(method.location.as_ref()),
                );
            }
        }
    }

    fn check_override(
        &self,
        method: &MethodDecl,
        key: &ErasedSignature,
        scope: &TypeScope,
        member: &MemberSignature,
    ) -> Result<(), Conflict> {
        let fail = |message: String| {
            Err(Conflict::incompatible(self.method_element(key), message)
                .at(method.location.as_ref()))
        };
        let target = member.element();

        if method.is_static() {
            return fail(format!(
                "static method {key} cannot implement instance method {target}"
            ));
        }
        if method.visibility != Visibility::Public {
            return fail(format!("{key} must be public to implement {target}"));
        }

        let viewed = self.view.member(member);
        if !self.return_compatible(&method.return_type, scope, &viewed.return_type, &viewed.scope) {
            return fail(format!(
                "return type {} of {key} is not compatible with {} returned by {target}",
                method.return_type, viewed.return_type
            ));
        }

        for thrown in &method.throws {
            let chain = self.throwable_chain(&thrown.erasure(scope));
            if !is_checked(&chain) {
                continue;
            }
            let declared = viewed.throws.iter().any(|t| {
                t.erasure(&viewed.scope)
                    .declared_name()
                    .is_some_and(|name| chain.iter().any(|c| c == name))
            });
            if !declared {
                return fail(format!(
                    "{key} throws checked exception {thrown}, which {target} does not declare"
                ));
            }
        }
        Ok(())
    }

    /// Covariant-or-equal return types.
    ///
    /// A user return type whose hierarchy is not in the model is only
    /// rejected when it is plainly wrong.
    fn return_compatible(
        &self,
        user: &TypeRef,
        user_scope: &TypeScope,
        member: &TypeRef,
        member_scope: &TypeScope,
    ) -> bool {
        let user = user.erasure(user_scope);
        let member = member.erasure(member_scope);
        match (&user, &member) {
            (TypeRef::Void, TypeRef::Void) => true,
            (TypeRef::Primitive(a), TypeRef::Primitive(b)) => a == b,
            _ if user.is_reference() && member.is_reference() => {
                self.reference_compatible(&user, &member)
            }
            _ => false,
        }
    }

    fn reference_compatible(&self, user: &TypeRef, member: &TypeRef) -> bool {
        if self.source.is_erased_subtype(user, member) {
            return true;
        }
        match (user, member) {
            (TypeRef::Array(a), TypeRef::Array(b)) => {
                a.is_reference() && b.is_reference() && self.reference_compatible(a, b)
            }
            (TypeRef::Declared { name, .. }, _) => {
                name != OBJECT
                    && member.declared_name() != Some(name.as_str())
                    && self.source.lookup(name).is_none()
            }
            _ => false,
        }
    }

    /// The superclass chain of an exception type, itself first.
    fn throwable_chain(&self, thrown: &TypeRef) -> Vec<String> {
        let mut chain: Vec<String> = Vec::new();
        let mut current = thrown.declared_name().map(str::to_string);
        while let Some(name) = current.take() {
            if chain.contains(&name) {
                break;
            }
            current = match self.source.lookup(&name) {
                Some(decl) => decl
                    .superclass
                    .as_ref()
                    .and_then(TypeRef::declared_name)
                    .map(str::to_string),
                None => PLATFORM_EXCEPTIONS
                    .iter()
                    .find(|(class, _)| *class == name)
                    .map(|(_, parent)| parent.to_string()),
            };
            chain.push(name);
        }
        chain
    }

    fn accessor(&mut self, method: &MethodDecl) {
        let scope = self.view.method_scope(method);
        let returned = method.return_type.erasure(&scope);
        let contract = self
            .model
            .contracts
            .iter()
            .position(|c| returned.declared_name() == Some(c.qualified_name.as_str()));
        let well_formed = method.params.is_empty() && !method.is_static() && !method.is_private();
        let key = ErasedSignature::of(&method.name, method.params.iter().map(|p| &p.ty), &scope);

        let conflict = match contract {
            Some(i) if well_formed => match self.overrides.accessors.insert(i, method.name.clone()) {
                None => return,
                Some(previous) => format!(
                    "{} has more than one accessor ({previous}, {}) for {}",
                    self.model.declaration, method.name, self.model.contracts[i].qualified_name
                ),
            },
            _ => format!(
                "@{} method {key} must be a non-private instance method without parameters returning a delegated interface",
                simple_name(&self.config.accessor_annotation)
            ),
        };
        self.conflicts.push(
            Conflict::unsupported(self.method_element(&key), conflict).at(method.location.as_ref()),
        );
    }

    fn collect_constructor_access(&mut self) {
        let delegate = self.delegate;
        for ctor in &delegate.constructors {
            for param in &ctor.params {
                let erased = param.ty.erasure(&self.view.scope);
                for (i, contract) in self.model.contracts.iter().enumerate() {
                    let contract_type = TypeRef::declared(contract.qualified_name.clone());
                    if self.source.is_erased_subtype(&erased, &contract_type) {
                        self.overrides.constructor_access.insert(i);
                    }
                }
            }
        }
    }
}

/// Whether an exception with this superclass chain must be declared.
///
/// Chains that leave the model before reaching `Throwable` are unknown and
/// treated as unchecked.
fn is_checked(chain: &[String]) -> bool {
    let reaches = |name: &str| chain.iter().any(|c| c == name);
    reaches("java.lang.Throwable")
        && !reaches("java.lang.RuntimeException")
        && !reaches("java.lang.Error")
}
