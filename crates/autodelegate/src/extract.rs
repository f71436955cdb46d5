//! Type model extraction.
//!
//! Reads the annotated declaration and its contracts from the declaration
//! model and builds the [`ContractModel`]: the generated class's name and type
//! parameters, the `extend` superclass, and the canonical abstract member
//! surface of every contract with its provenance.

use crate::diagnostic::Conflict;
use crate::model::{
    Contract, ContractModel, ErasedSignature, InheritedMethod, MemberSignature, Superclass,
    TargetName,
};
use crate::naming;
use autodelegate_core::{
    AnnotationDecl, AnnotationValue, ConstructorDecl, DeclKind, DeclarationSource,
    GeneratorConfig, MethodDecl, OBJECT, Param, SourceLocation, TypeDecl, TypeParam, TypeRef,
    TypeScope, Visibility, bindings, simple_name,
};
use std::collections::{BTreeMap, BTreeSet, VecDeque};

/// Build the model for the annotated class `decl`.
///
/// Any error is class-fatal: without a model there is nothing to generate.
pub fn extract(
    decl: &TypeDecl,
    source: &dyn DeclarationSource,
    config: &GeneratorConfig,
) -> Result<ContractModel, Vec<Conflict>> {
    let mut extractor = Extractor::new(decl, source, config);
    let target = naming::target_name(decl, config);

    extractor.check_declaration(decl).map_err(|c| vec![c])?;
    extractor
        .check_superclass(decl, &target)
        .map_err(|c| vec![c])?;

    let annotation = decl.annotation(&config.annotation).ok_or_else(|| {
        vec![extractor.unsupported(format!(
            "{} is not annotated with @{}",
            extractor.element,
            simple_name(&config.annotation)
        ))]
    })?;

    let contracts = extractor.contracts(annotation)?;
    let superclass = extractor.superclass(annotation).map_err(|c| vec![c])?;
    let (members, default_members) = extractor.members(&contracts)?;

    tracing::debug!(
        declaration = %extractor.element,
        contracts = contracts.len(),
        members = members.len(),
        "extracted contract model"
    );

    Ok(ContractModel {
        declaration: extractor.element,
        location: extractor.location,
        visibility: decl.visibility,
        target,
        type_params: extractor.type_params,
        contracts: contracts.into_iter().map(|c| c.contract).collect(),
        superclass,
        members,
        default_members,
    })
}

/// A contract named by the annotation, with the bindings that carry its
/// type parameters into the generated class.
struct ResolvedContract<'a> {
    contract: Contract,
    decl: &'a TypeDecl,
    bindings: BTreeMap<String, TypeRef>,
}

struct Extractor<'a> {
    source: &'a dyn DeclarationSource,
    config: &'a GeneratorConfig,
    element: String,
    location: Option<SourceLocation>,
    package: String,

    /// Type parameters of the generated class, filled in as raw generic
    /// contracts and superclass are adopted.
    type_params: Vec<TypeParam>,
}

impl<'a> Extractor<'a> {
    fn new(
        decl: &TypeDecl,
        source: &'a dyn DeclarationSource,
        config: &'a GeneratorConfig,
    ) -> Self {
        Self {
            source,
            config,
            element: decl.qualified_name(),
            location: decl.location.clone(),
            package: decl.package.clone(),
            type_params: Vec::new(),
        }
    }

    fn unsupported(&self, message: String) -> Conflict {
        Conflict::unsupported(&self.element, message).at(self.location.as_ref())
    }

    fn undefined(&self, message: String) -> Conflict {
        Conflict::undefined(&self.element, message).at(self.location.as_ref())
    }

    fn inaccessible(&self, message: String) -> Conflict {
        Conflict::inaccessible(&self.element, message).at(self.location.as_ref())
    }

    fn scope(&self) -> TypeScope {
        TypeScope::with_params(&self.type_params)
    }

    fn check_declaration(&self, decl: &TypeDecl) -> Result<(), Conflict> {
        let annotation = simple_name(&self.config.annotation);
        if decl.kind != DeclKind::Class {
            return Err(self.unsupported(format!(
                "@{annotation} can only be applied to a class; {} is {}",
                self.element,
                with_article(decl.kind)
            )));
        }
        if !decl.is_nested() {
            return Ok(());
        }
        if decl.visibility == Visibility::Private {
            return Err(self.unsupported(format!(
                "nested class {} must not be private",
                self.element
            )));
        }
        if !decl.is_static() {
            return Err(self.unsupported(format!(
                "nested class {} must be static",
                self.element
            )));
        }

        let mut enclosing = decl.enclosing_name();
        while let Some(name) = enclosing {
            let Some(outer) = self.source.lookup(&name) else {
                break;
            };
            if outer.visibility == Visibility::Private {
                return Err(self.unsupported(format!(
                    "{} is nested inside private type {name}",
                    self.element
                )));
            }
            enclosing = outer.enclosing_name();
        }
        Ok(())
    }

    /// The annotated class must extend the class about to be generated.
    fn check_superclass(&self, decl: &TypeDecl, target: &TargetName) -> Result<(), Conflict> {
        let qualified = target.qualified_name();
        match decl.superclass.as_ref().and_then(TypeRef::declared_name) {
            Some(name) if name == qualified || name == target.simple_name => Ok(()),
            Some(name) => Err(self.unsupported(format!(
                "{} must extend {}, not {name}",
                self.element, target.simple_name
            ))),
            None => Err(self.unsupported(format!(
                "{} must extend {}",
                self.element, target.simple_name
            ))),
        }
    }

    /// Parse a class literal from an annotation value.
    fn class_literal(&self, literal: &str) -> Result<TypeRef, Conflict> {
        match TypeRef::parse(literal) {
            Ok(ty @ TypeRef::Declared { .. }) => Ok(ty),
            Ok(_) | Err(_) => Err(self.unsupported(format!(
                "`{literal}` is not a class or interface type"
            ))),
        }
    }

    fn contracts(
        &mut self,
        annotation: &AnnotationDecl,
    ) -> Result<Vec<ResolvedContract<'a>>, Vec<Conflict>> {
        let literals = annotation
            .value("value")
            .map(AnnotationValue::as_list)
            .unwrap_or_default();
        if literals.is_empty() {
            return Err(vec![self.unsupported(format!(
                "@{} on {} names no interface to delegate to",
                simple_name(&self.config.annotation),
                self.element
            ))]);
        }

        let mut resolved: Vec<ResolvedContract<'a>> = Vec::new();
        let mut conflicts = Vec::new();
        for literal in literals {
            match self.contract(literal, &resolved) {
                Ok(contract) => resolved.push(contract),
                Err(conflict) => conflicts.push(conflict),
            }
        }
        if conflicts.is_empty() {
            Ok(resolved)
        } else {
            Err(conflicts)
        }
    }

    fn contract(
        &mut self,
        literal: &str,
        seen: &[ResolvedContract<'a>],
    ) -> Result<ResolvedContract<'a>, Conflict> {
        let source = self.source;
        let reference = self.class_literal(literal)?;
        let TypeRef::Declared { name, args } = &reference else {
            return Err(self.unsupported(format!("`{literal}` is not an interface type")));
        };

        let decl = source.lookup(name).ok_or_else(|| {
            self.undefined(format!(
                "interface {name} is not defined in the declaration model"
            ))
        })?;
        if decl.kind != DeclKind::Interface {
            return Err(self.unsupported(format!(
                "can only delegate to interfaces; {name} is {}",
                with_article(decl.kind)
            )));
        }
        if seen.iter().any(|c| c.contract.qualified_name == *name) {
            return Err(self.unsupported(format!("interface {name} is listed more than once")));
        }
        if !source.is_accessible_from(decl, &self.package) {
            return Err(self.inaccessible(format!(
                "interface {name} is not accessible from package {}",
                display_package(&self.package)
            )));
        }

        let (reference, bindings) = self.adopt(decl, args)?;
        Ok(ResolvedContract {
            contract: Contract {
                qualified_name: name.clone(),
                reference,
            },
            decl,
            bindings,
        })
    }

    /// Carry `decl`'s type parameters into the generated class.
    ///
    /// A raw reference copies the parameters onto the generated class; a
    /// parameterized one binds them to its arguments.
    fn adopt(
        &mut self,
        decl: &TypeDecl,
        args: &[TypeRef],
    ) -> Result<(TypeRef, BTreeMap<String, TypeRef>), Conflict> {
        let name = decl.qualified_name();
        if let Some(reason) = unsupported_bound(&decl.type_params) {
            return Err(self.unsupported(format!("type parameter {reason} of {name}")));
        }

        if args.is_empty() {
            for param in &decl.type_params {
                if self.type_params.iter().any(|p| p.name == param.name) {
                    return Err(self.unsupported(format!(
                        "type parameter {} of {name} clashes with a type parameter of another delegated type",
                        param.name
                    )));
                }
            }
            self.type_params.extend(decl.type_params.iter().cloned());
            return Ok((decl.as_type(), BTreeMap::new()));
        }

        if args.len() != decl.type_params.len() {
            return Err(self.unsupported(format!(
                "{name} takes {} type argument(s), found {}",
                decl.type_params.len(),
                args.len()
            )));
        }
        Ok((
            TypeRef::Declared {
                name,
                args: args.to_vec(),
            },
            bindings(&decl.type_params, args),
        ))
    }

    fn superclass(&mut self, annotation: &AnnotationDecl) -> Result<Option<Superclass>, Conflict> {
        let literal = match annotation.value("extend") {
            None => return Ok(None),
            Some(AnnotationValue::One(literal)) => literal.as_str(),
            Some(AnnotationValue::Many(list)) => match list.as_slice() {
                [] => return Ok(None),
                [literal] => literal.as_str(),
                _ => {
                    return Err(self.unsupported("`extend` names more than one class".to_string()));
                }
            },
        };

        let source = self.source;
        let reference = self.class_literal(literal)?;
        let TypeRef::Declared { name, args } = &reference else {
            return Err(self.unsupported(format!("`{literal}` is not a class type")));
        };
        if name == OBJECT {
            return Ok(None);
        }

        let decl = source.lookup(name).ok_or_else(|| {
            self.undefined(format!(
                "super class {name} is not defined in the declaration model"
            ))
        })?;
        if decl.kind != DeclKind::Class {
            return Err(self.unsupported(format!(
                "super class {name} must be a class, not {}",
                with_article(decl.kind)
            )));
        }
        if decl.is_final() {
            return Err(self.unsupported(format!("super class {name} is final")));
        }
        if !source.is_accessible_from(decl, &self.package) {
            return Err(self.inaccessible(format!(
                "super class {name} is not accessible from package {}",
                display_package(&self.package)
            )));
        }

        let (reference, bindings) = self.adopt(decl, args)?;
        let constructors = self.constructors(decl, &bindings)?;
        let methods = self.inherited_methods(decl, bindings);

        Ok(Some(Superclass {
            qualified_name: name.clone(),
            reference,
            constructors,
            methods,
        }))
    }

    /// Superclass constructors the generated class can call.
    fn constructors(
        &self,
        decl: &TypeDecl,
        bindings: &BTreeMap<String, TypeRef>,
    ) -> Result<Vec<ConstructorDecl>, Conflict> {
        let declared = if decl.constructors.is_empty() {
            vec![ConstructorDecl {
                visibility: decl.visibility,
                ..ConstructorDecl::default()
            }]
        } else {
            decl.constructors.clone()
        };

        let accessible: Vec<ConstructorDecl> = declared
            .into_iter()
            .filter(|ctor| match ctor.visibility {
                Visibility::Public | Visibility::Protected => true,
                Visibility::Package => decl.package == self.package,
                Visibility::Private => false,
            })
            .map(|mut ctor| {
                for param in &mut ctor.params {
                    param.ty = param.ty.substitute(bindings);
                }
                for thrown in &mut ctor.throws {
                    *thrown = thrown.substitute(bindings);
                }
                ctor
            })
            .collect();

        if accessible.is_empty() {
            return Err(self.unsupported(format!(
                "super class {} has no constructor accessible from package {}",
                decl.qualified_name(),
                display_package(&self.package)
            )));
        }
        Ok(accessible)
    }

    /// Instance methods along the superclass chain, closest declaration of
    /// each erased signature only.
    fn inherited_methods(
        &self,
        decl: &'a TypeDecl,
        bindings: BTreeMap<String, TypeRef>,
    ) -> Vec<InheritedMethod> {
        let source = self.source;
        let scope = self.scope();
        let mut methods = Vec::new();
        let mut keys = BTreeSet::new();
        let mut visited = BTreeSet::new();
        let mut current = Some((decl, bindings));

        while let Some((class, class_bindings)) = current.take() {
            if !visited.insert(class.qualified_name()) {
                break;
            }
            for method in &class.methods {
                if method.is_static() || method.is_private() {
                    continue;
                }
                let (type_params, params, _, _) = substituted(method, &class_bindings);
                let inherited = InheritedMethod {
                    name: method.name.clone(),
                    type_params,
                    params: params.into_iter().map(|p| p.ty).collect(),
                    declaring_type: class.qualified_name(),
                    implements_members: method.visibility == Visibility::Public
                        && !method.is_abstract(),
                };
                if keys.insert(inherited.erased(&scope)) {
                    methods.push(inherited);
                }
            }

            current = class.superclass.as_ref().and_then(|parent| {
                let parent = parent.substitute(&class_bindings);
                let parent_decl = source.lookup(parent.declared_name()?)?;
                let parent_bindings = parent_bindings(parent_decl, &parent);
                Some((parent_decl, parent_bindings))
            });
        }
        methods
    }

    fn members(
        &self,
        contracts: &[ResolvedContract<'a>],
    ) -> Result<(Vec<MemberSignature>, Vec<MemberSignature>), Vec<Conflict>> {
        let mut surfaces = Vec::new();
        let mut conflicts = Vec::new();
        for (index, contract) in contracts.iter().enumerate() {
            match self.walk(index, contract) {
                Ok(surface) => surfaces.push(surface),
                Err(conflict) => conflicts.push(conflict),
            }
        }
        if !conflicts.is_empty() {
            return Err(conflicts);
        }
        Ok(merge(surfaces))
    }

    /// Breadth-first walk of one contract's interface hierarchy.
    fn walk(&self, index: usize, contract: &ResolvedContract<'a>) -> Result<Surface, Conflict> {
        let source = self.source;
        let scope = self.scope();
        let mut surface = Surface::default();
        let mut visited = BTreeSet::new();
        let mut queue = VecDeque::from([(contract.decl, contract.bindings.clone())]);

        while let Some((decl, decl_bindings)) = queue.pop_front() {
            let declaring = decl.qualified_name();
            if !visited.insert(declaring.clone()) {
                continue;
            }

            for method in &decl.methods {
                if !method.is_abstract() && (method.is_static() || method.is_private()) {
                    continue;
                }
                let member = self.member(index, &declaring, method, &decl_bindings, &scope);
                if member.erased.is_object_method() {
                    continue;
                }
                surface.add(member, method.is_abstract(), source, &scope);
            }

            for parent in &decl.interfaces {
                let parent = parent.substitute(&decl_bindings);
                let Some(parent_name) = parent.declared_name() else {
                    continue;
                };
                let parent_decl = source.lookup(parent_name).ok_or_else(|| {
                    self.undefined(format!(
                        "{parent_name}, a super interface of {declaring}, is not defined in the declaration model"
                    ))
                })?;
                queue.push_back((parent_decl, parent_bindings(parent_decl, &parent)));
            }
        }
        Ok(surface)
    }

    fn member(
        &self,
        contract: usize,
        declaring: &str,
        method: &MethodDecl,
        decl_bindings: &BTreeMap<String, TypeRef>,
        scope: &TypeScope,
    ) -> MemberSignature {
        let (type_params, params, return_type, throws) = substituted(method, decl_bindings);
        let mut member_scope = scope.clone();
        member_scope.push_params(&type_params);
        let erased = ErasedSignature::of(&method.name, params.iter().map(|p| &p.ty), &member_scope);

        let unsupported = if !method.is_abstract() {
            None
        } else if method.is_static() {
            Some("static".to_string())
        } else if method.is_private() {
            Some("private".to_string())
        } else if method.is_final() {
            Some("final".to_string())
        } else {
            unsupported_bound(&type_params).map(|reason| format!("declares type parameter {reason}"))
        };

        MemberSignature {
            name: method.name.clone(),
            type_params,
            params,
            return_type,
            throws,
            varargs: method.varargs,
            erased,
            contract,
            declaring_types: vec![declaring.to_string()],
            location: method.location.clone(),
            ambiguous_with: Vec::new(),
            unsupported,
        }
    }
}

/// A method's signature with class type variables substituted; its own type
/// parameters shadow the bindings.
fn substituted(
    method: &MethodDecl,
    class_bindings: &BTreeMap<String, TypeRef>,
) -> (Vec<TypeParam>, Vec<Param>, TypeRef, Vec<TypeRef>) {
    let mut b = class_bindings.clone();
    for tp in &method.type_params {
        b.remove(&tp.name);
    }
    let type_params = method
        .type_params
        .iter()
        .map(|tp| TypeParam {
            name: tp.name.clone(),
            bounds: tp.bounds.iter().map(|t| t.substitute(&b)).collect(),
        })
        .collect();
    let params = method
        .params
        .iter()
        .map(|p| Param {
            name: p.name.clone(),
            ty: p.ty.substitute(&b),
        })
        .collect();
    let throws = method.throws.iter().map(|t| t.substitute(&b)).collect();
    (type_params, params, method.return_type.substitute(&b), throws)
}

/// Bindings for a supertype reference; raw references bind each parameter
/// to its erased bound.
fn parent_bindings(decl: &TypeDecl, reference: &TypeRef) -> BTreeMap<String, TypeRef> {
    let args = reference.type_args();
    if args.is_empty() {
        let scope = TypeScope::with_params(&decl.type_params);
        decl.type_params
            .iter()
            .map(|p| (p.name.clone(), TypeRef::Var(p.name.clone()).erasure(&scope)))
            .collect()
    } else {
        bindings(&decl.type_params, args)
    }
}

/// Describe the first type parameter whose bounds Java generics cannot carry
/// onto the generated class.
fn unsupported_bound(params: &[TypeParam]) -> Option<String> {
    for param in params {
        for (i, bound) in param.bounds.iter().enumerate() {
            let supported = match bound {
                TypeRef::Declared { .. } => true,
                TypeRef::Var(_) => i == 0 && param.bounds.len() == 1,
                _ => false,
            };
            if !supported {
                return Some(format!("{} with unsupported bound {bound}", param.name));
            }
        }
    }
    None
}

fn with_article(kind: DeclKind) -> String {
    match kind {
        DeclKind::Interface | DeclKind::Enum | DeclKind::Annotation => format!("an {kind}"),
        DeclKind::Class | DeclKind::Record => format!("a {kind}"),
    }
}

fn display_package(package: &str) -> &str {
    if package.is_empty() { "<unnamed>" } else { package }
}

#[derive(Debug, Clone)]
enum Slot {
    /// Still abstract; index into `Surface::members`.
    Member(usize),
    /// Has a body, given by the named type.
    Concrete(String),
}

/// The abstract surface of one contract.
#[derive(Debug, Default)]
struct Surface {
    members: Vec<Option<MemberSignature>>,
    slots: BTreeMap<ErasedSignature, Slot>,

    /// The declaration giving each concrete slot its body.
    defaults: BTreeMap<ErasedSignature, MemberSignature>,
}

impl Surface {
    fn add(
        &mut self,
        member: MemberSignature,
        is_abstract: bool,
        source: &dyn DeclarationSource,
        scope: &TypeScope,
    ) {
        let key = member.erased.clone();
        let declaring = member.declaring_type().to_string();

        match self.slots.get(&key).cloned() {
            None if is_abstract => self.push(key, member),
            None => self.make_concrete(key, member),
            Some(Slot::Concrete(owner)) => {
                // Re-abstracted by a more specific interface.
                if is_abstract && declaring != owner && source.is_subtype(&declaring, &owner) {
                    self.defaults.remove(&key);
                    self.push(key, member);
                }
            }
            Some(Slot::Member(i)) => {
                let Some(existing) = self.members[i].as_mut() else {
                    return;
                };
                if !is_abstract {
                    let overrides_all = existing
                        .declaring_types
                        .iter()
                        .all(|t| source.is_subtype(&declaring, t));
                    if overrides_all {
                        self.members[i] = None;
                        self.make_concrete(key, member);
                    }
                } else if source.is_subtype(existing.declaring_type(), &declaring) {
                    // Overridden by the closer declaration already recorded.
                    existing.declaring_types.push(declaring);
                } else {
                    merge_inherited(existing, member, source, scope);
                }
            }
        }
    }

    fn push(&mut self, key: ErasedSignature, member: MemberSignature) {
        self.slots.insert(key, Slot::Member(self.members.len()));
        self.members.push(Some(member));
    }

    fn make_concrete(&mut self, key: ErasedSignature, member: MemberSignature) {
        let declaring = member.declaring_type().to_string();
        self.slots.insert(key.clone(), Slot::Concrete(declaring));
        self.defaults.insert(key, member);
    }

    /// Abstract members in discovery order, and the default methods giving
    /// a body to every other erased signature.
    fn into_parts(self) -> (Vec<MemberSignature>, BTreeMap<ErasedSignature, MemberSignature>) {
        (self.members.into_iter().flatten().collect(), self.defaults)
    }
}

/// Reconcile two abstract members inherited through unrelated interfaces.
fn merge_inherited(
    existing: &mut MemberSignature,
    member: MemberSignature,
    source: &dyn DeclarationSource,
    scope: &TypeScope,
) {
    let declaring = member.declaring_type().to_string();
    if !existing.same_parameters(&member) {
        existing.ambiguous_with.push(declaring);
        return;
    }

    let theirs = existing.aligned_return_type(&member);
    if theirs != existing.return_type {
        let member_scope = existing.scope(scope);
        let ours_erased = existing.return_type.erasure(&member_scope);
        let theirs_erased = theirs.erasure(&member_scope);
        let more_specific = theirs.is_reference()
            && existing.return_type.is_reference()
            && ours_erased != theirs_erased;
        if more_specific && source.is_erased_subtype(&theirs_erased, &ours_erased) {
            existing.return_type = theirs;
        } else if !(more_specific && source.is_erased_subtype(&ours_erased, &theirs_erased)) {
            existing.ambiguous_with.push(declaring);
            return;
        }
    }

    existing.throws = intersect_throws(&existing.throws, &member.throws, source, scope);
    existing.declaring_types.push(declaring);
}

/// Thrown types allowed by both clauses.
fn intersect_throws(
    a: &[TypeRef],
    b: &[TypeRef],
    source: &dyn DeclarationSource,
    scope: &TypeScope,
) -> Vec<TypeRef> {
    let covered = |t: &TypeRef, by: &[TypeRef]| {
        let t = t.erasure(scope);
        by.iter()
            .any(|u| source.is_erased_subtype(&t, &u.erasure(scope)))
    };
    let mut out: Vec<TypeRef> = Vec::new();
    for t in a
        .iter()
        .filter(|t| covered(*t, b))
        .chain(b.iter().filter(|t| covered(*t, a)))
    {
        if !out.contains(t) {
            out.push(t.clone());
        }
    }
    out
}

/// Combine per-contract surfaces in annotation order into the abstract
/// members and the default methods left over.
///
/// Identical members tie-break to the first contract; anything else sharing
/// an erasure, or a member another contract gives a body, is ambiguous.
fn merge(surfaces: Vec<Surface>) -> (Vec<MemberSignature>, Vec<MemberSignature>) {
    let (abstracts, concretes): (Vec<_>, Vec<_>) =
        surfaces.into_iter().map(Surface::into_parts).unzip();

    let mut members: Vec<MemberSignature> = Vec::new();
    let mut by_key: BTreeMap<ErasedSignature, usize> = BTreeMap::new();
    for (k, surface) in abstracts.into_iter().enumerate() {
        for mut member in surface {
            if let Some(&i) = by_key.get(&member.erased) {
                let existing = &mut members[i];
                if existing.same_signature(&member) && same_throws(existing, &member) {
                    existing.declaring_types.extend(member.declaring_types);
                } else {
                    existing.ambiguous_with.extend(member.declaring_types);
                }
                continue;
            }
            for (j, concrete) in concretes.iter().enumerate() {
                if j == k {
                    continue;
                }
                if let Some(owner) = concrete.get(&member.erased) {
                    member.ambiguous_with.push(owner.declaring_type().to_string());
                }
            }
            by_key.insert(member.erased.clone(), members.len());
            members.push(member);
        }
    }

    let mut defaults: Vec<MemberSignature> = Vec::new();
    for concrete in concretes {
        for (key, member) in concrete {
            if !by_key.contains_key(&key) && !defaults.iter().any(|d| d.erased == key) {
                defaults.push(member);
            }
        }
    }
    (members, defaults)
}

fn same_throws(a: &MemberSignature, b: &MemberSignature) -> bool {
    let ours: BTreeSet<&TypeRef> = a.throws.iter().collect();
    let theirs: BTreeSet<&TypeRef> = b.throws.iter().collect();
    ours == theirs
}
