//! Java source generation.
//!
//! [`build_spec`] lays out the generated class from a checked plan and
//! [`render`] turns that layout into source text. Rendering is a pure
//! function of the class layout and the declaration model, so identical
//! inputs give byte-identical output.

use crate::check::{CheckedPlan, WrappedAccess};
use crate::naming::{NameAllocator, wrapped_field_name};
use autodelegate_core::{
    DeclarationSource, GeneratorConfig, OBJECT, Param, TypeParam, TypeRef, simple_name,
};
use std::collections::{BTreeSet, VecDeque};
use std::path::PathBuf;

const OVERRIDE: &str = "java.lang.Override";
const INDENT: &str = "    ";

/// A source file ready to hand to a filer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub qualified_name: String,

    /// `<package dirs>/<Name>.java`
    pub relative_path: PathBuf,

    pub contents: String,
}

/// Shape of the generated class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedClassSpec {
    pub package: String,
    pub simple_name: String,

    /// Qualified name of the `@Generated` annotation type.
    pub generated_annotation: String,
    pub generator_name: String,

    pub type_params: Vec<TypeParam>,
    pub superclass: Option<TypeRef>,
    pub interfaces: Vec<TypeRef>,

    pub fields: Vec<FieldSpec>,
    pub accessors: Vec<AccessorSpec>,
    pub constructors: Vec<ConstructorSpec>,
    pub methods: Vec<ForwardingMethod>,
}

/// `private final <ty> <name>;`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: String,
    pub ty: TypeRef,
}

/// `abstract <ty> <name>();`, implemented by the annotated class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessorSpec {
    pub name: String,
    pub ty: TypeRef,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstructorSpec {
    /// Wrapped instances first, then the superclass constructor's parameters.
    pub params: Vec<Param>,
    pub varargs: bool,
    pub throws: Vec<TypeRef>,

    /// Arguments of the explicit `super(...)` call, if one is written.
    pub super_args: Option<Vec<String>>,

    /// Fields assigned from the parameter of the same name.
    pub field_inits: Vec<String>,
}

/// Where a forwarding method finds its wrapped instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Receiver {
    Field(String),
    Accessor(String),
}

impl Receiver {
    fn expression(&self) -> String {
        match self {
            Receiver::Field(field) => format!("this.{field}"),
            Receiver::Accessor(method) => format!("this.{method}()"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardingMethod {
    pub name: String,
    pub type_params: Vec<TypeParam>,
    pub params: Vec<Param>,
    pub return_type: TypeRef,
    pub throws: Vec<TypeRef>,
    pub varargs: bool,
    pub receiver: Receiver,
}

/// Generate the source file for a checked plan.
pub fn emit(
    checked: &CheckedPlan<'_>,
    source: &dyn DeclarationSource,
    config: &GeneratorConfig,
) -> GeneratedFile {
    let spec = build_spec(checked, config);
    let contents = render(&spec, source);
    let target = &checked.model.target;

    tracing::debug!(
        class = %target.qualified_name(),
        methods = spec.methods.len(),
        constructors = spec.constructors.len(),
        bytes = contents.len(),
        "rendered delegate class"
    );

    GeneratedFile {
        qualified_name: target.qualified_name(),
        relative_path: target.relative_path(),
        contents,
    }
}

/// Lay out the generated class.
pub fn build_spec(checked: &CheckedPlan<'_>, config: &GeneratorConfig) -> GeneratedClassSpec {
    let model = checked.model;

    let mut names = NameAllocator::new();
    let mut fields = Vec::new();
    let mut accessors = Vec::new();
    let mut receivers = Vec::new();
    for (contract, access) in model.contracts.iter().zip(&checked.access) {
        match access {
            WrappedAccess::Field => {
                let name = names.new_name(&wrapped_field_name(contract.simple_name()));
                fields.push(FieldSpec {
                    name: name.clone(),
                    ty: contract.reference.clone(),
                });
                receivers.push(Receiver::Field(name));
            }
            WrappedAccess::Accessor { method } => {
                accessors.push(AccessorSpec {
                    name: method.clone(),
                    ty: contract.reference.clone(),
                });
                receivers.push(Receiver::Accessor(method.clone()));
            }
        }
    }

    let wrapped_params: Vec<Param> = fields
        .iter()
        .map(|f| Param {
            name: f.name.clone(),
            ty: f.ty.clone(),
        })
        .collect();
    let field_inits: Vec<String> = fields.iter().map(|f| f.name.clone()).collect();

    let constructors = match &model.superclass {
        Some(superclass) => superclass
            .constructors
            .iter()
            .map(|ctor| {
                let mut names = NameAllocator::new();
                for field in &field_inits {
                    names.reserve(field);
                }
                let super_params: Vec<Param> = ctor
                    .params
                    .iter()
                    .map(|p| Param {
                        name: names.new_name(&p.name),
                        ty: p.ty.clone(),
                    })
                    .collect();
                ConstructorSpec {
                    super_args: Some(super_params.iter().map(|p| p.name.clone()).collect()),
                    params: wrapped_params.iter().cloned().chain(super_params).collect(),
                    varargs: ctor.varargs,
                    throws: ctor.throws.clone(),
                    field_inits: field_inits.clone(),
                }
            })
            .collect(),
        None if fields.is_empty() => Vec::new(),
        None => vec![ConstructorSpec {
            params: wrapped_params,
            varargs: false,
            throws: Vec::new(),
            super_args: None,
            field_inits,
        }],
    };

    let methods = checked
        .to_forward
        .iter()
        .map(|member| {
            let mut names = NameAllocator::new();
            ForwardingMethod {
                name: member.name.clone(),
                type_params: member.type_params.clone(),
                params: member
                    .params
                    .iter()
                    .map(|p| Param {
                        name: names.new_name(&p.name),
                        ty: p.ty.clone(),
                    })
                    .collect(),
                return_type: member.return_type.clone(),
                throws: member.throws.clone(),
                varargs: member.varargs,
                receiver: receivers[member.contract].clone(),
            }
        })
        .collect();

    GeneratedClassSpec {
        package: model.target.package.clone(),
        simple_name: model.target.simple_name.clone(),
        generated_annotation: config.generated_annotation().to_string(),
        generator_name: config.generator_name.clone(),
        type_params: model.type_params.clone(),
        superclass: model.superclass.as_ref().map(|s| s.reference.clone()),
        interfaces: model.contracts.iter().map(|c| c.reference.clone()).collect(),
        fields,
        accessors,
        constructors,
        methods,
    }
}

/// Render `spec` as Java source.
pub fn render(spec: &GeneratedClassSpec, source: &dyn DeclarationSource) -> String {
    let namer = TypeNamer::new(spec, source);
    let mut code = String::new();

    if !spec.package.is_empty() {
        code.push_str(&format!("package {};\n\n", spec.package));
    }

    // An import would hide a same-package type of the same simple name.
    let annotation_simple = simple_name(&spec.generated_annotation);
    let annotation = if namer.package_types.contains(annotation_simple)
        || spec.simple_name == annotation_simple
    {
        spec.generated_annotation.as_str()
    } else {
        code.push_str(&format!("import {};\n\n", spec.generated_annotation));
        annotation_simple
    };
    code.push_str(&format!(
        "@{annotation}({})\n",
        java_string(&spec.generator_name)
    ));

    code.push_str(&format!(
        "abstract class {}{}",
        spec.simple_name,
        namer.type_params(&spec.type_params)
    ));
    if let Some(superclass) = &spec.superclass {
        code.push_str(&format!(" extends {}", namer.ty(superclass)));
    }
    if !spec.interfaces.is_empty() {
        let interfaces: Vec<String> = spec.interfaces.iter().map(|i| namer.ty(i)).collect();
        code.push_str(&format!(" implements {}", interfaces.join(", ")));
    }
    code.push_str(" {\n");

    let mut blocks: Vec<String> = Vec::new();
    if !spec.fields.is_empty() {
        blocks.push(
            spec.fields
                .iter()
                .map(|f| format!("{INDENT}private final {} {};\n", namer.ty(&f.ty), f.name))
                .collect(),
        );
    }
    if !spec.accessors.is_empty() {
        blocks.push(
            spec.accessors
                .iter()
                .map(|a| format!("{INDENT}abstract {} {}();\n", namer.ty(&a.ty), a.name))
                .collect(),
        );
    }
    for ctor in &spec.constructors {
        blocks.push(render_constructor(spec, ctor, &namer));
    }
    for method in &spec.methods {
        blocks.push(render_method(method, &namer));
    }

    code.push_str(&blocks.join("\n"));
    code.push_str("}\n");
    code
}

fn render_constructor(spec: &GeneratedClassSpec, ctor: &ConstructorSpec, namer: &TypeNamer<'_>) -> String {
    let mut code = format!(
        "{INDENT}{}({})",
        spec.simple_name,
        namer.params(&ctor.params, ctor.varargs)
    );
    code.push_str(&namer.throws(&ctor.throws));
    code.push_str(" {\n");
    if let Some(args) = &ctor.super_args {
        code.push_str(&format!("{INDENT}{INDENT}super({});\n", args.join(", ")));
    }
    for field in &ctor.field_inits {
        code.push_str(&format!("{INDENT}{INDENT}this.{field} = {field};\n"));
    }
    code.push_str(&format!("{INDENT}}}\n"));
    code
}

fn render_method(method: &ForwardingMethod, namer: &TypeNamer<'_>) -> String {
    let mut code = format!("{INDENT}@{}\n{INDENT}public ", namer.name(OVERRIDE));
    let type_params = namer.type_params(&method.type_params);
    if !type_params.is_empty() {
        code.push_str(&type_params);
        code.push(' ');
    }
    code.push_str(&format!(
        "{} {}({})",
        namer.ty(&method.return_type),
        method.name,
        namer.params(&method.params, method.varargs)
    ));
    code.push_str(&namer.throws(&method.throws));
    code.push_str(" {\n");

    let args: Vec<&str> = method.params.iter().map(|p| p.name.as_str()).collect();
    let call = format!(
        "{}.{}({})",
        method.receiver.expression(),
        method.name,
        args.join(", ")
    );
    if method.return_type.is_void() {
        code.push_str(&format!("{INDENT}{INDENT}{call};\n"));
    } else {
        code.push_str(&format!("{INDENT}{INDENT}return {call};\n"));
    }
    code.push_str(&format!("{INDENT}}}\n"));
    code
}

/// A Java string literal.
fn java_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", u32::from(c))),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Decides how each type name is spelled inside the generated class.
///
/// Same-package types are written by their package-relative name and
/// top-level `java.lang` types by their simple name, unless something in the
/// class hides that name. Everything else is fully qualified.
struct TypeNamer<'a> {
    source: &'a dyn DeclarationSource,
    package: &'a str,

    /// Names in scope inside the class body: type variables, member types
    /// inherited from supertypes and the class itself.
    hidden: BTreeSet<String>,

    /// Top-level types of the generated package.
    package_types: BTreeSet<String>,
}

impl<'a> TypeNamer<'a> {
    fn new(spec: &'a GeneratedClassSpec, source: &'a dyn DeclarationSource) -> Self {
        let mut hidden: BTreeSet<String> = spec
            .type_params
            .iter()
            .chain(spec.methods.iter().flat_map(|m| &m.type_params))
            .map(|p| p.name.clone())
            .collect();
        hidden.extend(inherited_member_types(spec, source));
        hidden.insert(spec.simple_name.clone());

        let package_types = source
            .declarations()
            .into_iter()
            .filter(|d| d.package == spec.package && !d.is_nested())
            .map(|d| d.name.clone())
            .collect();

        Self {
            source,
            package: &spec.package,
            hidden,
            package_types,
        }
    }

    fn name(&self, qualified: &str) -> String {
        let (package, relative) = match self.source.lookup(qualified) {
            Some(decl) => (decl.package.as_str(), decl.name.as_str()),
            None => match qualified.strip_prefix("java.lang.") {
                Some(rest) if !rest.contains('.') => ("java.lang", rest),
                _ => return qualified.to_string(),
            },
        };
        let outermost = relative.split('.').next().unwrap_or(relative);

        let visible = if package == self.package {
            !self.hidden.contains(outermost)
        } else if package == "java.lang" {
            !relative.contains('.')
                && !self.hidden.contains(outermost)
                && !self.package_types.contains(outermost)
        } else {
            false
        };
        if visible {
            relative.to_string()
        } else {
            qualified.to_string()
        }
    }

    fn ty(&self, ty: &TypeRef) -> String {
        ty.render(&|name| self.name(name))
    }

    /// `<A, B extends X & Y>`, or nothing.
    fn type_params(&self, params: &[TypeParam]) -> String {
        if params.is_empty() {
            return String::new();
        }
        let rendered: Vec<String> = params
            .iter()
            .map(|p| {
                let bounds: Vec<String> = p
                    .bounds
                    .iter()
                    .filter(|b| b.declared_name() != Some(OBJECT) || p.bounds.len() > 1)
                    .map(|b| self.ty(b))
                    .collect();
                if bounds.is_empty() {
                    p.name.clone()
                } else {
                    format!("{} extends {}", p.name, bounds.join(" & "))
                }
            })
            .collect();
        format!("<{}>", rendered.join(", "))
    }

    fn params(&self, params: &[Param], varargs: bool) -> String {
        let last = params.len().saturating_sub(1);
        let rendered: Vec<String> = params
            .iter()
            .enumerate()
            .map(|(i, p)| match &p.ty {
                TypeRef::Array(elem) if varargs && i == last => {
                    format!("{}... {}", self.ty(elem), p.name)
                }
                ty => format!("{} {}", self.ty(ty), p.name),
            })
            .collect();
        rendered.join(", ")
    }

    fn throws(&self, throws: &[TypeRef]) -> String {
        if throws.is_empty() {
            return String::new();
        }
        let rendered: Vec<String> = throws.iter().map(|t| self.ty(t)).collect();
        format!(" throws {}", rendered.join(", "))
    }
}

/// Simple names of member types the generated class inherits.
fn inherited_member_types(spec: &GeneratedClassSpec, source: &dyn DeclarationSource) -> BTreeSet<String> {
    let mut supertypes = BTreeSet::new();
    let mut queue: VecDeque<String> = spec
        .superclass
        .iter()
        .chain(&spec.interfaces)
        .filter_map(TypeRef::declared_name)
        .map(str::to_string)
        .collect();
    while let Some(name) = queue.pop_front() {
        if !supertypes.insert(name.clone()) {
            continue;
        }
        if let Some(decl) = source.lookup(&name) {
            for parent in decl.superclass.iter().chain(&decl.interfaces) {
                if let Some(parent) = parent.declared_name() {
                    queue.push_back(parent.to_string());
                }
            }
        }
    }

    source
        .declarations()
        .into_iter()
        .filter(|d| d.enclosing_name().is_some_and(|outer| supertypes.contains(&outer)))
        .map(|d| d.simple_name().to_string())
        .collect()
}

#[cfg(test)]
#[path = "emit/emit_tests.rs"]
mod emit_tests;
