#![allow(non_snake_case)]

use super::*;
use std::path::Path;

fn ty(s: &str) -> TypeRef {
    TypeRef::parse(s).unwrap()
}

fn member(name: &str, type_params: &[&str], params: &[TypeRef], ret: TypeRef) -> MemberSignature {
    let type_params: Vec<TypeParam> = type_params
        .iter()
        .map(|n| TypeParam {
            name: n.to_string(),
            bounds: vec![],
        })
        .collect();
    let params: Vec<Param> = params
        .iter()
        .enumerate()
        .map(|(i, t)| Param {
            name: format!("p{i}"),
            ty: t.clone(),
        })
        .collect();
    let scope = TypeScope::with_params(&type_params);
    MemberSignature {
        erased: ErasedSignature::of(name, params.iter().map(|p| &p.ty), &scope),
        name: name.into(),
        type_params,
        params,
        return_type: ret,
        throws: vec![],
        varargs: false,
        contract: 0,
        declaring_types: vec!["foo.I".into()],
        location: None,
        ambiguous_with: vec![],
        unsupported: None,
    }
}

#[test]
fn ErasedSignature___display___lists_erased_params() {
    let sig = ErasedSignature::new("put", vec![ty("java.lang.String"), ty("int[]")]);

    assert_eq!(sig.to_string(), "put(java.lang.String, int[])");
}

#[test]
fn ErasedSignature___of___erases_type_variables_to_bounds() {
    let scope = TypeScope::with_params(&[TypeParam {
        name: "T".into(),
        bounds: vec![ty("java.lang.Number")],
    }]);

    let sig = ErasedSignature::of(
        "add",
        &[TypeRef::Var("T".into()), ty("java.util.List<java.lang.String>")],
        &scope,
    );

    assert_eq!(
        sig.params,
        vec![ty("java.lang.Number"), ty("java.util.List")]
    );
}

#[test]
fn ErasedSignature___is_object_method___recognises_object_members() {
    assert!(ErasedSignature::new("hashCode", vec![]).is_object_method());
    assert!(ErasedSignature::new("toString", vec![]).is_object_method());
    assert!(ErasedSignature::new("equals", vec![TypeRef::object()]).is_object_method());
    assert!(!ErasedSignature::new("equals", vec![ty("java.lang.String")]).is_object_method());
    assert!(!ErasedSignature::new("clone", vec![]).is_object_method());
    assert!(ErasedSignature::new("clone", vec![]).is_overridable_object_method());
}

#[test]
fn TargetName___relative_path___follows_package() {
    let target = TargetName {
        package: "foo.bar".into(),
        simple_name: "AutoDelegate_Outer_C".into(),
    };

    assert_eq!(target.qualified_name(), "foo.bar.AutoDelegate_Outer_C");
    assert_eq!(
        target.relative_path(),
        Path::new("foo").join("bar").join("AutoDelegate_Outer_C.java")
    );
}

#[test]
fn TargetName___unnamed_package___has_bare_path() {
    let target = TargetName {
        package: String::new(),
        simple_name: "AutoDelegate_C".into(),
    };

    assert_eq!(target.qualified_name(), "AutoDelegate_C");
    assert_eq!(target.relative_path(), Path::new("AutoDelegate_C.java"));
}

#[test]
fn MemberSignature___same_signature___ignores_type_parameter_names() {
    let a = member("get", &["T"], &[TypeRef::Var("T".into())], TypeRef::Var("T".into()));
    let b = member("get", &["U"], &[TypeRef::Var("U".into())], TypeRef::Var("U".into()));

    assert!(a.same_signature(&b));
}

#[test]
fn MemberSignature___same_signature___detects_return_difference() {
    let a = member("size", &[], &[], ty("int"));
    let b = member("size", &[], &[], ty("long"));

    assert!(!a.same_signature(&b));
}

#[test]
fn MemberSignature___same_signature___detects_generic_instantiation_difference() {
    let a = member("take", &[], &[ty("java.util.List<java.lang.String>")], TypeRef::Void);
    let b = member("take", &[], &[ty("java.util.List<java.lang.Integer>")], TypeRef::Void);

    assert_eq!(a.erased, b.erased);
    assert!(!a.same_signature(&b));
}

#[test]
fn MemberSignature___element___names_declaring_type_and_erasure() {
    let m = member("add", &[], &[ty("java.lang.String")], TypeRef::Void);

    assert_eq!(m.element(), "foo.I#add(java.lang.String)");
}

#[test]
fn MemberSignature___referenced_types___collects_each_name_once() {
    let mut m = member(
        "map",
        &[],
        &[ty("java.util.Map<foo.K, foo.K>")],
        ty("foo.V[]"),
    );
    m.throws = vec![ty("java.io.IOException")];

    assert_eq!(
        m.referenced_types(),
        vec!["java.util.Map", "foo.K", "foo.V", "java.io.IOException"]
    );
}
