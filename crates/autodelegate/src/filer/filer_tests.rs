#![allow(non_snake_case)]

use super::*;

#[test]
fn source_path___maps_packages_to_directories() {
    assert_eq!(
        source_path("foo.bar.AutoDelegate_C"),
        Path::new("foo").join("bar").join("AutoDelegate_C.java")
    );
    assert_eq!(source_path("AutoDelegate_C"), Path::new("AutoDelegate_C.java"));
}

#[test]
fn MemoryFiler___create_source_file___stores_contents() {
    let mut filer = MemoryFiler::new();

    filer
        .create_source_file("foo.AutoDelegate_C", "class X {}")
        .unwrap();

    assert_eq!(filer.len(), 1);
    assert_eq!(filer.get("foo.AutoDelegate_C"), Some("class X {}"));
}

#[test]
fn MemoryFiler___create_source_file___refuses_to_overwrite() {
    let mut filer = MemoryFiler::new();
    filer.create_source_file("foo.AutoDelegate_C", "first").unwrap();

    let result = filer.create_source_file("foo.AutoDelegate_C", "second");

    assert!(matches!(result, Err(FilerError::AlreadyExists(_))));
    assert_eq!(filer.get("foo.AutoDelegate_C"), Some("first"));
}

#[test]
fn DirectoryFiler___create_source_file___writes_below_root() {
    let dir = tempfile::tempdir().unwrap();
    let mut filer = DirectoryFiler::new(dir.path());

    filer
        .create_source_file("foo.bar.AutoDelegate_C", "package foo.bar;\n")
        .unwrap();

    let written = fs::read_to_string(dir.path().join("foo/bar/AutoDelegate_C.java")).unwrap();
    assert_eq!(written, "package foo.bar;\n");
}

#[test]
fn DirectoryFiler___existing_file___is_not_overwritten() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("foo/AutoDelegate_C.java");
    fs::create_dir_all(target.parent().unwrap()).unwrap();
    fs::write(&target, "hand written").unwrap();
    let mut filer = DirectoryFiler::new(dir.path());

    let result = filer.create_source_file("foo.AutoDelegate_C", "generated");

    assert!(matches!(result, Err(FilerError::AlreadyExists(name)) if name == "foo.AutoDelegate_C"));
    assert_eq!(fs::read_to_string(&target).unwrap(), "hand written");
}

#[test]
fn FilerError___display___names_the_type() {
    let err = FilerError::AlreadyExists("foo.AutoDelegate_C".into());

    assert_eq!(
        err.to_string(),
        "source file for foo.AutoDelegate_C already exists"
    );
}

#[test]
fn DirectoryFiler___create_source_file___writes_at_target_relative_path() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let target = crate::model::TargetName {
        package: "foo.bar".into(),
        simple_name: "AutoDelegate_Outer_C".into(),
    };
    let mut filer = DirectoryFiler::new(temp_dir.path());

    filer
        .create_source_file(&target.qualified_name(), "class X {}")
        .unwrap();

    assert_eq!(target.relative_path(), source_path(&target.qualified_name()));
    assert!(temp_dir.path().join(target.relative_path()).is_file());
}
