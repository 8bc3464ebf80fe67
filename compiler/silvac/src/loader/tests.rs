use std::path::Path;

use pretty_assertions::assert_eq;
use tempfile::TempDir;

use super::*;

fn write(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

#[test]
fn test_module_path() {
    let root = Path::new("/proj");
    assert_eq!(
        module_path(root, Path::new("/proj/share/setup.si.json")).as_deref(),
        Some("share/setup.si")
    );
    assert_eq!(module_path(root, Path::new("/proj/a.json")), None);
    assert_eq!(module_path(root, Path::new("/elsewhere/a.si.json")), None);
}

#[test]
fn test_discovery_is_sorted_and_filtered() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "zeta.si.json", "{}");
    write(dir.path(), "alpha.si.json", "{}");
    write(dir.path(), "share/setup.si.json", "{}");
    write(dir.path(), "notes.json", "{}");
    write(dir.path(), ".hidden/x.si.json", "{}");

    let found: Vec<_> = discover_modules(dir.path())
        .unwrap()
        .iter()
        .map(|p| module_path(dir.path(), p).unwrap())
        .collect();
    assert_eq!(found, vec!["alpha.si", "share/setup.si", "zeta.si"]);
}

#[test]
fn test_load_attaches_dsl_source() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "orders.si.json",
        r#"{ "imports": [{ "url": "share.setup" }], "decls": [{ "kind": "service", "name": "Orders" }] }"#,
    );
    write(dir.path(), "orders.si", "service Orders {}\n");

    let project = load_project(dir.path()).unwrap();
    assert_eq!(project.modules.len(), 1);
    let module = &project.modules[0];
    assert_eq!(module.path, "orders.si");
    assert_eq!(module.source, "service Orders {}\n");
    assert_eq!(module.imports[0].url, "share.setup");
}

#[test]
fn test_malformed_json() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "bad.si.json", r#"{ "decls": [{ "kind": "castle" }] }"#);
    let err = load_project(dir.path()).unwrap_err();
    assert!(matches!(err, LoadError::Json { .. }));
    assert_eq!(err.code(), ErrorCode::E0006);
}

#[test]
fn test_not_a_directory() {
    let dir = TempDir::new().unwrap();
    let err = load_project(&dir.path().join("missing")).unwrap_err();
    assert!(matches!(err, LoadError::NotADirectory(_)));
}

#[test]
fn test_bad_type_expression_fails_lowering() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "a.si.json",
        r#"{ "decls": [{ "kind": "service", "name": "A",
             "api": { "functions": [{ "name": "f", "returns": "list<" }] } }] }"#,
    );
    let err = load_project(dir.path()).unwrap().lower().unwrap_err();
    assert_eq!(err.code(), ErrorCode::E0005);
}
