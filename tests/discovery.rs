/// Manifest discovery tests
///
/// Each test lays out a manifest tree in a temporary directory and loads
/// it into a fresh registry.

use autowire::{
    discover, discover_manifests, Catalog, DiError, DiResult, Function, Registry, Ty, TypeDesc, UnitLoader,
    Value,
};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

trait Color: Send + Sync {
    fn hex(&self) -> &'static str;
}

#[derive(Default)]
struct Blue;
impl Color for Blue {
    fn hex(&self) -> &'static str {
        "#00f"
    }
}

#[derive(Default)]
struct Red;
impl Color for Red {
    fn hex(&self) -> &'static str {
        "#f00"
    }
}

fn color() -> Ty {
    Ty::of::<dyn Color>()
}

fn catalog() -> Catalog {
    Catalog::new()
        .with("colors.blue", Ty::class::<Blue>().implements::<dyn Color>(color(), |c| c).default_constructor())
        .with("colors.red", Ty::class::<Red>().implements::<dyn Color>(color(), |c| c).default_constructor())
        .with(
            "colors.mix",
            Function::builder("mix")
                .returns(TypeDesc::plain::<String>())
                .build(|_| Ok(Value::new("purple".to_string()))),
        )
}

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

#[test]
fn test_nested_manifests_are_loaded_in_path_order() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "b/palette/red.inject.json",
        r#"{"producers": [{"subject": "colors.red", "name": "crimson", "meta": {"hex": "f00"}}]}"#,
    );
    write(
        dir.path(),
        "a/blue.inject.json",
        r#"{"producers": [{"subject": "colors.blue", "priority": 10, "singleton": true}]}"#,
    );
    write(dir.path(), "a/readme.json", r#"{"producers": "ignored"}"#);

    let registry = Registry::new();
    let loaded = discover_manifests(dir.path(), catalog(), &registry);

    assert_eq!(loaded.len(), 2);
    assert_eq!(loaded[0].registered, vec!["Blue"]);
    assert_eq!(loaded[1].registered, vec!["crimson"]);
    assert!(loaded[1].path.ends_with("b/palette/red.inject.json"));

    let blue = registry.producer("Blue").unwrap();
    assert_eq!(blue.priority(), 10);
    assert!(blue.is_singleton());
    let crimson = registry.producer("crimson").unwrap();
    assert_eq!(crimson.meta()["hex"], "f00");
    assert_eq!(crimson.meta()["name"], "crimson");

    let hexes: Vec<_> = registry.get_all::<dyn Color>().unwrap().iter().map(|c| c.hex()).collect();
    assert_eq!(hexes, vec!["#00f", "#f00"]);
}

#[test]
fn test_malformed_manifest_is_skipped() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "broken.inject.json", "{ not json");
    write(dir.path(), "typo.inject.json", r#"{"producers": [{"subject": "colors.red", "prio": 3}]}"#);
    write(dir.path(), "good.inject.json", r#"{"producers": [{"subject": "colors.mix"}]}"#);

    let registry = Registry::new();
    let loaded = discover_manifests(dir.path(), catalog(), &registry);

    assert_eq!(loaded.len(), 1);
    assert_eq!(registry.len(), 1);
    assert!(registry.contains("mix"));
}

#[test]
fn test_unknown_subject_rejects_whole_manifest() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "partial.inject.json",
        r#"{"producers": [{"subject": "colors.blue"}, {"subject": "colors.green"}]}"#,
    );

    let registry = Registry::new();
    let loaded = discover_manifests(dir.path(), catalog(), &registry);

    assert!(loaded.is_empty());
    assert!(registry.is_empty());
}

#[test]
fn test_duplicates_are_reported() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "one.inject.json", r#"{"producers": [{"subject": "colors.blue"}]}"#);
    write(
        dir.path(),
        "two.inject.json",
        r#"{"producers": [{"subject": "colors.blue"}, {"subject": "colors.red"}]}"#,
    );

    let registry = Registry::new();
    let loaded = discover_manifests(dir.path(), catalog(), &registry);

    assert_eq!(loaded[0].registered, vec!["Blue"]);
    assert_eq!(loaded[1].registered, vec!["Red"]);
    assert_eq!(loaded[1].duplicates, vec!["Blue"]);
    assert_eq!(registry.len(), 2);
}

#[test]
fn test_missing_root_yields_nothing() {
    let dir = TempDir::new().unwrap();
    let registry = Registry::new();
    let loaded = discover_manifests(dir.path().join("absent"), catalog(), &registry);
    assert!(loaded.is_empty());
}

/// Counts lines of `.txt` files; fails on empty ones.
struct LineCounter;

impl UnitLoader for LineCounter {
    type Unit = (String, usize);

    fn accepts(&self, path: &Path) -> bool {
        path.extension().map_or(false, |ext| ext == "txt")
    }

    fn load(&self, path: &Path) -> DiResult<Self::Unit> {
        let content = fs::read_to_string(path).map_err(|e| DiError::Discovery {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        if content.is_empty() {
            return Err(DiError::Discovery {
                path: path.to_path_buf(),
                message: "empty".into(),
            });
        }
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        Ok((name, content.lines().count()))
    }
}

#[test]
fn test_custom_unit_loader() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "z.txt", "one\ntwo\n");
    write(dir.path(), "nested/a.txt", "one\n");
    write(dir.path(), "nested/empty.txt", "");
    write(dir.path(), "nested/skip.md", "# no");

    let units = discover(dir.path(), &LineCounter);
    assert_eq!(units, vec![("a.txt".to_string(), 1), ("z.txt".to_string(), 2)]);
}
