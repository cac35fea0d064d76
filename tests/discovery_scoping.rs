use std::fs;
use std::path::Path;
use std::sync::Arc;

use tempfile::TempDir;
use testwatch::discover::{Discoverer, DiscoveryError, ModuleResolver, SourceLoader};
use testwatch::fs::{FileSystem, RealFileSystem};
use testwatch::types::CaseMarker;

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn discoverer(root: &Path, marker: CaseMarker) -> Discoverer<SourceLoader> {
    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
    let resolver = ModuleResolver::new(fs.clone(), vec![root.join("pkg")]);
    Discoverer::new(SourceLoader::new(fs.clone()), resolver, fs, marker)
}

fn project() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "pkg/base.rs",
        r#"
mod helper;

#[path = "../vendor/lib.rs"]
mod vendored;

#[cfg(test)]
mod tests {
    #[test]
    fn base_works() {}
}
"#,
    );
    write(
        dir.path(),
        "pkg/base/helper.rs",
        r#"
#[cfg(test)]
mod tests {
    #[test]
    fn helper_works() {}

    #[tokio::test]
    async fn helper_async() {}

    fn not_a_case() {}
}
"#,
    );
    write(
        dir.path(),
        "vendor/lib.rs",
        r#"
#[cfg(test)]
mod tests {
    #[test]
    fn vendored_test() {}
}
"#,
    );
    dir
}

#[test]
fn only_in_tree_modules_are_discovered() {
    let dir = project();
    let base = dir.path().join("pkg/base.rs");
    let units = discoverer(dir.path(), CaseMarker::Attribute)
        .discover(base.to_str().unwrap())
        .unwrap();

    let ids: Vec<&str> = units.iter().map(|u| u.identity.as_str()).collect();
    assert_eq!(ids, vec!["base::tests", "base::helper::tests"]);
    assert_eq!(units[1].cases, vec!["helper_works", "helper_async"]);
}

#[test]
fn module_path_references_resolve_against_search_paths() {
    let dir = project();
    let d = discoverer(dir.path(), CaseMarker::Attribute);

    let dotted = d.discover("base.helper").unwrap();
    let colons = d.discover("base::helper").unwrap();
    assert_eq!(dotted, colons);
    assert_eq!(dotted[0].identity.as_str(), "base::helper::tests");
}

#[test]
fn syntax_error_is_reported_per_target_and_others_continue() {
    let dir = project();
    write(dir.path(), "pkg/broken.rs", "fn oops( {");
    let d = discoverer(dir.path(), CaseMarker::Attribute);

    let outcome = d.discover_all(&["broken", "base"]);
    assert_eq!(outcome.errors.len(), 1);
    assert_eq!(outcome.errors[0].0, "broken");
    assert!(matches!(outcome.errors[0].1, DiscoveryError::Syntax { .. }));
    assert_eq!(outcome.units.len(), 2);
}

#[test]
fn prefix_marker_selects_by_name() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "pkg/legacy.rs",
        r#"
mod checks {
    fn test_one() {}
    fn helper() {}
}
"#,
    );
    let units = discoverer(dir.path(), CaseMarker::Prefix)
        .discover("legacy")
        .unwrap();
    assert_eq!(units.len(), 1);
    assert_eq!(units[0].identity.as_str(), "legacy::checks");
    assert_eq!(units[0].cases, vec!["test_one"]);
}
