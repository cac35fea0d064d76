use std::fs;
use std::path::Path;

use testwatch::discover::TestUnit;
use testwatch::exec::{CargoHarness, ExecutionEngine, RunnerCommand};
use testwatch::report::StatusCategory;
use testwatch::types::TestIdentity;

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// Drives a real `cargo test` in a scratch package. Slow and needs a
/// toolchain, so it only runs on request (`cargo test -- --ignored`).
#[tokio::test]
#[ignore]
async fn real_cargo_run_classifies_failures_and_errors() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "Cargo.toml",
        "[package]\nname = \"scratch\"\nversion = \"0.1.0\"\nedition = \"2021\"\n",
    );
    write(
        dir.path(),
        "src/lib.rs",
        r#"
#[cfg(test)]
mod tests {
    #[test]
    fn passes() {}

    #[test]
    fn asserts() {
        assert_eq!(1, 2);
    }

    #[test]
    fn panics() {
        panic!("boom");
    }
}
"#,
    );

    let command = RunnerCommand {
        workdir: dir.path().to_path_buf(),
        ..RunnerCommand::default()
    };
    let mut engine = ExecutionEngine::new(CargoHarness::new(command).unwrap());
    let units = vec![TestUnit {
        identity: TestIdentity::from("tests"),
        source: dir.path().join("src/lib.rs"),
        cases: vec!["passes".into(), "asserts".into(), "panics".into()],
    }];

    let report = engine.execute(&units).await.unwrap();
    assert!(report.get(StatusCategory::Failure, &"tests::asserts".into()).is_some());
    assert!(report.get(StatusCategory::Error, &"tests::panics".into()).is_some());
    assert_eq!(report.len(), 2);
}
