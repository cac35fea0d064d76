#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use testwatch::console::Console;
use testwatch::discover::{Discoverer, ModuleResolver, SourceLoader};
use testwatch::engine::{ControlEvent, CoreRuntime, Runtime, RuntimeOptions};
use testwatch::exec::ExecutionEngine;
use testwatch::fs::mock::MockFileSystem;
use testwatch::fs::FileSystem;
use testwatch::types::{CaseMarker, FingerprintMethod};
use testwatch::watch::{FingerprintStore, TargetExpander, WatchSet};
use testwatch_test_utils::{FakeHarness, RecordingSink};

pub use testwatch_test_utils::{init_tracing, with_timeout};

pub type TestRuntime = Runtime<SourceLoader, FakeHarness, RecordingSink>;

pub const FAILING_CALC: &str = r#"
pub fn add(a: i32, b: i32) -> i32 {
    a - b
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adds() {
        assert_eq!(add(2, 2), 4);
    }
}
"#;

pub const PASSING_CALC: &str = r#"
pub fn add(a: i32, b: i32) -> i32 {
    a + b
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adds() {
        assert_eq!(add(2, 2), 4);
    }
}
"#;

/// `proj/` cargo package whose `lib.rs` declares `mod calc;`.
pub fn calc_project(calc_source: &str) -> MockFileSystem {
    let fs = MockFileSystem::new();
    fs.add_file("proj/Cargo.toml", "[package]\nname = \"proj\"\n");
    fs.add_file("proj/src/lib.rs", "pub mod calc;\n");
    fs.add_file("proj/src/calc.rs", calc_source);
    fs
}

pub fn fast_options() -> RuntimeOptions {
    RuntimeOptions {
        delay: Duration::from_millis(10),
        idle_delay: Duration::from_millis(50),
        once: false,
    }
}

pub fn runtime(
    fs: &MockFileSystem,
    targets: &[&str],
    harness: FakeHarness,
    sink: RecordingSink,
    options: RuntimeOptions,
) -> (TestRuntime, mpsc::Sender<ControlEvent>) {
    let fs: Arc<dyn FileSystem> = Arc::new(fs.clone());
    let targets: Vec<String> = targets.iter().map(|t| t.to_string()).collect();

    let expander = TargetExpander::new(fs.clone(), "rs", false, None);
    let store = FingerprintStore::new(fs.clone(), FingerprintMethod::Hash);
    let watch = WatchSet::new(targets, expander, store);

    let resolver = ModuleResolver::new(fs.clone(), vec![PathBuf::from("proj/src")]);
    let discoverer = Discoverer::new(
        SourceLoader::new(fs.clone()),
        resolver,
        fs,
        CaseMarker::Attribute,
    );

    let (tx, rx) = mpsc::channel(8);
    let runtime = Runtime::new(
        CoreRuntime::new(options),
        watch,
        discoverer,
        ExecutionEngine::new(harness),
        Some(sink),
        rx,
    )
    .with_console(Console::new(Box::new(std::io::sink())));
    (runtime, tx)
}
