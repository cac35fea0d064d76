// src/exec/backend.rs

//! Pluggable test harness abstraction.
//!
//! The execution engine talks to a `TestHarness` instead of spawning
//! processes itself. This makes it easy to swap in a fake harness in tests
//! while keeping the production implementation ([`CargoHarness`]) here.

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::exec::libtest::LibtestParser;
use crate::exec::{CaseOutcome, CaseResult, ExecutionError, TestSuite};
use crate::report::StatusCategory;

/// Trait abstracting how a suite of test units is executed.
///
/// Implementations run every unit in the suite to completion and report one
/// outcome per case they heard about. A fault inside one case must not stop
/// the others; only failures of the harness itself are errors.
pub trait TestHarness: Send {
    fn run_suite<'a>(
        &'a mut self,
        suite: &'a TestSuite,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<CaseOutcome>, ExecutionError>> + Send + 'a>>;
}

/// Command line used by [`CargoHarness`]:
/// `program args... <unit filters...> trailing_args...`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerCommand {
    pub program: String,
    pub args: Vec<String>,
    pub trailing_args: Vec<String>,
    pub workdir: PathBuf,
}

impl Default for RunnerCommand {
    fn default() -> Self {
        Self {
            program: "cargo".to_string(),
            args: vec!["test".into(), "--no-fail-fast".into(), "--".into()],
            trailing_args: vec!["--test-threads=1".into()],
            workdir: PathBuf::from("."),
        }
    }
}

/// Runs the suite through `cargo test` (or any libtest-compatible command)
/// and parses its output.
#[derive(Debug, Clone)]
pub struct CargoHarness {
    command: RunnerCommand,
    parser: LibtestParser,
}

impl CargoHarness {
    pub fn new(command: RunnerCommand) -> Result<Self, ExecutionError> {
        let parser = LibtestParser::new().map_err(|e| ExecutionError::Parser(e.to_string()))?;
        Ok(Self { command, parser })
    }

    fn build_command(&self, suite: &TestSuite) -> Command {
        let mut cmd = Command::new(&self.command.program);
        cmd.args(&self.command.args)
            .args(suite.filters())
            .args(&self.command.trailing_args)
            .current_dir(&self.command.workdir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }

    async fn run(&self, suite: &TestSuite) -> Result<Vec<CaseOutcome>, ExecutionError> {
        let mut cmd = self.build_command(suite);
        info!(
            program = %self.command.program,
            units = suite.units.len(),
            workdir = ?self.command.workdir,
            "starting test process"
        );

        let output = cmd.output().await.map_err(|source| ExecutionError::Spawn {
            program: self.command.program.clone(),
            source,
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        let parsed = self.parser.parse(&stdout);

        info!(
            exit_code = output.status.code().unwrap_or(-1),
            success = output.status.success(),
            cases = parsed.outcomes.len(),
            "test process exited"
        );

        if !parsed.started && !output.status.success() {
            return Err(ExecutionError::Build {
                status: output.status.to_string(),
                stderr: tail(&stderr, 40),
            });
        }

        let mut outcomes = parsed.outcomes;
        for name in parsed.interrupted {
            warn!(case = %name, "test binary terminated while running case");
            outcomes.push(CaseOutcome {
                name,
                result: CaseResult::Failed {
                    category: StatusCategory::Error,
                    detail: format!(
                        "test process terminated before reporting a result ({})\n\n{}",
                        output.status,
                        tail(&stderr, 40)
                    ),
                },
            });
        }

        debug!(outcomes = outcomes.len(), "parsed libtest output");
        Ok(outcomes)
    }
}

impl TestHarness for CargoHarness {
    fn run_suite<'a>(
        &'a mut self,
        suite: &'a TestSuite,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<CaseOutcome>, ExecutionError>> + Send + 'a>> {
        Box::pin(self.run(suite))
    }
}

/// Last `max_lines` lines of `text`.
fn tail(text: &str, max_lines: usize) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let start = lines.len().saturating_sub(max_lines);
    lines[start..].join("\n")
}
