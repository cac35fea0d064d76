// src/exec/mod.rs

//! Test execution layer.
//!
//! - [`backend`] provides the `TestHarness` trait and the production
//!   `CargoHarness`, which tests can replace with a fake implementation.
//! - [`libtest`] parses libtest's console output.
//! - [`engine`] aggregates discovered units into one suite, runs it and
//!   classifies the non-passing cases into a `RunReport`.

pub mod backend;
pub mod engine;
pub mod libtest;

use thiserror::Error;

use crate::discover::TestUnit;
use crate::report::StatusCategory;
use crate::types::TestIdentity;

pub use backend::{CargoHarness, RunnerCommand, TestHarness};
pub use engine::ExecutionEngine;

#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("failed to start test runner '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("test runner exited ({status}) before running any tests:\n{stderr}")]
    Build { status: String, stderr: String },

    #[error("invalid output parser: {0}")]
    Parser(String),

    #[error("test harness failed: {0}")]
    Harness(String),
}

/// Every unit of one cycle, executed together.
#[derive(Debug, Clone, Default)]
pub struct TestSuite {
    pub units: Vec<TestUnit>,
}

impl TestSuite {
    pub fn filters(&self) -> Vec<String> {
        self.units.iter().flat_map(|u| u.filters()).collect()
    }

    pub fn case_count(&self) -> usize {
        self.units.iter().map(|u| u.cases.len()).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaseResult {
    Passed,
    Ignored,
    Failed {
        category: StatusCategory,
        detail: String,
    },
}

/// What the harness observed for one case, keyed by its full name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseOutcome {
    pub name: TestIdentity,
    pub result: CaseResult,
}
