// src/exec/engine.rs

use std::collections::HashMap;

use tracing::{debug, info, trace};

use crate::discover::TestUnit;
use crate::exec::{CaseResult, ExecutionError, TestHarness, TestSuite};
use crate::report::{FailureRecord, RunReport};
use crate::types::TestIdentity;

/// Runs discovered units through a [`TestHarness`] and produces a
/// [`RunReport`] holding only the cases that did not pass.
#[derive(Debug)]
pub struct ExecutionEngine<H: TestHarness> {
    harness: H,
}

impl<H: TestHarness> ExecutionEngine<H> {
    pub fn new(harness: H) -> Self {
        Self { harness }
    }

    pub async fn execute(&mut self, units: &[TestUnit]) -> Result<RunReport, ExecutionError> {
        let suite = TestSuite {
            units: units.to_vec(),
        };
        if suite.units.is_empty() {
            return Ok(RunReport::new());
        }

        // Case identity -> owning unit, so stray outcomes (libtest filters are
        // substring matches) can be dropped.
        let owners: HashMap<TestIdentity, &TestUnit> = units
            .iter()
            .flat_map(|unit| unit.cases.iter().map(move |case| (unit.case_identity(case), unit)))
            .collect();

        debug!(units = suite.units.len(), cases = suite.case_count(), "executing suite");
        let outcomes = self.harness.run_suite(&suite).await?;

        let mut report = RunReport::new();
        let mut passed = 0usize;
        for outcome in outcomes {
            let Some(unit) = owners.get(&outcome.name) else {
                trace!(case = %outcome.name, "outcome for undiscovered case; ignoring");
                continue;
            };
            match outcome.result {
                CaseResult::Passed => passed += 1,
                CaseResult::Ignored => {}
                CaseResult::Failed { category, detail } => {
                    let case = outcome
                        .name
                        .as_str()
                        .rsplit("::")
                        .next()
                        .unwrap_or(outcome.name.as_str())
                        .to_string();
                    let record = FailureRecord {
                        name: format!("{case} ({})", unit.identity),
                        detail,
                    };
                    report.record(category, outcome.name, record);
                }
            }
        }

        info!(passed, not_passing = report.len(), "suite finished");
        Ok(report)
    }
}
