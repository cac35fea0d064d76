use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use testwatch::exec::{CaseOutcome, CaseResult, ExecutionError, TestHarness, TestSuite};

/// What the fake returns for one suite run.
#[derive(Debug, Clone)]
pub enum Scripted {
    /// Report these outcomes.
    Outcomes(Vec<CaseOutcome>),
    /// Fail the whole run.
    Fail(String),
    /// Never finish (used to test interrupts).
    Hang,
}

/// A fake harness that:
/// - records the filters of every suite it was asked to run
/// - replays scripted results in order, and once the script is exhausted
///   reports every case of the suite as passed.
#[derive(Debug, Clone, Default)]
pub struct FakeHarness {
    script: Arc<Mutex<VecDeque<Scripted>>>,
    runs: Arc<Mutex<Vec<Vec<String>>>>,
}

impl FakeHarness {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, step: Scripted) -> &Self {
        self.script.lock().unwrap().push_back(step);
        self
    }

    /// Filters passed to each run so far.
    pub fn runs(&self) -> Vec<Vec<String>> {
        self.runs.lock().unwrap().clone()
    }
}

impl TestHarness for FakeHarness {
    fn run_suite<'a>(
        &'a mut self,
        suite: &'a TestSuite,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<CaseOutcome>, ExecutionError>> + Send + 'a>> {
        self.runs.lock().unwrap().push(suite.filters());
        let step = self.script.lock().unwrap().pop_front();

        Box::pin(async move {
            match step {
                Some(Scripted::Outcomes(outcomes)) => Ok(outcomes),
                Some(Scripted::Fail(message)) => Err(ExecutionError::Harness(message)),
                Some(Scripted::Hang) => std::future::pending().await,
                None => Ok(suite
                    .units
                    .iter()
                    .flat_map(|unit| {
                        unit.cases.iter().map(move |case| CaseOutcome {
                            name: unit.case_identity(case),
                            result: CaseResult::Passed,
                        })
                    })
                    .collect()),
            }
        })
    }
}
