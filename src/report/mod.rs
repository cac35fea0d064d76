// src/report/mod.rs

//! Run reports and the differ that compares them.
//!
//! A [`RunReport`] only records what did not pass; passing and ignored cases
//! are absent. [`diff`] turns two consecutive reports into transitions.

pub mod diff;

use std::collections::BTreeMap;
use std::fmt;

use crate::types::TestIdentity;

pub use diff::{diff, Direction, Transition};

/// Why a case did not pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StatusCategory {
    /// Something other than an assertion went wrong (unexpected panic,
    /// `Err` returned, test binary died).
    Error,
    /// An assertion did not hold.
    Failure,
}

impl StatusCategory {
    pub const ALL: [StatusCategory; 2] = [StatusCategory::Error, StatusCategory::Failure];

    pub fn as_str(&self) -> &'static str {
        match self {
            StatusCategory::Error => "error",
            StatusCategory::Failure => "failure",
        }
    }
}

impl fmt::Display for StatusCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureRecord {
    pub name: String,
    pub detail: String,
}

/// Non-passing cases of one run, by category.
///
/// [`RunReport::unobserved`] is the state before any run finished; diffing
/// against it yields nothing, which is how the first run establishes a
/// baseline without announcing pre-existing failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    observed: bool,
    errors: BTreeMap<TestIdentity, FailureRecord>,
    failures: BTreeMap<TestIdentity, FailureRecord>,
}

impl Default for RunReport {
    fn default() -> Self {
        Self::new()
    }
}

impl RunReport {
    /// An observed run with nothing broken.
    pub fn new() -> Self {
        Self {
            observed: true,
            errors: BTreeMap::new(),
            failures: BTreeMap::new(),
        }
    }

    /// Placeholder for "no run observed yet".
    pub fn unobserved() -> Self {
        Self {
            observed: false,
            ..Self::new()
        }
    }

    pub fn is_observed(&self) -> bool {
        self.observed
    }

    pub fn record(&mut self, category: StatusCategory, identity: TestIdentity, record: FailureRecord) {
        // One category per case; a later record wins.
        for other in StatusCategory::ALL {
            if other != category {
                self.category_mut(other).remove(&identity);
            }
        }
        self.category_mut(category).insert(identity, record);
    }

    pub fn category(&self, category: StatusCategory) -> &BTreeMap<TestIdentity, FailureRecord> {
        match category {
            StatusCategory::Error => &self.errors,
            StatusCategory::Failure => &self.failures,
        }
    }

    fn category_mut(&mut self, category: StatusCategory) -> &mut BTreeMap<TestIdentity, FailureRecord> {
        match category {
            StatusCategory::Error => &mut self.errors,
            StatusCategory::Failure => &mut self.failures,
        }
    }

    pub fn get(&self, category: StatusCategory, identity: &TestIdentity) -> Option<&FailureRecord> {
        self.category(category).get(identity)
    }

    pub fn len(&self) -> usize {
        self.errors.len() + self.failures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(name: &str) -> FailureRecord {
        FailureRecord {
            name: name.to_string(),
            detail: String::new(),
        }
    }

    #[test]
    fn a_case_lives_in_one_category() {
        let mut report = RunReport::new();
        let id = TestIdentity::from("calc::tests::adds");
        report.record(StatusCategory::Failure, id.clone(), rec("adds"));
        report.record(StatusCategory::Error, id.clone(), rec("adds"));

        assert!(report.get(StatusCategory::Failure, &id).is_none());
        assert!(report.get(StatusCategory::Error, &id).is_some());
        assert_eq!(report.len(), 1);
    }

    #[test]
    fn unobserved_is_empty_but_distinct() {
        assert!(RunReport::unobserved().is_empty());
        assert_ne!(RunReport::unobserved(), RunReport::new());
    }
}
