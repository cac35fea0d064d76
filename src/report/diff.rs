// src/report/diff.rs

use std::fmt;

use crate::report::{FailureRecord, RunReport, StatusCategory};
use crate::types::TestIdentity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Direction {
    /// Not in the previous report, present now.
    Broke,
    /// In the previous report, gone now.
    Fixed,
}

impl Direction {
    pub fn reversed(self) -> Direction {
        match self {
            Direction::Broke => Direction::Fixed,
            Direction::Fixed => Direction::Broke,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Broke => f.write_str("broke"),
            Direction::Fixed => f.write_str("fixed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub category: StatusCategory,
    pub direction: Direction,
    pub identity: TestIdentity,
    pub record: FailureRecord,
}

/// Compare two consecutive reports.
///
/// Per category: identities only in `current` broke, identities only in
/// `previous` were fixed, identities in both are still broken and not
/// reported. If either side is unobserved there is nothing to compare
/// against and no transitions are produced.
///
/// Output order is fixed: categories in [`StatusCategory::ALL`] order, broke
/// before fixed, identities ascending.
pub fn diff(previous: &RunReport, current: &RunReport) -> Vec<Transition> {
    if !previous.is_observed() || !current.is_observed() {
        return Vec::new();
    }

    let mut transitions = Vec::new();
    for category in StatusCategory::ALL {
        let prev = previous.category(category);
        let cur = current.category(category);

        for (identity, record) in cur {
            if !prev.contains_key(identity) {
                transitions.push(Transition {
                    category,
                    direction: Direction::Broke,
                    identity: identity.clone(),
                    record: record.clone(),
                });
            }
        }

        for (identity, record) in prev {
            if !cur.contains_key(identity) {
                transitions.push(Transition {
                    category,
                    direction: Direction::Fixed,
                    identity: identity.clone(),
                    record: record.clone(),
                });
            }
        }
    }
    transitions
}
