// src/exec/libtest.rs

//! Parser for libtest's human-readable output (`cargo test`).
//!
//! Only the pieces we need are recognised:
//! - `running N tests` (the test binary actually started),
//! - `test NAME ... ok|FAILED|ignored` result lines,
//! - `test NAME ... ` with no status (the binary died mid-test),
//! - `---- NAME stdout ----` sections holding panic output.

use std::collections::HashMap;

use regex::Regex;

use crate::exec::{CaseOutcome, CaseResult};
use crate::report::StatusCategory;
use crate::types::TestIdentity;

/// Everything we could read back from one harness invocation.
#[derive(Debug, Default)]
pub struct LibtestOutput {
    /// At least one test binary printed its `running N tests` banner.
    pub started: bool,
    pub outcomes: Vec<CaseOutcome>,
    /// Cases whose result line never completed.
    pub interrupted: Vec<TestIdentity>,
}

#[derive(Debug, Clone)]
pub struct LibtestParser {
    running: Regex,
    result: Regex,
    section: Regex,
}

impl LibtestParser {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            running: Regex::new(r"^running \d+ tests?$")?,
            result: Regex::new(
                r"^test (?P<name>.+?)(?: - should panic)? \.\.\.(?: (?P<status>ok|FAILED|ignored|bench)\b.*)?$",
            )?,
            section: Regex::new(r"^---- (?P<name>.+?) stdout ----$")?,
        })
    }

    pub fn parse(&self, stdout: &str) -> LibtestOutput {
        let mut output = LibtestOutput::default();
        let mut statuses: Vec<(TestIdentity, &str)> = Vec::new();
        let mut details: HashMap<TestIdentity, String> = HashMap::new();
        let mut current_section: Option<(TestIdentity, Vec<&str>)> = None;

        for raw in stdout.lines() {
            let line = raw.trim_end();

            if let Some(caps) = self.section.captures(line) {
                flush_section(&mut current_section, &mut details);
                current_section = Some((TestIdentity::new(&caps["name"]), Vec::new()));
                continue;
            }

            if current_section.is_some() && (line == "failures:" || line.starts_with("test result:")) {
                flush_section(&mut current_section, &mut details);
                continue;
            }

            if let Some((_, lines)) = current_section.as_mut() {
                lines.push(raw);
                continue;
            }

            if self.running.is_match(line) {
                output.started = true;
                continue;
            }

            if let Some(caps) = self.result.captures(line) {
                let name = TestIdentity::new(&caps["name"]);
                match caps.name("status") {
                    Some(status) => statuses.push((name, status.as_str())),
                    None => output.interrupted.push(name),
                }
            }
        }
        flush_section(&mut current_section, &mut details);

        for (name, status) in statuses {
            let result = match status {
                "ok" | "bench" => CaseResult::Passed,
                "ignored" => CaseResult::Ignored,
                _ => {
                    let detail = details.remove(&name).unwrap_or_default();
                    CaseResult::Failed {
                        category: classify(&detail),
                        detail,
                    }
                }
            };
            output.outcomes.push(CaseOutcome { name, result });
        }

        output
    }
}

fn flush_section(
    section: &mut Option<(TestIdentity, Vec<&str>)>,
    details: &mut HashMap<TestIdentity, String>,
) {
    if let Some((name, lines)) = section.take() {
        details.insert(name, lines.join("\n").trim().to_string());
    }
}

/// A panic caused by an assertion macro is a failure; anything else is an
/// error.
pub fn classify(detail: &str) -> StatusCategory {
    if detail.contains("assertion") {
        StatusCategory::Failure
    } else {
        StatusCategory::Error
    }
}
