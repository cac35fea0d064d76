// src/console.rs

//! Human-readable progress lines on stdout.
//!
//! Logs go to stderr through `tracing`; this is the user-facing transcript.

use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;

use crate::discover::TestUnit;
use crate::report::{Direction, RunReport, Transition};

const RULE_WIDTH: usize = 78;

pub fn rule() -> String {
    "-".repeat(RULE_WIDTH)
}

/// Writes the transcript to any `Write` sink (stdout in production).
pub struct Console {
    out: Box<dyn Write + Send>,
}

impl std::fmt::Debug for Console {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Console").finish_non_exhaustive()
    }
}

impl Default for Console {
    fn default() -> Self {
        Self::stdout()
    }
}

impl Console {
    pub fn stdout() -> Self {
        Self::new(Box::new(io::stdout()))
    }

    pub fn new(out: Box<dyn Write + Send>) -> Self {
        Self { out }
    }

    pub fn changes_detected(&mut self, changed: &[PathBuf]) {
        match changed {
            [] => {}
            [one] => self.line(format!("Change detected in {}", one.display())),
            many => self.line(format!("Changes detected in {} files", many.len())),
        }
    }

    pub fn run_started(&mut self, units: &[TestUnit]) {
        let cases: usize = units.iter().map(|u| u.cases.len()).sum();
        self.line(format!("Running {cases} tests in {} groups...", units.len()));
    }

    pub fn run_finished(&mut self, report: &RunReport) {
        if report.is_empty() {
            self.line("All tests passed".to_string());
        } else {
            self.line(format!("{} tests not passing", report.len()));
        }
    }

    pub fn run_failed(&mut self, reason: &str) {
        self.line(format!("Test run failed: {reason}"));
    }

    pub fn run_interrupted(&mut self) {
        self.line("Test run interrupted".to_string());
    }

    pub fn transition(&mut self, transition: &Transition) {
        let verb = match transition.direction {
            Direction::Broke => "Broke",
            Direction::Fixed => "Fixed",
        };
        self.line(format!("{verb} [{}] {}", transition.category, transition.record.name));
        if transition.direction == Direction::Broke && !transition.record.detail.is_empty() {
            self.line(transition.record.detail.trim_end().to_string());
        }
        self.line(rule());
    }

    pub fn no_tests(&mut self, wait: Duration) {
        self.line(format!("No tests found! Waiting {} seconds", wait.as_secs()));
    }

    fn line(&mut self, text: String) {
        // A closed stdout is not worth stopping the loop for.
        let _ = writeln!(self.out, "{text}");
        let _ = self.out.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{FailureRecord, StatusCategory};
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Buffer(Arc<Mutex<Vec<u8>>>);

    impl Write for Buffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn transition_block_ends_with_rule() {
        let buf = Buffer::default();
        let mut console = Console::new(Box::new(buf.clone()));
        console.transition(&Transition {
            category: StatusCategory::Error,
            direction: Direction::Broke,
            identity: "a::t".into(),
            record: FailureRecord {
                name: "t (a)".into(),
                detail: "called `Option::unwrap()` on a `None` value\n".into(),
            },
        });
        console.no_tests(Duration::from_secs(10));

        let text = String::from_utf8(buf.0.lock().unwrap().clone()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Broke [error] t (a)");
        assert_eq!(lines[2], rule());
        assert_eq!(lines[2].len(), 78);
        assert_eq!(lines[3], "No tests found! Waiting 10 seconds");
    }
}
