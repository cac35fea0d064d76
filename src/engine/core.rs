// src/engine/core.rs

//! Pure core runtime state machine.
//!
//! The core consumes [`CoreEvent`]s and produces an updated state plus a list
//! of commands describing what the IO shell should do next. It owns the last
//! [`RunReport`], so diffing needs no shared state or locking.
//!
//! The async shell (`engine::runtime::Runtime`) is responsible for polling
//! files, running discovery and the harness, sending notifications, sleeping
//! and handling Ctrl-C.

use crate::engine::event_handlers::{
    handle_discovered, handle_polled, handle_run_abandoned, handle_run_finished, CoreStep,
    CycleState,
};
use crate::engine::{CoreCommand, CoreEvent, RuntimeOptions};
use crate::report::RunReport;

/// Pure core runtime state.
///
/// It has **no** channels, no Tokio types, and does not perform any IO.
#[derive(Debug)]
pub struct CoreRuntime {
    state: CycleState,
    options: RuntimeOptions,
}

impl CoreRuntime {
    pub fn new(options: RuntimeOptions) -> Self {
        Self {
            state: CycleState::default(),
            options,
        }
    }

    pub fn options(&self) -> &RuntimeOptions {
        &self.options
    }

    /// The report later runs are diffed against.
    pub fn last_report(&self) -> &RunReport {
        &self.state.last
    }

    /// Whether the next poll will run the tests regardless of changes.
    pub fn is_pending(&self) -> bool {
        self.state.pending
    }

    /// Whether the last discovery found nothing to run.
    pub fn is_idle(&self) -> bool {
        self.state.idle
    }

    pub fn step(&mut self, event: CoreEvent) -> CoreStep {
        match event {
            CoreEvent::Polled { changed } => handle_polled(&mut self.state, &self.options, &changed),
            CoreEvent::Discovered { units } => handle_discovered(&mut self.state, &self.options, units),
            CoreEvent::RunFinished(report) => handle_run_finished(&mut self.state, &self.options, report),
            CoreEvent::RunFailed | CoreEvent::RunInterrupted => {
                handle_run_abandoned(&mut self.state, &self.options)
            }
            CoreEvent::ShutdownRequested => CoreStep {
                commands: vec![CoreCommand::RequestExit],
                keep_running: false,
            },
        }
    }
}
