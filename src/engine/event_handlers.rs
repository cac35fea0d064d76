// src/engine/event_handlers.rs

//! Event handling logic for the core runtime.

use std::path::PathBuf;

use crate::engine::RuntimeOptions;
use crate::report::{diff, RunReport, Transition};

/// Command produced by the pure core, to be executed by the outer IO shell.
#[derive(Debug, Clone, PartialEq)]
pub enum CoreCommand {
    /// Re-expand targets and re-discover test units.
    Discover,
    /// Run the most recently discovered units.
    Execute,
    /// Deliver these transitions.
    Notify(Vec<Transition>),
    /// The cycle is over; wait this long before the next poll.
    Sleep(std::time::Duration),
    /// Stop the loop.
    RequestExit,
}

/// Decision returned by the core after handling a single `CoreEvent`.
#[derive(Debug, Clone, PartialEq)]
pub struct CoreStep {
    pub commands: Vec<CoreCommand>,
    pub keep_running: bool,
}

impl CoreStep {
    fn running(commands: Vec<CoreCommand>) -> Self {
        Self {
            commands,
            keep_running: true,
        }
    }

    fn exit(mut commands: Vec<CoreCommand>) -> Self {
        commands.push(CoreCommand::RequestExit);
        Self {
            commands,
            keep_running: false,
        }
    }
}

/// Mutable state shared by the handlers.
#[derive(Debug)]
pub struct CycleState {
    /// Most recent observed report, or the unobserved sentinel.
    pub last: RunReport,
    /// A run is owed: first cycle, a change was seen, or the previous
    /// discovery came up empty.
    pub pending: bool,
    /// The previous discovery found no units.
    pub idle: bool,
}

impl Default for CycleState {
    fn default() -> Self {
        Self {
            last: RunReport::unobserved(),
            pending: true,
            idle: false,
        }
    }
}

/// Handle the result of polling the fingerprints.
pub fn handle_polled(state: &mut CycleState, options: &RuntimeOptions, changed: &[PathBuf]) -> CoreStep {
    if !changed.is_empty() {
        state.pending = true;
    }
    if state.pending {
        CoreStep::running(vec![CoreCommand::Discover])
    } else {
        CoreStep::running(vec![CoreCommand::Sleep(options.delay)])
    }
}

/// Handle the end of discovery.
///
/// With no units the run stays pending, so the next cycle re-discovers even
/// if no file changed, after the longer idle delay.
pub fn handle_discovered(state: &mut CycleState, options: &RuntimeOptions, units: usize) -> CoreStep {
    if units > 0 {
        state.idle = false;
        return CoreStep::running(vec![CoreCommand::Execute]);
    }

    state.idle = true;
    state.pending = true;
    if options.once {
        CoreStep::exit(Vec::new())
    } else {
        CoreStep::running(vec![CoreCommand::Sleep(options.idle_delay)])
    }
}

/// Handle a completed run: diff against the last report and keep the new one.
pub fn handle_run_finished(state: &mut CycleState, options: &RuntimeOptions, report: RunReport) -> CoreStep {
    let transitions = diff(&state.last, &report);
    state.last = report;
    state.pending = false;

    let mut commands = Vec::new();
    if !transitions.is_empty() {
        commands.push(CoreCommand::Notify(transitions));
    }
    finish_cycle(options, commands)
}

/// Handle a run that produced no report (failed or interrupted).
///
/// The last report is kept and nothing re-runs until the next change.
pub fn handle_run_abandoned(state: &mut CycleState, options: &RuntimeOptions) -> CoreStep {
    state.pending = false;
    finish_cycle(options, Vec::new())
}

fn finish_cycle(options: &RuntimeOptions, commands: Vec<CoreCommand>) -> CoreStep {
    if options.once {
        CoreStep::exit(commands)
    } else {
        let mut commands = commands;
        commands.push(CoreCommand::Sleep(options.delay));
        CoreStep::running(commands)
    }
}
