// src/engine/mod.rs

//! Control loop.
//!
//! Each cycle polls the watched files, and when something changed (or on
//! the very first cycle) re-discovers the tests, runs them, diffs the new
//! report against the previous one and sends a notification per transition.
//!
//! The pure core state machine lives in [`core`]; the async/IO shell is
//! implemented in [`runtime`].

use std::path::PathBuf;
use std::time::Duration;

use crate::report::RunReport;

/// Runtime options used by both the core and the async shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeOptions {
    /// Sleep between cycles.
    pub delay: Duration,
    /// Sleep after a cycle that found no tests.
    pub idle_delay: Duration,
    /// Exit after the first cycle that ran (or tried to run) tests.
    pub once: bool,
}

impl Default for RuntimeOptions {
    fn default() -> Self {
        Self {
            delay: Duration::from_secs(2),
            idle_delay: Duration::from_secs(10),
            once: false,
        }
    }
}

/// Events fed into the core by the IO shell.
#[derive(Debug, Clone)]
pub enum CoreEvent {
    /// Watched files were polled; `changed` lists the ones that changed.
    Polled { changed: Vec<PathBuf> },
    /// Discovery finished with this many runnable units.
    Discovered { units: usize },
    /// The suite ran to completion.
    RunFinished(RunReport),
    /// The harness could not produce a report (build failure, spawn error).
    RunFailed,
    /// The run was aborted by an interrupt.
    RunInterrupted,
    /// Graceful shutdown requested.
    ShutdownRequested,
}

/// Out-of-band control messages (Ctrl-C).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlEvent {
    /// Abort a running suite; during the sleep this exits the loop.
    Interrupt,
    /// Stop the loop unconditionally.
    Shutdown,
}

pub mod core;
pub mod event_handlers;
pub mod runtime;

pub use core::CoreRuntime;
pub use event_handlers::{CoreCommand, CoreStep};
pub use runtime::{CycleReport, NextStep, Runtime};
