// src/engine/runtime.rs

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::console::Console;
use crate::discover::{Discoverer, ModuleLoader, TestUnit};
use crate::errors::Result;
use crate::exec::{ExecutionEngine, TestHarness};
use crate::notification::{NotificationEvent, NotificationSink};
use crate::report::Transition;
use crate::watch::WatchSet;

use super::core::CoreRuntime;
use super::{ControlEvent, CoreCommand, CoreEvent};

/// What the loop does once a cycle is over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextStep {
    Sleep(Duration),
    Exit,
}

/// Summary of one pass through the loop.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    /// Files whose fingerprint changed since the previous cycle.
    pub changed: Vec<PathBuf>,
    /// Whether the suite was started this cycle.
    pub executed: bool,
    /// Transitions delivered this cycle.
    pub transitions: Vec<Transition>,
    pub next: NextStep,
}

/// Polls the watch set, and drives discovery, execution and notification
/// as directed by a [`CoreRuntime`].
///
/// This is a pure IO shell: all decisions (whether to run, how long to
/// sleep, when to exit) are made by the core.
pub struct Runtime<L: ModuleLoader, H: TestHarness, N: NotificationSink> {
    core: CoreRuntime,
    watch: WatchSet,
    discoverer: Discoverer<L>,
    engine: ExecutionEngine<H>,
    notifier: Option<N>,
    console: Console,
    control_rx: mpsc::Receiver<ControlEvent>,
    units: Vec<TestUnit>,
}

impl<L: ModuleLoader, H: TestHarness, N: NotificationSink> fmt::Debug for Runtime<L, H, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("core", &self.core)
            .field("watch", &self.watch)
            .field("units", &self.units.len())
            .finish_non_exhaustive()
    }
}

impl<L: ModuleLoader, H: TestHarness, N: NotificationSink> Runtime<L, H, N> {
    pub fn new(
        core: CoreRuntime,
        watch: WatchSet,
        discoverer: Discoverer<L>,
        engine: ExecutionEngine<H>,
        notifier: Option<N>,
        control_rx: mpsc::Receiver<ControlEvent>,
    ) -> Self {
        Self {
            core,
            watch,
            discoverer,
            engine,
            notifier,
            console: Console::stdout(),
            control_rx,
            units: Vec::new(),
        }
    }

    /// Replace the stdout transcript (tests capture it).
    pub fn with_console(mut self, console: Console) -> Self {
        self.console = console;
        self
    }

    pub fn core(&self) -> &CoreRuntime {
        &self.core
    }

    pub fn engine(&self) -> &ExecutionEngine<H> {
        &self.engine
    }

    pub fn notifier(&self) -> Option<&N> {
        self.notifier.as_ref()
    }

    /// Main loop: cycle, sleep, repeat until the core or a control event
    /// says to stop.
    pub async fn run(mut self) -> Result<()> {
        info!(targets = ?self.watch.targets(), "testwatch runtime started");

        loop {
            let cycle = self.run_cycle().await;
            match cycle.next {
                NextStep::Exit => break,
                NextStep::Sleep(delay) => {
                    if !self.sleep(delay).await {
                        break;
                    }
                }
            }
        }

        info!("runtime exiting");
        Ok(())
    }

    /// One poll → (discover → execute → diff → notify) pass, without the
    /// trailing sleep.
    pub async fn run_cycle(&mut self) -> CycleReport {
        let changed = self.watch.refresh(self.discoverer.resolver());
        self.console.changes_detected(&changed);

        let mut cycle = CycleReport {
            changed: changed.clone(),
            executed: false,
            transitions: Vec::new(),
            next: NextStep::Sleep(self.core.options().delay),
        };

        let mut step = self.core.step(CoreEvent::Polled { changed });
        loop {
            let mut follow_up = None;
            for command in step.commands {
                match command {
                    CoreCommand::Discover => {
                        let units = self.discover();
                        follow_up = Some(CoreEvent::Discovered { units });
                    }
                    CoreCommand::Execute => {
                        cycle.executed = true;
                        follow_up = Some(self.execute().await);
                    }
                    CoreCommand::Notify(transitions) => {
                        self.notify(&transitions).await;
                        cycle.transitions.extend(transitions);
                    }
                    CoreCommand::Sleep(delay) => cycle.next = NextStep::Sleep(delay),
                    CoreCommand::RequestExit => cycle.next = NextStep::Exit,
                }
            }

            if !step.keep_running {
                cycle.next = NextStep::Exit;
                break;
            }
            match follow_up {
                Some(event) => step = self.core.step(event),
                None => break,
            }
        }

        cycle
    }

    fn discover(&mut self) -> usize {
        let outcome = self.discoverer.discover_all(self.watch.targets());
        debug!(
            units = outcome.units.len(),
            cases = outcome.case_count(),
            failed_targets = outcome.errors.len(),
            "discovery pass finished"
        );
        self.units = outcome.units;
        if self.units.is_empty() {
            self.console.no_tests(self.core.options().idle_delay);
        }
        self.units.len()
    }

    async fn execute(&mut self) -> CoreEvent {
        self.console.run_started(&self.units);

        // Dropping the execution future kills the child process.
        let outcome = tokio::select! {
            result = self.engine.execute(&self.units) => Ok(result),
            Some(control) = self.control_rx.recv() => Err(control),
        };

        match outcome {
            Ok(Ok(report)) => {
                self.console.run_finished(&report);
                CoreEvent::RunFinished(report)
            }
            Ok(Err(err)) => {
                error!(error = %err, "test run failed; keeping previous results");
                self.console.run_failed(&err.to_string());
                CoreEvent::RunFailed
            }
            Err(ControlEvent::Interrupt) => {
                warn!("test run interrupted");
                self.console.run_interrupted();
                CoreEvent::RunInterrupted
            }
            Err(ControlEvent::Shutdown) => CoreEvent::ShutdownRequested,
        }
    }

    async fn notify(&mut self, transitions: &[Transition]) {
        for transition in transitions {
            self.console.transition(transition);
            info!(
                category = %transition.category,
                direction = %transition.direction,
                test = %transition.identity,
                "status changed"
            );

            let Some(sink) = self.notifier.as_mut() else {
                continue;
            };
            let event = NotificationEvent::from_transition(transition);
            if let Err(err) = sink.notify(&event).await {
                warn!(error = %err, title = %event.title, "notification dropped");
            }
        }
    }

    /// Returns false if a control event arrived while sleeping.
    async fn sleep(&mut self, delay: Duration) -> bool {
        tokio::select! {
            _ = tokio::time::sleep(delay) => true,
            Some(control) = self.control_rx.recv() => {
                info!(?control, "stop requested while idle");
                false
            }
        }
    }
}
