// src/lib.rs

pub mod cli;
pub mod config;
pub mod console;
pub mod discover;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod notification;
pub mod report;
pub mod types;
pub mod watch;

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::cli::CliArgs;
use crate::config::{load_optional, Settings};
use crate::discover::{Discoverer, ModuleResolver, SourceLoader};
use crate::engine::{ControlEvent, CoreRuntime, Runtime};
use crate::errors::Result;
use crate::exec::{CargoHarness, ExecutionEngine};
use crate::fs::{FileSystem, RealFileSystem};
use crate::notification::{GrowlNotifier, UdpTransport};
use crate::watch::{build_globset, FingerprintStore, TargetExpander, WatchSet};

/// The runtime as assembled for production use.
pub type AppRuntime = Runtime<SourceLoader, CargoHarness, GrowlNotifier>;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading and CLI overrides
/// - watch set, discovery, harness and notifier
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let cfg = load_optional(args.config.as_deref())?;
    let settings = Settings::resolve(cfg, &args)?;

    let (control_tx, control_rx) = mpsc::channel::<ControlEvent>(8);
    let runtime = build_runtime(&settings, Arc::new(RealFileSystem), control_rx)?;

    // Every Ctrl-C is an interrupt; the runtime decides whether it aborts
    // the current run or stops the loop.
    tokio::spawn(async move {
        loop {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "failed to listen for Ctrl+C");
                return;
            }
            if control_tx.send(ControlEvent::Interrupt).await.is_err() {
                return;
            }
        }
    });

    info!(
        targets = settings.targets.len(),
        method = %settings.method,
        delay_secs = settings.options.delay.as_secs(),
        notify = settings.notify.is_some(),
        "starting"
    );
    runtime.run().await
}

/// Assemble a runtime from resolved settings.
pub fn build_runtime(
    settings: &Settings,
    fs: Arc<dyn FileSystem>,
    control_rx: mpsc::Receiver<ControlEvent>,
) -> Result<AppRuntime> {
    let exclude = build_globset(&settings.exclude)?;
    let expander = TargetExpander::new(
        fs.clone(),
        settings.extension.clone(),
        settings.include_hidden,
        exclude,
    );
    let store = FingerprintStore::new(fs.clone(), settings.method);
    let watch = WatchSet::new(settings.targets.clone(), expander, store);

    let resolver = ModuleResolver::new(fs.clone(), settings.search_paths.clone());
    let discoverer = Discoverer::new(SourceLoader::new(fs.clone()), resolver, fs, settings.marker);

    let engine = ExecutionEngine::new(CargoHarness::new(settings.runner.clone())?);

    let notifier = settings.notify.as_ref().map(|n| {
        GrowlNotifier::new(
            UdpTransport::new(n.host.clone(), n.port),
            n.application.clone(),
            n.password.clone(),
        )
    });

    Ok(Runtime::new(
        CoreRuntime::new(settings.options),
        watch,
        discoverer,
        engine,
        notifier,
        control_rx,
    ))
}
