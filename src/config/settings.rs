// src/config/settings.rs

use std::path::PathBuf;
use std::time::Duration;

use crate::cli::CliArgs;
use crate::config::model::{ConfigFile, NotifySection};
use crate::config::validate::{ensure_non_empty, validate_excludes};
use crate::engine::RuntimeOptions;
use crate::errors::{Result, TestwatchError};
use crate::exec::RunnerCommand;
use crate::types::{CaseMarker, FingerprintMethod};

/// Everything the application needs, after merging the config file with
/// command-line overrides.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Command-line targets followed by `[config].watch`, deduplicated.
    pub targets: Vec<String>,
    pub options: RuntimeOptions,
    pub method: FingerprintMethod,
    pub include_hidden: bool,
    pub extension: String,
    pub exclude: Vec<String>,
    pub runner: RunnerCommand,
    pub marker: CaseMarker,
    pub search_paths: Vec<PathBuf>,
    /// `None` when notifications are disabled.
    pub notify: Option<NotifySection>,
}

impl Settings {
    pub fn resolve(cfg: ConfigFile, cli: &CliArgs) -> Result<Settings> {
        let mut targets: Vec<String> = Vec::new();
        for target in cli.targets.iter().chain(&cfg.config.watch) {
            if !targets.contains(target) {
                targets.push(target.clone());
            }
        }
        if targets.is_empty() {
            return Err(TestwatchError::ConfigError(
                "at least one watch target is required".to_string(),
            ));
        }

        let extension = cli
            .extension
            .clone()
            .unwrap_or(cfg.config.extension)
            .trim_start_matches('.')
            .to_string();
        ensure_non_empty("--extension", &extension)?;

        let mut exclude = cfg.config.exclude;
        exclude.extend(cli.exclude.iter().cloned());
        validate_excludes(&exclude)?;

        let notify = if cli.no_notify || !cfg.notify.enabled {
            None
        } else {
            let mut notify = cfg.notify;
            if let Some(host) = &cli.host {
                ensure_non_empty("--host", host)?;
                notify.host = host.clone();
            }
            if let Some(password) = &cli.password {
                notify.password = password.clone();
            }
            Some(notify)
        };

        Ok(Settings {
            targets,
            options: RuntimeOptions {
                delay: Duration::from_secs(cli.delay.unwrap_or(cfg.config.delay)),
                idle_delay: Duration::from_secs(cfg.config.idle_delay),
                once: cli.once,
            },
            method: cli.method.unwrap_or(cfg.config.method),
            include_hidden: cli.include_hidden || cfg.config.include_hidden,
            extension,
            exclude,
            runner: cfg.runner.command(),
            marker: cfg.runner.marker,
            search_paths: cfg.runner.search_paths,
            notify,
        })
    }
}
