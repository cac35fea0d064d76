// src/config/model.rs

use std::path::PathBuf;

use serde::Deserialize;

use crate::exec::RunnerCommand;
use crate::types::{CaseMarker, FingerprintMethod};

/// Configuration as read from a TOML file, before validation.
///
/// ```toml
/// [config]
/// delay = 2
/// method = "hash"
/// exclude = ["target/**"]
///
/// [runner]
/// program = "cargo"
/// args = ["test", "--no-fail-fast", "--"]
///
/// [notify]
/// host = "localhost"
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub config: ConfigSection,

    #[serde(default)]
    pub runner: RunnerSection,

    #[serde(default)]
    pub notify: NotifySection,
}

/// Validated configuration. Build it with `ConfigFile::try_from(raw)`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub config: ConfigSection,
    pub runner: RunnerSection,
    pub notify: NotifySection,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        config: ConfigSection,
        runner: RunnerSection,
        notify: NotifySection,
    ) -> Self {
        Self {
            config,
            runner,
            notify,
        }
    }
}

/// `[config]` section: what to watch and how often.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigSection {
    /// Seconds between polls.
    #[serde(default = "default_delay")]
    pub delay: u64,

    /// Seconds to wait after a cycle that found no tests.
    #[serde(default = "default_idle_delay")]
    pub idle_delay: u64,

    #[serde(default)]
    pub method: FingerprintMethod,

    /// Watch dot-prefixed files and directories inside directory targets.
    #[serde(default)]
    pub include_hidden: bool,

    /// Extension of the files picked up from directory targets.
    #[serde(default = "default_extension")]
    pub extension: String,

    /// Globs, relative to each directory target, of entries to skip.
    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,

    /// Targets watched in addition to the ones given on the command line.
    #[serde(default)]
    pub watch: Vec<String>,
}

fn default_delay() -> u64 {
    2
}

fn default_idle_delay() -> u64 {
    10
}

fn default_extension() -> String {
    "rs".to_string()
}

fn default_exclude() -> Vec<String> {
    vec!["target/**".to_string()]
}

impl Default for ConfigSection {
    fn default() -> Self {
        Self {
            delay: default_delay(),
            idle_delay: default_idle_delay(),
            method: FingerprintMethod::default(),
            include_hidden: false,
            extension: default_extension(),
            exclude: default_exclude(),
            watch: Vec::new(),
        }
    }
}

/// `[runner]` section: how tests are found and run.
#[derive(Debug, Clone, Deserialize)]
pub struct RunnerSection {
    #[serde(default = "default_program")]
    pub program: String,

    /// Arguments placed before the test filters.
    #[serde(default = "default_args")]
    pub args: Vec<String>,

    /// Arguments placed after the test filters.
    #[serde(default = "default_trailing_args")]
    pub trailing_args: Vec<String>,

    #[serde(default = "default_workdir")]
    pub workdir: PathBuf,

    #[serde(default)]
    pub marker: CaseMarker,

    /// Roots used to resolve module references such as `net::codec`.
    #[serde(default = "default_search_paths")]
    pub search_paths: Vec<PathBuf>,
}

fn default_program() -> String {
    RunnerCommand::default().program
}

fn default_args() -> Vec<String> {
    RunnerCommand::default().args
}

fn default_trailing_args() -> Vec<String> {
    RunnerCommand::default().trailing_args
}

fn default_workdir() -> PathBuf {
    RunnerCommand::default().workdir
}

fn default_search_paths() -> Vec<PathBuf> {
    vec![PathBuf::from("src"), PathBuf::from(".")]
}

impl Default for RunnerSection {
    fn default() -> Self {
        Self {
            program: default_program(),
            args: default_args(),
            trailing_args: default_trailing_args(),
            workdir: default_workdir(),
            marker: CaseMarker::default(),
            search_paths: default_search_paths(),
        }
    }
}

impl RunnerSection {
    pub fn command(&self) -> RunnerCommand {
        RunnerCommand {
            program: self.program.clone(),
            args: self.args.clone(),
            trailing_args: self.trailing_args.clone(),
            workdir: self.workdir.clone(),
        }
    }
}

/// `[notify]` section: the Growl daemon.
#[derive(Debug, Clone, Deserialize)]
pub struct NotifySection {
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_name")]
    pub password: String,

    #[serde(default = "default_name")]
    pub application: String,
}

fn default_enabled() -> bool {
    true
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    crate::notification::GROWL_UDP_PORT
}

fn default_name() -> String {
    "testwatch".to_string()
}

impl Default for NotifySection {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            host: default_host(),
            port: default_port(),
            password: default_name(),
            application: default_name(),
        }
    }
}
