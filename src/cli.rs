// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::types::FingerprintMethod;

/// Command-line arguments for `testwatch`.
#[derive(Debug, Clone, Default, Parser)]
#[command(
    name = "testwatch",
    version,
    about = "Re-run tests when sources change and notify about newly broken or fixed tests.",
    long_about = None
)]
pub struct CliArgs {
    /// Files, directories or module paths (`net::codec`, `net.codec`) to
    /// watch and test.
    #[arg(value_name = "TARGET")]
    pub targets: Vec<String>,

    /// Seconds between polls (default 2).
    #[arg(short = 'd', long, value_name = "SECS")]
    pub delay: Option<u64>,

    /// Change detection method (default `hash`).
    #[arg(short = 'm', long, value_enum, value_name = "METHOD")]
    pub method: Option<FingerprintMethod>,

    /// Also watch dot-prefixed entries inside directory targets.
    #[arg(long)]
    pub include_hidden: bool,

    /// File extension picked up from directory targets (default `rs`).
    #[arg(long, value_name = "EXT")]
    pub extension: Option<String>,

    /// Glob (relative to a directory target) of entries to skip. Repeatable.
    #[arg(long, value_name = "GLOB")]
    pub exclude: Vec<String>,

    /// Path to the config file (TOML).
    ///
    /// Default: `Testwatch.toml` in the current directory, if it exists.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Host running the notification daemon.
    #[arg(long, value_name = "HOST")]
    pub host: Option<String>,

    /// Notification daemon password.
    #[arg(long, value_name = "PASSWORD")]
    pub password: Option<String>,

    /// Do not send notifications.
    #[arg(long)]
    pub no_notify: bool,

    /// Run the tests once and exit.
    #[arg(long)]
    pub once: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `TESTWATCH_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Parse the process arguments; clap exits with status 2 on bad flags.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_and_targets() {
        let args = CliArgs::try_parse_from([
            "testwatch", "-d", "5", "-m", "content", "--exclude", "gen/**", "--exclude",
            "*.bak.rs", "--no-notify", "src", "calc::tests",
        ])
        .unwrap();
        assert_eq!(args.delay, Some(5));
        assert_eq!(args.method, Some(FingerprintMethod::Hash));
        assert_eq!(args.exclude, vec!["gen/**", "*.bak.rs"]);
        assert!(args.no_notify);
        assert_eq!(args.targets, vec!["src", "calc::tests"]);
    }

    #[test]
    fn unknown_method_is_rejected() {
        assert!(CliArgs::try_parse_from(["testwatch", "-m", "md5", "src"]).is_err());
    }
}
