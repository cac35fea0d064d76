// src/config/validate.rs

use crate::config::model::{ConfigFile, ConfigSection, NotifySection, RawConfigFile, RunnerSection};
use crate::errors::{Result, TestwatchError};
use crate::watch::build_globset;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::TestwatchError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_watch_config(&raw.config)?;
        validate_runner(&raw.runner)?;
        validate_notify(&raw.notify)?;
        Ok(ConfigFile::new_unchecked(raw.config, raw.runner, raw.notify))
    }
}

pub(crate) fn validate_watch_config(cfg: &ConfigSection) -> Result<()> {
    if cfg.idle_delay == 0 {
        return Err(TestwatchError::ConfigError(
            "[config].idle_delay must be >= 1 (got 0)".to_string(),
        ));
    }
    ensure_non_empty("[config].extension", cfg.extension.trim_start_matches('.'))?;
    validate_excludes(&cfg.exclude)
}

pub(crate) fn validate_excludes(patterns: &[String]) -> Result<()> {
    build_globset(patterns)
        .map(|_| ())
        .map_err(|e| TestwatchError::ConfigError(format!("{e:#}")))
}

fn validate_runner(cfg: &RunnerSection) -> Result<()> {
    ensure_non_empty("[runner].program", &cfg.program)?;
    if cfg.search_paths.is_empty() {
        return Err(TestwatchError::ConfigError(
            "[runner].search_paths must list at least one directory".to_string(),
        ));
    }
    Ok(())
}

fn validate_notify(cfg: &NotifySection) -> Result<()> {
    ensure_non_empty("[notify].application", &cfg.application)?;
    ensure_non_empty("[notify].host", &cfg.host)
}

pub(crate) fn ensure_non_empty(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(TestwatchError::ConfigError(format!("{field} must not be empty")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml_src: &str) -> Result<ConfigFile> {
        let raw: RawConfigFile = toml::from_str(toml_src)?;
        ConfigFile::try_from(raw)
    }

    #[test]
    fn empty_file_gives_defaults() {
        let cfg = parse("").unwrap();
        assert_eq!(cfg.config.delay, 2);
        assert_eq!(cfg.config.idle_delay, 10);
        assert_eq!(cfg.config.extension, "rs");
        assert_eq!(cfg.runner.program, "cargo");
        assert_eq!(cfg.notify.port, 9887);
        assert_eq!(cfg.notify.application, "testwatch");
    }

    #[test]
    fn method_aliases_are_accepted() {
        let cfg = parse("[config]\nmethod = \"sha1\"\n").unwrap();
        assert_eq!(cfg.config.method, crate::types::FingerprintMethod::Hash);
        assert!(parse("[config]\nmethod = \"md5\"\n").is_err());
    }

    #[test]
    fn invalid_values_are_config_errors() {
        for src in [
            "[config]\nidle_delay = 0\n",
            "[config]\nextension = \"\"\n",
            "[config]\nexclude = [\"a/[\"]\n",
            "[runner]\nprogram = \" \"\n",
            "[notify]\napplication = \"\"\n",
        ] {
            let err = parse(src).unwrap_err();
            assert!(err.is_usage_error(), "{src}: {err}");
        }
    }
}
