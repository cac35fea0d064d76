use testwatch::config::{ConfigFile, RawConfigFile};
use testwatch::exec::{CaseOutcome, CaseResult};
use testwatch::report::{FailureRecord, RunReport, StatusCategory};
use testwatch::types::{CaseMarker, FingerprintMethod};

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile::default(),
        }
    }

    pub fn with_watch(mut self, target: &str) -> Self {
        self.config.config.watch.push(target.to_string());
        self
    }

    pub fn with_exclude(mut self, pattern: &str) -> Self {
        self.config.config.exclude.push(pattern.to_string());
        self
    }

    pub fn with_method(mut self, method: FingerprintMethod) -> Self {
        self.config.config.method = method;
        self
    }

    pub fn with_marker(mut self, marker: CaseMarker) -> Self {
        self.config.runner.marker = marker;
        self
    }

    pub fn with_search_path(mut self, dir: &str) -> Self {
        self.config.runner.search_paths.insert(0, dir.into());
        self
    }

    pub fn without_notify(mut self) -> Self {
        self.config.notify.enabled = false;
        self
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for an observed `RunReport`.
#[derive(Default)]
pub struct ReportBuilder {
    report: RunReport,
}

impl ReportBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failure(self, identity: &str) -> Self {
        self.with(StatusCategory::Failure, identity, "assertion failed")
    }

    pub fn error(self, identity: &str) -> Self {
        self.with(StatusCategory::Error, identity, "panicked")
    }

    pub fn with(mut self, category: StatusCategory, identity: &str, detail: &str) -> Self {
        self.report.record(
            category,
            identity.into(),
            FailureRecord {
                name: identity.to_string(),
                detail: detail.to_string(),
            },
        );
        self
    }

    pub fn build(self) -> RunReport {
        self.report
    }
}

pub fn passed(name: &str) -> CaseOutcome {
    CaseOutcome {
        name: name.into(),
        result: CaseResult::Passed,
    }
}

pub fn failed(name: &str, detail: &str) -> CaseOutcome {
    CaseOutcome {
        name: name.into(),
        result: CaseResult::Failed {
            category: StatusCategory::Failure,
            detail: detail.to_string(),
        },
    }
}

pub fn errored(name: &str, detail: &str) -> CaseOutcome {
    CaseOutcome {
        name: name.into(),
        result: CaseResult::Failed {
            category: StatusCategory::Error,
            detail: detail.to_string(),
        },
    }
}
