use std::fmt;

use clap::ValueEnum;
use serde::Deserialize;

/// How the fingerprint store decides that a watched file changed.
///
/// - `Time`: compare modification times. Cheap, but a `touch` without any
///   content change is reported as a change.
/// - `Hash`: compare a blake3 digest of the file contents. Reads every file on
///   every poll, but ignores metadata-only changes (default).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FingerprintMethod {
    Time,
    #[serde(alias = "sha1", alias = "content")]
    #[value(alias = "sha1", alias = "content")]
    Hash,
}

impl Default for FingerprintMethod {
    fn default() -> Self {
        FingerprintMethod::Hash
    }
}

impl fmt::Display for FingerprintMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FingerprintMethod::Time => f.write_str("time"),
            FingerprintMethod::Hash => f.write_str("hash"),
        }
    }
}

/// How discovery recognises a test case inside a test group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseMarker {
    /// The function carries a `#[test]`-style attribute (`#[test]`,
    /// `#[tokio::test]`, ...).
    Attribute,
    /// The function name starts with `test`.
    Prefix,
}

impl Default for CaseMarker {
    fn default() -> Self {
        CaseMarker::Attribute
    }
}

/// Stable key for a test unit or a single test case.
///
/// Unit identities are module paths such as `calc::tests`; case identities
/// append the function name (`calc::tests::adds_numbers`), matching the names
/// libtest prints.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct TestIdentity(String);

impl TestIdentity {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Identity of a child item (`self::name`).
    pub fn child(&self, name: &str) -> TestIdentity {
        if self.0.is_empty() {
            TestIdentity(name.to_string())
        } else {
            TestIdentity(format!("{}::{}", self.0, name))
        }
    }
}

impl fmt::Display for TestIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            f.write_str("crate")
        } else {
            f.write_str(&self.0)
        }
    }
}

impl From<&str> for TestIdentity {
    fn from(s: &str) -> Self {
        TestIdentity(s.to_string())
    }
}

impl From<String> for TestIdentity {
    fn from(s: String) -> Self {
        TestIdentity(s)
    }
}
