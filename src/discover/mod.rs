// src/discover/mod.rs

//! Test discovery.
//!
//! Given a module reference this module:
//! - resolves it to a source file ([`module_ref`]),
//! - loads it and every in-tree module it declares ([`graph`], [`loader`]),
//! - turns each group with at least one test case into a [`TestUnit`].
//!
//! Everything is re-read from disk on every call, so edits show up on the
//! next pass.

pub mod descriptor;
pub mod graph;
pub mod loader;
pub mod module_ref;

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, warn};

use crate::fs::FileSystem;
use crate::types::{CaseMarker, TestIdentity};

pub use descriptor::{FunctionDescriptor, GroupDescriptor, ModuleDescriptor, SubmoduleDecl};
pub use graph::ModuleGraph;
pub use loader::{ModuleLoader, SourceLoader};
pub use module_ref::{ModuleRef, ModuleResolver};

#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("syntax error in {file:?}: {message}")]
    Syntax { file: PathBuf, message: String },

    #[error("cannot read module source {path:?}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("cannot resolve module reference '{reference}'")]
    Unresolved { reference: String },

    #[error("directory {dir:?} has no mod.rs, lib.rs or main.rs")]
    NoModuleFile { dir: PathBuf },
}

/// One runnable group of test cases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestUnit {
    pub identity: TestIdentity,
    pub source: PathBuf,
    pub cases: Vec<String>,
}

impl TestUnit {
    pub fn display_name(&self) -> String {
        format!("{} ({} case{})", self.identity, self.cases.len(), plural(self.cases.len()))
    }

    /// Identity of one of this unit's cases.
    pub fn case_identity(&self, case: &str) -> TestIdentity {
        self.identity.child(case)
    }

    /// Name filters that select this unit's cases in a libtest run.
    pub fn filters(&self) -> Vec<String> {
        if self.identity.is_root() {
            self.cases.clone()
        } else {
            vec![format!("{}::", self.identity)]
        }
    }
}

fn plural(n: usize) -> &'static str {
    if n == 1 { "" } else { "s" }
}

/// Result of discovering every target in one cycle.
#[derive(Debug, Default)]
pub struct DiscoveryOutcome {
    pub units: Vec<TestUnit>,
    pub errors: Vec<(String, DiscoveryError)>,
}

impl DiscoveryOutcome {
    pub fn case_count(&self) -> usize {
        self.units.iter().map(|u| u.cases.len()).sum()
    }
}

pub struct Discoverer<L: ModuleLoader> {
    loader: L,
    resolver: ModuleResolver,
    fs: Arc<dyn FileSystem>,
    marker: CaseMarker,
}

impl<L: ModuleLoader> std::fmt::Debug for Discoverer<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Discoverer")
            .field("resolver", &self.resolver)
            .field("marker", &self.marker)
            .finish_non_exhaustive()
    }
}

impl<L: ModuleLoader> Discoverer<L> {
    pub fn new(loader: L, resolver: ModuleResolver, fs: Arc<dyn FileSystem>, marker: CaseMarker) -> Self {
        Self {
            loader,
            resolver,
            fs,
            marker,
        }
    }

    pub fn resolver(&self) -> &ModuleResolver {
        &self.resolver
    }

    /// Discover the test units reachable from one reference, in module
    /// enumeration order.
    pub fn discover(&self, reference: &str) -> Result<Vec<TestUnit>, DiscoveryError> {
        let base = self.resolver.resolve(reference)?;
        let graph = ModuleGraph::load(&self.loader, &self.fs, &base)?;

        let mut units = Vec::new();
        for module in graph.modules() {
            for group in &module.groups {
                let cases = group.cases(self.marker);
                if cases.is_empty() {
                    continue;
                }
                units.push(TestUnit {
                    identity: group.identity.clone(),
                    source: module.file.clone(),
                    cases,
                });
            }
        }

        debug!(
            reference,
            modules = graph.len(),
            units = units.len(),
            "discovered test units"
        );
        Ok(units)
    }

    /// Discover every target, keeping going past per-target failures.
    ///
    /// Units reached from more than one target are kept once. Crate roots
    /// of different targets (`tests/a.rs`, `tests/b.rs`) share the root
    /// identity, so a unit is keyed by its identity and source file.
    pub fn discover_all<S: AsRef<str>>(&self, references: &[S]) -> DiscoveryOutcome {
        let mut outcome = DiscoveryOutcome::default();
        let mut seen: HashSet<(TestIdentity, PathBuf)> = HashSet::new();

        for reference in references {
            let reference = reference.as_ref();
            match self.discover(reference) {
                Ok(units) => {
                    for unit in units {
                        if seen.insert((unit.identity.clone(), unit.source.clone())) {
                            outcome.units.push(unit);
                        }
                    }
                }
                Err(err) => {
                    warn!(target = reference, error = %err, "discovery failed for target");
                    outcome.errors.push((reference.to_string(), err));
                }
            }
        }

        outcome
    }
}
