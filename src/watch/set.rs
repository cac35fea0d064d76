// src/watch/set.rs

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::discover::ModuleResolver;
use crate::watch::fingerprint::FingerprintStore;
use crate::watch::targets::TargetExpander;

/// The watched file set of one control loop.
///
/// Targets are re-expanded on every refresh, so files created inside a
/// watched directory are picked up. After the first refresh, a file that
/// appears or disappears under a directory target counts as a change just
/// like an edit. Files named directly by a target stay tracked while they
/// are missing; the store skips them as unreadable until they come back.
#[derive(Debug)]
pub struct WatchSet {
    targets: Vec<String>,
    expander: TargetExpander,
    store: FingerprintStore,
    pinned: HashSet<PathBuf>,
    primed: bool,
}

impl WatchSet {
    pub fn new(targets: Vec<String>, expander: TargetExpander, store: FingerprintStore) -> Self {
        Self {
            targets,
            expander,
            store,
            pinned: HashSet::new(),
            primed: false,
        }
    }

    pub fn targets(&self) -> &[String] {
        &self.targets
    }

    pub fn store(&self) -> &FingerprintStore {
        &self.store
    }

    /// Re-expand targets and poll every file; returns what changed.
    pub fn refresh(&mut self, resolver: &ModuleResolver) -> Vec<PathBuf> {
        let entries = self.expander.expand_entries(&self.targets, resolver);
        let current: HashSet<&Path> = entries.iter().map(|e| e.path.as_path()).collect();

        let mut changed = Vec::new();

        let gone: Vec<PathBuf> = self
            .store
            .paths()
            .filter(|p| !current.contains(p) && !self.pinned.contains(*p))
            .map(|p| p.to_path_buf())
            .collect();
        for path in gone {
            self.store.untrack(&path);
            debug!(path = ?path, "watched file disappeared");
            changed.push(path);
        }

        for entry in &entries {
            if entry.explicit {
                self.pinned.insert(entry.path.clone());
            }
            if self.store.contains(&entry.path) {
                continue;
            }
            match self.store.track(entry.path.clone()) {
                Ok(_) if self.primed => changed.push(entry.path.clone()),
                Ok(_) => {}
                Err(err) => warn!(error = %err, "cannot fingerprint watched file"),
            }
        }

        changed.extend(self.store.poll_all());
        self.primed = true;
        changed
    }
}
