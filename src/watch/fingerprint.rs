// src/watch/fingerprint.rs

//! Per-file change fingerprints.
//!
//! The store remembers one [`FileFingerprint`] per tracked file. Polling
//! recomputes the stamp and compares it to the stored one in the same call,
//! so a change is reported exactly once: the stored stamp is replaced as
//! soon as the change is observed.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use thiserror::Error;
use tracing::{debug, warn};

use crate::fs::FileSystem;
use crate::types::FingerprintMethod;
use crate::watch::hash::compute_file_hash;

#[derive(Error, Debug)]
pub enum FingerprintError {
    #[error("cannot read {path:?}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("unknown fingerprint handle {0}")]
    UnknownHandle(usize),
}

/// A comparable snapshot of a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stamp {
    Modified(SystemTime),
    Digest(String),
}

impl Stamp {
    /// Whether `self` (freshly computed) counts as a change relative to
    /// `stored`.
    ///
    /// Timestamps must move forward; digests only need to differ.
    fn supersedes(&self, stored: &Stamp) -> bool {
        match (self, stored) {
            (Stamp::Modified(new), Stamp::Modified(old)) => new > old,
            (Stamp::Digest(new), Stamp::Digest(old)) => new != old,
            // Method never changes for a tracked file; treat a mismatch as a change.
            _ => true,
        }
    }
}

impl fmt::Display for Stamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stamp::Modified(t) => write!(f, "{t:?}"),
            Stamp::Digest(d) => f.write_str(d),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FileFingerprint {
    pub path: PathBuf,
    pub method: FingerprintMethod,
    pub stamp: Stamp,
}

/// Opaque reference to a tracked file. Handles are never reused, so one
/// that outlives its file reports [`FingerprintError::UnknownHandle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FingerprintHandle(usize);

#[derive(Debug)]
pub struct FingerprintStore {
    fs: Arc<dyn FileSystem>,
    method: FingerprintMethod,
    entries: Vec<(FingerprintHandle, FileFingerprint)>,
    next_id: usize,
}

impl FingerprintStore {
    pub fn new(fs: Arc<dyn FileSystem>, method: FingerprintMethod) -> Self {
        Self {
            fs,
            method,
            entries: Vec::new(),
            next_id: 0,
        }
    }

    pub fn method(&self) -> FingerprintMethod {
        self.method
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Tracked paths in tracking order.
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.entries.iter().map(|(_, e)| e.path.as_path())
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.entries.iter().any(|(_, e)| e.path == path)
    }

    /// Stop tracking `path`. Its handle becomes unknown.
    pub fn untrack(&mut self, path: &Path) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(_, e)| e.path != path);
        self.entries.len() != before
    }

    /// Start tracking `path`, recording its current stamp as the baseline.
    ///
    /// Tracking the same path twice returns the existing handle.
    pub fn track(&mut self, path: impl Into<PathBuf>) -> Result<FingerprintHandle, FingerprintError> {
        let path = path.into();
        if let Some((handle, _)) = self.entries.iter().find(|(_, e)| e.path == path) {
            return Ok(*handle);
        }

        let stamp = self.compute(&path)?;
        debug!(path = ?path, method = %self.method, stamp = %stamp, "tracking file");
        let handle = FingerprintHandle(self.next_id);
        self.next_id += 1;
        self.entries.push((
            handle,
            FileFingerprint {
                path,
                method: self.method,
                stamp,
            },
        ));
        Ok(handle)
    }

    /// Returns true exactly once per detected change.
    pub fn poll(&mut self, handle: FingerprintHandle) -> Result<bool, FingerprintError> {
        let Some(idx) = self.entries.iter().position(|(h, _)| *h == handle) else {
            return Err(FingerprintError::UnknownHandle(handle.0));
        };
        self.poll_at(idx)
    }

    /// Poll every tracked file and return the ones that changed, in tracking
    /// order. Unreadable files are logged and treated as unchanged.
    pub fn poll_all(&mut self) -> Vec<PathBuf> {
        let mut changed = Vec::new();
        for idx in 0..self.entries.len() {
            match self.poll_at(idx) {
                Ok(true) => changed.push(self.entries[idx].1.path.clone()),
                Ok(false) => {}
                Err(err) => warn!(error = %err, "skipping unreadable watched file this cycle"),
            }
        }
        changed
    }

    fn poll_at(&mut self, idx: usize) -> Result<bool, FingerprintError> {
        let fresh = self.compute(&self.entries[idx].1.path)?;
        let entry = &mut self.entries[idx].1;
        if fresh.supersedes(&entry.stamp) {
            debug!(path = ?entry.path, old = %entry.stamp, new = %fresh, "fingerprint changed");
            entry.stamp = fresh;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn compute(&self, path: &Path) -> Result<Stamp, FingerprintError> {
        let unreadable = |source: anyhow::Error| FingerprintError::Unreadable {
            path: path.to_path_buf(),
            source,
        };
        match self.method {
            FingerprintMethod::Time => self.fs.modified(path).map(Stamp::Modified).map_err(unreadable),
            FingerprintMethod::Hash => compute_file_hash(self.fs.as_ref(), path)
                .map(Stamp::Digest)
                .map_err(unreadable),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;

    fn store(fs: &MockFileSystem, method: FingerprintMethod) -> FingerprintStore {
        FingerprintStore::new(Arc::new(fs.clone()), method)
    }

    #[test]
    fn hash_method_reports_content_change_once() {
        let fs = MockFileSystem::new();
        fs.add_file("src/a.rs", "fn a() {}");
        let mut store = store(&fs, FingerprintMethod::Hash);
        let h = store.track("src/a.rs").unwrap();

        assert!(!store.poll(h).unwrap());

        fs.add_file("src/a.rs", "fn a() { 1; }");
        assert!(store.poll(h).unwrap());
        assert!(!store.poll(h).unwrap(), "same change must not be reported twice");
    }

    #[test]
    fn hash_method_ignores_touch() {
        let fs = MockFileSystem::new();
        fs.add_file("src/a.rs", "fn a() {}");
        let mut store = store(&fs, FingerprintMethod::Hash);
        let h = store.track("src/a.rs").unwrap();

        fs.touch("src/a.rs");
        assert!(!store.poll(h).unwrap());

        // Rewriting identical content is also not a change.
        fs.add_file("src/a.rs", "fn a() {}");
        assert!(!store.poll(h).unwrap());
    }

    #[test]
    fn time_method_reports_touch_as_change() {
        let fs = MockFileSystem::new();
        fs.add_file("src/a.rs", "fn a() {}");
        let mut store = store(&fs, FingerprintMethod::Time);
        let h = store.track("src/a.rs").unwrap();

        assert!(!store.poll(h).unwrap());
        fs.touch("src/a.rs");
        assert!(store.poll(h).unwrap());
        assert!(!store.poll(h).unwrap());
    }

    #[test]
    fn vanished_file_is_unreadable_and_skipped_by_poll_all() {
        let fs = MockFileSystem::new();
        fs.add_file("src/a.rs", "a");
        fs.add_file("src/b.rs", "b");
        let mut store = store(&fs, FingerprintMethod::Hash);
        let a = store.track("src/a.rs").unwrap();
        store.track("src/b.rs").unwrap();

        fs.remove_file("src/a.rs");
        fs.add_file("src/b.rs", "b2");

        assert!(matches!(store.poll(a), Err(FingerprintError::Unreadable { .. })));
        assert_eq!(store.poll_all(), vec![PathBuf::from("src/b.rs")]);
    }

    #[test]
    fn tracking_twice_reuses_handle() {
        let fs = MockFileSystem::new();
        fs.add_file("a.rs", "a");
        let mut store = store(&fs, FingerprintMethod::Time);
        let h1 = store.track("a.rs").unwrap();
        let h2 = store.track("a.rs").unwrap();
        assert_eq!(h1, h2);
        assert_eq!(store.len(), 1);

        assert!(store.untrack(Path::new("a.rs")));
        assert!(!store.contains(Path::new("a.rs")));
        assert!(!store.untrack(Path::new("a.rs")));
    }

    #[test]
    fn handles_stay_valid_across_untrack() {
        let fs = MockFileSystem::new();
        fs.add_file("a.rs", "a");
        fs.add_file("b.rs", "b");
        let mut store = store(&fs, FingerprintMethod::Hash);
        let a = store.track("a.rs").unwrap();
        let b = store.track("b.rs").unwrap();

        store.untrack(Path::new("a.rs"));
        assert!(matches!(store.poll(a), Err(FingerprintError::UnknownHandle(_))));

        fs.add_file("b.rs", "b2");
        assert!(store.poll(b).unwrap());

        // Re-tracking a path hands out a fresh handle.
        let a2 = store.track("a.rs").unwrap();
        assert_ne!(a, a2);
        assert!(matches!(store.poll(a), Err(FingerprintError::UnknownHandle(_))));
    }
}
