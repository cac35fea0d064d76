// src/watch/targets.rs

//! Expand watch targets into the concrete list of files to fingerprint.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use tracing::{debug, warn};

use crate::discover::module_ref::ModuleResolver;
use crate::fs::FileSystem;
use crate::watch::path_utils::{is_hidden, normalize_lexically, relative_str};

/// Build a GlobSet from simple string patterns.
///
/// Returns `None` for an empty pattern list.
pub fn build_globset(patterns: &[String]) -> Result<Option<GlobSet>> {
    if patterns.is_empty() {
        return Ok(None);
    }
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        let glob = Glob::new(pat).with_context(|| format!("invalid glob pattern: {pat}"))?;
        builder.add(glob);
    }
    Ok(Some(builder.build()?))
}

/// A file produced by target expansion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpandedFile {
    pub path: PathBuf,
    /// Named directly by a target (file path or module reference) rather
    /// than found by walking a directory.
    pub explicit: bool,
}

#[derive(Debug, Clone)]
pub struct TargetExpander {
    fs: Arc<dyn FileSystem>,
    extension: String,
    include_hidden: bool,
    exclude: Option<GlobSet>,
}

impl TargetExpander {
    pub fn new(
        fs: Arc<dyn FileSystem>,
        extension: impl Into<String>,
        include_hidden: bool,
        exclude: Option<GlobSet>,
    ) -> Self {
        let extension = extension.into();
        Self {
            fs,
            extension: extension.trim_start_matches('.').to_string(),
            include_hidden,
            exclude,
        }
    }

    /// Expand every target in order, dropping duplicates.
    ///
    /// Targets that are neither files, directories nor resolvable module
    /// references are logged and skipped.
    pub fn expand(&self, targets: &[String], resolver: &ModuleResolver) -> Vec<PathBuf> {
        self.expand_entries(targets, resolver)
            .into_iter()
            .map(|entry| entry.path)
            .collect()
    }

    /// Like [`expand`](Self::expand), but keeps track of which files a
    /// target named directly. The first occurrence of a file wins.
    pub fn expand_entries(&self, targets: &[String], resolver: &ModuleResolver) -> Vec<ExpandedFile> {
        let mut seen = HashSet::new();
        let mut files = Vec::new();

        for target in targets {
            let (expanded, explicit) = match self.expand_one(target, resolver) {
                Ok(expanded) => expanded,
                Err(err) => {
                    warn!(target = %target, error = %err, "skipping watch target");
                    continue;
                }
            };
            debug!(target = %target, files = expanded.len(), "expanded watch target");
            for path in expanded {
                if seen.insert(path.clone()) {
                    files.push(ExpandedFile { path, explicit });
                }
            }
        }

        files
    }

    fn expand_one(&self, target: &str, resolver: &ModuleResolver) -> Result<(Vec<PathBuf>, bool)> {
        let path = normalize_lexically(Path::new(target));
        if self.fs.is_file(&path) {
            return Ok((vec![path], true));
        }
        if self.fs.is_dir(&path) {
            let mut files = Vec::new();
            self.walk(&path, &path, &mut files)?;
            return Ok((files, false));
        }
        let module = resolver.resolve(target)?;
        Ok((vec![module.file], true))
    }

    fn walk(&self, root: &Path, dir: &Path, out: &mut Vec<PathBuf>) -> Result<()> {
        let mut entries = self.fs.read_dir(dir)?;
        entries.sort();

        for entry in entries {
            let Some(rel) = relative_str(self.fs.as_ref(), root, &entry) else {
                continue;
            };
            if !self.include_hidden && is_hidden(Path::new(&rel)) {
                continue;
            }
            if self.exclude.as_ref().is_some_and(|set| set.is_match(&rel)) {
                continue;
            }

            if self.fs.is_dir(&entry) {
                self.walk(root, &entry, out)?;
            } else if self.fs.is_file(&entry) && self.has_extension(&entry) {
                out.push(entry);
            }
        }
        Ok(())
    }

    fn has_extension(&self, path: &Path) -> bool {
        path.extension()
            .is_some_and(|ext| ext.to_string_lossy() == self.extension)
    }
}
