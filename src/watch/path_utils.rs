// src/watch/path_utils.rs

//! Utility functions for path handling in the watcher and discovery.

use std::path::{Component, Path, PathBuf};

use crate::fs::FileSystem;

/// Convert a path into a string relative to `root`, with forward slashes.
///
/// - First we try a direct `strip_prefix(root)`.
/// - If that fails (e.g. due to symlinks or different absolute prefixes),
///   we canonicalize both paths and try again.
///
/// Returns `None` if the path cannot be reasonably related to `root`.
pub fn relative_str(fs: &dyn FileSystem, root: &Path, path: &Path) -> Option<String> {
    if let Ok(rel) = path.strip_prefix(root) {
        return Some(rel.to_string_lossy().replace('\\', "/"));
    }

    if let (Ok(root_canon), Ok(path_canon)) = (fs.canonicalize(root), fs.canonicalize(path)) {
        if let Ok(rel) = path_canon.strip_prefix(&root_canon) {
            return Some(rel.to_string_lossy().replace('\\', "/"));
        }
    }

    None
}

/// Resolve `.` and `..` components without touching the filesystem.
///
/// A leading `..` that cannot be popped is kept, so `../x` stays outside of
/// whatever directory it was relative to.
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let can_pop = matches!(
                    out.components().next_back(),
                    Some(Component::Normal(_))
                );
                if can_pop {
                    out.pop();
                } else if !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}

/// Normalize a path for comparisons: canonical when the filesystem can
/// resolve it, lexical otherwise.
pub fn normalize(fs: &dyn FileSystem, path: &Path) -> PathBuf {
    let lexical = normalize_lexically(path);
    fs.canonicalize(&lexical).unwrap_or(lexical)
}

/// True if `path` lies inside the `dir` subtree.
///
/// A normalized `dir` of `.` has no prefix to compare against, so any
/// relative path that does not climb out of it counts as inside.
pub fn is_within(fs: &dyn FileSystem, path: &Path, dir: &Path) -> bool {
    let path = normalize(fs, path);
    let dir = normalize(fs, dir);
    if dir == Path::new(".") {
        return path.is_relative() && !path.starts_with("..");
    }
    path.starts_with(&dir)
}

/// True if any component of `rel` (a path relative to a watch target) is a
/// dot-prefixed entry.
pub fn is_hidden(rel: &Path) -> bool {
    rel.components().any(|c| match c {
        Component::Normal(name) => name.to_string_lossy().starts_with('.'),
        _ => false,
    })
}
