// src/discover/module_ref.rs

//! Turning a user-supplied reference (`calc`, `net.codec`, `net::codec`,
//! `src/net/codec.rs`, `src/net/`) into a concrete module file.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::discover::DiscoveryError;
use crate::fs::FileSystem;
use crate::types::TestIdentity;
use crate::watch::path_utils::normalize_lexically;

/// File names that own their directory (children live next to them).
const MOD_RS_NAMES: [&str; 3] = ["mod.rs", "lib.rs", "main.rs"];

/// A resolved module: its path inside the crate and the file defining it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleRef {
    pub module: TestIdentity,
    pub file: PathBuf,
}

impl ModuleRef {
    /// Directory whose subtree bounds discovery for this module.
    pub fn search_dir(&self) -> PathBuf {
        match self.file.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }
}

/// True for `mod.rs`, `lib.rs` and `main.rs`.
pub fn is_mod_rs(file: &Path) -> bool {
    file.file_name()
        .and_then(|n| n.to_str())
        .map(|n| MOD_RS_NAMES.contains(&n))
        .unwrap_or(false)
}

#[derive(Debug, Clone)]
pub struct ModuleResolver {
    fs: Arc<dyn FileSystem>,
    search_paths: Vec<PathBuf>,
}

impl ModuleResolver {
    pub fn new(fs: Arc<dyn FileSystem>, search_paths: Vec<PathBuf>) -> Self {
        Self { fs, search_paths }
    }

    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    /// Resolve a reference to a module file.
    ///
    /// Existing files and directories win over dotted module names, so
    /// `calc.rs` is a file and `calc.tests` is a module path.
    pub fn resolve(&self, reference: &str) -> Result<ModuleRef, DiscoveryError> {
        let as_path = normalize_lexically(Path::new(reference));

        if self.fs.is_file(&as_path) {
            return Ok(self.from_file(&as_path));
        }

        if self.fs.is_dir(&as_path) {
            for name in MOD_RS_NAMES {
                let candidate = as_path.join(name);
                if self.fs.is_file(&candidate) {
                    return Ok(self.from_file(&candidate));
                }
            }
            // A cargo package root stands for its library or binary crate.
            if self.fs.is_file(&as_path.join("Cargo.toml")) {
                for name in ["lib.rs", "main.rs"] {
                    let candidate = normalize_lexically(&as_path.join("src").join(name));
                    if self.fs.is_file(&candidate) {
                        return Ok(self.from_file(&candidate));
                    }
                }
            }
            return Err(DiscoveryError::NoModuleFile { dir: as_path });
        }

        let segments: Vec<&str> = reference
            .split("::")
            .flat_map(|s| s.split('.'))
            .filter(|s| !s.is_empty())
            .collect();
        if segments.is_empty() {
            return Err(DiscoveryError::Unresolved {
                reference: reference.to_string(),
            });
        }

        for root in &self.search_paths {
            let mut dir = root.clone();
            for seg in &segments[..segments.len() - 1] {
                dir.push(seg);
            }
            let last = segments[segments.len() - 1];
            let candidates = [dir.join(format!("{last}.rs")), dir.join(last).join("mod.rs")];
            for candidate in candidates {
                let candidate = normalize_lexically(&candidate);
                if self.fs.is_file(&candidate) {
                    debug!(reference, file = ?candidate, "resolved module reference");
                    return Ok(ModuleRef {
                        module: TestIdentity::new(segments.join("::")),
                        file: candidate,
                    });
                }
            }
        }

        Err(DiscoveryError::Unresolved {
            reference: reference.to_string(),
        })
    }

    /// Build a reference for a source file.
    ///
    /// Inside a cargo package (`<pkg>/src/...` with `<pkg>/Cargo.toml`) the
    /// module path is taken relative to `src/`; elsewhere the file stem alone
    /// names the module. Roots of the package's other targets (`tests/`,
    /// `benches/`, `examples/`, `src/bin/`) are crate roots of their own.
    pub fn from_file(&self, file: &Path) -> ModuleRef {
        let module = if self.is_target_root(file) {
            TestIdentity::default()
        } else {
            self.crate_relative_module(file)
                .unwrap_or_else(|| TestIdentity::new(fallback_module_name(file)))
        };
        ModuleRef {
            module,
            file: file.to_path_buf(),
        }
    }

    /// `tests/x.rs`, `tests/x/main.rs` and the same under `benches/`,
    /// `examples/` and `src/bin/`.
    fn is_target_root(&self, file: &Path) -> bool {
        let Some(dir) = file.parent() else {
            return false;
        };
        if self.is_target_dir(dir) {
            return true;
        }
        let is_main = file.file_name().map(|n| n == "main.rs").unwrap_or(false);
        is_main && dir.parent().map(|d| self.is_target_dir(d)).unwrap_or(false)
    }

    fn is_target_dir(&self, dir: &Path) -> bool {
        let has_manifest = |pkg: &Path| self.fs.is_file(&pkg.join("Cargo.toml"));
        let parent = dir.parent().unwrap_or_else(|| Path::new(""));
        match dir.file_name().and_then(|n| n.to_str()) {
            Some("tests" | "benches" | "examples") => has_manifest(parent),
            Some("bin") => {
                parent.file_name().map(|n| n == "src").unwrap_or(false)
                    && has_manifest(parent.parent().unwrap_or_else(|| Path::new("")))
            }
            _ => false,
        }
    }

    fn crate_relative_module(&self, file: &Path) -> Option<TestIdentity> {
        let src_dir = file.ancestors().skip(1).find(|dir| {
            dir.file_name().map(|n| n == "src").unwrap_or(false) && {
                let pkg = dir.parent().unwrap_or_else(|| Path::new(""));
                self.fs.is_file(&pkg.join("Cargo.toml"))
            }
        })?;

        let rel = file.strip_prefix(src_dir).ok()?;
        let mut segments: Vec<String> = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        let file_name = segments.pop()?;

        let at_src_root = segments.is_empty();
        match file_name.as_str() {
            "lib.rs" | "main.rs" if at_src_root => {}
            "mod.rs" => {}
            _ => segments.push(strip_rs(&file_name)),
        }
        Some(TestIdentity::new(segments.join("::")))
    }
}

fn strip_rs(name: &str) -> String {
    name.strip_suffix(".rs").unwrap_or(name).to_string()
}

fn fallback_module_name(file: &Path) -> String {
    let is_mod = file.file_name().map(|n| n == "mod.rs").unwrap_or(false);
    if is_mod {
        if let Some(dir) = file.parent().and_then(|p| p.file_name()) {
            return dir.to_string_lossy().into_owned();
        }
    }
    file.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}
