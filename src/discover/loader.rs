// src/discover/loader.rs

//! Module loaders.
//!
//! A loader re-reads a module from its source every time it is asked, so an
//! edit is picked up on the next discovery pass without restarting.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use syn::{Attribute, Expr, ExprLit, Item, Lit, Meta};
use tracing::trace;

use crate::discover::descriptor::{
    FunctionDescriptor, GroupDescriptor, ModuleDescriptor, SubmoduleDecl,
};
use crate::discover::module_ref::{is_mod_rs, ModuleRef};
use crate::discover::DiscoveryError;
use crate::fs::FileSystem;
use crate::types::TestIdentity;
use crate::watch::path_utils::normalize_lexically;

/// Trait abstracting how a module is turned into a [`ModuleDescriptor`].
///
/// Production code uses [`SourceLoader`]; tests can hand out canned
/// descriptors instead.
pub trait ModuleLoader {
    fn load(&self, module: &ModuleRef) -> Result<ModuleDescriptor, DiscoveryError>;
}

/// Parses Rust source files with `syn`.
#[derive(Debug, Clone)]
pub struct SourceLoader {
    fs: Arc<dyn FileSystem>,
}

impl SourceLoader {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }
}

impl ModuleLoader for SourceLoader {
    fn load(&self, module: &ModuleRef) -> Result<ModuleDescriptor, DiscoveryError> {
        let source = self
            .fs
            .read_to_string(&module.file)
            .map_err(|source| DiscoveryError::Unreadable {
                path: module.file.clone(),
                source,
            })?;

        let parsed = syn::parse_file(&source).map_err(|err| DiscoveryError::Syntax {
            file: module.file.clone(),
            message: err.to_string(),
        })?;

        let file_dir = module.search_dir();
        // Crate roots own their directory just like `mod.rs`.
        let child_dir = if is_mod_rs(&module.file) || module.module.is_root() {
            file_dir.clone()
        } else {
            let stem = module.file.file_stem().unwrap_or_default();
            file_dir.join(stem)
        };

        let mut descriptor = ModuleDescriptor {
            module: module.module.clone(),
            file: module.file.clone(),
            groups: Vec::new(),
            submodules: Vec::new(),
        };

        let scope = Scope {
            identity: module.module.clone(),
            child_dir,
            path_attr_dir: file_dir,
        };
        self.collect(&parsed.items, &scope, &mut descriptor);

        trace!(
            module = %descriptor.module,
            groups = descriptor.groups.len(),
            submodules = descriptor.submodules.len(),
            "loaded module descriptor"
        );
        Ok(descriptor)
    }
}

/// Where we are while walking nested inline modules.
struct Scope {
    identity: TestIdentity,
    /// Directory holding out-of-line children declared in this scope.
    child_dir: PathBuf,
    /// Directory `#[path = "..."]` values are relative to.
    path_attr_dir: PathBuf,
}

impl SourceLoader {
    fn collect(&self, items: &[Item], scope: &Scope, out: &mut ModuleDescriptor) {
        let functions: Vec<FunctionDescriptor> = items
            .iter()
            .filter_map(|item| match item {
                Item::Fn(f) => Some(FunctionDescriptor {
                    name: f.sig.ident.to_string(),
                    test_attribute: has_test_attribute(&f.attrs),
                }),
                _ => None,
            })
            .collect();

        if !functions.is_empty() {
            out.groups.push(GroupDescriptor {
                identity: scope.identity.clone(),
                functions,
            });
        }

        for item in items {
            let Item::Mod(m) = item else { continue };
            let name = m.ident.to_string();
            let identity = scope.identity.child(&name);
            match &m.content {
                Some((_, inner)) => {
                    let nested_dir = scope.child_dir.join(&name);
                    let nested = Scope {
                        identity,
                        child_dir: nested_dir.clone(),
                        path_attr_dir: nested_dir,
                    };
                    self.collect(inner, &nested, out);
                }
                None => {
                    let file = self.resolve_out_of_line(&name, &m.attrs, scope);
                    out.submodules.push(SubmoduleDecl {
                        module: identity,
                        file,
                    });
                }
            }
        }
    }

    fn resolve_out_of_line(&self, name: &str, attrs: &[Attribute], scope: &Scope) -> Option<PathBuf> {
        if let Some(explicit) = path_attribute(attrs) {
            let file = normalize_lexically(&scope.path_attr_dir.join(explicit));
            return self.fs.is_file(&file).then_some(file);
        }

        [
            scope.child_dir.join(format!("{name}.rs")),
            scope.child_dir.join(name).join("mod.rs"),
        ]
        .into_iter()
        .map(|p| normalize_lexically(&p))
        .find(|p| self.fs.is_file(p))
    }
}

/// `#[test]`, `#[tokio::test]`, `#[rstest::test]`, ...
fn has_test_attribute(attrs: &[Attribute]) -> bool {
    attrs.iter().any(|attr| {
        attr.path()
            .segments
            .last()
            .map(|seg| seg.ident == "test")
            .unwrap_or(false)
    })
}

fn path_attribute(attrs: &[Attribute]) -> Option<PathBuf> {
    attrs.iter().find_map(|attr| {
        if !attr.path().is_ident("path") {
            return None;
        }
        match &attr.meta {
            Meta::NameValue(nv) => match &nv.value {
                Expr::Lit(ExprLit {
                    lit: Lit::Str(s), ..
                }) => Some(Path::new(&s.value()).to_path_buf()),
                _ => None,
            },
            _ => None,
        }
    })
}
