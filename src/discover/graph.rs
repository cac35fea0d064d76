// src/discover/graph.rs

//! Module graph rooted at one discovery target.
//!
//! Nodes are loaded module descriptors, edges are `mod x;` declarations.
//! Only modules whose file sits under the base module's directory are
//! loaded; anything declared from elsewhere (e.g. a `#[path]` into a vendored
//! tree) is left out.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use petgraph::algo::is_cyclic_directed;
use petgraph::graph::{DiGraph, NodeIndex};
use tracing::{debug, warn};

use crate::discover::descriptor::ModuleDescriptor;
use crate::discover::loader::ModuleLoader;
use crate::discover::module_ref::ModuleRef;
use crate::discover::DiscoveryError;
use crate::fs::FileSystem;
use crate::watch::path_utils::{is_within, normalize};

#[derive(Debug)]
pub struct ModuleGraph {
    graph: DiGraph<ModuleDescriptor, ()>,
}

impl ModuleGraph {
    /// Load `base` and every in-tree module it transitively declares.
    pub fn load<L: ModuleLoader + ?Sized>(
        loader: &L,
        fs: &Arc<dyn FileSystem>,
        base: &ModuleRef,
    ) -> Result<Self, DiscoveryError> {
        let scope_dir = base.search_dir();

        let mut graph = DiGraph::new();
        let mut by_file: HashMap<PathBuf, NodeIndex> = HashMap::new();

        let root_desc = loader.load(base)?;
        let root = graph.add_node(root_desc);
        by_file.insert(normalize(fs.as_ref(), &base.file), root);

        let mut pending = vec![root];
        while let Some(parent) = pending.pop() {
            let decls = graph[parent].submodules.clone();
            for decl in decls {
                let Some(file) = decl.file else {
                    warn!(module = %decl.module, "declared module has no source file; skipping");
                    continue;
                };

                let key = normalize(fs.as_ref(), &file);
                if !is_within(fs.as_ref(), &file, &scope_dir) {
                    debug!(
                        module = %decl.module,
                        file = ?file,
                        scope = ?scope_dir,
                        "module lives outside the target's directory; not collecting its tests"
                    );
                    continue;
                }

                if let Some(&existing) = by_file.get(&key) {
                    graph.add_edge(parent, existing, ());
                    continue;
                }

                let child = loader.load(&ModuleRef {
                    module: decl.module,
                    file,
                })?;
                let idx = graph.add_node(child);
                graph.add_edge(parent, idx, ());
                by_file.insert(key, idx);
                pending.push(idx);
            }
        }

        if is_cyclic_directed(&graph) {
            warn!(module = %graph[root].module, "module declarations form a cycle");
        }

        Ok(Self { graph })
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Modules in load order, base module first.
    pub fn modules(&self) -> impl Iterator<Item = &ModuleDescriptor> {
        self.graph.node_indices().map(move |idx| &self.graph[idx])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discover::loader::SourceLoader;
    use crate::fs::mock::MockFileSystem;
    use crate::types::TestIdentity;

    fn load(fs: &MockFileSystem, file: &str, module: &str) -> ModuleGraph {
        let shared: Arc<dyn FileSystem> = Arc::new(fs.clone());
        let loader = SourceLoader::new(shared.clone());
        let base = ModuleRef {
            module: TestIdentity::from(module),
            file: PathBuf::from(file),
        };
        ModuleGraph::load(&loader, &shared, &base).unwrap()
    }

    fn module_names(graph: &ModuleGraph) -> Vec<&str> {
        graph.modules().map(|m| m.module.as_str()).collect()
    }

    #[test]
    fn base_in_current_dir_keeps_its_children() {
        let fs = MockFileSystem::new();
        fs.add_file("calc.rs", "mod helper;");
        fs.add_file("calc/helper.rs", "#[test] fn works() {}");

        let graph = load(&fs, "calc.rs", "calc");
        assert_eq!(module_names(&graph), vec!["calc", "calc::helper"]);
    }

    #[test]
    fn out_of_tree_modules_are_skipped_and_cycles_tolerated() {
        let fs = MockFileSystem::new();
        fs.add_file(
            "pkg/lib.rs",
            r#"
mod a;
#[path = "../vendor/lib.rs"]
mod vendored;
"#,
        );
        fs.add_file("pkg/a.rs", "#[path = \"lib.rs\"] mod back;");
        fs.add_file("vendor/lib.rs", "#[test] fn foreign() {}");

        let graph = load(&fs, "pkg/lib.rs", "");
        assert_eq!(module_names(&graph), vec!["", "a"]);
        assert_eq!(graph.len(), 2);
    }
}
