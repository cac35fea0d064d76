// src/discover/descriptor.rs

//! Structural description of a parsed module.
//!
//! Loaders produce these; discovery decides what is runnable by looking only
//! at the descriptor, never at live code.

use std::path::PathBuf;

use crate::types::{CaseMarker, TestIdentity};

/// A free function declared directly in a module or inline module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDescriptor {
    pub name: String,
    /// Carries an attribute whose last path segment is `test`.
    pub test_attribute: bool,
}

impl FunctionDescriptor {
    pub fn is_case(&self, marker: CaseMarker) -> bool {
        match marker {
            CaseMarker::Attribute => self.test_attribute,
            CaseMarker::Prefix => self.name.starts_with("test"),
        }
    }
}

/// A group of functions sharing one module scope: the file's own top level,
/// or an inline `mod name { ... }` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupDescriptor {
    pub identity: TestIdentity,
    pub functions: Vec<FunctionDescriptor>,
}

impl GroupDescriptor {
    /// Names of the functions recognised as test cases.
    pub fn cases(&self, marker: CaseMarker) -> Vec<String> {
        self.functions
            .iter()
            .filter(|f| f.is_case(marker))
            .map(|f| f.name.clone())
            .collect()
    }
}

/// An out-of-line `mod name;` declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmoduleDecl {
    pub module: TestIdentity,
    /// Resolved source file, or `None` when no candidate file exists.
    pub file: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleDescriptor {
    pub module: TestIdentity,
    pub file: PathBuf,
    pub groups: Vec<GroupDescriptor>,
    pub submodules: Vec<SubmoduleDecl>,
}
