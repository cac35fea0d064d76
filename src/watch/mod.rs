// src/watch/mod.rs

//! Change detection by polling.
//!
//! Watch targets are expanded to a flat file list ([`targets`]) and each file
//! gets a fingerprint ([`fingerprint`]) that is re-checked every cycle.
//! [`WatchSet`] combines the two for the control loop.

pub mod fingerprint;
pub mod hash;
pub mod path_utils;
pub mod set;
pub mod targets;

pub use fingerprint::{FingerprintError, FingerprintStore};
pub use set::WatchSet;
pub use targets::{build_globset, ExpandedFile, TargetExpander};
