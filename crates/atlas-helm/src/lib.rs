//! Helm integration for atlas.
//!
//! Installed releases are the source of truth for which training jobs exist.
//! This crate treats helm as a key-value release store: list, check, install,
//! and delete named releases.

pub mod list;
pub mod store;
pub mod types;

pub use list::parse_release_list;
pub use store::{HelmReleaseStore, ReleaseError, ReleaseStore};
pub use types::ReleaseMap;
