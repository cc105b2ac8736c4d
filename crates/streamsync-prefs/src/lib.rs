//! streamsync-prefs library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the binary entry point in `main.rs` share the same module tree.

/// Storage layer: the TOML-file-backed preference store.
pub mod storage;

pub use storage::prefs_file::{FilePreferences, StorageError};
