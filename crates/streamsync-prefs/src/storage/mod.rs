//! Storage infrastructure: settings file persistence.
//!
//! The `prefs_file` sub-module handles:
//!
//! - Locating the settings file in the platform-appropriate directory.
//! - Loading it into memory when the store is opened (absent file = empty).
//! - Writing changes back to disk on a background thread, without blocking
//!   the caller, plus an explicit wait for callers that need durability.

pub mod prefs_file;
