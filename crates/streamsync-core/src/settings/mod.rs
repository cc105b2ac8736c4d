//! Sender settings: receiver address, receiver port, and channel ID.
//!
//! [`store::SettingsStore`] reads and writes the three values through an
//! injected [`crate::PreferenceStore`].  Key names and defaults live in
//! [`keys`] so the file-backed store and the CLI agree on them.

pub mod keys;
pub mod store;
