//! # streamsync-core
//!
//! Shared library for Stream in Sync containing the sender's persisted
//! settings and the key-value store abstraction they are kept in.
//!
//! This crate has zero dependencies on OS APIs or the file system.  The
//! file-backed store lives in `streamsync-prefs`.
//!
//! # Architecture overview (for beginners)
//!
//! A Stream in Sync sender captures camera and audio and streams them to a
//! receiver.  Before it can start, it needs to remember three things between
//! runs: the receiver's IP address, the receiver's port, and the channel ID
//! this sender streams on.
//!
//! - **`preferences`** – A small, typed key-value store capability
//!   ([`PreferenceStore`]).  Values are read with a fallback default and
//!   written in batches through an [`Editor`].  An in-memory implementation
//!   ([`MemoryPreferences`]) is provided for tests and embedding.
//!
//! - **`settings`** – [`SettingsStore`], a thin accessor over any
//!   [`PreferenceStore`] that knows the key names and the defaults.

pub mod preferences;
pub mod settings;

// Re-export the most-used types at the crate root so callers can write
// `streamsync_core::SettingsStore` instead of the full module path.
pub use preferences::{
    memory::MemoryPreferences, Editor, Edits, PreferenceError, PreferenceStore,
    PreferenceStoreExt, PreferenceValue,
};
pub use settings::{
    keys::{DEFAULT_ADDRESS, DEFAULT_ID, DEFAULT_PORT, KEY_ADDRESS, KEY_ID, KEY_PORT},
    store::{Settings, SettingsStore},
};
