//! Typed key-value preference store capability.
//!
//! A [`PreferenceStore`] holds text and integer values under string keys and
//! survives process restarts (for persistent implementations).  Reads never
//! fail: a missing key yields the caller-supplied default.  Writes are grouped
//! into an [`Edits`] batch and handed to the store in one of two ways:
//!
//! - [`PreferenceStore::apply`] – fire-and-forget.  The new values are visible
//!   to subsequent reads immediately; durability happens in the background and
//!   the caller never hears about failures.
//! - [`PreferenceStore::commit`] – commit and wait.  Returns once the batch
//!   (and everything applied before it) is durable.
//!
//! # Testability
//!
//! [`memory::MemoryPreferences`] is a process-local implementation for unit
//! tests and embedding.  Under `cfg(test)` a `mockall` mock of the trait is
//! generated as `MockPreferenceStore`.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

pub mod memory;

/// A single stored value.
///
/// Serialized untagged so a TOML settings file reads naturally:
/// `port = 5000`, `ip = "127.0.0.1"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PreferenceValue {
    /// A 32-bit signed integer.
    Int(i32),
    /// A UTF-8 text value.
    Text(String),
}

impl PreferenceValue {
    /// Returns the integer payload, or `None` for text values.
    pub fn as_int(&self) -> Option<i32> {
        match self {
            Self::Int(v) => Some(*v),
            Self::Text(_) => None,
        }
    }

    /// Returns the text payload, or `None` for integer values.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(v) => Some(v),
            Self::Int(_) => None,
        }
    }

    /// Short type name used in log messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Int(_) => "int",
            Self::Text(_) => "text",
        }
    }
}

/// Error type for waited-on preference writes.
///
/// Reads and fire-and-forget writes never produce this.
#[derive(Debug, Error)]
pub enum PreferenceError {
    /// The backing storage rejected the write.
    #[error("failed to persist preferences: {0}")]
    Persist(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The background writer is gone, so the write cannot be confirmed.
    #[error("preference writer has shut down")]
    WriterClosed,
}

/// An ordered batch of pending writes.
///
/// Later entries for the same key win when the batch is applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Edits {
    entries: Vec<(String, PreferenceValue)>,
}

impl Edits {
    /// Creates an empty batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `value` under `key`.
    pub fn put(&mut self, key: impl Into<String>, value: PreferenceValue) {
        self.entries.push((key.into(), value));
    }

    /// Returns `true` when nothing has been queued.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of queued writes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Iterates queued writes in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PreferenceValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl IntoIterator for Edits {
    type Item = (String, PreferenceValue);
    type IntoIter = std::vec::IntoIter<(String, PreferenceValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Persistent key-value capability consumed by [`crate::SettingsStore`].
///
/// Implementations must serialize concurrent writes internally; each
/// `apply`/`commit` call is one independent transaction.
#[cfg_attr(test, mockall::automock)]
pub trait PreferenceStore: Send + Sync {
    /// Returns the text stored under `key`, or `default` if absent.
    fn get_string(&self, key: &str, default: &str) -> String;

    /// Returns the integer stored under `key`, or `default` if absent.
    fn get_int(&self, key: &str, default: i32) -> i32;

    /// Applies `edits` without waiting for durability.
    fn apply(&self, edits: Edits);

    /// Applies `edits` and waits until they, and every earlier write, are durable.
    ///
    /// # Errors
    ///
    /// Returns [`PreferenceError`] if the backing storage could not be written.
    fn commit(&self, edits: Edits) -> Result<(), PreferenceError>;
}

impl<T: PreferenceStore + ?Sized> PreferenceStore for Arc<T> {
    fn get_string(&self, key: &str, default: &str) -> String {
        (**self).get_string(key, default)
    }

    fn get_int(&self, key: &str, default: i32) -> i32 {
        (**self).get_int(key, default)
    }

    fn apply(&self, edits: Edits) {
        (**self).apply(edits)
    }

    fn commit(&self, edits: Edits) -> Result<(), PreferenceError> {
        (**self).commit(edits)
    }
}

/// Write transaction over a [`PreferenceStore`].
///
/// ```rust
/// use streamsync_core::{MemoryPreferences, PreferenceStore, PreferenceStoreExt};
///
/// let prefs = MemoryPreferences::new();
/// prefs.edit().put_string("ip", "10.0.0.2").put_int("port", 6000).apply();
/// assert_eq!(prefs.get_int("port", 5000), 6000);
/// ```
#[must_use = "edits are discarded unless apply() or commit() is called"]
pub struct Editor<'a, S: PreferenceStore + ?Sized> {
    store: &'a S,
    edits: Edits,
}

impl<'a, S: PreferenceStore + ?Sized> Editor<'a, S> {
    /// Starts an empty transaction against `store`.
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            edits: Edits::new(),
        }
    }

    /// Queues a text value.
    pub fn put_string(mut self, key: &str, value: &str) -> Self {
        self.edits.put(key, PreferenceValue::Text(value.to_string()));
        self
    }

    /// Queues an integer value.
    pub fn put_int(mut self, key: &str, value: i32) -> Self {
        self.edits.put(key, PreferenceValue::Int(value));
        self
    }

    /// Hands the batch to the store without waiting.
    pub fn apply(self) {
        self.store.apply(self.edits);
    }

    /// Hands the batch to the store and waits for durability.
    ///
    /// # Errors
    ///
    /// Propagates the store's [`PreferenceError`].
    pub fn commit(self) -> Result<(), PreferenceError> {
        self.store.commit(self.edits)
    }
}

/// Adds [`edit`](PreferenceStoreExt::edit) to every [`PreferenceStore`].
pub trait PreferenceStoreExt: PreferenceStore {
    /// Opens a write transaction.
    fn edit(&self) -> Editor<'_, Self>;
}

impl<T: PreferenceStore + ?Sized> PreferenceStoreExt for T {
    fn edit(&self) -> Editor<'_, Self> {
        Editor::new(self)
    }
}

/// Resolves a looked-up value as text, falling back to `default`.
///
/// A value of the wrong type is treated as absent and logged.
pub fn text_or_default(key: &str, value: Option<&PreferenceValue>, default: &str) -> String {
    match value {
        None => default.to_string(),
        Some(found) => match found.as_text() {
            Some(v) => v.to_string(),
            None => {
                warn!(key, found = found.kind(), "expected text preference, using default");
                default.to_string()
            }
        },
    }
}

/// Resolves a looked-up value as an integer, falling back to `default`.
///
/// A value of the wrong type is treated as absent and logged.
pub fn int_or_default(key: &str, value: Option<&PreferenceValue>, default: i32) -> i32 {
    match value {
        None => default,
        Some(found) => found.as_int().unwrap_or_else(|| {
            warn!(key, found = found.kind(), "expected int preference, using default");
            default
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edits_preserve_insertion_order() {
        // Arrange
        let mut edits = Edits::new();

        // Act
        edits.put("b", PreferenceValue::Int(1));
        edits.put("a", PreferenceValue::Text("x".to_string()));

        // Assert
        let keys: Vec<&str> = edits.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["b", "a"]);
        assert_eq!(edits.len(), 2);
        assert!(!edits.is_empty());
    }

    #[test]
    fn test_editor_forwards_batch_to_apply() {
        // Arrange
        let mut mock = MockPreferenceStore::new();
        let mut expected = Edits::new();
        expected.put("ip", PreferenceValue::Text("10.1.1.1".to_string()));
        expected.put("port", PreferenceValue::Int(7000));
        mock.expect_apply()
            .withf(move |edits| *edits == expected)
            .times(1)
            .return_const(());

        // Act
        mock.edit()
            .put_string("ip", "10.1.1.1")
            .put_int("port", 7000)
            .apply();

        // Assert – expectations are verified when `mock` is dropped
    }

    #[test]
    fn test_editor_commit_propagates_store_error() {
        // Arrange
        let mut mock = MockPreferenceStore::new();
        mock.expect_commit()
            .times(1)
            .returning(|_| Err(PreferenceError::WriterClosed));

        // Act
        let result = mock.edit().put_int("id", 3).commit();

        // Assert
        assert!(matches!(result, Err(PreferenceError::WriterClosed)));
    }

    #[test]
    fn test_arc_store_delegates_to_inner() {
        // Arrange
        let mut mock = MockPreferenceStore::new();
        mock.expect_get_int()
            .withf(|key, default| key == "port" && *default == 5000)
            .return_const(9000);
        let shared = Arc::new(mock);

        // Act
        let port = shared.get_int("port", 5000);

        // Assert
        assert_eq!(port, 9000);
    }

    #[test]
    fn test_text_or_default_uses_default_on_type_mismatch() {
        let value = PreferenceValue::Int(5);
        assert_eq!(text_or_default("ip", Some(&value), "127.0.0.1"), "127.0.0.1");
    }

    #[test]
    fn test_int_or_default_uses_default_on_type_mismatch() {
        let value = PreferenceValue::Text("8080".to_string());
        assert_eq!(int_or_default("port", Some(&value), 5000), 5000);
    }

    #[test]
    fn test_lookup_helpers_return_stored_values() {
        let text = PreferenceValue::Text("10.0.0.9".to_string());
        let int = PreferenceValue::Int(-4);
        assert_eq!(text_or_default("ip", Some(&text), "127.0.0.1"), "10.0.0.9");
        assert_eq!(int_or_default("id", Some(&int), 0), -4);
        assert_eq!(int_or_default("id", None, 0), 0);
    }

    #[test]
    fn test_preference_value_accessors() {
        assert_eq!(PreferenceValue::Int(3).as_int(), Some(3));
        assert_eq!(PreferenceValue::Int(3).as_text(), None);
        assert_eq!(PreferenceValue::Text("a".into()).as_text(), Some("a"));
        assert_eq!(PreferenceValue::Text("a".into()).kind(), "text");
    }
}
