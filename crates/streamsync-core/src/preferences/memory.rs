//! In-memory preference store.
//!
//! Keeps values in a process-local map.  Useful as a test double and for
//! embedding the settings in tools that should not touch the disk.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::debug;

use super::{int_or_default, text_or_default, Edits, PreferenceError, PreferenceStore, PreferenceValue};

/// A [`PreferenceStore`] that never leaves memory.
///
/// `apply` and `commit` both take effect immediately; `commit` always succeeds.
#[derive(Debug, Default)]
pub struct MemoryPreferences {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    values: BTreeMap<String, PreferenceValue>,
    applied: u32,
    committed: u32,
}

impl MemoryPreferences {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with `values`.
    pub fn with_values<I, K>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, PreferenceValue)>,
        K: Into<String>,
    {
        let values = values.into_iter().map(|(k, v)| (k.into(), v)).collect();
        Self {
            inner: Mutex::new(Inner {
                values,
                ..Inner::default()
            }),
        }
    }

    /// Returns a copy of every stored entry, ordered by key.
    pub fn entries(&self) -> BTreeMap<String, PreferenceValue> {
        self.lock_inner().values.clone()
    }

    /// Returns the number of batches handed to [`PreferenceStore::apply`].
    pub fn applied_count(&self) -> u32 {
        self.lock_inner().applied
    }

    /// Returns the number of batches handed to [`PreferenceStore::commit`].
    pub fn committed_count(&self) -> u32 {
        self.lock_inner().committed
    }

    // Every update is a plain map insert, so a poisoned lock still guards
    // consistent data.
    fn lock_inner(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self, edits: Edits, committed: bool) {
        let mut inner = self.lock_inner();
        debug!(writes = edits.len(), committed, "memory preferences updated");
        for (key, value) in edits {
            inner.values.insert(key, value);
        }
        if committed {
            inner.committed += 1;
        } else {
            inner.applied += 1;
        }
    }
}

impl PreferenceStore for MemoryPreferences {
    fn get_string(&self, key: &str, default: &str) -> String {
        let inner = self.lock_inner();
        text_or_default(key, inner.values.get(key), default)
    }

    fn get_int(&self, key: &str, default: i32) -> i32 {
        let inner = self.lock_inner();
        int_or_default(key, inner.values.get(key), default)
    }

    fn apply(&self, edits: Edits) {
        self.write(edits, false);
    }

    fn commit(&self, edits: Edits) -> Result<(), PreferenceError> {
        self.write(edits, true);
        Ok(())
    }
}
