//! Typed accessors for the sender settings.
//!
//! Each field is read and written independently.  Reads are total: a value
//! that was never written comes back as its default.  Setters perform no
//! validation; any string is accepted as an address and any integer as a
//! port or ID.

use std::net::{IpAddr, SocketAddr};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::keys::{DEFAULT_ADDRESS, DEFAULT_ID, DEFAULT_PORT, KEY_ADDRESS, KEY_ID, KEY_PORT};
use crate::preferences::{Edits, PreferenceError, PreferenceStore, PreferenceStoreExt};

/// Point-in-time copy of all three settings.
///
/// Serialized with the storage key names so it prints like the settings file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(rename = "ip")]
    pub address: String,
    pub port: i32,
    pub id: i32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS.to_string(),
            port: DEFAULT_PORT,
            id: DEFAULT_ID,
        }
    }
}

/// Settings accessor over an injected [`PreferenceStore`].
///
/// # Example
///
/// ```rust
/// use streamsync_core::{MemoryPreferences, SettingsStore};
///
/// let settings = SettingsStore::new(MemoryPreferences::new());
/// assert_eq!(settings.port(), 5000);
/// settings.set_port(8080);
/// assert_eq!(settings.port(), 8080);
/// ```
#[derive(Debug)]
pub struct SettingsStore<P: PreferenceStore> {
    prefs: P,
}

impl<P: PreferenceStore> SettingsStore<P> {
    /// Wraps `prefs`.
    pub fn new(prefs: P) -> Self {
        Self { prefs }
    }

    /// Borrows the underlying store.
    pub fn preferences(&self) -> &P {
        &self.prefs
    }

    /// Unwraps the underlying store.
    pub fn into_inner(self) -> P {
        self.prefs
    }

    /// Receiver address, `"127.0.0.1"` if unset.
    pub fn address(&self) -> String {
        self.prefs.get_string(KEY_ADDRESS, DEFAULT_ADDRESS)
    }

    /// Stores the receiver address without waiting for durability.
    pub fn set_address(&self, value: &str) {
        debug!(address = value, "set receiver address");
        self.prefs.edit().put_string(KEY_ADDRESS, value).apply();
    }

    /// Receiver port, `5000` if unset.
    pub fn port(&self) -> i32 {
        self.prefs.get_int(KEY_PORT, DEFAULT_PORT)
    }

    /// Stores the receiver port without waiting for durability.
    pub fn set_port(&self, value: i32) {
        debug!(port = value, "set receiver port");
        self.prefs.edit().put_int(KEY_PORT, value).apply();
    }

    /// Channel ID, `0` if unset.
    pub fn id(&self) -> i32 {
        self.prefs.get_int(KEY_ID, DEFAULT_ID)
    }

    /// Stores the channel ID without waiting for durability.
    pub fn set_id(&self, value: i32) {
        debug!(id = value, "set channel id");
        self.prefs.edit().put_int(KEY_ID, value).apply();
    }

    /// Blocks until every earlier `set_*` call is durable.
    ///
    /// # Errors
    ///
    /// Returns [`PreferenceError`] if the store could not persist its contents.
    pub fn flush(&self) -> Result<(), PreferenceError> {
        self.prefs.commit(Edits::new())
    }

    /// Reads all three fields.
    pub fn snapshot(&self) -> Settings {
        Settings {
            address: self.address(),
            port: self.port(),
            id: self.id(),
        }
    }

    /// Receiver socket address, if the stored values form one.
    ///
    /// `None` when the address is not an IP literal or the port is outside
    /// `0..=65535`.  Hostnames are not resolved.
    pub fn endpoint(&self) -> Option<SocketAddr> {
        let ip: IpAddr = self.address().parse().ok()?;
        let port = u16::try_from(self.port()).ok()?;
        Some(SocketAddr::new(ip, port))
    }
}
