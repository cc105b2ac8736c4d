//! Storage key names and built-in defaults.
//!
//! The key names are part of the on-disk format and must not change.

/// Key under which the receiver address is stored.
pub const KEY_ADDRESS: &str = "ip";
/// Key under which the receiver port is stored.
pub const KEY_PORT: &str = "port";
/// Key under which the channel ID is stored.
pub const KEY_ID: &str = "id";

/// Address returned when none has been stored.
pub const DEFAULT_ADDRESS: &str = "127.0.0.1";
/// Port returned when none has been stored.
pub const DEFAULT_PORT: i32 = 5000;
/// Channel ID returned when none has been stored.
pub const DEFAULT_ID: i32 = 0;
