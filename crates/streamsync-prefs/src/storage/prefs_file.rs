//! TOML-file-backed preference store.
//!
//! Persists the sender settings to the platform-appropriate settings file:
//! - Windows:  `%APPDATA%\StreamInSync\settings.toml`
//! - Linux:    `~/.config/streaminsync/settings.toml`
//! - macOS:    `~/Library/Application Support/StreamInSync/settings.toml`
//!
//! The file is a single flat TOML table.  Example:
//!
//! ```toml
//! id = 2
//! ip = "192.168.1.5"
//! port = 8080
//! ```
//!
//! # Write path
//!
//! The whole file is loaded into memory by [`FilePreferences::open`].  Reads
//! are served from memory.  Every write updates memory first (so the next
//! read sees it) and then queues a snapshot for a dedicated writer thread.
//! The writer coalesces queued snapshots, writes only the newest one to a
//! temporary file next to the target, and renames it into place.
//!
//! Fire-and-forget writes ([`PreferenceStore::apply`]) report failures only
//! to the log.  [`PreferenceStore::commit`] waits for the writer to confirm.
//! Dropping the store drains the queue before returning.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

use streamsync_core::preferences::{int_or_default, text_or_default};
use streamsync_core::{Edits, PreferenceError, PreferenceStore, PreferenceValue};
use thiserror::Error;
use tracing::{debug, error, info};

/// File name of the settings file inside the platform directory.
pub const SETTINGS_FILE_NAME: &str = "settings.toml";

type ValueMap = BTreeMap<String, PreferenceValue>;

/// Error type for settings file operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    /// A file system I/O error occurred.
    #[error("I/O error accessing settings at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse settings TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The settings could not be serialized to TOML.
    #[error("failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// The background writer thread could not be started.
    #[error("failed to start settings writer thread: {0}")]
    WriterThread(#[source] std::io::Error),
}

/// One queued write: the full map as of the write, plus an optional waiter.
struct WriteRequest {
    snapshot: ValueMap,
    ack: Option<Sender<Result<(), PreferenceError>>>,
}

/// A [`PreferenceStore`] persisted to a TOML file.
#[derive(Debug)]
pub struct FilePreferences {
    path: PathBuf,
    values: Mutex<ValueMap>,
    writer: Option<Sender<WriteRequest>>,
    handle: Option<JoinHandle<()>>,
}

impl FilePreferences {
    /// Opens the store at `path`, loading existing values.
    ///
    /// A missing file opens as an empty store; the file and its directory are
    /// created by the first write.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] for file-system errors other than "not
    /// found", [`StorageError::Parse`] if the file is not a flat table of
    /// strings and integers, and [`StorageError::WriterThread`] if the writer
    /// thread cannot be spawned.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let values = load_values(&path)?;
        info!(path = %path.display(), entries = values.len(), "opened settings file");

        let (tx, rx) = mpsc::channel();
        let writer_path = path.clone();
        let on_disk = values.clone();
        let handle = thread::Builder::new()
            .name("settings-writer".to_string())
            .spawn(move || run_writer(writer_path, on_disk, rx))
            .map_err(StorageError::WriterThread)?;

        Ok(Self {
            path,
            values: Mutex::new(values),
            writer: Some(tx),
            handle: Some(handle),
        })
    }

    /// Opens the store at the platform default location.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NoPlatformConfigDir`] if the location cannot be
    /// determined, otherwise the same errors as [`FilePreferences::open`].
    pub fn open_default() -> Result<Self, StorageError> {
        Self::open(settings_file_path()?)
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns a copy of every stored entry, ordered by key.
    pub fn entries(&self) -> ValueMap {
        self.lock_values().clone()
    }

    fn lock_values(&self) -> MutexGuard<'_, ValueMap> {
        self.values.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Merges `edits` into memory and queues the resulting snapshot.
    ///
    /// The lock is held across the send so queue order matches write order.
    fn write(
        &self,
        edits: Edits,
        ack: Option<Sender<Result<(), PreferenceError>>>,
    ) -> Result<(), PreferenceError> {
        let mut values = self.lock_values();
        for (key, value) in edits {
            values.insert(key, value);
        }
        let writer = self.writer.as_ref().ok_or(PreferenceError::WriterClosed)?;
        writer
            .send(WriteRequest {
                snapshot: values.clone(),
                ack,
            })
            .map_err(|_| PreferenceError::WriterClosed)
    }
}

impl PreferenceStore for FilePreferences {
    fn get_string(&self, key: &str, default: &str) -> String {
        text_or_default(key, self.lock_values().get(key), default)
    }

    fn get_int(&self, key: &str, default: i32) -> i32 {
        int_or_default(key, self.lock_values().get(key), default)
    }

    fn apply(&self, edits: Edits) {
        debug!(path = %self.path.display(), writes = edits.len(), "queue settings write");
        if let Err(e) = self.write(edits, None) {
            error!(path = %self.path.display(), "settings write dropped: {e}");
        }
    }

    fn commit(&self, edits: Edits) -> Result<(), PreferenceError> {
        debug!(path = %self.path.display(), writes = edits.len(), "commit settings write");
        let (ack_tx, ack_rx) = mpsc::channel();
        self.write(edits, Some(ack_tx))?;
        ack_rx.recv().map_err(|_| PreferenceError::WriterClosed)?
    }
}

impl Drop for FilePreferences {
    fn drop(&mut self) {
        // Closing the channel lets the writer finish the queue and exit.
        self.writer.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                error!(path = %self.path.display(), "settings writer thread panicked");
            }
        }
    }
}

// ── Writer thread ─────────────────────────────────────────────────────────────

fn run_writer(path: PathBuf, mut on_disk: ValueMap, rx: Receiver<WriteRequest>) {
    while let Ok(first) = rx.recv() {
        let mut latest = first.snapshot;
        let mut waiters: Vec<_> = first.ack.into_iter().collect();

        // Every snapshot contains everything before it, so only the newest
        // queued one needs to reach the disk.
        while let Ok(next) = rx.try_recv() {
            latest = next.snapshot;
            waiters.extend(next.ack);
        }

        let result = if latest == on_disk {
            Ok(())
        } else {
            save_values(&path, &latest)
        };

        match &result {
            Ok(()) => {
                debug!(path = %path.display(), entries = latest.len(), "settings persisted");
                on_disk = latest;
            }
            Err(e) => error!(path = %path.display(), "failed to persist settings: {e}"),
        }

        for waiter in waiters {
            let reply = match &result {
                Ok(()) => Ok(()),
                Err(e) => Err(PreferenceError::Persist(e.to_string().into())),
            };
            // The waiter may have given up; nothing to report to.
            let _ = waiter.send(reply);
        }
    }
    debug!(path = %path.display(), "settings writer stopped");
}

// ── File I/O ──────────────────────────────────────────────────────────────────

fn load_values(path: &Path) -> Result<ValueMap, StorageError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(toml::from_str(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ValueMap::new()),
        Err(source) => Err(StorageError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Writes `values` to a sibling temp file and renames it over `path`.
fn save_values(path: &Path, values: &ValueMap) -> Result<(), StorageError> {
    // Ensure directory exists before writing.
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(|source| StorageError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let content = toml::to_string_pretty(values)?;
    let tmp = temp_path(path);
    std::fs::write(&tmp, content).map_err(|source| StorageError::Io {
        path: tmp.clone(),
        source,
    })?;
    std::fs::rename(&tmp, path).map_err(|source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| SETTINGS_FILE_NAME.into());
    name.push(".tmp");
    path.with_file_name(name)
}

// ── Settings location ─────────────────────────────────────────────────────────

/// Determines the platform-appropriate directory for the settings file.
///
/// # Errors
///
/// Returns [`StorageError::NoPlatformConfigDir`] when the platform config base
/// directory cannot be determined from the environment.
pub fn settings_dir() -> Result<PathBuf, StorageError> {
    platform_settings_dir().ok_or(StorageError::NoPlatformConfigDir)
}

/// Resolves the full path to the settings file.
///
/// # Errors
///
/// Returns [`StorageError::NoPlatformConfigDir`] if the base directory cannot
/// be determined.
pub fn settings_file_path() -> Result<PathBuf, StorageError> {
    Ok(settings_dir()?.join(SETTINGS_FILE_NAME))
}

fn platform_settings_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("StreamInSync"))
    }

    #[cfg(any(target_os = "linux", target_os = "android"))]
    {
        // XDG_CONFIG_HOME or ~/.config
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("streaminsync"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("StreamInSync")
        })
    }

    #[cfg(not(any(
        target_os = "windows",
        target_os = "linux",
        target_os = "android",
        target_os = "macos"
    )))]
    {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
