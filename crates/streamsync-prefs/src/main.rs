//! Stream in Sync settings tool: entry point.
//!
//! Reads and edits the sender settings file (receiver address, receiver port,
//! channel ID) from the command line.
//!
//! # Usage
//!
//! ```text
//! streamsync-prefs [--file <PATH>] <COMMAND>
//!
//! Commands:
//!   show                 Print all settings and the resolved endpoint
//!   get <FIELD>          Print one setting (address, port, id)
//!   set <FIELD> <VALUE>  Store one setting and wait until it is on disk
//!   path                 Print the settings file location
//! ```
//!
//! # Environment variable overrides
//!
//! | Variable                   | Description                         |
//! |----------------------------|-------------------------------------|
//! | `STREAMSYNC_SETTINGS_FILE` | Settings file path (same as --file) |
//! | `RUST_LOG`                 | Log filter, default `info`          |

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use streamsync_core::SettingsStore;
use streamsync_prefs::storage::prefs_file::settings_file_path;
use streamsync_prefs::FilePreferences;

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Inspect and edit Stream in Sync sender settings.
#[derive(Debug, Parser)]
#[command(name = "streamsync-prefs", version)]
struct Cli {
    /// Settings file to use instead of the platform default.
    #[arg(long, global = true, env = "STREAMSYNC_SETTINGS_FILE")]
    file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print all settings and the resolved endpoint.
    Show,
    /// Print one setting.
    Get {
        #[arg(value_enum)]
        field: Field,
    },
    /// Store one setting and wait until it is on disk.
    Set {
        #[command(subcommand)]
        value: SetValue,
    },
    /// Print the settings file location.
    Path,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Field {
    Address,
    Port,
    Id,
}

#[derive(Debug, Subcommand)]
enum SetValue {
    /// Receiver address.  Not validated.
    Address { value: String },
    /// Receiver port.  Not range-checked.
    Port {
        #[arg(allow_negative_numbers = true)]
        value: i32,
    },
    /// Channel ID.
    Id {
        #[arg(allow_negative_numbers = true)]
        value: i32,
    },
}

impl Cli {
    fn settings_path(&self) -> anyhow::Result<PathBuf> {
        match &self.file {
            Some(path) => Ok(path.clone()),
            None => settings_file_path().context("no --file given and no platform default"),
        }
    }
}

fn open_settings(path: &Path) -> anyhow::Result<SettingsStore<FilePreferences>> {
    let prefs = FilePreferences::open(path)
        .with_context(|| format!("failed to open settings file {}", path.display()))?;
    Ok(SettingsStore::new(prefs))
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout carries only command output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let path = cli.settings_path()?;

    match cli.command {
        Command::Path => println!("{}", path.display()),
        Command::Show => {
            let settings = open_settings(&path)?;
            let snapshot = settings.snapshot();
            print!(
                "{}",
                toml::to_string_pretty(&snapshot).context("failed to render settings")?
            );
            match settings.endpoint() {
                Some(endpoint) => println!("# endpoint: {endpoint}"),
                None => println!("# endpoint: unresolved"),
            }
        }
        Command::Get { field } => {
            let settings = open_settings(&path)?;
            match field {
                Field::Address => println!("{}", settings.address()),
                Field::Port => println!("{}", settings.port()),
                Field::Id => println!("{}", settings.id()),
            }
        }
        Command::Set { value } => {
            let settings = open_settings(&path)?;
            match value {
                SetValue::Address { value } => settings.set_address(&value),
                SetValue::Port { value } => settings.set_port(value),
                SetValue::Id { value } => settings.set_id(value),
            }
            settings
                .flush()
                .with_context(|| format!("failed to write settings file {}", path.display()))?;
            info!(path = %path.display(), "settings saved");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_set_port_accepts_negative_value() {
        // Arrange / Act
        let cli = Cli::try_parse_from(["streamsync-prefs", "set", "port", "-1"])
            .expect("negative port must parse");

        // Assert
        assert!(matches!(
            cli.command,
            Command::Set {
                value: SetValue::Port { value: -1 }
            }
        ));
    }

    #[test]
    fn test_cli_set_id_accepts_negative_value() {
        let cli = Cli::try_parse_from(["streamsync-prefs", "set", "id", "-17"]).expect("parse");
        assert!(matches!(
            cli.command,
            Command::Set {
                value: SetValue::Id { value: -17 }
            }
        ));
    }

    #[test]
    fn test_cli_set_address_keeps_text_unvalidated() {
        let cli = Cli::try_parse_from(["streamsync-prefs", "set", "address", "receiver.local"])
            .expect("parse");
        match cli.command {
            Command::Set {
                value: SetValue::Address { value },
            } => assert_eq!(value, "receiver.local"),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_file_accepted_after_subcommand() {
        // Arrange / Act
        let cli = Cli::try_parse_from([
            "streamsync-prefs",
            "get",
            "port",
            "--file",
            "/tmp/streamsync/settings.toml",
        ])
        .expect("global --file must parse after the subcommand");

        // Assert
        assert!(matches!(cli.command, Command::Get { field: Field::Port }));
        assert_eq!(
            cli.file,
            Some(PathBuf::from("/tmp/streamsync/settings.toml"))
        );
    }

    #[test]
    fn test_cli_rejects_unknown_get_field() {
        let result = Cli::try_parse_from(["streamsync-prefs", "get", "hostname"]);
        assert!(result.is_err(), "unknown field must be rejected");
    }

    #[test]
    fn test_cli_rejects_non_numeric_port() {
        let result = Cli::try_parse_from(["streamsync-prefs", "set", "port", "eighty"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_parses_show_and_path() {
        let show = Cli::try_parse_from(["streamsync-prefs", "show"]).expect("parse show");
        let path = Cli::try_parse_from(["streamsync-prefs", "path"]).expect("parse path");
        assert!(matches!(show.command, Command::Show));
        assert!(matches!(path.command, Command::Path));
    }

    #[test]
    fn test_settings_path_prefers_explicit_file() {
        let cli = Cli {
            file: Some(PathBuf::from("/srv/sender/settings.toml")),
            command: Command::Path,
        };
        assert_eq!(
            cli.settings_path().expect("explicit path"),
            PathBuf::from("/srv/sender/settings.toml")
        );
    }

    #[test]
    fn test_settings_path_falls_back_to_platform_default() {
        // Arrange
        let cli = Cli {
            file: None,
            command: Command::Path,
        };

        // Act
        let resolved = cli.settings_path();

        // Assert – matches the platform default whenever one exists
        match settings_file_path() {
            Ok(expected) => assert_eq!(resolved.expect("default path"), expected),
            Err(_) => assert!(resolved.is_err()),
        }
    }
}
