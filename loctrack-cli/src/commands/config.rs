//! Preferences management CLI commands.
//!
//! Provides `config get`, `config set`, `config unset`, `config list`, and
//! `config path` commands for viewing and modifying the persisted tracking
//! configuration from the command line.

use std::path::{Path, PathBuf};

use clap::Subcommand;
use loctrack::config::{
    DEFAULT_INTERVAL_MS, DEFAULT_MAX_WAIT_TIME_MS, DEFAULT_RUN_IN_FOREGROUND,
    DEFAULT_SMALLEST_DISPLACEMENT_M, DEFAULT_TOPIC, DEFAULT_USE_GPS, DEFAULT_USE_NETWORK,
};
use loctrack::store::{
    default_store_path, ConfigKey, ConfigStore, IniConfigStore, DEFAULT_NAMESPACE,
};

use crate::error::CliError;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Get a persisted value
    Get {
        /// Preference key (e.g., LOCATION_INTERVAL)
        key: String,
    },

    /// Set a persisted value
    Set {
        /// Preference key (e.g., LOCATION_INTERVAL)
        key: String,

        /// Value to set
        value: String,
    },

    /// Remove a persisted value so the default applies again
    Unset {
        /// Preference key (e.g., FOREGROUND_NOTIFICATION_TITLE)
        key: String,
    },

    /// List all preferences
    List,

    /// Show the preferences file path
    Path,
}

/// Run a config subcommand.
pub fn run(command: ConfigCommands, store_path: Option<PathBuf>) -> Result<(), CliError> {
    let path = store_path.unwrap_or_else(default_store_path);
    match command {
        ConfigCommands::Get { key } => run_get(&path, &key),
        ConfigCommands::Set { key, value } => run_set(&path, &key, &value),
        ConfigCommands::Unset { key } => run_unset(&path, &key),
        ConfigCommands::List => run_list(&path),
        ConfigCommands::Path => run_path(&path),
    }
}

fn parse_key(key: &str) -> Result<ConfigKey, CliError> {
    key.parse().map_err(|_| {
        CliError::Config(format!(
            "Unknown preference key '{}'. Use 'loctrack config list' to see available keys.",
            key
        ))
    })
}

fn open(path: &Path) -> Result<IniConfigStore, CliError> {
    Ok(IniConfigStore::open(path, DEFAULT_NAMESPACE)?)
}

/// Built-in value used when a key is not persisted.
fn default_value(key: ConfigKey) -> Option<String> {
    match key {
        ConfigKey::Action => Some(DEFAULT_TOPIC.to_string()),
        ConfigKey::LocationInterval => Some(DEFAULT_INTERVAL_MS.to_string()),
        ConfigKey::LocationSmallestDisplacement => {
            Some(DEFAULT_SMALLEST_DISPLACEMENT_M.to_string())
        }
        ConfigKey::LocationMaxWaitTime => Some(DEFAULT_MAX_WAIT_TIME_MS.to_string()),
        ConfigKey::Gps => Some(DEFAULT_USE_GPS.to_string()),
        ConfigKey::Network => Some(DEFAULT_USE_NETWORK.to_string()),
        ConfigKey::RunInForeground => Some(DEFAULT_RUN_IN_FOREGROUND.to_string()),
        ConfigKey::ForegroundNotificationTitle
        | ConfigKey::ForegroundNotificationText
        | ConfigKey::ForegroundNotificationTicker
        | ConfigKey::ForegroundNotificationChannelId => None,
    }
}

fn describe(store: &dyn ConfigStore, key: ConfigKey) -> String {
    match (store.read(key), default_value(key)) {
        (Some(value), _) => value,
        (None, Some(default)) => format!("(not set, default {})", default),
        (None, None) => "(not set)".to_string(),
    }
}

/// Get a persisted value.
fn run_get(path: &Path, key: &str) -> Result<(), CliError> {
    let key = parse_key(key)?;
    let store = open(path)?;
    println!("{}", describe(&store, key));
    Ok(())
}

/// Set a persisted value.
fn run_set(path: &Path, key: &str, value: &str) -> Result<(), CliError> {
    let key = parse_key(key)?;
    let store = open(path)?;
    store.put_parsed(key, value)?;

    println!("Set {} = {}", key, value);
    Ok(())
}

/// Remove a persisted value.
fn run_unset(path: &Path, key: &str) -> Result<(), CliError> {
    let key = parse_key(key)?;
    let store = open(path)?;
    store.remove(key)?;

    println!("Unset {}", key);
    Ok(())
}

/// List all preferences.
fn run_list(path: &Path) -> Result<(), CliError> {
    let store = open(path)?;

    println!("Tracking Preferences");
    println!("====================");
    println!();
    println!("[{}]", store.namespace());

    for key in ConfigKey::all() {
        println!("  {} = {}", key, describe(&store, *key));
    }

    Ok(())
}

/// Show the preferences file path.
fn run_path(path: &Path) -> Result<(), CliError> {
    println!("{}", path.display());
    Ok(())
}
