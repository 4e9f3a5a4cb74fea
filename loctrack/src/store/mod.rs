//! Durable key/value persistence for tracking configuration.
//!
//! The [`ConfigStore`] trait mirrors a platform preferences API: typed
//! getters that fall back to a caller-supplied default, and setters that
//! write through to durable storage. Keys are [`ConfigKey`] values and are
//! namespaced by each store so they never collide with unrelated state.
//!
//! # Backends
//!
//! - [`MemoryConfigStore`] - in-process map, for tests and embedding
//! - [`IniConfigStore`] - INI file that survives process restarts
//!
//! # Example
//!
//! ```
//! use loctrack::store::{ConfigKey, ConfigStore, MemoryConfigStore};
//!
//! let store = MemoryConfigStore::new("my.app");
//! store.put_long(ConfigKey::LocationInterval, 5000).unwrap();
//!
//! assert_eq!(store.get_long(ConfigKey::LocationInterval, 10_000), 5000);
//! assert!(store.get_bool(ConfigKey::Gps, true));
//! ```

mod error;
mod ini_file;
mod keys;
mod memory;

pub use error::StoreError;
pub use ini_file::{default_store_directory, default_store_path, IniConfigStore};
pub use keys::{ConfigKey, ValueKind};
pub use memory::MemoryConfigStore;

/// Default namespace for persisted keys.
pub const DEFAULT_NAMESPACE: &str = "loctrack.preferences";

/// Namespaced key/value persistence.
///
/// Backends implement the raw string operations; the typed accessors are
/// provided. Reads are infallible and return the default for missing or
/// malformed values. Writes are synchronous and durable once they return.
pub trait ConfigStore: Send + Sync {
    /// Namespace the keys are stored under.
    fn namespace(&self) -> &str;

    /// Read the raw stored value.
    fn read(&self, key: ConfigKey) -> Option<String>;

    /// Write a raw value.
    fn write(&self, key: ConfigKey, value: &str) -> Result<(), StoreError>;

    /// Remove a value. Removing a missing key is not an error.
    fn remove(&self, key: ConfigKey) -> Result<(), StoreError>;

    /// Get a string value.
    fn get_string(&self, key: ConfigKey, default: Option<&str>) -> Option<String> {
        self.read(key).or_else(|| default.map(str::to_string))
    }

    /// Get an integer value.
    fn get_long(&self, key: ConfigKey, default: i64) -> i64 {
        match self.read(key) {
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                tracing::warn!(key = %key, value = %raw, "Ignoring malformed stored integer");
                default
            }),
            None => default,
        }
    }

    /// Get a boolean value.
    fn get_bool(&self, key: ConfigKey, default: bool) -> bool {
        match self.read(key) {
            Some(raw) => parse_bool(&raw).unwrap_or_else(|| {
                tracing::warn!(key = %key, value = %raw, "Ignoring malformed stored boolean");
                default
            }),
            None => default,
        }
    }

    /// Put a string value.
    fn put_string(&self, key: ConfigKey, value: &str) -> Result<(), StoreError> {
        self.write(key, value)
    }

    /// Put an integer value.
    fn put_long(&self, key: ConfigKey, value: i64) -> Result<(), StoreError> {
        self.write(key, &value.to_string())
    }

    /// Put a boolean value.
    fn put_bool(&self, key: ConfigKey, value: bool) -> Result<(), StoreError> {
        self.write(key, if value { "true" } else { "false" })
    }

    /// Validate and write a user-supplied value according to the key's kind.
    fn put_parsed(&self, key: ConfigKey, value: &str) -> Result<(), StoreError> {
        match key.kind() {
            ValueKind::String => self.put_string(key, value),
            ValueKind::Long => {
                let parsed = value
                    .trim()
                    .parse::<i64>()
                    .ok()
                    .filter(|v| *v >= 0)
                    .ok_or_else(|| StoreError::InvalidValue {
                        key: key.to_string(),
                        value: value.to_string(),
                        expected: "non-negative integer",
                    })?;
                self.put_long(key, parsed)
            }
            ValueKind::Bool => {
                let parsed = parse_bool(value).ok_or_else(|| StoreError::InvalidValue {
                    key: key.to_string(),
                    value: value.to_string(),
                    expected: "boolean",
                })?;
                self.put_bool(key, parsed)
            }
        }
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}
