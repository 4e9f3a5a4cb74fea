//! INI-file backed configuration store (~/.loctrack/preferences.ini).
//!
//! The whole file is held in memory and rewritten on every change, so a
//! value is on disk by the time `put_*` returns. Each namespace is one INI
//! section, which lets several applications share a file without their
//! keys colliding.
//!
//! The file is parsed without quote or escape handling and written without
//! escaping. Values the INI reader would otherwise alter (surrounding
//! whitespace, leading quotes, backslashes, comment or control characters)
//! are stored as a JSON string literal and decoded on read.

use std::path::{Path, PathBuf};

use ::ini::{EscapePolicy, Ini, ParseOption};
use parking_lot::Mutex;

use super::error::StoreError;
use super::keys::ConfigKey;
use super::ConfigStore;

/// Durable configuration store backed by an INI file.
pub struct IniConfigStore {
    path: PathBuf,
    namespace: String,
    ini: Mutex<Ini>,
}

impl IniConfigStore {
    /// Open the store at `path`.
    ///
    /// A missing file is treated as an empty store; it is created on the
    /// first write.
    pub fn open(path: impl Into<PathBuf>, namespace: impl Into<String>) -> Result<Self, StoreError> {
        let path = path.into();
        let ini = if path.exists() {
            Ini::load_from_file_opt(&path, parse_option()).map_err(|source| StoreError::Load {
                path: path.clone(),
                source,
            })?
        } else {
            Ini::new()
        };

        tracing::debug!(path = %path.display(), "Opened preferences file");

        Ok(Self {
            path,
            namespace: namespace.into(),
            ini: Mutex::new(ini),
        })
    }

    /// Open the store at the default location with the default namespace.
    pub fn open_default() -> Result<Self, StoreError> {
        Self::open(default_store_path(), super::DEFAULT_NAMESPACE)
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, ini: &Ini) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|source| StoreError::CreateDir {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        ini.write_to_file_policy(&self.path, EscapePolicy::Nothing)
            .map_err(|source| StoreError::Write {
                path: self.path.clone(),
                source,
            })
    }
}

impl ConfigStore for IniConfigStore {
    fn namespace(&self) -> &str {
        &self.namespace
    }

    fn read(&self, key: ConfigKey) -> Option<String> {
        self.ini
            .lock()
            .section(Some(self.namespace.as_str()))
            .and_then(|section| section.get(key.as_str()))
            .map(decode_value)
    }

    fn write(&self, key: ConfigKey, value: &str) -> Result<(), StoreError> {
        let mut ini = self.ini.lock();
        let encoded = encode_value(value);

        let unchanged = ini
            .section(Some(self.namespace.as_str()))
            .and_then(|section| section.get(key.as_str()))
            .is_some_and(|current| current == encoded);
        if unchanged {
            return Ok(());
        }

        // Only replace the live copy once the file holds the new value.
        let mut updated = ini.clone();
        updated
            .with_section(Some(self.namespace.as_str()))
            .set(key.as_str(), encoded);
        self.persist(&updated)?;
        *ini = updated;
        Ok(())
    }

    fn remove(&self, key: ConfigKey) -> Result<(), StoreError> {
        let mut ini = self.ini.lock();

        let mut updated = ini.clone();
        if updated
            .delete_from(Some(self.namespace.as_str()), key.as_str())
            .is_none()
        {
            return Ok(());
        }
        self.persist(&updated)?;
        *ini = updated;
        Ok(())
    }
}

fn parse_option() -> ParseOption {
    ParseOption {
        enabled_quote: false,
        enabled_escape: false,
        ..ParseOption::default()
    }
}

/// Whether the INI reader would return `value` unchanged if written raw.
fn survives_raw(value: &str) -> bool {
    !value.is_empty()
        && value.trim() == value
        && !value.starts_with(['"', '\''])
        && !value.contains(|c: char| c.is_control() || matches!(c, '\\' | ';' | '#'))
}

fn encode_value(value: &str) -> String {
    if survives_raw(value) {
        return value.to_string();
    }
    serde_json::to_string(value).unwrap_or_else(|_| value.to_string())
}

fn decode_value(stored: &str) -> String {
    if stored.starts_with('"') {
        if let Ok(decoded) = serde_json::from_str::<String>(stored) {
            return decoded;
        }
    }
    stored.to_string()
}

/// Get the path to the preferences directory (~/.loctrack).
pub fn default_store_directory() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".loctrack")
}

/// Get the path to the preferences file (~/.loctrack/preferences.ini).
pub fn default_store_path() -> PathBuf {
    default_store_directory().join("preferences.ini")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_empty_store() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let store = IniConfigStore::open(temp_dir.path().join("prefs.ini"), "test").unwrap();

        assert_eq!(store.get_long(ConfigKey::LocationInterval, 10_000), 10_000);
        assert!(!store.path().exists());
    }

    #[test]
    fn test_values_survive_reopen() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("prefs.ini");

        {
            let store = IniConfigStore::open(&path, "test").unwrap();
            store.put_long(ConfigKey::LocationInterval, 5000).unwrap();
            store.put_bool(ConfigKey::Gps, false).unwrap();
            store.put_string(ConfigKey::Action, "my.action").unwrap();
        }

        let reopened = IniConfigStore::open(&path, "test").unwrap();
        assert_eq!(reopened.get_long(ConfigKey::LocationInterval, 0), 5000);
        assert!(!reopened.get_bool(ConfigKey::Gps, true));
        assert_eq!(
            reopened.get_string(ConfigKey::Action, None).as_deref(),
            Some("my.action")
        );
    }

    #[test]
    fn test_namespaces_are_isolated() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("prefs.ini");

        let first = IniConfigStore::open(&path, "first").unwrap();
        first.put_long(ConfigKey::LocationInterval, 1000).unwrap();

        let second = IniConfigStore::open(&path, "second").unwrap();
        assert_eq!(second.get_long(ConfigKey::LocationInterval, 10_000), 10_000);

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("[first]"));
        assert!(content.contains("LOCATION_INTERVAL=1000"));
    }

    #[test]
    fn test_unchanged_write_skips_disk() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("prefs.ini");
        let store = IniConfigStore::open(&path, "test").unwrap();

        store.put_bool(ConfigKey::Network, true).unwrap();
        std::fs::remove_file(&path).unwrap();

        store.put_bool(ConfigKey::Network, true).unwrap();
        assert!(!path.exists());

        store.put_bool(ConfigKey::Network, false).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_remove_persists() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("prefs.ini");

        let store = IniConfigStore::open(&path, "test").unwrap();
        store
            .put_string(ConfigKey::ForegroundNotificationTitle, "Tracking")
            .unwrap();
        store.remove(ConfigKey::ForegroundNotificationTitle).unwrap();

        let reopened = IniConfigStore::open(&path, "test").unwrap();
        assert_eq!(
            reopened.get_string(ConfigKey::ForegroundNotificationTitle, None),
            None
        );
    }

    #[test]
    fn test_padded_and_quoted_strings_survive_reopen() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("prefs.ini");
        let values = [
            (ConfigKey::ForegroundNotificationTicker, "  padded  "),
            (ConfigKey::ForegroundNotificationChannelId, "\"quoted\""),
            (ConfigKey::ForegroundNotificationTitle, "C:\\tracks ; #1"),
            (ConfigKey::ForegroundNotificationText, "two\nlines"),
            (ConfigKey::Action, ""),
        ];

        {
            let store = IniConfigStore::open(&path, "test").unwrap();
            for (key, value) in values {
                store.put_string(key, value).unwrap();
            }
        }

        let reopened = IniConfigStore::open(&path, "test").unwrap();
        for (key, value) in values {
            assert_eq!(reopened.get_string(key, None).as_deref(), Some(value), "{}", key);
        }
    }

    #[test]
    fn test_plain_values_are_written_unquoted() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("prefs.ini");
        let store = IniConfigStore::open(&path, "test").unwrap();

        store.put_string(ConfigKey::Action, "my.action").unwrap();
        store.put_string(ConfigKey::ForegroundNotificationTicker, " x").unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("ACTION=my.action"));
        assert!(content.contains("FOREGROUND_NOTIFICATION_TICKER=\" x\""));
    }

    #[test]
    fn test_failed_write_keeps_previous_value() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let parent = temp_dir.path().join("prefs");
        let path = parent.join("prefs.ini");
        let store = IniConfigStore::open(&path, "test").unwrap();
        store.put_long(ConfigKey::LocationInterval, 1000).unwrap();

        std::fs::remove_dir_all(&parent).unwrap();
        std::fs::write(&parent, "not a directory").unwrap();

        assert!(store.put_long(ConfigKey::LocationInterval, 5000).is_err());
        assert_eq!(store.get_long(ConfigKey::LocationInterval, 10_000), 1000);

        assert!(store.remove(ConfigKey::LocationInterval).is_err());
        assert_eq!(store.get_long(ConfigKey::LocationInterval, 10_000), 1000);
    }

    #[test]
    fn test_failed_first_write_leaves_store_empty() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let blocker = temp_dir.path().join("blocker");
        std::fs::write(&blocker, "").unwrap();
        let store = IniConfigStore::open(blocker.join("prefs.ini"), "test").unwrap();

        assert!(matches!(
            store.put_long(ConfigKey::LocationInterval, 5000),
            Err(StoreError::CreateDir { .. })
        ));
        assert_eq!(store.get_long(ConfigKey::LocationInterval, 10_000), 10_000);
    }

    #[test]
    fn test_default_path() {
        let path = default_store_path();
        assert!(path.ends_with(".loctrack/preferences.ini"));
    }
}
