//! Error types for configuration stores.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur when reading or writing persisted configuration.
///
/// Reads never fail: a missing or unparseable value yields the caller's
/// default. Only durable writes and key parsing surface errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Failed to load the backing file.
    #[error("Failed to load preferences from {path}: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: ini::Error,
    },

    /// Failed to write the backing file.
    #[error("Failed to write preferences to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to create the directory holding the backing file.
    #[error("Failed to create preferences directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Unknown persisted key name.
    #[error("Unknown preference key '{0}'")]
    UnknownKey(String),

    /// A value could not be parsed as the key's kind.
    #[error("Invalid value for {key}: '{value}' is not a valid {expected}")]
    InvalidValue {
        key: String,
        value: String,
        expected: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_value_display() {
        let err = StoreError::InvalidValue {
            key: "GPS".to_string(),
            value: "maybe".to_string(),
            expected: "boolean",
        };
        assert_eq!(
            err.to_string(),
            "Invalid value for GPS: 'maybe' is not a valid boolean"
        );
    }

    #[test]
    fn test_write_error_has_source() {
        use std::error::Error;

        let err = StoreError::Write {
            path: PathBuf::from("/tmp/prefs.ini"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.source().is_some());
        assert!(err.to_string().contains("/tmp/prefs.ini"));
    }
}
