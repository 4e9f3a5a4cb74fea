//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and appropriate exit codes.

use std::fmt;
use std::process;

use loctrack::session::SessionError;
use loctrack::store::StoreError;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Invalid arguments or configuration
    Config(String),
    /// Preferences file could not be read or written
    Store(StoreError),
    /// Tracking session failed to start
    Session(SessionError),
    /// Async runtime could not be created
    Runtime(std::io::Error),
    /// The location permission was declined
    PermissionDenied,
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        match self {
            CliError::Store(StoreError::Load { .. }) => {
                eprintln!();
                eprintln!("The preferences file could not be parsed.");
                eprintln!("Fix or remove it, or point --store at another file.");
                process::exit(1)
            }
            CliError::PermissionDenied => process::exit(2),
            _ => process::exit(1),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::Store(e) => write!(f, "{}", e),
            CliError::Session(e) => write!(f, "Failed to start tracking: {}", e),
            CliError::Runtime(e) => write!(f, "Failed to start async runtime: {}", e),
            CliError::PermissionDenied => write!(f, "Location permission denied"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Store(e) => Some(e),
            CliError::Session(e) => Some(e),
            CliError::Runtime(e) => Some(e),
            _ => None,
        }
    }
}

impl From<StoreError> for CliError {
    fn from(e: StoreError) -> Self {
        CliError::Store(e)
    }
}

impl From<SessionError> for CliError {
    fn from(e: SessionError) -> Self {
        CliError::Session(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        assert_eq!(
            CliError::Config("bad".to_string()).to_string(),
            "Configuration error: bad"
        );
        assert_eq!(
            CliError::PermissionDenied.to_string(),
            "Location permission denied"
        );
    }

    #[test]
    fn test_store_error_converts() {
        let err: CliError = StoreError::UnknownKey("NOPE".to_string()).into();
        assert!(matches!(err, CliError::Store(StoreError::UnknownKey(_))));
        assert!(std::error::Error::source(&err).is_some());
    }
}
