//! Error types for location providers.

use thiserror::Error;

/// Errors returned synchronously by a [`super::LocationProvider`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProviderError {
    /// The platform refused the call because the sensing permission is missing.
    #[error("Location access rejected by platform security: {0}")]
    SecurityRejected(String),

    /// The call requires an open connection.
    #[error("Provider is not connected")]
    NotConnected,

    /// Provider-specific failure.
    #[error("Provider error: {0}")]
    Other(String),
}

/// Details of an asynchronous connection failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectFailure {
    /// Provider-specific error code.
    pub code: i32,
    /// Human-readable reason.
    pub message: String,
}

impl ConnectFailure {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ConnectFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "connection failed (code {}): {}", self.code, self.message)
    }
}
