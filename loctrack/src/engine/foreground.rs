//! Foreground keep-alive indicator.
//!
//! When foreground mode resolves true, the engine asks a
//! [`ForegroundPresenter`] for an indicator once per activation and dismisses
//! it on deactivation. Building the visual indicator is the host's concern;
//! [`LoggingPresenter`] is the headless stand-in.

use thiserror::Error;

use crate::config::ForegroundNotification;

/// Identifier of the keep-alive indicator.
pub const FOREGROUND_NOTIFICATION_ID: u32 = 1338;

/// Errors raised while presenting the indicator.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PresenterError {
    /// The host requires a channel id and none was configured.
    #[error("Foreground notification has no channel id")]
    MissingChannel,

    #[error("Failed to present foreground indicator: {0}")]
    Failed(String),
}

/// A presented keep-alive indicator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeepAliveIndicator {
    pub id: u32,
    pub notification: ForegroundNotification,
}

/// Produces and dismisses keep-alive indicators.
pub trait ForegroundPresenter: Send + Sync {
    fn present(
        &self,
        notification: &ForegroundNotification,
    ) -> Result<KeepAliveIndicator, PresenterError>;

    fn dismiss(&self, _indicator: &KeepAliveIndicator) {}
}

/// Presenter that only logs.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingPresenter;

impl ForegroundPresenter for LoggingPresenter {
    fn present(
        &self,
        notification: &ForegroundNotification,
    ) -> Result<KeepAliveIndicator, PresenterError> {
        let Some(channel) = notification.channel_id.as_deref() else {
            return Err(PresenterError::MissingChannel);
        };

        tracing::info!(
            id = FOREGROUND_NOTIFICATION_ID,
            channel = %channel,
            title = notification.title.as_deref().unwrap_or(""),
            text = notification.text.as_deref().unwrap_or(""),
            "Keep-alive indicator shown"
        );
        Ok(KeepAliveIndicator {
            id: FOREGROUND_NOTIFICATION_ID,
            notification: notification.clone(),
        })
    }

    fn dismiss(&self, indicator: &KeepAliveIndicator) {
        tracing::info!(id = indicator.id, "Keep-alive indicator dismissed");
    }
}
