//! Merged configuration owned by the engine for one activation.
//!
//! # Merge Order
//!
//! Each field is resolved independently:
//!
//! 1. explicit value from the [`TrackingConfiguration`] (numeric zero = unset)
//! 2. persisted value from the [`ConfigStore`]
//! 3. built-in default from [`super::defaults`]

use super::defaults::*;
use super::tracking::{ForegroundNotification, TrackingConfiguration};
use crate::provider::Priority;
use crate::store::{ConfigKey, ConfigStore};

/// Fully resolved tracking configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfiguration {
    pub topic: String,
    pub interval_ms: u64,
    pub smallest_displacement_m: u64,
    pub max_wait_time_ms: u64,
    pub use_gps: bool,
    pub use_network: bool,
    pub run_in_foreground: bool,
    pub notification: ForegroundNotification,
}

impl ResolvedConfiguration {
    /// Merge an optional explicit configuration with the store and defaults.
    ///
    /// With `explicit = None` the result is rebuilt purely from the store,
    /// which is how an engine restarted by the host recovers its request.
    pub fn resolve(explicit: Option<&TrackingConfiguration>, store: &dyn ConfigStore) -> Self {
        let topic = explicit
            .map(|c| c.topic.clone())
            .filter(|t| !t.is_empty())
            .or_else(|| {
                store
                    .get_string(ConfigKey::Action, None)
                    .filter(|t| !t.is_empty())
            })
            .unwrap_or_else(|| DEFAULT_TOPIC.to_string());

        let interval_ms = explicit_numeric(explicit.and_then(|c| c.interval_ms))
            .unwrap_or_else(|| {
                stored_numeric(store, ConfigKey::LocationInterval).unwrap_or(DEFAULT_INTERVAL_MS)
            });

        let smallest_displacement_m =
            explicit_numeric(explicit.and_then(|c| c.smallest_displacement_m)).unwrap_or_else(
                || {
                    stored_numeric(store, ConfigKey::LocationSmallestDisplacement)
                        .unwrap_or(DEFAULT_SMALLEST_DISPLACEMENT_M)
                },
            );

        let max_wait_time_ms = explicit_numeric(explicit.and_then(|c| c.max_wait_time_ms))
            .unwrap_or_else(|| {
                stored_numeric(store, ConfigKey::LocationMaxWaitTime)
                    .unwrap_or(DEFAULT_MAX_WAIT_TIME_MS)
            });

        let use_gps = explicit
            .and_then(|c| c.use_gps)
            .unwrap_or_else(|| store.get_bool(ConfigKey::Gps, DEFAULT_USE_GPS));
        let use_network = explicit
            .and_then(|c| c.use_network)
            .unwrap_or_else(|| store.get_bool(ConfigKey::Network, DEFAULT_USE_NETWORK));
        let run_in_foreground = explicit
            .and_then(|c| c.run_in_foreground)
            .unwrap_or_else(|| {
                store.get_bool(ConfigKey::RunInForeground, DEFAULT_RUN_IN_FOREGROUND)
            });

        let explicit_notification = explicit
            .map(|c| c.notification.clone())
            .unwrap_or_default();
        let notification = ForegroundNotification {
            title: explicit_notification
                .title
                .or_else(|| store.get_string(ConfigKey::ForegroundNotificationTitle, None)),
            text: explicit_notification
                .text
                .or_else(|| store.get_string(ConfigKey::ForegroundNotificationText, None)),
            ticker: explicit_notification
                .ticker
                .or_else(|| store.get_string(ConfigKey::ForegroundNotificationTicker, None)),
            channel_id: explicit_notification
                .channel_id
                .or_else(|| store.get_string(ConfigKey::ForegroundNotificationChannelId, None)),
        };

        Self {
            topic,
            interval_ms,
            smallest_displacement_m,
            max_wait_time_ms,
            use_gps,
            use_network,
            run_in_foreground,
            notification,
        }
    }

    /// Acquisition priority.
    ///
    /// GPS wins over network; with neither set the provider default applies.
    pub fn priority(&self) -> Option<Priority> {
        if self.use_gps {
            Some(Priority::HighAccuracy)
        } else if self.use_network {
            Some(Priority::BalancedPowerAccuracy)
        } else {
            None
        }
    }

    /// Fastest interval the provider may deliver at (half the interval).
    pub fn fastest_interval_ms(&self) -> u64 {
        self.interval_ms / 2
    }
}

fn explicit_numeric(value: Option<u64>) -> Option<u64> {
    value.filter(|v| *v > 0)
}

fn stored_numeric(store: &dyn ConfigStore, key: ConfigKey) -> Option<u64> {
    let value = store.get_long(key, 0);
    if value > 0 {
        Some(value as u64)
    } else {
        None
    }
}
