//! Caller-supplied tracking configuration and its persisted mirror.

use crate::store::{ConfigKey, ConfigStore, StoreError};

/// Text shown by the foreground keep-alive indicator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForegroundNotification {
    pub title: Option<String>,
    pub text: Option<String>,
    pub ticker: Option<String>,
    pub channel_id: Option<String>,
}

impl ForegroundNotification {
    /// Create notification text with every field set.
    pub fn new(
        title: impl Into<String>,
        text: impl Into<String>,
        ticker: impl Into<String>,
        channel_id: impl Into<String>,
    ) -> Self {
        Self {
            title: Some(title.into()),
            text: Some(text.into()),
            ticker: Some(ticker.into()),
            channel_id: Some(channel_id.into()),
        }
    }

    /// Whether no field is set.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.text.is_none()
            && self.ticker.is_none()
            && self.channel_id.is_none()
    }
}

/// One tracking request as assembled by a session.
///
/// Fields the caller never set stay `None` so the engine can fill them from
/// the persisted configuration and then from built-in defaults. A numeric
/// field explicitly set to zero is treated as unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackingConfiguration {
    /// Caller's delivery topic.
    pub topic: String,
    /// Desired interval between fixes in milliseconds.
    pub interval_ms: Option<u64>,
    /// Minimum movement in meters before a fix is delivered.
    pub smallest_displacement_m: Option<u64>,
    /// Maximum time a provider may batch fixes, in milliseconds.
    pub max_wait_time_ms: Option<u64>,
    pub use_gps: Option<bool>,
    pub use_network: Option<bool>,
    pub run_in_foreground: Option<bool>,
    /// Only meaningful when foreground mode resolves true.
    pub notification: ForegroundNotification,
}

impl TrackingConfiguration {
    /// Create a configuration for `topic` with every other field unset.
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            ..Default::default()
        }
    }

    /// Write this configuration to the store.
    ///
    /// Numeric fields are written only when non-zero, so an unset interval
    /// never clobbers one persisted by an earlier session. The topic and
    /// notification strings are always written (an unset string clears the
    /// stored one); booleans are written whenever they are set.
    pub fn persist(&self, store: &dyn ConfigStore) -> Result<(), StoreError> {
        store.put_string(ConfigKey::Action, &self.topic)?;

        let numerics = [
            (ConfigKey::LocationInterval, self.interval_ms),
            (
                ConfigKey::LocationSmallestDisplacement,
                self.smallest_displacement_m,
            ),
            (ConfigKey::LocationMaxWaitTime, self.max_wait_time_ms),
        ];
        for (key, value) in numerics {
            if let Some(value) = value.filter(|v| *v != 0) {
                store.put_long(key, clamp_to_long(value))?;
            }
        }

        let flags = [
            (ConfigKey::Gps, self.use_gps),
            (ConfigKey::Network, self.use_network),
            (ConfigKey::RunInForeground, self.run_in_foreground),
        ];
        for (key, value) in flags {
            if let Some(value) = value {
                store.put_bool(key, value)?;
            }
        }

        let strings = [
            (ConfigKey::ForegroundNotificationTitle, &self.notification.title),
            (ConfigKey::ForegroundNotificationText, &self.notification.text),
            (ConfigKey::ForegroundNotificationTicker, &self.notification.ticker),
            (
                ConfigKey::ForegroundNotificationChannelId,
                &self.notification.channel_id,
            ),
        ];
        for (key, value) in strings {
            match value {
                Some(value) => store.put_string(key, value)?,
                None => store.remove(key)?,
            }
        }

        tracing::debug!(
            topic = %self.topic,
            namespace = store.namespace(),
            "Persisted tracking configuration"
        );
        Ok(())
    }
}

fn clamp_to_long(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryConfigStore;

    #[test]
    fn test_new_leaves_fields_unset() {
        let config = TrackingConfiguration::new("my.action");

        assert_eq!(config.topic, "my.action");
        assert!(config.interval_ms.is_none());
        assert!(config.use_gps.is_none());
        assert!(config.notification.is_empty());
    }

    #[test]
    fn test_persist_writes_every_set_field() {
        let store = MemoryConfigStore::new("test");
        let config = TrackingConfiguration {
            interval_ms: Some(1000),
            smallest_displacement_m: Some(25),
            max_wait_time_ms: Some(60_000),
            use_gps: Some(true),
            use_network: Some(false),
            run_in_foreground: Some(true),
            notification: ForegroundNotification::new("Title", "Text", "Ticker", "channel"),
            ..TrackingConfiguration::new("my.action")
        };

        config.persist(&store).unwrap();

        assert_eq!(
            store.get_string(ConfigKey::Action, None).as_deref(),
            Some("my.action")
        );
        assert_eq!(store.get_long(ConfigKey::LocationInterval, 0), 1000);
        assert_eq!(store.get_long(ConfigKey::LocationSmallestDisplacement, 0), 25);
        assert_eq!(store.get_long(ConfigKey::LocationMaxWaitTime, 0), 60_000);
        assert!(store.get_bool(ConfigKey::Gps, false));
        assert!(!store.get_bool(ConfigKey::Network, true));
        assert_eq!(
            store
                .get_string(ConfigKey::ForegroundNotificationChannelId, None)
                .as_deref(),
            Some("channel")
        );
    }

    #[test]
    fn test_persist_preserves_earlier_numerics_when_zero_or_unset() {
        let store = MemoryConfigStore::new("test");
        store.put_long(ConfigKey::LocationInterval, 5000).unwrap();
        store.put_long(ConfigKey::LocationMaxWaitTime, 9000).unwrap();

        let config = TrackingConfiguration {
            interval_ms: Some(0),
            ..TrackingConfiguration::new("my.action")
        };
        config.persist(&store).unwrap();

        assert_eq!(store.get_long(ConfigKey::LocationInterval, 0), 5000);
        assert_eq!(store.get_long(ConfigKey::LocationMaxWaitTime, 0), 9000);
    }

    #[test]
    fn test_persist_clears_unset_notification_strings() {
        let store = MemoryConfigStore::new("test");
        store
            .put_string(ConfigKey::ForegroundNotificationTitle, "Old title")
            .unwrap();

        TrackingConfiguration::new("my.action")
            .persist(&store)
            .unwrap();

        assert_eq!(
            store.get_string(ConfigKey::ForegroundNotificationTitle, None),
            None
        );
    }

    #[test]
    fn test_persist_keeps_unset_booleans() {
        let store = MemoryConfigStore::new("test");
        store.put_bool(ConfigKey::Network, true).unwrap();

        TrackingConfiguration::new("my.action")
            .persist(&store)
            .unwrap();

        assert!(store.get_bool(ConfigKey::Network, false));
    }
}
