//! Persisted configuration keys.
//!
//! Each key names one field of the last-applied tracking configuration.
//! The store namespaces them, so the bare names only need to be unique
//! within this crate.

use std::str::FromStr;

use super::error::StoreError;

/// The kind of value stored under a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    String,
    Long,
    Bool,
}

/// Supported persisted keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigKey {
    Action,
    LocationInterval,
    LocationSmallestDisplacement,
    LocationMaxWaitTime,
    Gps,
    Network,
    RunInForeground,
    ForegroundNotificationTitle,
    ForegroundNotificationText,
    ForegroundNotificationTicker,
    ForegroundNotificationChannelId,
}

impl ConfigKey {
    /// Every key, in display order.
    pub fn all() -> &'static [ConfigKey] {
        &[
            ConfigKey::Action,
            ConfigKey::LocationInterval,
            ConfigKey::LocationSmallestDisplacement,
            ConfigKey::LocationMaxWaitTime,
            ConfigKey::Gps,
            ConfigKey::Network,
            ConfigKey::RunInForeground,
            ConfigKey::ForegroundNotificationTitle,
            ConfigKey::ForegroundNotificationText,
            ConfigKey::ForegroundNotificationTicker,
            ConfigKey::ForegroundNotificationChannelId,
        ]
    }

    /// The stored key name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigKey::Action => "ACTION",
            ConfigKey::LocationInterval => "LOCATION_INTERVAL",
            ConfigKey::LocationSmallestDisplacement => "LOCATION_SMALLEST_DISPLACEMENT",
            ConfigKey::LocationMaxWaitTime => "LOCATION_MAX_WAIT_TIME",
            ConfigKey::Gps => "GPS",
            ConfigKey::Network => "NETWORK",
            ConfigKey::RunInForeground => "RUN_IN_FOREGROUND",
            ConfigKey::ForegroundNotificationTitle => "FOREGROUND_NOTIFICATION_TITLE",
            ConfigKey::ForegroundNotificationText => "FOREGROUND_NOTIFICATION_TEXT",
            ConfigKey::ForegroundNotificationTicker => "FOREGROUND_NOTIFICATION_TICKER",
            ConfigKey::ForegroundNotificationChannelId => "FOREGROUND_NOTIFICATION_CHANNEL_ID",
        }
    }

    /// The value kind stored under this key.
    pub fn kind(&self) -> ValueKind {
        match self {
            ConfigKey::LocationInterval
            | ConfigKey::LocationSmallestDisplacement
            | ConfigKey::LocationMaxWaitTime => ValueKind::Long,
            ConfigKey::Gps | ConfigKey::Network | ConfigKey::RunInForeground => ValueKind::Bool,
            _ => ValueKind::String,
        }
    }
}

impl FromStr for ConfigKey {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_uppercase();
        ConfigKey::all()
            .iter()
            .copied()
            .find(|key| key.as_str() == upper)
            .ok_or_else(|| StoreError::UnknownKey(s.to_string()))
    }
}

impl std::fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(
            "location_interval".parse::<ConfigKey>().unwrap(),
            ConfigKey::LocationInterval
        );
        assert_eq!("GPS".parse::<ConfigKey>().unwrap(), ConfigKey::Gps);
    }

    #[test]
    fn test_parse_unknown_key() {
        let err = "SPEED".parse::<ConfigKey>().unwrap_err();
        assert!(matches!(err, StoreError::UnknownKey(ref k) if k == "SPEED"));
    }

    #[test]
    fn test_all_keys_round_trip_through_names() {
        for key in ConfigKey::all() {
            assert_eq!(key.as_str().parse::<ConfigKey>().unwrap(), *key);
        }
        assert_eq!(ConfigKey::all().len(), 11);
    }

    #[test]
    fn test_value_kinds() {
        assert_eq!(ConfigKey::Action.kind(), ValueKind::String);
        assert_eq!(ConfigKey::LocationMaxWaitTime.kind(), ValueKind::Long);
        assert_eq!(ConfigKey::RunInForeground.kind(), ValueKind::Bool);
        assert_eq!(
            ConfigKey::ForegroundNotificationChannelId.kind(),
            ValueKind::String
        );
    }
}
