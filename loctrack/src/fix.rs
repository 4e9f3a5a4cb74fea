//! Position fixes produced by a location provider.

use serde::{Deserialize, Serialize};

/// A single position reading.
///
/// Fixes are produced by a [`crate::provider::LocationProvider`] and passed
/// through the engine untouched. The `provider` tag is an opaque passthrough
/// (e.g. `"fused"`, `"gps"`, `"network"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fix {
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
    /// Altitude above the WGS84 ellipsoid in meters.
    pub altitude: f64,
    /// Horizontal accuracy radius in meters.
    pub accuracy: f32,
    /// Time of the reading, milliseconds since the Unix epoch.
    pub timestamp_ms: i64,
    /// Provider tag.
    pub provider: String,
}

impl Fix {
    /// Create a fix stamped with the current wall-clock time.
    pub fn now(latitude: f64, longitude: f64, provider: impl Into<String>) -> Self {
        Self {
            latitude,
            longitude,
            altitude: 0.0,
            accuracy: 0.0,
            timestamp_ms: chrono::Utc::now().timestamp_millis(),
            provider: provider.into(),
        }
    }

    /// Set the altitude.
    pub fn with_altitude(mut self, altitude: f64) -> Self {
        self.altitude = altitude;
        self
    }

    /// Set the accuracy radius.
    pub fn with_accuracy(mut self, accuracy: f32) -> Self {
        self.accuracy = accuracy;
        self
    }

    /// Set an explicit timestamp.
    pub fn with_timestamp_ms(mut self, timestamp_ms: i64) -> Self {
        self.timestamp_ms = timestamp_ms;
        self
    }

    /// Position as a (latitude, longitude) tuple.
    pub fn position(&self) -> (f64, f64) {
        (self.latitude, self.longitude)
    }
}

impl std::fmt::Display for Fix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:.5},{:.5} ±{:.0}m ({})",
            self.latitude, self.longitude, self.accuracy, self.provider
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_stamps_current_time() {
        let before = chrono::Utc::now().timestamp_millis();
        let fix = Fix::now(53.5, 10.0, "gps");
        let after = chrono::Utc::now().timestamp_millis();

        assert!(fix.timestamp_ms >= before && fix.timestamp_ms <= after);
        assert_eq!(fix.position(), (53.5, 10.0));
        assert_eq!(fix.provider, "gps");
    }

    #[test]
    fn test_builder_fields() {
        let fix = Fix::now(1.0, 2.0, "fused")
            .with_altitude(120.0)
            .with_accuracy(8.5)
            .with_timestamp_ms(42);

        assert_eq!(fix.altitude, 120.0);
        assert_eq!(fix.accuracy, 8.5);
        assert_eq!(fix.timestamp_ms, 42);
    }

    #[test]
    fn test_display() {
        let fix = Fix::now(53.55, 9.99, "gps").with_accuracy(12.0);
        assert_eq!(fix.to_string(), "53.55000,9.99000 ±12m (gps)");
    }

    #[test]
    fn test_serializes_to_json() {
        let fix = Fix::now(1.0, 2.0, "network").with_timestamp_ms(1000);
        let json = serde_json::to_value(&fix).unwrap();

        assert_eq!(json["latitude"], 1.0);
        assert_eq!(json["timestamp_ms"], 1000);
        assert_eq!(json["provider"], "network");
    }
}
