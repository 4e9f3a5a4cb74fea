//! Payloads carried by the broadcast bus.

use serde::{Deserialize, Serialize};

use crate::fix::Fix;

/// Topic every fix is mirrored on, regardless of the caller's topic.
pub const CURRENT_LOCATION_TOPIC: &str = "CURRENT_LOCATION";

/// Topic announcing that the location capability was denied.
pub const PERMISSION_DENIED_TOPIC: &str = "PERMISSION_DENIED";

/// Event published on the bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TrackerEvent {
    /// A fix, published on the caller's topic.
    LocationUpdated { topic: String, fix: Fix },
    /// The same fix, published on [`CURRENT_LOCATION_TOPIC`].
    CurrentLocationUpdated { fix: Fix },
    /// Published on [`PERMISSION_DENIED_TOPIC`]; carries no payload.
    PermissionDenied,
}

impl TrackerEvent {
    /// The fix carried by this event, if any.
    pub fn fix(&self) -> Option<&Fix> {
        match self {
            TrackerEvent::LocationUpdated { fix, .. } => Some(fix),
            TrackerEvent::CurrentLocationUpdated { fix } => Some(fix),
            TrackerEvent::PermissionDenied => None,
        }
    }

    /// Serialize as a single-line JSON object.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fix_accessor() {
        let fix = Fix::now(1.0, 2.0, "test");
        let event = TrackerEvent::CurrentLocationUpdated { fix: fix.clone() };
        assert_eq!(event.fix(), Some(&fix));
        assert_eq!(TrackerEvent::PermissionDenied.fix(), None);
    }

    #[test]
    fn test_serialized_shape() {
        let fix = Fix::now(1.0, 2.0, "test").with_timestamp_ms(5);
        let event = TrackerEvent::LocationUpdated {
            topic: "T".to_string(),
            fix,
        };

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "location_updated");
        assert_eq!(json["topic"], "T");
        assert_eq!(json["fix"]["timestamp_ms"], 5);

        assert_eq!(
            TrackerEvent::PermissionDenied.to_json().unwrap(),
            r#"{"event":"permission_denied"}"#
        );
    }
}
