//! Update request parameters handed to a provider.

use crate::config::ResolvedConfiguration;

/// Acquisition priority tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    /// Most accurate fixes available (GPS).
    HighAccuracy,
    /// Block-level accuracy at lower power (network positioning).
    BalancedPowerAccuracy,
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Priority::HighAccuracy => f.write_str("high-accuracy"),
            Priority::BalancedPowerAccuracy => f.write_str("balanced-power"),
        }
    }
}

/// Parameters for a streaming request.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateRequest {
    /// `None` leaves the provider's default priority in place.
    pub priority: Option<Priority>,
    pub interval_ms: u64,
    pub fastest_interval_ms: u64,
    pub smallest_displacement_m: f32,
    pub max_wait_time_ms: u64,
}

impl UpdateRequest {
    /// Build the request for a resolved configuration.
    pub fn from_configuration(config: &ResolvedConfiguration) -> Self {
        Self {
            priority: config.priority(),
            interval_ms: config.interval_ms,
            fastest_interval_ms: config.fastest_interval_ms(),
            smallest_displacement_m: config.smallest_displacement_m as f32,
            max_wait_time_ms: config.max_wait_time_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TrackingConfiguration;
    use crate::store::MemoryConfigStore;

    #[test]
    fn test_request_from_configuration() {
        let store = MemoryConfigStore::new("test");
        let explicit = TrackingConfiguration {
            interval_ms: Some(1000),
            smallest_displacement_m: Some(15),
            max_wait_time_ms: Some(4000),
            use_gps: Some(false),
            use_network: Some(true),
            ..TrackingConfiguration::new("T")
        };
        let resolved = ResolvedConfiguration::resolve(Some(&explicit), &store);

        let request = UpdateRequest::from_configuration(&resolved);

        assert_eq!(request.priority, Some(Priority::BalancedPowerAccuracy));
        assert_eq!(request.interval_ms, 1000);
        assert_eq!(request.fastest_interval_ms, 500);
        assert_eq!(request.smallest_displacement_m, 15.0);
        assert_eq!(request.max_wait_time_ms, 4000);
    }
}
