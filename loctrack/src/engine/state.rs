//! Engine lifecycle states.

use std::fmt;

/// Lifecycle state of the [`super::LocationEngine`].
///
/// ```text
/// Idle → Configuring → Connecting → Connected → Streaming
///                          ↑                        │
///                          └────── Suspended ◄──────┘
/// any active state → Stopped
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineState {
    /// Never activated.
    Idle,
    /// Activation accepted, configuration not yet merged.
    Configuring,
    /// Waiting for the provider connection.
    Connecting,
    /// Provider connected, updates not (yet) requested.
    Connected,
    /// Updates requested; fixes are published.
    Streaming,
    /// Provider connection dropped; a reconnect follows immediately.
    Suspended,
    /// Deactivated.
    Stopped,
}

impl EngineState {
    /// Whether the engine holds an activation.
    pub fn is_active(self) -> bool {
        !matches!(self, EngineState::Idle | EngineState::Stopped)
    }
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EngineState::Idle => "idle",
            EngineState::Configuring => "configuring",
            EngineState::Connecting => "connecting",
            EngineState::Connected => "connected",
            EngineState::Streaming => "streaming",
            EngineState::Suspended => "suspended",
            EngineState::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_active_states() {
        assert!(!EngineState::Idle.is_active());
        assert!(!EngineState::Stopped.is_active());
        assert!(EngineState::Configuring.is_active());
        assert!(EngineState::Suspended.is_active());
    }
}
