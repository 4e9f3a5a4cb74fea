//! Built-in defaults applied when neither the caller nor the store supplies a value.

/// Topic used when nothing was ever persisted.
pub const DEFAULT_TOPIC: &str = "LOCATION.ACTION";

/// Update interval in milliseconds.
pub const DEFAULT_INTERVAL_MS: u64 = 10_000;

/// Smallest displacement in meters (0 = every fix).
pub const DEFAULT_SMALLEST_DISPLACEMENT_M: u64 = 0;

/// Maximum batching wait in milliseconds (0 = no batching).
pub const DEFAULT_MAX_WAIT_TIME_MS: u64 = 0;

/// Whether GPS (high accuracy) is requested.
pub const DEFAULT_USE_GPS: bool = true;

/// Whether network positioning (balanced power) is requested.
pub const DEFAULT_USE_NETWORK: bool = false;

/// Whether the engine keeps a foreground indicator.
pub const DEFAULT_RUN_IN_FOREGROUND: bool = true;
