//! Periodic fix logging.
//!
//! Spawns a background task that logs the engine's most recent fix at a
//! fixed interval, for post-run analysis of what the engine was seeing.
//!
//! # Output Format
//!
//! Logs are emitted at DEBUG level with structured fields:
//! - `state` - Engine state
//! - `lat`, `lon` - Position in decimal degrees
//! - `alt_m` - Altitude in meters
//! - `accuracy_m` - Accuracy radius in meters
//! - `age_s` - Seconds since the fix was taken
//! - `provider` - Provider tag

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::LocationEngine;

/// Default logging interval.
pub const DEFAULT_FIX_LOG_INTERVAL: Duration = Duration::from_secs(20);

/// Spawns a background task that periodically logs the current fix.
///
/// The task stops when `cancellation` is triggered. Callers that only care
/// about INFO and above can skip spawning it:
///
/// ```ignore
/// if tracing::enabled!(tracing::Level::DEBUG) {
///     spawn_fix_logger(engine.clone(), cancel.child_token(), DEFAULT_FIX_LOG_INTERVAL);
/// }
/// ```
pub fn spawn_fix_logger(
    engine: Arc<LocationEngine>,
    cancellation: CancellationToken,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    log_fix(&engine);
                }
                _ = cancellation.cancelled() => {
                    tracing::debug!("Fix logger stopped");
                    break;
                }
            }
        }
    })
}

fn log_fix(engine: &LocationEngine) {
    let state = engine.state();

    match engine.current_fix() {
        Some(fix) => {
            let age_ms = chrono::Utc::now().timestamp_millis() - fix.timestamp_ms;
            tracing::debug!(
                state = %state,
                lat = format!("{:.5}", fix.latitude),
                lon = format!("{:.5}", fix.longitude),
                alt_m = format!("{:.0}", fix.altitude),
                accuracy_m = format!("{:.0}", fix.accuracy),
                age_s = age_ms.max(0) / 1000,
                provider = %fix.provider,
                "Fix update"
            );
        }
        None => {
            tracing::debug!(state = %state, "Fix update (no fix yet)");
        }
    }
}
