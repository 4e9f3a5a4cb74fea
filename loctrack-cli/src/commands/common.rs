//! Common types and utilities shared across CLI commands.

use std::path::PathBuf;

use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use loctrack::bus::TrackerEvent;

use crate::error::CliError;

/// Expand ~ to home directory in paths.
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

/// Cancel `shutdown` on Ctrl+C.
pub fn install_interrupt_handler(shutdown: CancellationToken) -> Result<(), CliError> {
    ctrlc::set_handler(move || {
        eprintln!();
        eprintln!("Received shutdown signal, stopping...");
        shutdown.cancel();
    })
    .map_err(|e| CliError::Config(format!("Failed to set signal handler: {}", e)))
}

/// Render an event as a single JSON line.
pub fn event_json_line(event: &TrackerEvent) -> String {
    event
        .to_json()
        .unwrap_or_else(|e| format!("{{\"error\":\"{}\"}}", e))
}

/// Print every event from `rx` to stdout as a JSON line.
///
/// Returns the number of fixes printed once `limit` fixes were seen, the
/// channel closed, or `shutdown` was cancelled.
pub async fn print_fixes(
    mut rx: broadcast::Receiver<TrackerEvent>,
    limit: Option<u64>,
    shutdown: CancellationToken,
) -> u64 {
    let mut printed = 0u64;
    if limit == Some(0) {
        return printed;
    }

    loop {
        tokio::select! {
            biased;
            _ = shutdown.cancelled() => break,
            result = rx.recv() => match result {
                Ok(event) => {
                    println!("{}", event_json_line(&event));
                    if event.fix().is_some() {
                        printed += 1;
                        if limit.is_some_and(|n| printed >= n) {
                            break;
                        }
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Output lagged behind fixes");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    }
    printed
}
