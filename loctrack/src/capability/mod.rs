//! Sensing-permission gate.
//!
//! The gate answers two questions: is the location capability granted right
//! now ([`CapabilityGate::check`]), and, if not, what does the user decide
//! when asked ([`CapabilityGate::request`]). Requests are correlated by a
//! numeric request code and resolve exactly once.
//!
//! The UI layer is an external collaborator: it shows the platform prompt
//! and forwards the result into a [`ForwardedCapabilityGate`].
//!
//! # Example
//!
//! ```
//! use loctrack::capability::{
//!     CapabilityGate, CapabilityOutcome, CapabilityStatus, ForwardedCapabilityGate,
//!     PERMISSION_REQUEST_CODE,
//! };
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let gate = ForwardedCapabilityGate::new(CapabilityStatus::NotGranted);
//! let pending = gate.request(PERMISSION_REQUEST_CODE).unwrap();
//!
//! // Later, the UI forwards the platform's answer
//! gate.on_request_result(PERMISSION_REQUEST_CODE, CapabilityOutcome::Granted);
//!
//! assert_eq!(pending.outcome().await, CapabilityOutcome::Granted);
//! assert_eq!(gate.check(), CapabilityStatus::Granted);
//! # });
//! ```

mod forwarded;
mod static_gate;

use thiserror::Error;
use tokio::sync::oneshot;

pub use forwarded::ForwardedCapabilityGate;
pub use static_gate::StaticCapabilityGate;

/// Request code shared by sessions and gates to correlate permission results.
pub const PERMISSION_REQUEST_CODE: u32 = 1001;

/// Synchronous capability status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapabilityStatus {
    Granted,
    NotGranted,
}

/// Result of an asynchronous capability request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapabilityOutcome {
    Granted,
    Denied,
}

/// Errors raised by capability gates.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CapabilityError {
    /// A request with this code is still waiting for its result.
    #[error("Capability request {0} is already outstanding")]
    RequestOutstanding(u32),
}

/// An outstanding capability request.
#[derive(Debug)]
pub struct PendingCapability {
    request_code: u32,
    rx: oneshot::Receiver<CapabilityOutcome>,
}

impl PendingCapability {
    /// Create a pending request and the sender that resolves it.
    pub fn channel(request_code: u32) -> (oneshot::Sender<CapabilityOutcome>, Self) {
        let (tx, rx) = oneshot::channel();
        (tx, Self { request_code, rx })
    }

    /// A request that is already resolved.
    pub fn resolved(request_code: u32, outcome: CapabilityOutcome) -> Self {
        let (tx, pending) = Self::channel(request_code);
        let _ = tx.send(outcome);
        pending
    }

    /// Code this request was issued with.
    pub fn request_code(&self) -> u32 {
        self.request_code
    }

    /// Wait for the outcome.
    ///
    /// A request the gate abandoned without answering counts as denied.
    pub async fn outcome(self) -> CapabilityOutcome {
        match self.rx.await {
            Ok(outcome) => outcome,
            Err(_) => {
                tracing::warn!(
                    request_code = self.request_code,
                    "Capability request abandoned without a result, treating as denied"
                );
                CapabilityOutcome::Denied
            }
        }
    }
}

/// Permission check and request port.
pub trait CapabilityGate: Send + Sync {
    /// Whether the capability is granted right now.
    fn check(&self) -> CapabilityStatus;

    /// Ask for the capability.
    ///
    /// Issuing a second request with the same code before the first resolves
    /// is a caller error.
    fn request(&self, request_code: u32) -> Result<PendingCapability, CapabilityError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_resolved_pending() {
        let pending = PendingCapability::resolved(7, CapabilityOutcome::Granted);
        assert_eq!(pending.request_code(), 7);
        assert_eq!(pending.outcome().await, CapabilityOutcome::Granted);
    }

    #[tokio::test]
    async fn test_abandoned_request_is_denied() {
        let (tx, pending) = PendingCapability::channel(7);
        drop(tx);
        assert_eq!(pending.outcome().await, CapabilityOutcome::Denied);
    }
}
