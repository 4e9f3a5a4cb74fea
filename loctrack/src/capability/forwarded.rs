//! Gate fed by results the host UI forwards from the platform.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use tokio::sync::oneshot;

use super::{
    CapabilityError, CapabilityGate, CapabilityOutcome, CapabilityStatus, PendingCapability,
};

type PromptHook = Box<dyn Fn(u32) + Send + Sync>;

/// Capability gate whose results arrive from the UI layer.
///
/// `request` records a pending request and invokes the optional prompt hook
/// (where the host shows the platform dialog). The host later calls
/// [`on_request_result`](Self::on_request_result) with the platform answer.
pub struct ForwardedCapabilityGate {
    granted: AtomicBool,
    pending: Mutex<HashMap<u32, oneshot::Sender<CapabilityOutcome>>>,
    prompt: Option<PromptHook>,
}

impl ForwardedCapabilityGate {
    /// Create a gate with the given initial status.
    pub fn new(initial: CapabilityStatus) -> Self {
        Self {
            granted: AtomicBool::new(initial == CapabilityStatus::Granted),
            pending: Mutex::new(HashMap::new()),
            prompt: None,
        }
    }

    /// Invoke `prompt` with the request code whenever a request is issued.
    pub fn with_prompt(mut self, prompt: impl Fn(u32) + Send + Sync + 'static) -> Self {
        self.prompt = Some(Box::new(prompt));
        self
    }

    /// Forward the platform's answer for `request_code`.
    ///
    /// Returns false when no request with that code is outstanding.
    pub fn on_request_result(&self, request_code: u32, outcome: CapabilityOutcome) -> bool {
        if outcome == CapabilityOutcome::Granted {
            self.granted.store(true, Ordering::SeqCst);
        }

        let Some(tx) = self.pending.lock().remove(&request_code) else {
            tracing::debug!(request_code, "Ignoring result for unknown capability request");
            return false;
        };

        tracing::info!(request_code, outcome = ?outcome, "Capability request resolved");
        // The session may have been dropped while waiting.
        let _ = tx.send(outcome);
        true
    }

    /// Revoke the capability (the user changed it in system settings).
    pub fn revoke(&self) {
        self.granted.store(false, Ordering::SeqCst);
    }

    /// Whether a request with this code is outstanding.
    pub fn is_pending(&self, request_code: u32) -> bool {
        self.pending.lock().contains_key(&request_code)
    }
}

impl CapabilityGate for ForwardedCapabilityGate {
    fn check(&self) -> CapabilityStatus {
        if self.granted.load(Ordering::SeqCst) {
            CapabilityStatus::Granted
        } else {
            CapabilityStatus::NotGranted
        }
    }

    fn request(&self, request_code: u32) -> Result<PendingCapability, CapabilityError> {
        let request = {
            let mut pending = self.pending.lock();
            if pending.contains_key(&request_code) {
                return Err(CapabilityError::RequestOutstanding(request_code));
            }
            let (tx, request) = PendingCapability::channel(request_code);
            pending.insert(request_code, tx);
            request
        };

        tracing::debug!(request_code, "Capability request issued");
        if let Some(prompt) = &self.prompt {
            prompt(request_code);
        }
        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU32;
    use std::sync::Arc;

    #[test]
    fn test_initial_status() {
        assert_eq!(
            ForwardedCapabilityGate::new(CapabilityStatus::Granted).check(),
            CapabilityStatus::Granted
        );
        assert_eq!(
            ForwardedCapabilityGate::new(CapabilityStatus::NotGranted).check(),
            CapabilityStatus::NotGranted
        );
    }

    #[test]
    fn test_duplicate_request_is_rejected() {
        let gate = ForwardedCapabilityGate::new(CapabilityStatus::NotGranted);
        let _first = gate.request(1).unwrap();

        assert_eq!(
            gate.request(1).unwrap_err(),
            CapabilityError::RequestOutstanding(1)
        );
        assert!(gate.request(2).is_ok());
    }

    #[test]
    fn test_prompt_hook_receives_code() {
        let seen = Arc::new(AtomicU32::new(0));
        let seen_in_hook = Arc::clone(&seen);
        let gate = ForwardedCapabilityGate::new(CapabilityStatus::NotGranted)
            .with_prompt(move |code| seen_in_hook.store(code, Ordering::SeqCst));

        let _pending = gate.request(42).unwrap();

        assert_eq!(seen.load(Ordering::SeqCst), 42);
    }

    #[tokio::test]
    async fn test_denied_result_keeps_not_granted() {
        let gate = ForwardedCapabilityGate::new(CapabilityStatus::NotGranted);
        let pending = gate.request(3).unwrap();

        assert!(gate.on_request_result(3, CapabilityOutcome::Denied));
        assert_eq!(pending.outcome().await, CapabilityOutcome::Denied);
        assert_eq!(gate.check(), CapabilityStatus::NotGranted);
        assert!(!gate.is_pending(3));
    }

    #[tokio::test]
    async fn test_result_resolves_exactly_once() {
        let gate = ForwardedCapabilityGate::new(CapabilityStatus::NotGranted);
        let pending = gate.request(3).unwrap();

        assert!(gate.on_request_result(3, CapabilityOutcome::Granted));
        assert!(!gate.on_request_result(3, CapabilityOutcome::Denied));
        assert_eq!(pending.outcome().await, CapabilityOutcome::Granted);

        // The code is free again once resolved
        assert!(gate.request(3).is_ok());
    }

    #[test]
    fn test_revoke() {
        let gate = ForwardedCapabilityGate::new(CapabilityStatus::Granted);
        gate.revoke();
        assert_eq!(gate.check(), CapabilityStatus::NotGranted);
    }
}
