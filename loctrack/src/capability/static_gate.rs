//! Gate with a fixed status and a scripted prompt answer.

use std::sync::atomic::{AtomicUsize, Ordering};

use super::{
    CapabilityError, CapabilityGate, CapabilityOutcome, CapabilityStatus, PendingCapability,
};

/// Capability gate for hosts without a permission model, and for tests.
///
/// `check` always reports the configured status; `request` resolves
/// immediately with the configured prompt answer.
#[derive(Debug)]
pub struct StaticCapabilityGate {
    status: CapabilityStatus,
    prompt_answer: CapabilityOutcome,
    requests: AtomicUsize,
}

impl StaticCapabilityGate {
    /// Capability already granted; requests are never needed.
    pub fn granted() -> Self {
        Self::prompting(CapabilityStatus::Granted, CapabilityOutcome::Granted)
    }

    /// Capability missing and the user declines when asked.
    pub fn denied() -> Self {
        Self::prompting(CapabilityStatus::NotGranted, CapabilityOutcome::Denied)
    }

    /// Custom status and prompt answer.
    pub fn prompting(status: CapabilityStatus, prompt_answer: CapabilityOutcome) -> Self {
        Self {
            status,
            prompt_answer,
            requests: AtomicUsize::new(0),
        }
    }

    /// Number of requests issued against this gate.
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

impl CapabilityGate for StaticCapabilityGate {
    fn check(&self) -> CapabilityStatus {
        self.status
    }

    fn request(&self, request_code: u32) -> Result<PendingCapability, CapabilityError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        Ok(PendingCapability::resolved(request_code, self.prompt_answer))
    }
}
