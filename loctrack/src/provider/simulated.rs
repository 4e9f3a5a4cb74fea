//! Scripted provider for demos and tests.
//!
//! [`SimulatedProvider`] implements the full callback contract without any
//! hardware. Connection outcomes follow a [`ConnectBehavior`]; fixes are
//! either injected by hand (`emit_fix`) or generated along a
//! [`SimulatedRoute`] at the requested interval once updates are requested.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

use super::error::{ConnectFailure, ProviderError};
use super::request::UpdateRequest;
use super::{LocationProvider, ProviderCallbacks};
use crate::fix::Fix;

/// Provider tag stamped on generated fixes.
pub const SIMULATED_PROVIDER_TAG: &str = "simulated";

/// How `connect()` resolves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectBehavior {
    /// Signal `on_connected` immediately.
    Succeed,
    /// Signal `on_connection_failed` immediately.
    Fail(ConnectFailure),
    /// Do nothing; the test completes the connection with `complete_connection`.
    Manual,
}

/// Straight-line path generated while streaming.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulatedRoute {
    pub start_latitude: f64,
    pub start_longitude: f64,
    /// Degrees added to latitude per fix.
    pub step_latitude: f64,
    /// Degrees added to longitude per fix.
    pub step_longitude: f64,
    pub accuracy: f32,
}

impl SimulatedRoute {
    /// Route heading north-east from the given point in small steps.
    pub fn from(latitude: f64, longitude: f64) -> Self {
        Self {
            start_latitude: latitude,
            start_longitude: longitude,
            step_latitude: 0.0001,
            step_longitude: 0.0001,
            accuracy: 5.0,
        }
    }

    /// Fix number `index` along the route.
    pub fn fix_at(&self, index: u64) -> Fix {
        let step = index as f64;
        Fix::now(
            self.start_latitude + self.step_latitude * step,
            self.start_longitude + self.step_longitude * step,
            SIMULATED_PROVIDER_TAG,
        )
        .with_accuracy(self.accuracy)
    }
}

/// Scripted location provider.
pub struct SimulatedProvider {
    behavior: Mutex<ConnectBehavior>,
    callbacks: Mutex<Option<Arc<dyn ProviderCallbacks>>>,
    connected: AtomicBool,
    streaming: AtomicBool,
    reject_updates: AtomicBool,
    last_known: Mutex<Option<Fix>>,
    route: Option<SimulatedRoute>,
    stream_cancel: Mutex<Option<CancellationToken>>,
    requests: Mutex<Vec<UpdateRequest>>,
    connect_calls: AtomicUsize,
    disconnect_calls: AtomicUsize,
}

impl Default for SimulatedProvider {
    fn default() -> Self {
        Self::new(ConnectBehavior::Succeed)
    }
}

impl SimulatedProvider {
    /// Create a provider with the given connection behavior and no route.
    pub fn new(behavior: ConnectBehavior) -> Self {
        Self {
            behavior: Mutex::new(behavior),
            callbacks: Mutex::new(None),
            connected: AtomicBool::new(false),
            streaming: AtomicBool::new(false),
            reject_updates: AtomicBool::new(false),
            last_known: Mutex::new(None),
            route: None,
            stream_cancel: Mutex::new(None),
            requests: Mutex::new(Vec::new()),
            connect_calls: AtomicUsize::new(0),
            disconnect_calls: AtomicUsize::new(0),
        }
    }

    /// Generate fixes along `route` while streaming.
    ///
    /// Generation runs on the ambient tokio runtime.
    pub fn with_route(mut self, route: SimulatedRoute) -> Self {
        self.route = Some(route);
        self
    }

    /// Set the fix returned by `last_known`.
    pub fn with_last_known(self, fix: Fix) -> Self {
        *self.last_known.lock() = Some(fix);
        self
    }

    /// Change how subsequent `connect()` calls resolve.
    pub fn set_behavior(&self, behavior: ConnectBehavior) {
        *self.behavior.lock() = behavior;
    }

    /// Make `request_updates` fail with a security rejection.
    pub fn set_reject_updates(&self, reject: bool) {
        self.reject_updates.store(reject, Ordering::SeqCst);
    }

    /// Complete a pending connection (for [`ConnectBehavior::Manual`]).
    pub fn complete_connection(&self) {
        self.connected.store(true, Ordering::SeqCst);
        if let Some(callbacks) = self.current_callbacks() {
            callbacks.on_connected();
        }
    }

    /// Fail a pending connection.
    pub fn fail_connection(&self, failure: ConnectFailure) {
        self.connected.store(false, Ordering::SeqCst);
        if let Some(callbacks) = self.current_callbacks() {
            callbacks.on_connection_failed(failure);
        }
    }

    /// Drop the connection as a platform suspension would.
    pub fn suspend(&self, cause: i32) {
        self.connected.store(false, Ordering::SeqCst);
        self.stop_stream();
        if let Some(callbacks) = self.current_callbacks() {
            callbacks.on_connection_suspended(cause);
        }
    }

    /// Deliver a fix to the registered callbacks.
    pub fn emit_fix(&self, fix: Fix) {
        *self.last_known.lock() = Some(fix.clone());
        if let Some(callbacks) = self.current_callbacks() {
            callbacks.on_fix(fix);
        }
    }

    /// Whether updates are currently requested.
    pub fn is_streaming(&self) -> bool {
        self.streaming.load(Ordering::SeqCst)
    }

    /// Every accepted update request, oldest first.
    pub fn requests(&self) -> Vec<UpdateRequest> {
        self.requests.lock().clone()
    }

    /// Number of `connect()` calls.
    pub fn connect_calls(&self) -> usize {
        self.connect_calls.load(Ordering::SeqCst)
    }

    /// Number of `disconnect()` calls.
    pub fn disconnect_calls(&self) -> usize {
        self.disconnect_calls.load(Ordering::SeqCst)
    }

    fn current_callbacks(&self) -> Option<Arc<dyn ProviderCallbacks>> {
        self.callbacks.lock().clone()
    }

    fn stop_stream(&self) {
        self.streaming.store(false, Ordering::SeqCst);
        if let Some(token) = self.stream_cancel.lock().take() {
            token.cancel();
        }
    }

    fn start_stream(&self, route: SimulatedRoute, interval: Duration) {
        let Some(callbacks) = self.current_callbacks() else {
            return;
        };
        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => runtime,
            Err(_) => {
                tracing::warn!("No tokio runtime available, simulated route will not stream");
                return;
            }
        };

        let token = CancellationToken::new();
        if let Some(previous) = self.stream_cancel.lock().replace(token.clone()) {
            previous.cancel();
        }

        runtime.spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            let mut index = 0u64;
            loop {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {
                        callbacks.on_fix(route.fix_at(index));
                        index += 1;
                    }
                }
            }
            tracing::debug!(fixes = index, "Simulated route stopped");
        });
    }
}

impl LocationProvider for SimulatedProvider {
    fn set_callbacks(&self, callbacks: Arc<dyn ProviderCallbacks>) {
        *self.callbacks.lock() = Some(callbacks);
    }

    fn connect(&self) {
        self.connect_calls.fetch_add(1, Ordering::SeqCst);
        let behavior = self.behavior.lock().clone();
        match behavior {
            ConnectBehavior::Succeed => self.complete_connection(),
            ConnectBehavior::Fail(failure) => self.fail_connection(failure),
            ConnectBehavior::Manual => {}
        }
    }

    fn disconnect(&self) {
        self.disconnect_calls.fetch_add(1, Ordering::SeqCst);
        self.stop_stream();
        self.connected.store(false, Ordering::SeqCst);
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn last_known(&self) -> Result<Option<Fix>, ProviderError> {
        if !self.is_connected() {
            return Err(ProviderError::NotConnected);
        }
        Ok(self.last_known.lock().clone())
    }

    fn request_updates(&self, request: &UpdateRequest) -> Result<(), ProviderError> {
        if !self.is_connected() {
            return Err(ProviderError::NotConnected);
        }
        if self.reject_updates.load(Ordering::SeqCst) {
            return Err(ProviderError::SecurityRejected(
                "location permission not granted".to_string(),
            ));
        }

        self.requests.lock().push(request.clone());
        self.streaming.store(true, Ordering::SeqCst);

        if let Some(route) = self.route {
            self.start_stream(route, Duration::from_millis(request.interval_ms.max(1)));
        }
        Ok(())
    }

    fn remove_updates(&self) {
        self.stop_stream();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        signals: Mutex<Vec<String>>,
    }

    impl ProviderCallbacks for Recorder {
        fn on_connected(&self) {
            self.signals.lock().push("connected".to_string());
        }

        fn on_connection_suspended(&self, cause: i32) {
            self.signals.lock().push(format!("suspended:{}", cause));
        }

        fn on_fix(&self, fix: Fix) {
            self.signals.lock().push(format!("fix:{}", fix.latitude));
        }

        fn on_connection_failed(&self, failure: ConnectFailure) {
            self.signals.lock().push(format!("failed:{}", failure.code));
        }
    }

    fn request() -> UpdateRequest {
        UpdateRequest {
            priority: None,
            interval_ms: 10,
            fastest_interval_ms: 5,
            smallest_displacement_m: 0.0,
            max_wait_time_ms: 0,
        }
    }

    #[test]
    fn test_succeeding_connect_signals_connected() {
        let provider = SimulatedProvider::new(ConnectBehavior::Succeed);
        let recorder = Arc::new(Recorder::default());
        provider.set_callbacks(recorder.clone());

        provider.connect();

        assert!(provider.is_connected());
        assert_eq!(*recorder.signals.lock(), vec!["connected"]);
    }

    #[test]
    fn test_failing_connect_signals_failure() {
        let provider =
            SimulatedProvider::new(ConnectBehavior::Fail(ConnectFailure::new(7, "offline")));
        let recorder = Arc::new(Recorder::default());
        provider.set_callbacks(recorder.clone());

        provider.connect();

        assert!(!provider.is_connected());
        assert_eq!(*recorder.signals.lock(), vec!["failed:7"]);
    }

    #[test]
    fn test_request_requires_connection() {
        let provider = SimulatedProvider::new(ConnectBehavior::Manual);
        assert_eq!(
            provider.request_updates(&request()),
            Err(ProviderError::NotConnected)
        );
        assert_eq!(provider.last_known(), Err(ProviderError::NotConnected));
    }

    #[test]
    fn test_rejected_request_is_not_recorded() {
        let provider = SimulatedProvider::default();
        provider.set_callbacks(Arc::new(Recorder::default()));
        provider.connect();
        provider.set_reject_updates(true);

        let result = provider.request_updates(&request());

        assert!(matches!(result, Err(ProviderError::SecurityRejected(_))));
        assert!(provider.requests().is_empty());
        assert!(!provider.is_streaming());
    }

    #[test]
    fn test_suspend_stops_streaming() {
        let provider = SimulatedProvider::default();
        let recorder = Arc::new(Recorder::default());
        provider.set_callbacks(recorder.clone());
        provider.connect();
        provider.request_updates(&request()).unwrap();

        provider.suspend(2);

        assert!(!provider.is_connected());
        assert!(!provider.is_streaming());
        assert_eq!(*recorder.signals.lock(), vec!["connected", "suspended:2"]);
    }

    #[test]
    fn test_route_steps() {
        let route = SimulatedRoute::from(10.0, 20.0);
        let third = route.fix_at(2);

        assert!((third.latitude - 10.0002).abs() < 1e-9);
        assert!((third.longitude - 20.0002).abs() < 1e-9);
        assert_eq!(third.provider, SIMULATED_PROVIDER_TAG);
    }

    #[tokio::test]
    async fn test_route_streams_until_removed() {
        let provider = SimulatedProvider::default().with_route(SimulatedRoute::from(1.0, 2.0));
        let recorder = Arc::new(Recorder::default());
        provider.set_callbacks(recorder.clone());
        provider.connect();
        provider.request_updates(&request()).unwrap();

        tokio::time::sleep(Duration::from_millis(60)).await;
        provider.remove_updates();
        let count = recorder.signals.lock().len();
        assert!(count >= 2, "expected streamed fixes, got {}", count);

        tokio::time::sleep(Duration::from_millis(40)).await;
        assert_eq!(recorder.signals.lock().len(), count);
    }
}
