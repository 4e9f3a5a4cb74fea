//! Caller-facing tracking session.
//!
//! A [`TrackingSession`] assembles a [`TrackingConfiguration`], runs the
//! capability gate, persists the configuration and drives the engine. The
//! collaborators it works against are bundled in a [`TrackerContext`].
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use loctrack::bus::BroadcastBus;
//! use loctrack::capability::StaticCapabilityGate;
//! use loctrack::engine::{EngineDependencies, LocationEngine, LoggingPresenter};
//! use loctrack::provider::SimulatedProvider;
//! use loctrack::session::{SessionOutcome, TrackerContext, TrackingSession};
//! use loctrack::store::MemoryConfigStore;
//!
//! # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
//! let store = Arc::new(MemoryConfigStore::new("demo"));
//! let bus = Arc::new(BroadcastBus::new());
//! let engine = Arc::new(LocationEngine::spawn(EngineDependencies {
//!     store: store.clone(),
//!     provider: Arc::new(SimulatedProvider::default()),
//!     presenter: Arc::new(LoggingPresenter),
//!     bus: bus.clone(),
//! }));
//! let ctx = TrackerContext {
//!     store,
//!     gate: Arc::new(StaticCapabilityGate::granted()),
//!     bus,
//!     engine,
//! };
//!
//! let mut session = TrackingSession::new("DEMO").with_interval(1000).with_foreground(false);
//! assert_eq!(session.start(&ctx).await.unwrap(), SessionOutcome::Started);
//! assert!(session.stop(&ctx));
//! # });
//! ```

use std::sync::Arc;

use thiserror::Error;

use crate::bus::{
    BroadcastBus, EventHandler, ReceiverHandle, TrackerEvent, CURRENT_LOCATION_TOPIC,
    PERMISSION_DENIED_TOPIC,
};
use crate::capability::{
    CapabilityError, CapabilityGate, CapabilityOutcome, CapabilityStatus, PERMISSION_REQUEST_CODE,
};
use crate::config::{ForegroundNotification, TrackingConfiguration};
use crate::engine::LocationEngine;
use crate::store::{ConfigStore, StoreError};

/// Collaborators a session runs against.
#[derive(Clone)]
pub struct TrackerContext {
    pub store: Arc<dyn ConfigStore>,
    pub gate: Arc<dyn CapabilityGate>,
    pub bus: Arc<BroadcastBus>,
    pub engine: Arc<LocationEngine>,
}

/// How a start attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    /// Configuration persisted and the engine activated.
    Started,
    /// The capability was denied; nothing was persisted or activated.
    PermissionDenied,
}

/// Errors raised while starting a session.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Failed to persist tracking configuration: {0}")]
    Store(#[from] StoreError),

    #[error("Capability request failed: {0}")]
    Capability(#[from] CapabilityError),
}

/// Builder and lifecycle handle for one tracking request.
pub struct TrackingSession {
    configuration: TrackingConfiguration,
    current_location_handler: Option<Arc<dyn EventHandler>>,
    registration: Option<(Arc<BroadcastBus>, ReceiverHandle)>,
}

impl TrackingSession {
    /// Start building a session that publishes fixes on `topic`.
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            configuration: TrackingConfiguration::new(topic),
            current_location_handler: None,
            registration: None,
        }
    }

    /// Desired interval between fixes.
    pub fn with_interval(mut self, interval_ms: u64) -> Self {
        self.configuration.interval_ms = Some(interval_ms);
        self
    }

    /// Minimum movement between fixes.
    pub fn with_smallest_displacement(mut self, meters: u64) -> Self {
        self.configuration.smallest_displacement_m = Some(meters);
        self
    }

    /// Maximum time fixes may be batched before delivery.
    pub fn with_max_wait_time(mut self, max_wait_ms: u64) -> Self {
        self.configuration.max_wait_time_ms = Some(max_wait_ms);
        self
    }

    pub fn with_gps(mut self, use_gps: bool) -> Self {
        self.configuration.use_gps = Some(use_gps);
        self
    }

    pub fn with_network(mut self, use_network: bool) -> Self {
        self.configuration.use_network = Some(use_network);
        self
    }

    /// Run the engine in foreground (keep-alive) mode.
    pub fn with_foreground(mut self, run_in_foreground: bool) -> Self {
        self.configuration.run_in_foreground = Some(run_in_foreground);
        self
    }

    /// Text for the keep-alive indicator. Absent fields clear stored values.
    pub fn with_notification(
        mut self,
        title: Option<&str>,
        text: Option<&str>,
        ticker: Option<&str>,
        channel_id: Option<&str>,
    ) -> Self {
        self.configuration.notification = ForegroundNotification {
            title: title.map(str::to_string),
            text: text.map(str::to_string),
            ticker: ticker.map(str::to_string),
            channel_id: channel_id.map(str::to_string),
        };
        self
    }

    /// Receive current-location and permission-denied events.
    ///
    /// The handler is registered on the first `start` and unregistered by
    /// `stop` or when the session is dropped.
    pub fn subscribe_current_location(
        mut self,
        handler: impl Fn(&str, &TrackerEvent) + Send + Sync + 'static,
    ) -> Self {
        self.current_location_handler = Some(Arc::new(handler));
        self
    }

    /// The configuration this session applies.
    pub fn configuration(&self) -> &TrackingConfiguration {
        &self.configuration
    }

    /// Run the capability gate, then persist and activate.
    ///
    /// Starting again while the engine is active reconfigures it.
    pub async fn start(&mut self, ctx: &TrackerContext) -> Result<SessionOutcome, SessionError> {
        if self.registration.is_none() {
            if let Some(handler) = &self.current_location_handler {
                let handle = ctx.bus.register(
                    &[CURRENT_LOCATION_TOPIC, PERMISSION_DENIED_TOPIC],
                    Arc::clone(handler),
                );
                self.registration = Some((Arc::clone(&ctx.bus), handle));
            }
        }

        if ctx.gate.check() == CapabilityStatus::NotGranted {
            tracing::info!(
                request_code = PERMISSION_REQUEST_CODE,
                "Location capability missing, requesting"
            );
            let pending = ctx.gate.request(PERMISSION_REQUEST_CODE)?;
            if pending.outcome().await == CapabilityOutcome::Denied {
                tracing::warn!(topic = %self.configuration.topic, "Location capability denied");
                ctx.bus
                    .publish(PERMISSION_DENIED_TOPIC, TrackerEvent::PermissionDenied);
                return Ok(SessionOutcome::PermissionDenied);
            }
        }

        self.configuration.persist(ctx.store.as_ref())?;
        ctx.engine.activate(Some(self.configuration.clone()));

        tracing::info!(topic = %self.configuration.topic, "Tracking session started");
        Ok(SessionOutcome::Started)
    }

    /// Stop tracking.
    ///
    /// Returns false (and does nothing) when the engine is not active.
    pub fn stop(&mut self, ctx: &TrackerContext) -> bool {
        if !ctx.engine.is_active() {
            return false;
        }

        ctx.engine.deactivate();
        self.release_handler();
        tracing::info!(topic = %self.configuration.topic, "Tracking session stopped");
        true
    }

    fn release_handler(&mut self) {
        if let Some((bus, handle)) = self.registration.take() {
            bus.unregister(&handle);
        }
    }
}

impl Drop for TrackingSession {
    fn drop(&mut self) {
        // A denied session never becomes active, so `stop` cannot release it.
        self.release_handler();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::{ForwardedCapabilityGate, StaticCapabilityGate};
    use crate::engine::{EngineDependencies, EngineState, LoggingPresenter};
    use crate::provider::SimulatedProvider;
    use crate::store::{ConfigKey, MemoryConfigStore};
    use std::time::Duration;

    fn context(gate: Arc<dyn CapabilityGate>) -> (TrackerContext, Arc<SimulatedProvider>) {
        let provider = Arc::new(SimulatedProvider::default());
        let store = Arc::new(MemoryConfigStore::new("test"));
        let bus = Arc::new(BroadcastBus::new());
        let engine = Arc::new(LocationEngine::spawn(EngineDependencies {
            store: store.clone(),
            provider: provider.clone(),
            presenter: Arc::new(LoggingPresenter),
            bus: bus.clone(),
        }));
        (
            TrackerContext {
                store,
                gate,
                bus,
                engine,
            },
            provider,
        )
    }

    #[test]
    fn test_builder_sets_fields() {
        let session = TrackingSession::new("T")
            .with_interval(1000)
            .with_smallest_displacement(5)
            .with_max_wait_time(3000)
            .with_gps(false)
            .with_network(true)
            .with_foreground(true)
            .with_notification(Some("title"), None, None, Some("chan"));

        let config = session.configuration();
        assert_eq!(config.topic, "T");
        assert_eq!(config.interval_ms, Some(1000));
        assert_eq!(config.smallest_displacement_m, Some(5));
        assert_eq!(config.max_wait_time_ms, Some(3000));
        assert_eq!(config.use_gps, Some(false));
        assert_eq!(config.use_network, Some(true));
        assert_eq!(config.run_in_foreground, Some(true));
        assert_eq!(config.notification.title.as_deref(), Some("title"));
        assert_eq!(config.notification.text, None);
        assert_eq!(config.notification.channel_id.as_deref(), Some("chan"));
    }

    #[tokio::test]
    async fn test_start_persists_and_activates() {
        let (ctx, _provider) = context(Arc::new(StaticCapabilityGate::granted()));
        let mut session = TrackingSession::new("T").with_interval(1000);

        let outcome = session.start(&ctx).await.unwrap();

        assert_eq!(outcome, SessionOutcome::Started);
        assert!(ctx.engine.is_active());
        assert_eq!(ctx.store.get_string(ConfigKey::Action, None).as_deref(), Some("T"));
        assert_eq!(ctx.store.get_long(ConfigKey::LocationInterval, 0), 1000);
    }

    #[tokio::test]
    async fn test_denied_start_touches_nothing() {
        let (ctx, provider) = context(Arc::new(StaticCapabilityGate::denied()));
        let mut rx = ctx.bus.subscribe(PERMISSION_DENIED_TOPIC);
        let mut session = TrackingSession::new("T").with_interval(1000);

        let outcome = session.start(&ctx).await.unwrap();

        assert_eq!(outcome, SessionOutcome::PermissionDenied);
        assert_eq!(rx.try_recv().unwrap(), TrackerEvent::PermissionDenied);
        assert_eq!(ctx.engine.state(), EngineState::Idle);
        assert_eq!(ctx.store.get_string(ConfigKey::Action, None), None);
        assert_eq!(provider.connect_calls(), 0);
    }

    #[tokio::test]
    async fn test_forwarded_grant_starts_session() {
        let gate = Arc::new(ForwardedCapabilityGate::new(CapabilityStatus::NotGranted));
        let (ctx, _provider) = context(gate.clone());
        let mut session = TrackingSession::new("T");

        let forward = {
            let gate = Arc::clone(&gate);
            tokio::spawn(async move {
                while !gate.is_pending(PERMISSION_REQUEST_CODE) {
                    tokio::time::sleep(Duration::from_millis(1)).await;
                }
                gate.on_request_result(PERMISSION_REQUEST_CODE, CapabilityOutcome::Granted);
            })
        };

        let outcome = session.start(&ctx).await.unwrap();
        forward.await.unwrap();

        assert_eq!(outcome, SessionOutcome::Started);
        assert_eq!(ctx.gate.check(), CapabilityStatus::Granted);
    }

    #[tokio::test]
    async fn test_handler_registered_once_and_unregistered_on_stop() {
        let (ctx, _provider) = context(Arc::new(StaticCapabilityGate::granted()));
        let mut session = TrackingSession::new("T")
            .with_foreground(false)
            .subscribe_current_location(|_, _| {});

        session.start(&ctx).await.unwrap();
        assert_eq!(ctx.bus.subscriber_count(CURRENT_LOCATION_TOPIC), 1);

        // Starting again does not register a second handler
        session.start(&ctx).await.unwrap();
        assert_eq!(ctx.bus.subscriber_count(CURRENT_LOCATION_TOPIC), 1);

        assert!(session.stop(&ctx));
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(ctx.bus.subscriber_count(CURRENT_LOCATION_TOPIC), 0);
    }

    #[tokio::test]
    async fn test_denied_session_releases_handler_on_drop() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let (ctx, _provider) = context(Arc::new(StaticCapabilityGate::denied()));
        let denials = Arc::new(AtomicUsize::new(0));
        let mut session = TrackingSession::new("T").subscribe_current_location({
            let denials = Arc::clone(&denials);
            move |_, event| {
                if *event == TrackerEvent::PermissionDenied {
                    denials.fetch_add(1, Ordering::SeqCst);
                }
            }
        });

        let outcome = session.start(&ctx).await.unwrap();
        assert_eq!(outcome, SessionOutcome::PermissionDenied);
        tokio::time::timeout(Duration::from_secs(1), async {
            while denials.load(Ordering::SeqCst) == 0 {
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
        })
        .await
        .unwrap();

        // Engine never activated, so stop has nothing to do
        assert!(!session.stop(&ctx));
        assert_eq!(ctx.bus.subscriber_count(PERMISSION_DENIED_TOPIC), 1);

        drop(session);
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(ctx.bus.subscriber_count(PERMISSION_DENIED_TOPIC), 0);
        assert_eq!(ctx.bus.subscriber_count(CURRENT_LOCATION_TOPIC), 0);
    }

    #[tokio::test]
    async fn test_stop_without_start_is_noop() {
        let (ctx, provider) = context(Arc::new(StaticCapabilityGate::granted()));
        let mut session = TrackingSession::new("T");

        assert!(!session.stop(&ctx));
        assert_eq!(ctx.engine.state(), EngineState::Idle);
        assert_eq!(provider.disconnect_calls(), 0);
    }
}
