//! The location engine state machine.
//!
//! # Architecture
//!
//! ```text
//!  activate()/deactivate() ──► EngineCore (Mutex) ◄── driver task
//!                                                        ▲
//!  provider callbacks ──► ProviderInbox ──► mpsc queue ──┘
//! ```
//!
//! `activate` and `deactivate` lock the core directly and may be called from
//! any thread. Everything else (the configure step and every provider
//! signal) flows through a single unbounded queue consumed by one driver
//! task, so provider callbacks never block and never re-enter the core.
//!
//! Each activation bumps a generation counter. Inputs tagged with an older
//! generation belong to a torn-down connection and are dropped.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;

use super::foreground::{ForegroundPresenter, KeepAliveIndicator};
use super::state::EngineState;
use crate::bus::{BroadcastBus, TrackerEvent, CURRENT_LOCATION_TOPIC};
use crate::config::{ResolvedConfiguration, TrackingConfiguration};
use crate::fix::Fix;
use crate::provider::{ConnectFailure, LocationProvider, ProviderCallbacks, UpdateRequest};
use crate::store::ConfigStore;

/// Collaborators injected into the engine.
pub struct EngineDependencies {
    pub store: Arc<dyn ConfigStore>,
    pub provider: Arc<dyn LocationProvider>,
    pub presenter: Arc<dyn ForegroundPresenter>,
    pub bus: Arc<BroadcastBus>,
}

#[derive(Debug)]
struct EngineInput {
    generation: u64,
    kind: InputKind,
}

#[derive(Debug)]
enum InputKind {
    Configure(Option<TrackingConfiguration>),
    Connected,
    Suspended(i32),
    Fix(Fix),
    ConnectFailed(ConnectFailure),
}

/// Mutable engine state guarded by one lock.
struct EngineCore {
    state: EngineState,
    generation: u64,
    config: Option<ResolvedConfiguration>,
    current_fix: Option<Fix>,
    connection_opened: bool,
    indicator: Option<KeepAliveIndicator>,
    transitions: Vec<EngineState>,
}

struct EngineShared {
    core: Mutex<EngineCore>,
    store: Arc<dyn ConfigStore>,
    provider: Arc<dyn LocationProvider>,
    presenter: Arc<dyn ForegroundPresenter>,
    bus: Arc<BroadcastBus>,
    input_tx: mpsc::UnboundedSender<EngineInput>,
    state_tx: watch::Sender<EngineState>,
}

/// Callback receiver handed to the provider for one activation.
struct ProviderInbox {
    generation: u64,
    tx: mpsc::UnboundedSender<EngineInput>,
}

impl ProviderInbox {
    fn enqueue(&self, kind: InputKind) {
        let input = EngineInput {
            generation: self.generation,
            kind,
        };
        if self.tx.send(input).is_err() {
            tracing::trace!("Engine driver gone, provider signal dropped");
        }
    }
}

impl ProviderCallbacks for ProviderInbox {
    fn on_connected(&self) {
        self.enqueue(InputKind::Connected);
    }

    fn on_connection_suspended(&self, cause: i32) {
        self.enqueue(InputKind::Suspended(cause));
    }

    fn on_fix(&self, fix: Fix) {
        self.enqueue(InputKind::Fix(fix));
    }

    fn on_connection_failed(&self, failure: ConnectFailure) {
        self.enqueue(InputKind::ConnectFailed(failure));
    }
}

/// Background location engine.
///
/// Owns the provider connection for the current activation and publishes
/// every fix on the caller's topic and on [`CURRENT_LOCATION_TOPIC`].
/// Dropping the engine deactivates it and stops the driver task.
pub struct LocationEngine {
    shared: Arc<EngineShared>,
    cancellation: CancellationToken,
}

impl LocationEngine {
    /// Create the engine and spawn its driver task.
    ///
    /// Must be called within a tokio runtime.
    pub fn spawn(deps: EngineDependencies) -> Self {
        let (input_tx, input_rx) = mpsc::unbounded_channel();
        let (state_tx, _) = watch::channel(EngineState::Idle);

        let shared = Arc::new(EngineShared {
            core: Mutex::new(EngineCore {
                state: EngineState::Idle,
                generation: 0,
                config: None,
                current_fix: None,
                connection_opened: false,
                indicator: None,
                transitions: Vec::new(),
            }),
            store: deps.store,
            provider: deps.provider,
            presenter: deps.presenter,
            bus: deps.bus,
            input_tx,
            state_tx,
        });

        let cancellation = CancellationToken::new();
        tokio::spawn(run_driver(
            Arc::clone(&shared),
            input_rx,
            cancellation.clone(),
        ));

        Self {
            shared,
            cancellation,
        }
    }

    /// Start (or restart) tracking.
    ///
    /// Any active connection is torn down first. With `None` the
    /// configuration is rebuilt purely from the store, which is how an
    /// engine restarted by the host resumes its last request.
    pub fn activate(&self, explicit: Option<TrackingConfiguration>) {
        let generation = {
            let mut core = self.shared.core.lock();
            if core.state.is_active() {
                tracing::info!(state = %core.state, "Reactivating, tearing down current connection");
                self.shared.teardown(&mut core);
            }
            core.generation += 1;
            core.config = None;
            core.current_fix = None;
            core.transitions.clear();
            self.shared.transition(&mut core, EngineState::Configuring);
            core.generation
        };

        let input = EngineInput {
            generation,
            kind: InputKind::Configure(explicit),
        };
        if self.shared.input_tx.send(input).is_err() {
            tracing::warn!("Engine driver has stopped, activation ignored");
        }
    }

    /// Stop tracking. Idempotent; a no-op before any activation.
    pub fn deactivate(&self) {
        let mut core = self.shared.core.lock();
        if !core.state.is_active() {
            return;
        }
        self.shared.teardown(&mut core);
        core.generation += 1;
        self.shared.transition(&mut core, EngineState::Stopped);
        tracing::info!("Location engine stopped");
    }

    /// Whether the engine holds an activation.
    pub fn is_active(&self) -> bool {
        self.shared.core.lock().state.is_active()
    }

    /// Current state.
    pub fn state(&self) -> EngineState {
        self.shared.core.lock().state
    }

    /// Watch state changes.
    pub fn subscribe_state(&self) -> watch::Receiver<EngineState> {
        self.shared.state_tx.subscribe()
    }

    /// States entered since the last activation, oldest first.
    pub fn transitions(&self) -> Vec<EngineState> {
        self.shared.core.lock().transitions.clone()
    }

    /// Most recent fix of the current activation.
    pub fn current_fix(&self) -> Option<Fix> {
        self.shared.core.lock().current_fix.clone()
    }

    /// Configuration merged for the current activation.
    pub fn configuration(&self) -> Option<ResolvedConfiguration> {
        self.shared.core.lock().config.clone()
    }

    /// Binding a client to the engine is not supported.
    ///
    /// # Panics
    ///
    /// Always.
    pub fn bind(&self) -> ! {
        panic!("binding to the location engine is not supported")
    }
}

impl Drop for LocationEngine {
    fn drop(&mut self) {
        self.deactivate();
        self.cancellation.cancel();
    }
}

async fn run_driver(
    shared: Arc<EngineShared>,
    mut input_rx: mpsc::UnboundedReceiver<EngineInput>,
    cancellation: CancellationToken,
) {
    tracing::debug!("Engine driver started");
    loop {
        tokio::select! {
            biased;
            _ = cancellation.cancelled() => break,
            input = input_rx.recv() => match input {
                Some(input) => shared.handle(input),
                None => break,
            }
        }
    }
    tracing::debug!("Engine driver stopped");
}

impl EngineShared {
    fn handle(&self, input: EngineInput) {
        let mut core = self.core.lock();
        if input.generation != core.generation {
            tracing::trace!(
                input_generation = input.generation,
                generation = core.generation,
                "Dropping stale engine input"
            );
            return;
        }

        match input.kind {
            InputKind::Configure(explicit) => self.configure(&mut core, explicit),
            InputKind::Connected => self.on_connected(&mut core),
            InputKind::Suspended(cause) => self.on_suspended(&mut core, cause),
            InputKind::Fix(fix) => {
                if core.state == EngineState::Streaming {
                    self.deliver_fix(&mut core, fix);
                } else {
                    tracing::debug!(state = %core.state, "Ignoring fix outside streaming");
                }
            }
            InputKind::ConnectFailed(failure) => {
                tracing::warn!(
                    code = failure.code,
                    reason = %failure.message,
                    "Location provider connection failed"
                );
            }
        }
    }

    fn configure(&self, core: &mut EngineCore, explicit: Option<TrackingConfiguration>) {
        if core.state != EngineState::Configuring {
            return;
        }

        let config = ResolvedConfiguration::resolve(explicit.as_ref(), self.store.as_ref());
        tracing::info!(
            topic = %config.topic,
            interval_ms = config.interval_ms,
            smallest_displacement_m = config.smallest_displacement_m,
            max_wait_time_ms = config.max_wait_time_ms,
            gps = config.use_gps,
            network = config.use_network,
            foreground = config.run_in_foreground,
            "Location engine configured"
        );

        if config.run_in_foreground {
            match self.presenter.present(&config.notification) {
                Ok(indicator) => core.indicator = Some(indicator),
                Err(e) => {
                    tracing::warn!(error = %e, "Keep-alive indicator unavailable, running in background");
                }
            }
        }
        core.config = Some(config);

        self.transition(core, EngineState::Connecting);
        self.provider.set_callbacks(Arc::new(ProviderInbox {
            generation: core.generation,
            tx: self.input_tx.clone(),
        }));
        core.connection_opened = true;
        self.provider.connect();
    }

    fn on_connected(&self, core: &mut EngineCore) {
        if core.state != EngineState::Connecting {
            tracing::debug!(state = %core.state, "Ignoring connect signal");
            return;
        }
        self.transition(core, EngineState::Connected);

        if core.current_fix.is_none() {
            match self.provider.last_known() {
                Ok(Some(fix)) => self.deliver_fix(core, fix),
                Ok(None) => tracing::debug!("No last known fix"),
                Err(e) => tracing::debug!(error = %e, "Last known fix unavailable"),
            }
        }

        let Some(config) = core.config.as_ref() else {
            return;
        };
        let request = UpdateRequest::from_configuration(config);
        match self.provider.request_updates(&request) {
            Ok(()) => {
                tracing::debug!(
                    priority = ?request.priority,
                    interval_ms = request.interval_ms,
                    fastest_interval_ms = request.fastest_interval_ms,
                    "Location updates requested"
                );
                self.transition(core, EngineState::Streaming);
            }
            Err(e) => {
                tracing::warn!(error = %e, "Location update request rejected, staying connected");
            }
        }
    }

    fn on_suspended(&self, core: &mut EngineCore, cause: i32) {
        if !matches!(core.state, EngineState::Connected | EngineState::Streaming) {
            tracing::debug!(state = %core.state, cause, "Ignoring suspension");
            return;
        }
        tracing::info!(cause, "Location provider connection suspended, reconnecting");
        self.transition(core, EngineState::Suspended);
        self.transition(core, EngineState::Connecting);
        self.provider.connect();
    }

    fn deliver_fix(&self, core: &mut EngineCore, fix: Fix) {
        let Some(topic) = core.config.as_ref().map(|c| c.topic.clone()) else {
            return;
        };
        core.current_fix = Some(fix.clone());

        tracing::trace!(
            topic = %topic,
            lat = fix.latitude,
            lon = fix.longitude,
            accuracy_m = fix.accuracy,
            "Publishing fix"
        );
        self.bus.publish(
            &topic,
            TrackerEvent::LocationUpdated {
                topic: topic.clone(),
                fix: fix.clone(),
            },
        );
        self.bus.publish(
            CURRENT_LOCATION_TOPIC,
            TrackerEvent::CurrentLocationUpdated { fix },
        );
    }

    fn teardown(&self, core: &mut EngineCore) {
        if core.state == EngineState::Streaming {
            self.provider.remove_updates();
        }
        if core.connection_opened {
            self.provider.disconnect();
            core.connection_opened = false;
        }
        if let Some(indicator) = core.indicator.take() {
            self.presenter.dismiss(&indicator);
        }
    }

    fn transition(&self, core: &mut EngineCore, next: EngineState) {
        tracing::debug!(from = %core.state, to = %next, "Engine state transition");
        core.state = next;
        core.transitions.push(next);
        self.state_tx.send_replace(next);
    }
}
