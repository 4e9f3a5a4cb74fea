//! Background location engine.
//!
//! The [`LocationEngine`] owns one provider connection per activation,
//! merges the tracking configuration (explicit over persisted over
//! defaults), and publishes every fix on the bus. An optional
//! [`ForegroundPresenter`] keeps the engine visible while it runs in
//! foreground mode.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use loctrack::bus::BroadcastBus;
//! use loctrack::config::TrackingConfiguration;
//! use loctrack::engine::{EngineDependencies, EngineState, LocationEngine, LoggingPresenter};
//! use loctrack::provider::SimulatedProvider;
//! use loctrack::store::MemoryConfigStore;
//!
//! # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
//! let engine = LocationEngine::spawn(EngineDependencies {
//!     store: Arc::new(MemoryConfigStore::new("demo")),
//!     provider: Arc::new(SimulatedProvider::default()),
//!     presenter: Arc::new(LoggingPresenter),
//!     bus: Arc::new(BroadcastBus::new()),
//! });
//!
//! engine.activate(Some(TrackingConfiguration::new("DEMO")));
//! assert_eq!(engine.state(), EngineState::Configuring);
//!
//! engine.deactivate();
//! assert_eq!(engine.state(), EngineState::Stopped);
//! # });
//! ```

mod foreground;
mod logger;
mod service;
mod state;

pub use foreground::{
    ForegroundPresenter, KeepAliveIndicator, LoggingPresenter, PresenterError,
    FOREGROUND_NOTIFICATION_ID,
};
pub use logger::{spawn_fix_logger, DEFAULT_FIX_LOG_INTERVAL};
pub use service::{EngineDependencies, LocationEngine};
pub use state::EngineState;
