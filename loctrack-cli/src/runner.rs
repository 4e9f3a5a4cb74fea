//! CLI runner for common setup and operations.
//!
//! Encapsulates logging initialization, preferences loading, runtime
//! creation and engine wiring to reduce duplication across command handlers.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;

use loctrack::bus::BroadcastBus;
use loctrack::capability::CapabilityGate;
use loctrack::engine::{EngineDependencies, LocationEngine, LoggingPresenter};
use loctrack::logging::{default_log_dir, default_log_file, init_logging, LoggingGuard};
use loctrack::provider::LocationProvider;
use loctrack::session::TrackerContext;
use loctrack::store::{default_store_path, ConfigStore, IniConfigStore, DEFAULT_NAMESPACE};

use crate::error::CliError;

/// Runner that manages CLI lifecycle and common operations.
pub struct CliRunner {
    /// Logging guard - keeps logging active while runner exists
    #[allow(dead_code)]
    logging_guard: LoggingGuard,
    store: Arc<IniConfigStore>,
}

impl CliRunner {
    /// Create a new CLI runner, initializing logging and opening the store.
    ///
    /// `store_path` overrides the default `~/.loctrack/preferences.ini`.
    pub fn new(store_path: Option<PathBuf>) -> Result<Self, CliError> {
        let logging_guard = init_logging(&default_log_dir(), default_log_file())
            .map_err(|e| CliError::LoggingInit(e.to_string()))?;

        let path = store_path.unwrap_or_else(default_store_path);
        let store = Arc::new(IniConfigStore::open(path, DEFAULT_NAMESPACE)?);

        Ok(Self {
            logging_guard,
            store,
        })
    }

    /// Log startup information for a command.
    pub fn log_startup(&self, command: &str) {
        info!("loctrack v{}", env!("CARGO_PKG_VERSION"));
        info!(
            store = %self.store.path().display(),
            "loctrack CLI: {} command",
            command
        );
    }

    /// The opened preferences store.
    pub fn store(&self) -> Arc<dyn ConfigStore> {
        self.store.clone()
    }

    /// Build the multi-threaded runtime the engine runs on.
    pub fn runtime(&self) -> Result<tokio::runtime::Runtime, CliError> {
        tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(CliError::Runtime)
    }

    /// Wire an engine and session context around `provider` and `gate`.
    ///
    /// Must be called within the runtime.
    pub fn context(
        &self,
        provider: Arc<dyn LocationProvider>,
        gate: Arc<dyn CapabilityGate>,
    ) -> TrackerContext {
        let bus = Arc::new(BroadcastBus::new());
        let engine = Arc::new(LocationEngine::spawn(EngineDependencies {
            store: self.store(),
            provider,
            presenter: Arc::new(LoggingPresenter),
            bus: Arc::clone(&bus),
        }));
        TrackerContext {
            store: self.store(),
            gate,
            bus,
            engine,
        }
    }
}
