//! Location provider abstraction.
//!
//! A [`LocationProvider`] is the external subsystem that actually produces
//! fixes (a fused platform API, a GPS receiver, a network locator). The
//! engine talks to it through a small synchronous surface and receives its
//! asynchronous signals through [`ProviderCallbacks`].
//!
//! # Callback Contract
//!
//! ```text
//! connect() ──► on_connected() ──► request_updates() ──► on_fix() ...
//!          └──► on_connection_failed()
//!                         on_connection_suspended() ──► connect() again
//! ```
//!
//! Callbacks may arrive on any thread, including synchronously from inside
//! `connect()` or `request_updates()`. Implementations of
//! [`ProviderCallbacks`] must therefore never block.

mod error;
mod request;
mod simulated;

use std::sync::Arc;

pub use error::{ConnectFailure, ProviderError};
pub use request::{Priority, UpdateRequest};
pub use simulated::{ConnectBehavior, SimulatedProvider, SimulatedRoute};

use crate::fix::Fix;

/// Receiver of asynchronous provider signals.
pub trait ProviderCallbacks: Send + Sync {
    /// The connection is established.
    fn on_connected(&self);

    /// The connection was temporarily lost.
    fn on_connection_suspended(&self, cause: i32);

    /// A new fix is available.
    fn on_fix(&self, fix: Fix);

    /// The connection attempt failed.
    fn on_connection_failed(&self, failure: ConnectFailure);
}

/// External source of position fixes.
pub trait LocationProvider: Send + Sync {
    /// Register the receiver for subsequent callbacks, replacing any earlier one.
    fn set_callbacks(&self, callbacks: Arc<dyn ProviderCallbacks>);

    /// Begin connecting. Completion is signalled through the callbacks.
    fn connect(&self);

    /// Close the connection. Must be safe to call when not connected.
    fn disconnect(&self);

    /// Whether the connection is currently established.
    fn is_connected(&self) -> bool;

    /// Most recent fix known to the provider, if any.
    fn last_known(&self) -> Result<Option<Fix>, ProviderError>;

    /// Start streaming fixes with the given parameters.
    fn request_updates(&self, request: &UpdateRequest) -> Result<(), ProviderError>;

    /// Stop streaming fixes.
    fn remove_updates(&self);
}
