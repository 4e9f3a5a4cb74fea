//! loctrack - Background location tracking
//!
//! This library periodically acquires the device position from a location
//! provider, delivers every fix to subscribers over a topic-based broadcast
//! bus, and persists its configuration so a restarted engine can resume the
//! last request without the caller.
//!
//! # Modules
//!
//! - [`session`] - caller-facing builder: capability gate, persistence, start/stop
//! - [`engine`] - connection and acquisition state machine
//! - [`bus`] - string-topic publish/subscribe
//! - [`store`] - durable namespaced key/value configuration
//! - [`capability`] - permission check and request port
//! - [`provider`] - location provider abstraction and a simulated provider
//! - [`config`] - tracking configuration, merge rules and defaults

pub mod bus;
pub mod capability;
pub mod config;
pub mod engine;
pub mod fix;
pub mod logging;
pub mod provider;
pub mod session;
pub mod store;

pub use fix::Fix;
