//! Tracking configuration: what a caller asks for, and what the engine runs with.
//!
//! A [`TrackingConfiguration`] is the caller's request with unset fields
//! left absent. It is persisted through a [`crate::store::ConfigStore`] at
//! session start and merged into a [`ResolvedConfiguration`] when the engine
//! activates (explicit > persisted > default).
//!
//! # Example
//!
//! ```
//! use loctrack::config::{ResolvedConfiguration, TrackingConfiguration};
//! use loctrack::store::MemoryConfigStore;
//!
//! let store = MemoryConfigStore::new("example");
//!
//! let first = TrackingConfiguration {
//!     interval_ms: Some(5000),
//!     ..TrackingConfiguration::new("my.action")
//! };
//! first.persist(&store).unwrap();
//!
//! // A later request without an interval inherits the persisted one
//! let later = TrackingConfiguration::new("my.action");
//! let resolved = ResolvedConfiguration::resolve(Some(&later), &store);
//! assert_eq!(resolved.interval_ms, 5000);
//! ```

mod defaults;
mod resolved;
mod tracking;

pub use defaults::*;
pub use resolved::ResolvedConfiguration;
pub use tracking::{ForegroundNotification, TrackingConfiguration};
