//! CLI command implementations.
//!
//! Each subcommand has its own module with argument definitions and handlers.
//!
//! # Command Modules
//!
//! - [`config`] - Preferences management (get, set, unset, list, path)
//! - [`restore`] - Resume tracking from persisted configuration
//! - [`track`] - Run a tracking session

pub mod common;
pub mod config;
pub mod restore;
pub mod track;
