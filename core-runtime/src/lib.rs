//! # Core Runtime
//!
//! Shared infrastructure underneath the Detroit Art core crates: the typed
//! event bus, the logging bootstrap, and the dependency-bundle configuration
//! builder with fail-fast capability validation.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use error::{Error, Result};
