//! Workspace placeholder crate.
//!
//! This crate exists to expose shared feature flags that map to the individual
//! workspace crates (e.g., `core-service`, `core-playback`, `core-recording`).
//! Host applications can depend on `dpop-workspace` and enable the documented
//! features without needing to wire each crate individually.
//!
//! ## Features
//!
//! - `desktop-shims` (default): pulls in `core-service` with desktop bridge
//!   implementations (reqwest HTTP client, SQLite settings store, OS keychain
//!   secure store). Hosts still inject the platform audio engines.

#[cfg(feature = "desktop-shims")]
pub use core_service;
