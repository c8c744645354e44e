//! # Playback Module
//!
//! Single-flight audio playback with elapsed-time tracking, seek support and
//! time-indexed cover art resolution.
//!
//! ## Overview
//!
//! This module handles:
//! - The playback controller: at most one active session process-wide;
//!   starting a new source tears down the previous one
//! - Drift-corrected seeking: a pending seek target is re-issued when the
//!   engine's reported position lags it beyond a configurable tolerance
//! - Media tile resolution: which cover image is current for a playback
//!   position, given a content item's timestamped tiles

pub mod config;
pub mod controller;
pub mod error;
pub mod session;
pub mod tiles;

pub use config::PlaybackConfig;
pub use controller::PlaybackController;
pub use error::{PlaybackError, Result};
pub use session::PlaybackSession;
