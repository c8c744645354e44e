//! # Recording Module
//!
//! Single-flight microphone capture with a one-second elapsed tick, input
//! metering for UI pulse feedback, and the publish pipeline that turns a
//! finished capture into backend content.
//!
//! ## Overview
//!
//! This module handles:
//! - The recording controller: at most one capture at a time, enforced with
//!   an explicit error rather than by UI affordances
//! - The photo-then-record workflow: a still photo can be captured first and
//!   is bundled with the eventual content record
//! - The stop pipeline: stop capture, reset state unconditionally, upload
//!   the clip, create the content record, and play the uploaded audio back
//!   as confirmation

pub mod config;
pub mod controller;
pub mod error;
pub mod meter;
pub mod session;

pub use config::RecordingConfig;
pub use controller::{PublishedRecording, RecordingController};
pub use error::{RecordingError, Result};
pub use meter::pulse_scale;
pub use session::RecordingSession;
