//! # DPoP Provider
//!
//! Typed REST client for the DPoP backend (the Detroit Art API).
//!
//! ## Overview
//!
//! This module provides:
//! - One typed method per backend endpoint (events, RSVPs, venues, artwork,
//!   content, flyers, users)
//! - Bearer-token injection once a session token is set
//! - Multipart media upload (`image` file part + `exif` JSON string part)
//! - Status-checked responses: non-2xx bodies become [`DpopError::Api`]
//!   instead of being JSON-decoded as if they had succeeded

pub mod client;
pub mod error;
pub mod models;

pub use client::DpopClient;
pub use error::{DpopError, Result};
