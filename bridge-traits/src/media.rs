//! Media device bridge traits and supporting types.
//!
//! These abstractions let the playback and recording controllers drive
//! platform audio engines and the camera without depending on any specific
//! engine API. Host applications provide concrete implementations that
//! satisfy their platform constraints (desktop, mobile).
//!
//! Engine-to-core notifications use typed payloads delivered over
//! `tokio::sync::broadcast` channels instead of the untyped status callbacks
//! the engines themselves expose: controllers subscribe once and receive
//! [`EngineStatus`] / [`MeteringUpdate`] values at whatever cadence the
//! engine samples its own position or input level.

use crate::error::Result;
use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::broadcast;

/// Periodic playback status sample reported by a [`PlaybackEngine`].
///
/// Emitted at a fixed cadence while a source is loaded. `position` is the
/// engine's own notion of the current playhead, which may lag a recently
/// issued seek; the playback controller owns the drift-correction policy.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineStatus {
    /// Current playhead position.
    pub position: Duration,
    /// Total duration of the loaded source, when known.
    pub duration: Option<Duration>,
    /// Whether the engine is actively producing audio.
    pub is_playing: bool,
    /// Set on the final status of a source that played to its end.
    pub finished: bool,
}

/// Instantaneous input-level sample reported by a [`RecorderEngine`].
///
/// `level_db` is in roughly dBFS units: 0 is full scale, silence trends
/// toward -160. Used only to drive UI pulse feedback.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeteringUpdate {
    pub level_db: f32,
}

/// Result of loading an audio source into a [`PlaybackEngine`].
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedAudio {
    /// Total duration of the source, when the engine can determine it at
    /// load time (remote streams may report it only via status updates).
    pub duration: Option<Duration>,
}

/// Finalized capture returned by [`RecorderEngine::stop`].
#[derive(Debug, Clone)]
pub struct RecordedClip {
    /// Engine-local resource locator for the finished capture.
    pub uri: String,
    /// Encoded audio bytes, ready for upload.
    pub data: Bytes,
    /// Capture length in whole seconds as measured by the engine.
    pub duration_secs: u64,
}

/// Still photo returned by [`CameraDevice::capture_photo`].
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedPhoto {
    /// Device-local resource locator for the photo.
    pub uri: String,
    pub width: u32,
    pub height: u32,
    /// Encoded image bytes, ready for upload.
    pub data: Bytes,
}

/// Audio session routing applied before playback starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackRouting {
    /// Lower the volume of other apps instead of interrupting them.
    pub duck_others: bool,
    /// Keep playing when the host app moves to the background.
    pub stay_active_in_background: bool,
}

impl Default for PlaybackRouting {
    fn default() -> Self {
        Self {
            duck_others: true,
            stay_active_in_background: true,
        }
    }
}

/// Outcome of a device permission request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
}

impl PermissionStatus {
    pub fn is_granted(&self) -> bool {
        matches!(self, PermissionStatus::Granted)
    }
}

/// Trait for platform audio playback engines.
///
/// The engine holds at most one loaded source at a time; loading a new
/// source while one is active is implementation-defined, so callers are
/// expected to `stop_and_unload` first. The playback controller enforces
/// that ordering.
#[async_trait]
pub trait PlaybackEngine: Send + Sync {
    /// Apply audio session routing. Called before a new source is loaded.
    async fn set_routing(&self, routing: PlaybackRouting) -> Result<()>;

    /// Load a source by resource locator, allocating native resources.
    async fn load(&self, uri: &str) -> Result<LoadedAudio>;

    /// Begin or resume playback of the loaded source.
    async fn play(&self) -> Result<()>;

    /// Stop playback and release the loaded source. Must be idempotent.
    async fn stop_and_unload(&self) -> Result<()>;

    /// Seek to an absolute position within the loaded source.
    async fn seek(&self, position: Duration) -> Result<()>;

    /// Subscribe to periodic status samples for the loaded source.
    fn status_events(&self) -> broadcast::Receiver<EngineStatus>;
}

/// Trait for platform microphone capture engines.
///
/// `start` is expected to configure the shared audio session for capture
/// (the recording counterpart of [`PlaybackEngine::set_routing`]) before
/// recording begins.
#[async_trait]
pub trait RecorderEngine: Send + Sync {
    /// Request microphone permission from the host platform.
    async fn request_permission(&self) -> Result<PermissionStatus>;

    /// Configure the capture audio session and begin recording.
    async fn start(&self) -> Result<()>;

    /// Stop recording and return the finalized clip.
    async fn stop(&self) -> Result<RecordedClip>;

    /// Subscribe to input-level metering samples.
    fn metering_events(&self) -> broadcast::Receiver<MeteringUpdate>;
}

/// Trait for still-photo capture devices.
#[async_trait]
pub trait CameraDevice: Send + Sync {
    /// Capture a single photo and return its handle.
    async fn capture_photo(&self) -> Result<CapturedPhoto>;
}
