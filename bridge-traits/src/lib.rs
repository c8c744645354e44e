//! # Host Bridge Traits
//!
//! The contract between the Detroit Art core and whatever platform hosts it.
//! Every capability the core needs from the outside world is a trait here;
//! hosts (desktop shims, mobile shells, test mocks) supply implementations.
//!
//! - [`HttpClient`](http::HttpClient) - request execution with optional retry
//! - [`SecureStore`](storage::SecureStore) - bearer-token persistence
//!   (Keychain / Keystore / Credential Manager / Secret Service)
//! - [`SettingsStore`](storage::SettingsStore) - string-keyed JSON state
//! - [`PlaybackEngine`](media::PlaybackEngine) - native audio playback
//! - [`RecorderEngine`](media::RecorderEngine) - microphone capture
//! - [`CameraDevice`](media::CameraDevice) - still-photo capture
//! - [`Clock`](time::Clock) - injectable time source
//!
//! Engines push their periodic notifications over `tokio::sync::broadcast`
//! channels with explicit payload types ([`EngineStatus`](media::EngineStatus),
//! [`MeteringUpdate`](media::MeteringUpdate)), so the controllers never see a
//! platform callback signature.
//!
//! All traits are `Send + Sync` and report failures as
//! [`BridgeError`](error::BridgeError).

pub mod error;
pub mod http;
pub mod media;
pub mod storage;
pub mod time;

pub use error::BridgeError;

// Re-export commonly used types
pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse, MultipartForm};
pub use media::{
    CameraDevice, CapturedPhoto, EngineStatus, LoadedAudio, MeteringUpdate, PermissionStatus,
    PlaybackEngine, PlaybackRouting, RecordedClip, RecorderEngine,
};
pub use storage::{SecureStore, SettingsStore};
pub use time::{Clock, SystemClock};
