//! # Core Configuration Module
//!
//! Builder for the bundle of bridges and settings the core needs at startup.
//! Validation is fail-fast: a missing required bridge surfaces at `build()`
//! with a message naming the capability and how to provide it, instead of a
//! panic at first use.
//!
//! ## Required Dependencies
//!
//! - `HttpClient` - REST calls against the DPoP backend
//! - `SecureStore` - auth token persistence
//! - `SettingsStore` - profile, cached user and check-in persistence
//! - `PlaybackEngine` - native audio playback
//! - `RecorderEngine` - microphone capture
//!
//! ## Optional Dependencies
//!
//! - `CameraDevice` - photo capture preceding a recording (hosts without a
//!   camera simply skip the photo step)
//! - `Clock` - defaults to the system clock
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::CoreConfig;
//! use std::sync::Arc;
//!
//! let config = CoreConfig::builder()
//!     .api_base_url("https://api.dpop.tech/api")
//!     .http_client(Arc::new(MyHttpClient))
//!     .secure_store(Arc::new(MySecureStore))
//!     .settings_store(Arc::new(MySettingsStore))
//!     .playback_engine(Arc::new(MyPlaybackEngine))
//!     .recorder_engine(Arc::new(MyRecorderEngine))
//!     .build()
//!     .expect("Failed to build config");
//! ```
//!
//! With the `desktop-shims` feature enabled, desktop-ready defaults for the
//! HTTP client and both stores can be injected in one call:
//!
//! ```ignore
//! let config = CoreConfig::builder()
//!     .with_desktop_bridges("/home/user/.local/share/detroit-art")
//!     .await?
//!     .playback_engine(Arc::new(MyPlaybackEngine))
//!     .recorder_engine(Arc::new(MyRecorderEngine))
//!     .build()?;
//! ```

use crate::error::{Error, Result};
use crate::events::DEFAULT_EVENT_CAPACITY;
use bridge_traits::{
    http::HttpClient,
    media::{CameraDevice, PlaybackEngine, RecorderEngine},
    storage::{SecureStore, SettingsStore},
    time::{Clock, SystemClock},
};
use std::sync::Arc;

/// Default DPoP backend base URL (the `/api` prefix included).
pub const DEFAULT_API_BASE_URL: &str = "https://api.dpop.tech/api";

/// The assembled dependency bundle. Built through [`CoreConfig::builder`].
#[derive(Clone)]
pub struct CoreConfig {
    /// Base URL of the DPoP REST backend.
    pub api_base_url: String,

    /// Event bus capacity (events buffered per subscriber).
    pub event_capacity: usize,

    /// HTTP client for API requests (required).
    pub http_client: Arc<dyn HttpClient>,

    /// Secure credential storage (required).
    pub secure_store: Arc<dyn SecureStore>,

    /// Key-value preferences storage (required).
    pub settings_store: Arc<dyn SettingsStore>,

    /// Native audio playback engine (required).
    pub playback_engine: Arc<dyn PlaybackEngine>,

    /// Microphone capture engine (required).
    pub recorder_engine: Arc<dyn RecorderEngine>,

    /// Photo capture device (optional).
    pub camera: Option<Arc<dyn CameraDevice>>,

    /// Time source (defaults to the system clock).
    pub clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for CoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreConfig")
            .field("api_base_url", &self.api_base_url)
            .field("event_capacity", &self.event_capacity)
            .field("http_client", &"HttpClient { ... }")
            .field("secure_store", &"SecureStore { ... }")
            .field("settings_store", &"SettingsStore { ... }")
            .field("playback_engine", &"PlaybackEngine { ... }")
            .field("recorder_engine", &"RecorderEngine { ... }")
            .field("camera", &self.camera.as_ref().map(|_| "CameraDevice { ... }"))
            .finish()
    }
}

impl CoreConfig {
    /// Start building a configuration.
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }
}

/// Builder for [`CoreConfig`] with fail-fast capability validation.
#[derive(Default)]
pub struct CoreConfigBuilder {
    api_base_url: Option<String>,
    event_capacity: Option<usize>,
    http_client: Option<Arc<dyn HttpClient>>,
    secure_store: Option<Arc<dyn SecureStore>>,
    settings_store: Option<Arc<dyn SettingsStore>>,
    playback_engine: Option<Arc<dyn PlaybackEngine>>,
    recorder_engine: Option<Arc<dyn RecorderEngine>>,
    camera: Option<Arc<dyn CameraDevice>>,
    clock: Option<Arc<dyn Clock>>,
}

impl CoreConfigBuilder {
    /// Set the backend base URL (defaults to [`DEFAULT_API_BASE_URL`]).
    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = Some(url.into());
        self
    }

    /// Set the event bus capacity.
    pub fn event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = Some(capacity);
        self
    }

    /// Inject the HTTP client bridge.
    pub fn http_client(mut self, client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Inject the secure store bridge.
    pub fn secure_store(mut self, store: Arc<dyn SecureStore>) -> Self {
        self.secure_store = Some(store);
        self
    }

    /// Inject the settings store bridge.
    pub fn settings_store(mut self, store: Arc<dyn SettingsStore>) -> Self {
        self.settings_store = Some(store);
        self
    }

    /// Inject the playback engine bridge.
    pub fn playback_engine(mut self, engine: Arc<dyn PlaybackEngine>) -> Self {
        self.playback_engine = Some(engine);
        self
    }

    /// Inject the recorder engine bridge.
    pub fn recorder_engine(mut self, engine: Arc<dyn RecorderEngine>) -> Self {
        self.recorder_engine = Some(engine);
        self
    }

    /// Inject the camera bridge.
    pub fn camera(mut self, camera: Arc<dyn CameraDevice>) -> Self {
        self.camera = Some(camera);
        self
    }

    /// Inject a custom time source.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Inject desktop defaults for the HTTP client, settings store and
    /// secure store. Audio engines remain host-provided.
    ///
    /// The settings database lives at `{data_dir}/settings.db`.
    #[cfg(feature = "desktop-shims")]
    pub async fn with_desktop_bridges(
        mut self,
        data_dir: impl Into<std::path::PathBuf>,
    ) -> Result<Self> {
        let data_dir = data_dir.into();

        let settings = bridge_desktop::SqliteSettingsStore::new(data_dir.join("settings.db"))
            .await
            .map_err(|e| Error::Config(format!("Failed to open settings store: {}", e)))?;

        self.http_client = Some(Arc::new(bridge_desktop::ReqwestHttpClient::new()));
        self.settings_store = Some(Arc::new(settings));
        self.secure_store = Some(Arc::new(bridge_desktop::KeyringSecureStore::new()));
        Ok(self)
    }

    /// Validate and build the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CapabilityMissing`] naming the first missing required
    /// bridge, with a hint about how to provide it.
    pub fn build(self) -> Result<CoreConfig> {
        let http_client = self.http_client.ok_or_else(|| Error::CapabilityMissing {
            capability: "HttpClient".to_string(),
            message: "No HTTP client provided. Desktop: enable the desktop-shims feature. \
                      Mobile: inject a platform-native adapter."
                .to_string(),
        })?;

        let secure_store = self.secure_store.ok_or_else(|| Error::CapabilityMissing {
            capability: "SecureStore".to_string(),
            message: "No secure store provided. Desktop: enable the desktop-shims feature. \
                      Mobile: inject a Keychain/Keystore adapter."
                .to_string(),
        })?;

        let settings_store = self.settings_store.ok_or_else(|| Error::CapabilityMissing {
            capability: "SettingsStore".to_string(),
            message: "No settings store provided. Desktop: enable the desktop-shims feature. \
                      Mobile: inject a preferences adapter."
                .to_string(),
        })?;

        let playback_engine = self.playback_engine.ok_or_else(|| Error::CapabilityMissing {
            capability: "PlaybackEngine".to_string(),
            message: "No playback engine provided. Inject the host platform's audio engine \
                      adapter."
                .to_string(),
        })?;

        let recorder_engine = self.recorder_engine.ok_or_else(|| Error::CapabilityMissing {
            capability: "RecorderEngine".to_string(),
            message: "No recorder engine provided. Inject the host platform's microphone \
                      capture adapter."
                .to_string(),
        })?;

        let api_base_url = self
            .api_base_url
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
        if api_base_url.is_empty() {
            return Err(Error::Config("api_base_url must not be empty".to_string()));
        }

        tracing::debug!(api_base_url = %api_base_url, "Core configuration assembled");
        Ok(CoreConfig {
            api_base_url,
            event_capacity: self.event_capacity.unwrap_or(DEFAULT_EVENT_CAPACITY),
            http_client,
            secure_store,
            settings_store,
            playback_engine,
            recorder_engine,
            camera: self.camera,
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_fails_without_http_client() {
        let result = CoreConfig::builder().build();
        match result {
            Err(Error::CapabilityMissing { capability, .. }) => {
                assert_eq!(capability, "HttpClient");
            }
            other => panic!("Expected CapabilityMissing, got {:?}", other.map(|_| ())),
        }
    }
}
