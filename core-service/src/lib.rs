//! Core service façade and bootstrap helpers.
//!
//! This crate wires host-provided bridge implementations (HTTP, secure
//! store, settings store, audio engines, camera) into the Detroit Art core:
//! the DPoP API client, the auth manager, and the playback and recording
//! controllers. Desktop apps typically enable the `desktop-shims` feature
//! (which provides reqwest/SQLite/keyring bridges through `core-runtime`),
//! and inject their platform audio engines on top.
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::CoreConfig;
//! use core_service::DetroitArtService;
//!
//! let config = CoreConfig::builder()
//!     .with_desktop_bridges(data_dir)
//!     .await?
//!     .playback_engine(playback_engine)
//!     .recorder_engine(recorder_engine)
//!     .build()?;
//!
//! let service = DetroitArtService::new(config)?;
//! service.start();
//!
//! service.auth().restore().await?;
//! service.playback().play("https://cdn.dpop.tech/m/42.m4a", None).await?;
//! ```

pub mod error;

pub use error::{CoreError, Result};

use bridge_traits::media::CapturedPhoto;
use core_auth::{AuthManager, ContactCard};
use core_playback::{PlaybackConfig, PlaybackController};
use core_recording::{PublishedRecording, RecordingConfig, RecordingController};
use core_runtime::config::CoreConfig;
use core_runtime::events::EventBus;
use provider_dpop::models::{CheckIn, Rsvp, RsvpRequest};
use provider_dpop::DpopClient;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Primary façade exposed to host applications.
///
/// Owns the event bus, the shared API client, the auth manager and both
/// media controllers. Controllers are reachable through accessors; the
/// façade itself adds the small amount of cross-cutting glue the screens
/// need (check-in with local record, RSVP with the stored contact card,
/// photo-then-record capture).
pub struct DetroitArtService {
    event_bus: EventBus,
    client: Arc<DpopClient>,
    auth: Arc<AuthManager>,
    playback: Arc<PlaybackController>,
    recording: Arc<RecordingController>,
    cancel: CancellationToken,
    status_listener: parking_lot::Mutex<Option<JoinHandle<()>>>,
}

impl DetroitArtService {
    /// Create a service with default controller tuning.
    pub fn new(config: CoreConfig) -> Result<Self> {
        Self::with_tuning(config, PlaybackConfig::default(), RecordingConfig::default())
    }

    /// Create a service with explicit playback and recording tuning.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InitializationFailed`] when a tuning value is
    /// out of range.
    pub fn with_tuning(
        config: CoreConfig,
        playback_config: PlaybackConfig,
        recording_config: RecordingConfig,
    ) -> Result<Self> {
        playback_config
            .validate()
            .map_err(CoreError::InitializationFailed)?;
        recording_config
            .validate()
            .map_err(CoreError::InitializationFailed)?;

        let event_bus = EventBus::new(config.event_capacity);
        let client = Arc::new(DpopClient::new(
            config.http_client.clone(),
            config.api_base_url.clone(),
        ));

        let auth = Arc::new(AuthManager::new(
            config.secure_store.clone(),
            config.settings_store.clone(),
            event_bus.clone(),
            client.clone(),
            config.clock.clone(),
        ));

        let playback = Arc::new(PlaybackController::new(
            config.playback_engine.clone(),
            event_bus.clone(),
            playback_config,
        ));

        let recording = Arc::new(RecordingController::new(
            config.recorder_engine.clone(),
            config.camera.clone(),
            playback.clone(),
            client.clone(),
            event_bus.clone(),
            config.clock.clone(),
            recording_config,
        ));

        info!(api_base_url = %config.api_base_url, "Core service constructed");
        Ok(Self {
            event_bus,
            client,
            auth,
            playback,
            recording,
            cancel: CancellationToken::new(),
            status_listener: parking_lot::Mutex::new(None),
        })
    }

    /// Start background machinery (the playback status listener).
    ///
    /// Idempotent; calling `start` twice is a no-op.
    pub fn start(&self) {
        let mut listener = self.status_listener.lock();
        if listener.is_some() {
            debug!("Service already started");
            return;
        }
        *listener = Some(self.playback.spawn_status_listener(self.cancel.clone()));
        info!("Core service started");
    }

    /// Stop background machinery and halt any active playback.
    pub async fn shutdown(&self) -> Result<()> {
        self.cancel.cancel();
        let listener = self.status_listener.lock().take();
        if let Some(handle) = listener {
            let _ = handle.await;
        }
        self.playback.stop().await?;
        info!("Core service shut down");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// The event bus carrying auth, playback, recording and content events.
    pub fn events(&self) -> &EventBus {
        &self.event_bus
    }

    /// The shared DPoP API client.
    pub fn client(&self) -> &Arc<DpopClient> {
        &self.client
    }

    /// The authentication manager.
    pub fn auth(&self) -> &Arc<AuthManager> {
        &self.auth
    }

    /// The playback controller.
    pub fn playback(&self) -> &Arc<PlaybackController> {
        &self.playback
    }

    /// The recording controller.
    pub fn recording(&self) -> &Arc<RecordingController> {
        &self.recording
    }

    // ------------------------------------------------------------------
    // Cross-cutting glue
    // ------------------------------------------------------------------

    /// Check in to an event and record it locally, so the device remembers
    /// attended events across restarts.
    pub async fn check_in(&self, event_id: i64) -> Result<CheckIn> {
        let check_in = self.client.check_in(event_id).await?;
        self.auth.session_store().record_check_in(&check_in).await?;
        Ok(check_in)
    }

    /// The locally recorded check-in for an event, if any.
    pub async fn local_check_in(&self, event_id: i64) -> Result<Option<CheckIn>> {
        Ok(self.auth.session_store().load_check_in(event_id).await?)
    }

    /// RSVP to an event using the stored contact card (all fields empty
    /// when none is stored).
    pub async fn rsvp(&self, event_id: i64) -> Result<Rsvp> {
        let contact = self.auth.session_store().load_contact().await?;
        let request = match contact {
            Some(card) => RsvpRequest {
                name: Some(card.name),
                email: card.email,
                phone: card.phone,
            },
            None => RsvpRequest {
                name: None,
                email: None,
                phone: None,
            },
        };
        Ok(self.client.rsvp(event_id, &request).await?)
    }

    /// Persist the contact card used for future RSVPs.
    pub async fn save_contact(&self, contact: &ContactCard) -> Result<()> {
        Ok(self.auth.session_store().store_contact(contact).await?)
    }

    /// Snap a photo and begin recording (the broadcast workflow), returning
    /// the captured photo.
    pub async fn capture_and_record(&self) -> Result<CapturedPhoto> {
        Ok(self.recording.capture_and_record().await?)
    }

    /// Stop the active recording and publish it.
    pub async fn stop_and_publish(&self) -> Result<PublishedRecording> {
        Ok(self.recording.stop().await?)
    }
}

impl std::fmt::Debug for DetroitArtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DetroitArtService")
            .field("client", &self.client)
            .finish()
    }
}
