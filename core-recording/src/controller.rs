//! Recording controller.
//!
//! Owns the single in-flight capture session, its one-second elapsed tick
//! and metering listener, and the publish pipeline that runs when a capture
//! stops. The capture workflow mirrors the broadcast screen: optionally snap
//! a photo, record audio, then stop to upload and publish both as one
//! content item, with the uploaded audio played back as confirmation.

use crate::config::RecordingConfig;
use crate::error::{RecordingError, Result};
use crate::meter::pulse_scale;
use crate::session::RecordingSession;
use bridge_traits::media::{CameraDevice, CapturedPhoto, RecordedClip, RecorderEngine};
use bridge_traits::time::Clock;
use core_playback::PlaybackController;
use core_runtime::events::{ContentEvent, CoreEvent, EventBus, RecordingEvent, RecvError};
use provider_dpop::models::{ContentItem, MediaUpload, NewContent, UploadedMedia};
use provider_dpop::DpopClient;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// Fallback filename when a clip uri has no path segment.
const DEFAULT_CLIP_FILENAME: &str = "recording.m4a";

/// Result of a successful stop-and-publish.
#[derive(Debug, Clone)]
pub struct PublishedRecording {
    /// Upload receipt for the audio media.
    pub media: UploadedMedia,
    /// The created content record.
    pub content: ContentItem,
}

/// Background tasks owned by an active capture.
struct CaptureTasks {
    cancel: CancellationToken,
    tick: JoinHandle<()>,
    meter: JoinHandle<()>,
}

/// Single-flight microphone capture controller.
///
/// # Invariants
///
/// - At most one capture session exists at a time; a second `start` returns
///   [`RecordingError::RecordingInProgress`].
/// - `stop` resets elapsed time to zero and clears the pending photo before
///   any fallible publish step runs, so the reset holds regardless of upload
///   success or failure.
/// - Tick and metering tasks are cancelled on stop; no callback can fire
///   into a torn-down session.
pub struct RecordingController {
    recorder: Arc<dyn RecorderEngine>,
    camera: Option<Arc<dyn CameraDevice>>,
    playback: Arc<PlaybackController>,
    client: Arc<DpopClient>,
    event_bus: EventBus,
    clock: Arc<dyn Clock>,
    config: RecordingConfig,
    session: Arc<RwLock<Option<RecordingSession>>>,
    pending_photo: Arc<RwLock<Option<CapturedPhoto>>>,
    tasks: parking_lot::Mutex<Option<CaptureTasks>>,
}

impl RecordingController {
    /// Create a controller over the given capture bridges.
    ///
    /// # Arguments
    ///
    /// * `recorder` - Microphone capture engine
    /// * `camera` - Photo capture device, when the host has one
    /// * `playback` - Playback controller used for confirmation playback
    /// * `client` - DPoP API client for upload and content creation
    /// * `event_bus` - Event bus for recording/content events
    /// * `clock` - Time source for content timestamps
    /// * `config` - Tick interval, metering floor, confirmation playback
    pub fn new(
        recorder: Arc<dyn RecorderEngine>,
        camera: Option<Arc<dyn CameraDevice>>,
        playback: Arc<PlaybackController>,
        client: Arc<DpopClient>,
        event_bus: EventBus,
        clock: Arc<dyn Clock>,
        config: RecordingConfig,
    ) -> Self {
        Self {
            recorder,
            camera,
            playback,
            client,
            event_bus,
            clock,
            config,
            session: Arc::new(RwLock::new(None)),
            pending_photo: Arc::new(RwLock::new(None)),
            tasks: parking_lot::Mutex::new(None),
        }
    }

    /// Capture a photo and retain it for the next published recording.
    ///
    /// # Errors
    ///
    /// Returns [`RecordingError::CameraUnavailable`] when no camera bridge
    /// was configured.
    #[instrument(skip(self))]
    pub async fn capture_photo(&self) -> Result<CapturedPhoto> {
        let camera = self
            .camera
            .as_ref()
            .ok_or(RecordingError::CameraUnavailable)?;

        let photo = camera.capture_photo().await?;
        *self.pending_photo.write().await = Some(photo.clone());

        let _ = self
            .event_bus
            .emit(CoreEvent::Recording(RecordingEvent::PhotoCaptured {
                uri: photo.uri.clone(),
            }));
        info!(uri = %photo.uri, "Photo captured");
        Ok(photo)
    }

    /// Snap a photo, then immediately begin recording.
    ///
    /// The photo-first ordering is the broadcast workflow: the cover shot is
    /// taken in the moment the capture starts, not after.
    pub async fn capture_and_record(&self) -> Result<CapturedPhoto> {
        let photo = self.capture_photo().await?;
        self.start().await?;
        Ok(photo)
    }

    /// Begin a capture session.
    ///
    /// Requests microphone permission, starts the engine (which configures
    /// the capture audio session), resets the elapsed counter and spawns the
    /// tick and metering tasks.
    ///
    /// # Errors
    ///
    /// - [`RecordingError::RecordingInProgress`] when a capture is active
    /// - [`RecordingError::PermissionDenied`] when the microphone permission
    ///   request is refused
    #[instrument(skip(self))]
    pub async fn start(&self) -> Result<()> {
        {
            // Reserve the session slot before the first await so concurrent
            // starts cannot both pass the check.
            let mut guard = self.session.write().await;
            if guard.is_some() {
                return Err(RecordingError::RecordingInProgress);
            }
            *guard = Some(RecordingSession::new());
        }

        if let Err(e) = self.begin_capture().await {
            *self.session.write().await = None;
            return Err(e);
        }

        let _ = self
            .event_bus
            .emit(CoreEvent::Recording(RecordingEvent::Started));
        info!("Recording started");
        Ok(())
    }

    /// Stop the capture and publish it.
    ///
    /// The session state is reset (elapsed reads zero, `is_recording` is
    /// false) and the pending photo is taken before any fallible step, so
    /// the reset holds even when the engine, upload, or content creation
    /// fails. On success the uploaded audio is played back as confirmation.
    #[instrument(skip(self))]
    pub async fn stop(&self) -> Result<PublishedRecording> {
        // Cancel the timers and wait them out so no tick lands after the
        // reset below.
        let tasks = self.tasks.lock().take();
        if let Some(tasks) = tasks {
            tasks.cancel.cancel();
            let _ = tasks.tick.await;
            let _ = tasks.meter.await;
        }

        let finished = { self.session.write().await.take() };
        let Some(finished) = finished else {
            return Err(RecordingError::NotRecording);
        };
        let photo = { self.pending_photo.write().await.take() };

        let clip = match self.recorder.stop().await {
            Ok(clip) => clip,
            Err(e) => {
                self.emit_publish_failed(&e.to_string(), false);
                return Err(e.into());
            }
        };

        let _ = self
            .event_bus
            .emit(CoreEvent::Recording(RecordingEvent::Stopped {
                duration_secs: finished.elapsed_secs,
            }));
        info!(duration_secs = finished.elapsed_secs, "Recording stopped");

        self.publish(&finished, photo, clip).await
    }

    /// Whether a capture is in progress.
    pub async fn is_recording(&self) -> bool {
        self.session.read().await.is_some()
    }

    /// Elapsed capture time in whole seconds; zero when not recording.
    pub async fn elapsed_secs(&self) -> u64 {
        self.session
            .read()
            .await
            .as_ref()
            .map(|s| s.elapsed_secs)
            .unwrap_or(0)
    }

    /// Most recent pulse scale; zero when not recording.
    pub async fn meter_scale(&self) -> f32 {
        self.session
            .read()
            .await
            .as_ref()
            .map(|s| s.meter_scale)
            .unwrap_or(0.0)
    }

    /// The photo waiting to be bundled with the next published recording.
    pub async fn pending_photo(&self) -> Option<CapturedPhoto> {
        self.pending_photo.read().await.clone()
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    async fn begin_capture(&self) -> Result<()> {
        let permission = self.recorder.request_permission().await?;
        if !permission.is_granted() {
            warn!("Microphone permission denied");
            return Err(RecordingError::PermissionDenied);
        }

        self.recorder.start().await?;

        let cancel = CancellationToken::new();
        let tick = self.spawn_tick_task(cancel.clone());
        let meter = self.spawn_meter_task(cancel.clone());
        *self.tasks.lock() = Some(CaptureTasks {
            cancel,
            tick,
            meter,
        });
        Ok(())
    }

    /// One-second wall-clock tick driving the elapsed counter.
    fn spawn_tick_task(&self, cancel: CancellationToken) -> JoinHandle<()> {
        let session = Arc::clone(&self.session);
        let bus = self.event_bus.clone();
        let tick_interval = self.config.tick_interval;
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(tick_interval);
            // The first tick of a tokio interval completes immediately.
            interval.tick().await;
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = interval.tick() => {
                        let elapsed = {
                            let mut guard = session.write().await;
                            match guard.as_mut() {
                                Some(s) => {
                                    s.elapsed_secs += 1;
                                    Some(s.elapsed_secs)
                                }
                                None => None,
                            }
                        };
                        match elapsed {
                            Some(elapsed_secs) => {
                                let _ = bus.emit(CoreEvent::Recording(RecordingEvent::Tick {
                                    elapsed_secs,
                                }));
                            }
                            None => break,
                        }
                    }
                }
            }
        })
    }

    /// Metering listener mapping engine levels to the pulse scale.
    fn spawn_meter_task(&self, cancel: CancellationToken) -> JoinHandle<()> {
        let session = Arc::clone(&self.session);
        let bus = self.event_bus.clone();
        let floor_db = self.config.metering_floor_db;
        let mut receiver = self.recorder.metering_events();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    result = receiver.recv() => match result {
                        Ok(update) => {
                            let scale = pulse_scale(update.level_db, floor_db);
                            {
                                let mut guard = session.write().await;
                                if let Some(s) = guard.as_mut() {
                                    s.meter_scale = scale;
                                }
                            }
                            let _ = bus.emit(CoreEvent::Recording(RecordingEvent::Meter {
                                level_db: update.level_db,
                                scale,
                            }));
                        }
                        Err(RecvError::Lagged(missed)) => {
                            debug!(missed, "Metering listener lagged");
                        }
                        Err(RecvError::Closed) => break,
                    }
                }
            }
        })
    }

    /// Upload the clip (and photo, when present), create the content record
    /// and trigger confirmation playback.
    async fn publish(
        &self,
        finished: &RecordingSession,
        photo: Option<CapturedPhoto>,
        clip: RecordedClip,
    ) -> Result<PublishedRecording> {
        let captured_at = self.clock.now();

        let audio_exif = serde_json::json!({
            "duration_secs": clip.duration_secs.max(finished.elapsed_secs),
            "captured_at": captured_at.to_rfc3339(),
        });
        let audio_upload = MediaUpload {
            filename: filename_from_uri(&clip.uri),
            content_type: "audio/mp4".to_string(),
            data: clip.data,
        };

        let uploaded = match self.client.upload_media(&audio_upload, &audio_exif).await {
            Ok(uploaded) => uploaded,
            Err(e) => {
                self.emit_publish_failed(&e.to_string(), e.is_transient());
                return Err(e.into());
            }
        };
        let _ = self.event_bus.emit(CoreEvent::Content(ContentEvent::Uploaded {
            url: uploaded.url.clone(),
        }));

        // Photo upload is best-effort: a recording without its cover still
        // publishes.
        let image_url = match &photo {
            Some(photo) => {
                let photo_exif = serde_json::json!({
                    "width": photo.width,
                    "height": photo.height,
                    "captured_at": captured_at.to_rfc3339(),
                });
                let photo_upload = MediaUpload {
                    filename: filename_from_uri(&photo.uri),
                    content_type: "image/jpeg".to_string(),
                    data: photo.data.clone(),
                };
                match self.client.upload_media(&photo_upload, &photo_exif).await {
                    Ok(receipt) => Some(receipt.url),
                    Err(e) => {
                        warn!(error = %e, "Photo upload failed, publishing without cover");
                        None
                    }
                }
            }
            None => None,
        };

        let new_content = NewContent {
            kind: "audio".to_string(),
            url: uploaded.url.clone(),
            image_url,
            width: photo.as_ref().map(|p| p.width),
            height: photo.as_ref().map(|p| p.height),
            duration_secs: Some(clip.duration_secs.max(finished.elapsed_secs)),
            captured_at,
        };

        let content = match self.client.create_content(&new_content).await {
            Ok(content) => content,
            Err(e) => {
                self.emit_publish_failed(&e.to_string(), e.is_transient());
                return Err(e.into());
            }
        };
        let _ = self
            .event_bus
            .emit(CoreEvent::Content(ContentEvent::Published {
                content_id: content.id,
            }));
        info!(content_id = content.id, "Recording published");

        // Audible confirmation. A failure here never fails the publish: the
        // content record already exists, and the playback controller has
        // emitted its own error event.
        if self.config.confirmation_playback {
            if let Err(e) = self.playback.play(&uploaded.url, None).await {
                warn!(error = %e, "Confirmation playback failed");
            }
        }

        Ok(PublishedRecording {
            media: uploaded,
            content,
        })
    }

    fn emit_publish_failed(&self, message: &str, recoverable: bool) {
        let _ = self
            .event_bus
            .emit(CoreEvent::Content(ContentEvent::PublishFailed {
                message: message.to_string(),
                recoverable,
            }));
    }
}

impl std::fmt::Debug for RecordingController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordingController")
            .field("config", &self.config)
            .field("has_camera", &self.camera.is_some())
            .finish()
    }
}

fn filename_from_uri(uri: &str) -> String {
    uri.rsplit('/')
        .next()
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_CLIP_FILENAME)
        .to_string()
}
