//! Integration tests for the recording controller: wall-clock tick,
//! metering, single-flight enforcement and the stop/publish pipeline.

use bridge_traits::error::{BridgeError, Result as BridgeResult};
use bridge_traits::http::{HttpClient, HttpRequest, HttpResponse};
use bridge_traits::media::{
    CameraDevice, CapturedPhoto, EngineStatus, LoadedAudio, MeteringUpdate, PermissionStatus,
    PlaybackEngine, PlaybackRouting, RecordedClip, RecorderEngine,
};
use bytes::Bytes;
use core_playback::{PlaybackConfig, PlaybackController};
use core_recording::{RecordingConfig, RecordingController, RecordingError};
use core_runtime::events::{ContentEvent, CoreEvent, EventBus, RecordingEvent};
use mockall::mock;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;

// ----------------------------------------------------------------------
// Mock bridges
// ----------------------------------------------------------------------

struct MockRecorder {
    permission: Mutex<PermissionStatus>,
    started: Mutex<bool>,
    metering_tx: broadcast::Sender<MeteringUpdate>,
}

impl MockRecorder {
    fn new() -> Arc<Self> {
        let (metering_tx, _) = broadcast::channel(32);
        Arc::new(Self {
            permission: Mutex::new(PermissionStatus::Granted),
            started: Mutex::new(false),
            metering_tx,
        })
    }

    fn deny_permission(&self) {
        *self.permission.lock() = PermissionStatus::Denied;
    }

    fn emit_level(&self, level_db: f32) {
        self.metering_tx.send(MeteringUpdate { level_db }).ok();
    }
}

#[async_trait::async_trait]
impl RecorderEngine for MockRecorder {
    async fn request_permission(&self) -> BridgeResult<PermissionStatus> {
        Ok(*self.permission.lock())
    }

    async fn start(&self) -> BridgeResult<()> {
        *self.started.lock() = true;
        Ok(())
    }

    async fn stop(&self) -> BridgeResult<RecordedClip> {
        if !*self.started.lock() {
            return Err(BridgeError::OperationFailed("not recording".to_string()));
        }
        *self.started.lock() = false;
        Ok(RecordedClip {
            uri: "file:///caches/rec/clip-1.m4a".to_string(),
            data: Bytes::from_static(b"encoded-audio"),
            duration_secs: 3,
        })
    }

    fn metering_events(&self) -> broadcast::Receiver<MeteringUpdate> {
        self.metering_tx.subscribe()
    }
}

struct MockPlaybackEngine {
    loads: Mutex<Vec<String>>,
    status_tx: broadcast::Sender<EngineStatus>,
}

impl MockPlaybackEngine {
    fn new() -> Arc<Self> {
        let (status_tx, _) = broadcast::channel(8);
        Arc::new(Self {
            loads: Mutex::new(Vec::new()),
            status_tx,
        })
    }

    fn loads(&self) -> Vec<String> {
        self.loads.lock().clone()
    }
}

#[async_trait::async_trait]
impl PlaybackEngine for MockPlaybackEngine {
    async fn set_routing(&self, _routing: PlaybackRouting) -> BridgeResult<()> {
        Ok(())
    }

    async fn load(&self, uri: &str) -> BridgeResult<LoadedAudio> {
        self.loads.lock().push(uri.to_string());
        Ok(LoadedAudio { duration: None })
    }

    async fn play(&self) -> BridgeResult<()> {
        Ok(())
    }

    async fn stop_and_unload(&self) -> BridgeResult<()> {
        Ok(())
    }

    async fn seek(&self, _position: Duration) -> BridgeResult<()> {
        Ok(())
    }

    fn status_events(&self) -> broadcast::Receiver<EngineStatus> {
        self.status_tx.subscribe()
    }
}

mock! {
    Camera {}

    #[async_trait::async_trait]
    impl CameraDevice for Camera {
        async fn capture_photo(&self) -> BridgeResult<CapturedPhoto>;
    }
}

struct MockHttpClient {
    responses: Mutex<VecDeque<(u16, String)>>,
    urls: Mutex<Vec<String>>,
}

impl MockHttpClient {
    fn new(responses: Vec<(u16, &str)>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(
                responses
                    .into_iter()
                    .map(|(s, b)| (s, b.to_string()))
                    .collect(),
            ),
            urls: Mutex::new(Vec::new()),
        })
    }

    fn urls(&self) -> Vec<String> {
        self.urls.lock().clone()
    }
}

#[async_trait::async_trait]
impl HttpClient for MockHttpClient {
    async fn execute(&self, request: HttpRequest) -> BridgeResult<HttpResponse> {
        self.urls.lock().push(request.url.clone());
        let (status, body) = self
            .responses
            .lock()
            .pop_front()
            .ok_or_else(|| BridgeError::OperationFailed("no canned response".to_string()))?;
        Ok(HttpResponse {
            status,
            headers: HashMap::new(),
            body: Bytes::from(body),
        })
    }
}

// ----------------------------------------------------------------------
// Fixture
// ----------------------------------------------------------------------

struct Fixture {
    recorder: Arc<MockRecorder>,
    playback_engine: Arc<MockPlaybackEngine>,
    controller: RecordingController,
    bus: EventBus,
    http: Arc<MockHttpClient>,
}

fn photo() -> CapturedPhoto {
    CapturedPhoto {
        uri: "file:///caches/photos/shot-1.jpg".to_string(),
        width: 640,
        height: 480,
        data: Bytes::from_static(b"jpeg-bytes"),
    }
}

fn fixture_with(responses: Vec<(u16, &str)>, camera: Option<MockCamera>) -> Fixture {
    let recorder = MockRecorder::new();
    let playback_engine = MockPlaybackEngine::new();
    let bus = EventBus::new(100);
    let http = MockHttpClient::new(responses);
    let client = Arc::new(provider_dpop::DpopClient::new(
        http.clone(),
        "https://api.dpop.tech/api",
    ));
    let playback = Arc::new(PlaybackController::new(
        playback_engine.clone(),
        bus.clone(),
        PlaybackConfig::default(),
    ));
    let controller = RecordingController::new(
        recorder.clone(),
        camera.map(|c| Arc::new(c) as Arc<dyn CameraDevice>),
        playback,
        client,
        bus.clone(),
        Arc::new(bridge_traits::time::SystemClock),
        RecordingConfig::default(),
    );
    Fixture {
        recorder,
        playback_engine,
        controller,
        bus,
        http,
    }
}

const UPLOAD_OK: (u16, &str) = (200, r#"{"url":"https://cdn.dpop.tech/m/9.m4a"}"#);
const PHOTO_UPLOAD_OK: (u16, &str) = (200, r#"{"url":"https://cdn.dpop.tech/i/9.jpg"}"#);
const CONTENT_OK: (u16, &str) = (200, r#"{"id":7,"type":"audio","url":"https://cdn.dpop.tech/m/9.m4a"}"#);

async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}

async fn advance_secs(secs: u64) {
    for _ in 0..secs {
        tokio::time::advance(Duration::from_secs(1)).await;
        settle().await;
    }
}

fn drain(receiver: &mut core_runtime::events::Receiver<CoreEvent>) -> Vec<CoreEvent> {
    let mut events = Vec::new();
    while let Ok(event) = receiver.try_recv() {
        events.push(event);
    }
    events
}

// ----------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn tick_counts_wall_clock_seconds() {
    let fx = fixture_with(vec![UPLOAD_OK, CONTENT_OK], None);

    fx.controller.start().await.unwrap();
    settle().await;

    advance_secs(3).await;
    assert_eq!(fx.controller.elapsed_secs().await, 3);
    assert!(fx.controller.is_recording().await);

    let published = fx.controller.stop().await.unwrap();
    assert_eq!(published.content.id, 7);

    // Elapsed resets and the session is gone.
    assert_eq!(fx.controller.elapsed_secs().await, 0);
    assert!(!fx.controller.is_recording().await);

    // No further ticks accrue after stop.
    advance_secs(2).await;
    assert_eq!(fx.controller.elapsed_secs().await, 0);
}

#[tokio::test(start_paused = true)]
async fn tick_events_carry_elapsed_seconds() {
    let fx = fixture_with(vec![], None);
    let mut events = fx.bus.subscribe();

    fx.controller.start().await.unwrap();
    settle().await;
    advance_secs(2).await;

    let ticks: Vec<u64> = drain(&mut events)
        .into_iter()
        .filter_map(|e| match e {
            CoreEvent::Recording(RecordingEvent::Tick { elapsed_secs }) => Some(elapsed_secs),
            _ => None,
        })
        .collect();
    assert_eq!(ticks, vec![1, 2]);
}

#[tokio::test]
async fn concurrent_start_is_rejected() {
    let fx = fixture_with(vec![], None);

    fx.controller.start().await.unwrap();
    let err = fx.controller.start().await.unwrap_err();
    assert!(matches!(err, RecordingError::RecordingInProgress));
}

#[tokio::test]
async fn stop_without_start_errors() {
    let fx = fixture_with(vec![], None);
    let err = fx.controller.stop().await.unwrap_err();
    assert!(matches!(err, RecordingError::NotRecording));
}

#[tokio::test]
async fn permission_denial_aborts_start() {
    let fx = fixture_with(vec![], None);
    fx.recorder.deny_permission();

    let err = fx.controller.start().await.unwrap_err();
    assert!(matches!(err, RecordingError::PermissionDenied));
    assert!(!fx.controller.is_recording().await);
}

#[tokio::test]
async fn metering_updates_map_to_pulse_scale() {
    let fx = fixture_with(vec![], None);
    let mut events = fx.bus.subscribe();

    fx.controller.start().await.unwrap();
    settle().await;

    fx.recorder.emit_level(-40.0);
    settle().await;

    assert_eq!(fx.controller.meter_scale().await, 0.5);

    let meters: Vec<(f32, f32)> = drain(&mut events)
        .into_iter()
        .filter_map(|e| match e {
            CoreEvent::Recording(RecordingEvent::Meter { level_db, scale }) => {
                Some((level_db, scale))
            }
            _ => None,
        })
        .collect();
    assert_eq!(meters, vec![(-40.0, 0.5)]);
}

#[tokio::test]
async fn capture_and_record_retains_photo_then_starts() {
    let mut camera = MockCamera::new();
    camera
        .expect_capture_photo()
        .times(1)
        .returning(|| Ok(photo()));
    let fx = fixture_with(vec![], Some(camera));
    let mut events = fx.bus.subscribe();

    let captured = fx.controller.capture_and_record().await.unwrap();
    assert_eq!(captured.width, 640);
    assert!(fx.controller.is_recording().await);
    assert_eq!(fx.controller.pending_photo().await, Some(photo()));

    let events = drain(&mut events);
    assert!(matches!(
        events[0],
        CoreEvent::Recording(RecordingEvent::PhotoCaptured { .. })
    ));
    assert!(matches!(
        events[1],
        CoreEvent::Recording(RecordingEvent::Started)
    ));
}

#[tokio::test]
async fn capture_photo_without_camera_errors() {
    let fx = fixture_with(vec![], None);
    let err = fx.controller.capture_photo().await.unwrap_err();
    assert!(matches!(err, RecordingError::CameraUnavailable));
}

#[tokio::test(start_paused = true)]
async fn stop_publishes_audio_photo_and_content() {
    let mut camera = MockCamera::new();
    camera
        .expect_capture_photo()
        .times(1)
        .returning(|| Ok(photo()));
    let fx = fixture_with(vec![UPLOAD_OK, PHOTO_UPLOAD_OK, CONTENT_OK], Some(camera));
    let mut events = fx.bus.subscribe();

    fx.controller.capture_and_record().await.unwrap();
    settle().await;
    advance_secs(3).await;

    let published = fx.controller.stop().await.unwrap();
    assert_eq!(published.media.url, "https://cdn.dpop.tech/m/9.m4a");
    assert_eq!(published.content.id, 7);

    // Audio upload, photo upload, then content creation.
    let urls = fx.http.urls();
    assert_eq!(urls[0], "https://api.dpop.tech/api/upload-media");
    assert_eq!(urls[1], "https://api.dpop.tech/api/upload-media");
    assert_eq!(urls[2], "https://api.dpop.tech/api/content");

    // Confirmation playback of the uploaded audio.
    settle().await;
    assert_eq!(
        fx.playback_engine.loads(),
        vec!["https://cdn.dpop.tech/m/9.m4a".to_string()]
    );

    let events = drain(&mut events);
    assert!(events.iter().any(|e| matches!(
        e,
        CoreEvent::Content(ContentEvent::Uploaded { url }) if url == "https://cdn.dpop.tech/m/9.m4a"
    )));
    assert!(events.iter().any(|e| matches!(
        e,
        CoreEvent::Content(ContentEvent::Published { content_id: 7 })
    )));
    assert!(events.iter().any(|e| matches!(
        e,
        CoreEvent::Recording(RecordingEvent::Stopped { duration_secs: 3 })
    )));
}

#[tokio::test(start_paused = true)]
async fn stop_resets_state_even_when_upload_fails() {
    let mut camera = MockCamera::new();
    camera
        .expect_capture_photo()
        .times(1)
        .returning(|| Ok(photo()));
    let fx = fixture_with(vec![(500, r#"{"message":"storage down"}"#)], Some(camera));
    let mut events = fx.bus.subscribe();

    fx.controller.capture_and_record().await.unwrap();
    settle().await;
    advance_secs(2).await;

    let err = fx.controller.stop().await.unwrap_err();
    assert!(matches!(err, RecordingError::Publish(_)));

    // The reset holds regardless of the failure.
    assert_eq!(fx.controller.elapsed_secs().await, 0);
    assert!(!fx.controller.is_recording().await);
    assert!(fx.controller.pending_photo().await.is_none());

    // And the failure is surfaced on the bus.
    let events = drain(&mut events);
    assert!(events.iter().any(|e| matches!(
        e,
        CoreEvent::Content(ContentEvent::PublishFailed { recoverable: true, .. })
    )));

    // A new capture can start immediately.
    fx.controller.start().await.unwrap();
    assert!(fx.controller.is_recording().await);
}

#[tokio::test]
async fn recording_without_photo_publishes_audio_only() {
    let fx = fixture_with(vec![UPLOAD_OK, CONTENT_OK], None);

    fx.controller.start().await.unwrap();
    let published = fx.controller.stop().await.unwrap();

    assert_eq!(published.content.id, 7);
    // Only two requests: audio upload and content creation.
    assert_eq!(fx.http.urls().len(), 2);
}
