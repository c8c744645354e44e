//! Typed event bus.
//!
//! Controllers publish their state changes as [`CoreEvent`] values on a
//! shared [`EventBus`] (a `tokio::sync::broadcast` channel); hosts subscribe
//! to drive UI without polling the controllers. Events are grouped by domain:
//! auth session changes, playback lifecycle and position, recording ticks
//! and metering, and content publishing.
//!
//! Subscribers that fall behind the channel capacity receive
//! [`RecvError::Lagged`] with the number of dropped events and keep
//! receiving from there; [`RecvError::Closed`] means every sender is gone.
//! Position and tick events arrive at engine cadence, so slow consumers
//! should expect occasional lag rather than treat it as fatal.

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast;

pub use tokio::sync::broadcast::error::{RecvError, SendError};
pub use tokio::sync::broadcast::Receiver;

/// Event capacity used when none is configured.
///
/// Sized for bursts of position updates at the playback engine's status
/// cadence without dropping slower consumers.
pub const DEFAULT_EVENT_CAPACITY: usize = 100;

/// Any event the core can emit, tagged by domain.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "payload")]
pub enum CoreEvent {
    Auth(AuthEvent),
    Playback(PlaybackEvent),
    Recording(RecordingEvent),
    Content(ContentEvent),
}

/// Events related to authentication and the local session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event")]
pub enum AuthEvent {
    /// Authentication flow in progress.
    SigningIn,
    /// User successfully authenticated.
    SignedIn {
        /// Backend user id.
        user_id: i64,
        /// Account email, when the backend returns it.
        email: Option<String>,
    },
    /// A new account was created (always followed by `SignedIn`).
    Registered {
        /// Backend user id.
        user_id: i64,
    },
    /// User signed out; local session and stored credentials cleared.
    SignedOut {
        /// Backend user id of the session that ended.
        user_id: i64,
    },
    /// Authentication failed.
    AuthError {
        message: String,
        /// Whether retrying the same operation can succeed.
        recoverable: bool,
    },
}

/// Events related to audio playback.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event")]
pub enum PlaybackEvent {
    /// Playback of a source started.
    Started { uri: String },
    /// Playback stopped (explicitly or through replacement).
    Stopped { uri: String },
    /// Source played through to its end.
    Completed { uri: String },
    /// Playhead position updated (status cadence or seek).
    PositionChanged {
        uri: String,
        position_secs: f64,
        duration_secs: Option<f64>,
    },
    /// A lagging seek was re-issued by the drift-correction policy.
    SeekCorrected {
        uri: String,
        /// The pending seek target in seconds.
        target_secs: f64,
        /// The engine-reported position that triggered the correction.
        observed_secs: f64,
    },
    /// Playback failed.
    Error {
        /// Resource locator, if a source was involved.
        uri: Option<String>,
        message: String,
        /// Whether retrying the same operation can succeed.
        recoverable: bool,
    },
}

/// Events related to microphone capture.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event")]
pub enum RecordingEvent {
    /// Capture started.
    Started,
    /// One-second wall-clock tick while recording.
    Tick {
        /// Seconds elapsed since capture started.
        elapsed_secs: u64,
    },
    /// Input-level sample mapped to the UI pulse scale.
    Meter {
        /// Raw level in dBFS-like units.
        level_db: f32,
        /// Normalized pulse scale in `[0, 1]`.
        scale: f32,
    },
    /// A photo was captured for the upcoming recording.
    PhotoCaptured {
        /// Device-local photo locator.
        uri: String,
    },
    /// Capture stopped and finalized.
    Stopped {
        /// Total capture length in seconds.
        duration_secs: u64,
    },
}

/// Events related to publishing recorded content to the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event")]
pub enum ContentEvent {
    /// Media file uploaded successfully.
    Uploaded {
        /// Public URL of the uploaded media.
        url: String,
    },
    /// Content record created on the backend.
    Published {
        /// Backend content id.
        content_id: i64,
    },
    /// Upload or content creation failed.
    PublishFailed {
        message: String,
        /// Whether retrying the same operation can succeed.
        recoverable: bool,
    },
}

/// Broadcast sender handle for [`CoreEvent`]s.
///
/// Cloning is cheap and every clone publishes into the same channel. Each
/// [`subscribe`](EventBus::subscribe) call yields an independent receiver
/// that sees all events emitted after it was created; nothing is replayed.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CoreEvent>,
}

impl EventBus {
    /// Create a bus able to buffer `capacity` events per subscriber before
    /// the slowest subscriber starts lagging.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event.
    ///
    /// Returns how many subscribers received it, or `Err` when nobody is
    /// listening. Controllers ignore the error; an event with no audience is
    /// not a failure.
    pub fn emit(&self, event: CoreEvent) -> Result<usize, SendError<CoreEvent>> {
        self.sender.send(event)
    }

    /// Open a new subscription.
    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.sender.subscribe()
    }

    /// How many receivers are currently open.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

type EventPredicate = Box<dyn Fn(&CoreEvent) -> bool + Send + Sync>;

/// A receiver with an optional predicate, for subscribers that only care
/// about one domain of events.
pub struct EventStream {
    receiver: Receiver<CoreEvent>,
    predicate: Option<EventPredicate>,
}

impl EventStream {
    pub fn new(receiver: Receiver<CoreEvent>) -> Self {
        Self {
            receiver,
            predicate: None,
        }
    }

    /// Restrict the stream to events matching `predicate`. Non-matching
    /// events are silently skipped by `recv`/`try_recv`.
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&CoreEvent) -> bool + Send + Sync + 'static,
    {
        self.predicate = Some(Box::new(predicate));
        self
    }

    /// Wait for the next matching event.
    ///
    /// Lag is propagated as [`RecvError::Lagged`] so callers can decide
    /// whether dropped events matter to them.
    pub async fn recv(&mut self) -> Result<CoreEvent, RecvError> {
        loop {
            let event = self.receiver.recv().await?;
            if self.matches(&event) {
                return Ok(event);
            }
        }
    }

    /// Poll for a matching event without waiting. `None` means the channel
    /// is currently empty.
    pub fn try_recv(&mut self) -> Option<Result<CoreEvent, RecvError>> {
        use broadcast::error::TryRecvError;
        loop {
            match self.receiver.try_recv() {
                Ok(event) if self.matches(&event) => return Some(Ok(event)),
                Ok(_) => continue,
                Err(TryRecvError::Empty) => return None,
                Err(TryRecvError::Lagged(n)) => return Some(Err(RecvError::Lagged(n))),
                Err(TryRecvError::Closed) => return Some(Err(RecvError::Closed)),
            }
        }
    }

    fn matches(&self, event: &CoreEvent) -> bool {
        self.predicate.as_ref().map_or(true, |p| p(event))
    }
}

impl fmt::Debug for EventStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream")
            .field("filtered", &self.predicate.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn emit_without_subscribers_is_err() {
        let bus = EventBus::new(8);
        assert_eq!(bus.subscriber_count(), 0);
        assert!(bus
            .emit(CoreEvent::Recording(RecordingEvent::Started))
            .is_err());
    }

    #[tokio::test]
    async fn every_subscriber_sees_every_event() {
        let bus = EventBus::new(8);
        let mut first = bus.subscribe();
        let mut second = bus.subscribe();

        let event = CoreEvent::Content(ContentEvent::Published { content_id: 42 });
        assert_eq!(bus.emit(event.clone()).unwrap(), 2);

        assert_eq!(first.recv().await.unwrap(), event);
        assert_eq!(second.recv().await.unwrap(), event);
    }

    #[tokio::test]
    async fn filtered_stream_skips_other_domains() {
        let bus = EventBus::new(8);
        let mut recording_only = EventStream::new(bus.subscribe())
            .filter(|event| matches!(event, CoreEvent::Recording(_)));

        bus.emit(CoreEvent::Playback(PlaybackEvent::Stopped {
            uri: "file:///tmp/a.m4a".to_string(),
        }))
        .unwrap();
        let tick = CoreEvent::Recording(RecordingEvent::Tick { elapsed_secs: 3 });
        bus.emit(tick.clone()).unwrap();

        assert_eq!(recording_only.recv().await.unwrap(), tick);
        assert!(recording_only.try_recv().is_none());
    }

    #[tokio::test]
    async fn slow_subscriber_observes_lag() {
        let bus = EventBus::new(2);
        let mut slow = bus.subscribe();

        for elapsed_secs in 0..5 {
            bus.emit(CoreEvent::Recording(RecordingEvent::Tick { elapsed_secs }))
                .unwrap();
        }

        assert!(matches!(slow.recv().await, Err(RecvError::Lagged(_))));
    }

    #[tokio::test]
    async fn try_recv_on_empty_channel() {
        let bus = EventBus::default();
        let mut stream = EventStream::new(bus.subscribe());
        assert!(stream.try_recv().is_none());
    }

    #[test]
    fn events_survive_serde_round_trip() {
        let event = CoreEvent::Recording(RecordingEvent::Meter {
            level_db: -40.0,
            scale: 0.5,
        });
        let json = serde_json::to_string(&event).unwrap();
        let back: CoreEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn event_json_is_domain_tagged() {
        let event = CoreEvent::Auth(AuthEvent::SignedIn {
            user_id: 7,
            email: None,
        });
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""type":"Auth""#));
        assert!(json.contains(r#""event":"SignedIn""#));
    }
}
