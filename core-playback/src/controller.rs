//! Playback controller.
//!
//! Owns the single in-flight playback session and the drift-correction
//! policy for asynchronous seeks. All engine access goes through the
//! [`PlaybackEngine`] bridge; all state changes are mirrored onto the event
//! bus so hosts can render progress without polling.

use crate::config::PlaybackConfig;
use crate::error::{PlaybackError, Result};
use crate::session::PlaybackSession;
use bridge_traits::media::{EngineStatus, PlaybackEngine};
use core_runtime::events::{CoreEvent, EventBus, PlaybackEvent, RecvError};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// Outcome of applying one engine status sample, decided under the session
/// lock and acted on outside it.
enum StatusAction {
    /// Position accepted; notify subscribers.
    Position {
        uri: String,
        position: Duration,
        duration: Option<Duration>,
    },
    /// The engine lags a pending seek target; re-issue the seek.
    Reseek {
        uri: String,
        target: Duration,
        observed: Duration,
    },
    /// The source played to its end; the session was destroyed.
    Completed { uri: String },
}

/// Single-flight audio playback controller.
///
/// # Invariants
///
/// - At most one [`PlaybackSession`] exists at a time. `play` on a new uri
///   stops and unloads the previous source before loading the next.
/// - `seek_to` on the active uri never reloads the source.
/// - A pending seek target survives until the engine reports a position
///   within the configured drift tolerance of it; lagging positions trigger
///   a re-seek instead of being accepted.
///
/// # Example
///
/// ```ignore
/// use core_playback::{PlaybackConfig, PlaybackController};
///
/// let controller = Arc::new(PlaybackController::new(engine, event_bus, PlaybackConfig::default()));
/// let listener = controller.spawn_status_listener(cancel_token);
///
/// controller.play("https://cdn.dpop.tech/m/42.m4a", None).await?;
/// controller.seek_to("https://cdn.dpop.tech/m/42.m4a", Duration::from_secs(30)).await?;
/// controller.stop().await?;
/// ```
pub struct PlaybackController {
    engine: Arc<dyn PlaybackEngine>,
    event_bus: EventBus,
    config: PlaybackConfig,
    session: Arc<RwLock<Option<PlaybackSession>>>,
}

impl PlaybackController {
    /// Create a controller over the given engine.
    pub fn new(
        engine: Arc<dyn PlaybackEngine>,
        event_bus: EventBus,
        config: PlaybackConfig,
    ) -> Self {
        Self {
            engine,
            event_bus,
            config,
            session: Arc::new(RwLock::new(None)),
        }
    }

    /// Start playback of `uri`, replacing any active session.
    ///
    /// The previous source (if any) is stopped and unloaded first, audio
    /// routing is reconfigured, and elapsed time resets to zero. When
    /// `start_time` is given, the seek is issued immediately and recorded as
    /// the pending target; elapsed time is set optimistically.
    #[instrument(skip(self), fields(uri = %uri))]
    pub async fn play(&self, uri: &str, start_time: Option<Duration>) -> Result<()> {
        let previous = { self.session.write().await.take() };
        if let Some(prev) = previous {
            debug!(previous = %prev.uri, "Replacing active session");
            self.engine.stop_and_unload().await?;
            let _ = self
                .event_bus
                .emit(CoreEvent::Playback(PlaybackEvent::Stopped { uri: prev.uri }));
        }

        self.engine.set_routing(self.config.routing).await?;

        let loaded = match self.engine.load(uri).await {
            Ok(loaded) => loaded,
            Err(e) => {
                warn!(error = %e, "Failed to load source");
                let _ = self.event_bus.emit(CoreEvent::Playback(PlaybackEvent::Error {
                    uri: Some(uri.to_string()),
                    message: e.to_string(),
                    recoverable: true,
                }));
                return Err(PlaybackError::LoadFailed(e.to_string()));
            }
        };

        let mut session = PlaybackSession::new(uri);
        session.duration = loaded.duration;

        if let Some(start) = start_time {
            if !start.is_zero() {
                self.engine.seek(start).await?;
                session.seek_target = Some(start);
                session.elapsed = start;
            }
        }

        self.engine.play().await?;
        session.is_playing = true;

        *self.session.write().await = Some(session);
        let _ = self
            .event_bus
            .emit(CoreEvent::Playback(PlaybackEvent::Started {
                uri: uri.to_string(),
            }));
        info!("Playback started");
        Ok(())
    }

    /// Stop playback and destroy the session.
    ///
    /// Idempotent: stopping with no active session is a no-op.
    #[instrument(skip(self))]
    pub async fn stop(&self) -> Result<()> {
        let previous = { self.session.write().await.take() };
        let Some(prev) = previous else {
            debug!("Stop requested with no active session");
            return Ok(());
        };

        self.engine.stop_and_unload().await?;
        let _ = self
            .event_bus
            .emit(CoreEvent::Playback(PlaybackEvent::Stopped { uri: prev.uri }));
        info!("Playback stopped");
        Ok(())
    }

    /// Seek within the active source, or load-and-seek a different one.
    ///
    /// When `uri` matches the active session the seek happens in place:
    /// elapsed time is updated optimistically and the position is recorded
    /// as the pending target, with no reload. Otherwise this is equivalent
    /// to `play(uri, Some(position))`.
    #[instrument(skip(self), fields(uri = %uri, position_secs = position.as_secs_f64()))]
    pub async fn seek_to(&self, uri: &str, position: Duration) -> Result<()> {
        let active = {
            let mut guard = self.session.write().await;
            match guard.as_mut() {
                Some(session) if session.uri == uri => {
                    session.elapsed = position;
                    session.seek_target = Some(position);
                    Some(session.duration)
                }
                _ => None,
            }
        };

        let Some(duration) = active else {
            debug!("Seek target is not the active session, loading");
            return self.play(uri, Some(position)).await;
        };

        self.engine.seek(position).await?;
        let _ = self
            .event_bus
            .emit(CoreEvent::Playback(PlaybackEvent::PositionChanged {
                uri: uri.to_string(),
                position_secs: position.as_secs_f64(),
                duration_secs: duration.map(|d| d.as_secs_f64()),
            }));
        Ok(())
    }

    /// Apply one engine status sample.
    ///
    /// Normally driven by the listener task from
    /// [`spawn_status_listener`](Self::spawn_status_listener); exposed for
    /// hosts that forward engine callbacks directly.
    pub async fn handle_status(&self, status: EngineStatus) -> Result<()> {
        let action = {
            let mut guard = self.session.write().await;
            let Some(session) = guard.as_mut() else {
                return Ok(());
            };

            if let Some(duration) = status.duration {
                session.duration = Some(duration);
            }

            match session.seek_target {
                // Engine still lags the pending seek: re-issue rather than
                // letting the stale position walk the elapsed time backward.
                Some(target) if status.position + self.config.seek_drift_tolerance < target => {
                    StatusAction::Reseek {
                        uri: session.uri.clone(),
                        target,
                        observed: status.position,
                    }
                }
                _ => {
                    session.seek_target = None;
                    session.elapsed = status.position;
                    session.is_playing = status.is_playing;
                    let uri = session.uri.clone();
                    let duration = session.duration;

                    if status.finished {
                        *guard = None;
                        StatusAction::Completed { uri }
                    } else {
                        StatusAction::Position {
                            uri,
                            position: status.position,
                            duration,
                        }
                    }
                }
            }
        };

        match action {
            StatusAction::Position {
                uri,
                position,
                duration,
            } => {
                let _ = self
                    .event_bus
                    .emit(CoreEvent::Playback(PlaybackEvent::PositionChanged {
                        uri,
                        position_secs: position.as_secs_f64(),
                        duration_secs: duration.map(|d| d.as_secs_f64()),
                    }));
            }
            StatusAction::Reseek {
                uri,
                target,
                observed,
            } => {
                debug!(
                    target_secs = target.as_secs_f64(),
                    observed_secs = observed.as_secs_f64(),
                    "Re-issuing lagging seek"
                );
                let _ = self
                    .event_bus
                    .emit(CoreEvent::Playback(PlaybackEvent::SeekCorrected {
                        uri,
                        target_secs: target.as_secs_f64(),
                        observed_secs: observed.as_secs_f64(),
                    }));
                self.engine.seek(target).await?;
            }
            StatusAction::Completed { uri } => {
                info!(uri = %uri, "Source played to completion");
                let _ = self
                    .event_bus
                    .emit(CoreEvent::Playback(PlaybackEvent::Completed { uri }));
            }
        }

        Ok(())
    }

    /// Spawn the task that feeds engine status samples into
    /// [`handle_status`](Self::handle_status) until cancelled.
    pub fn spawn_status_listener(self: &Arc<Self>, cancel: CancellationToken) -> JoinHandle<()> {
        let controller = Arc::clone(self);
        let mut receiver = controller.engine.status_events();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    result = receiver.recv() => match result {
                        Ok(status) => {
                            if let Err(e) = controller.handle_status(status).await {
                                warn!(error = %e, "Failed to apply engine status");
                            }
                        }
                        Err(RecvError::Lagged(missed)) => {
                            debug!(missed, "Status listener lagged");
                        }
                        Err(RecvError::Closed) => break,
                    }
                }
            }
            debug!("Status listener stopped");
        })
    }

    /// Snapshot of the active session, if any.
    pub async fn current(&self) -> Option<PlaybackSession> {
        self.session.read().await.clone()
    }

    /// Current elapsed time; zero when nothing is playing.
    pub async fn elapsed(&self) -> Duration {
        self.session
            .read()
            .await
            .as_ref()
            .map(|s| s.elapsed)
            .unwrap_or(Duration::ZERO)
    }

    /// Whether a session is active and playing.
    pub async fn is_playing(&self) -> bool {
        self.session
            .read()
            .await
            .as_ref()
            .map(|s| s.is_playing)
            .unwrap_or(false)
    }
}

impl std::fmt::Debug for PlaybackController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackController")
            .field("config", &self.config)
            .finish()
    }
}
