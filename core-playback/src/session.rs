//! Playback session state.

use std::time::Duration;

/// The currently loaded audio resource.
///
/// Exactly one session is active process-wide at a time; the controller
/// tears down the previous session (stop + unload) before creating the next.
/// Created by `play`, mutated by engine status samples and `seek_to`,
/// destroyed by `stop`, replacement, or the source playing to its end.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackSession {
    /// Resource locator of the loaded source.
    pub uri: String,
    /// Whether the engine is actively producing audio.
    pub is_playing: bool,
    /// Current playhead position. Updated optimistically on seek, then
    /// reconciled against engine status samples.
    pub elapsed: Duration,
    /// Total duration of the source, when known.
    pub duration: Option<Duration>,
    /// Pending seek position awaiting engine confirmation.
    pub seek_target: Option<Duration>,
}

impl PlaybackSession {
    /// Create a fresh session for a source, with elapsed time reset to zero.
    pub fn new(uri: &str) -> Self {
        Self {
            uri: uri.to_string(),
            is_playing: false,
            elapsed: Duration::ZERO,
            duration: None,
            seek_target: None,
        }
    }

    /// Elapsed time in fractional seconds.
    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }

    /// Duration in fractional seconds, when known.
    pub fn duration_secs(&self) -> Option<f64> {
        self.duration.map(|d| d.as_secs_f64())
    }
}
