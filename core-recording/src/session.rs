//! Recording session state.

/// An in-progress microphone capture.
///
/// Created by `start`, destroyed by `stop`. The elapsed counter is driven by
/// a one-second wall-clock tick, not by the engine; the meter scale tracks
/// the most recent input-level sample.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordingSession {
    /// Whole seconds since capture started.
    pub elapsed_secs: u64,
    /// Most recent normalized pulse scale in `[0, 1]`.
    pub meter_scale: f32,
}

impl RecordingSession {
    pub fn new() -> Self {
        Self {
            elapsed_secs: 0,
            meter_scale: 0.0,
        }
    }
}

impl Default for RecordingSession {
    fn default() -> Self {
        Self::new()
    }
}
