//! # Playback Configuration
//!
//! Tuning knobs for the playback controller.

use bridge_traits::media::PlaybackRouting;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Playback controller configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Expected cadence of engine status samples.
    ///
    /// Engines own their actual sampling rate; this value is advisory and
    /// documents what the controller was tuned against.
    ///
    /// Default: 500 ms.
    #[serde(default = "default_status_interval")]
    pub status_interval: Duration,

    /// How far the engine-reported position may lag a pending seek target
    /// before the seek is re-issued.
    ///
    /// Seeks on some engines resolve asynchronously and the first status
    /// samples after a seek still report the old position. The exact
    /// threshold is not load-bearing; anything around a second keeps the
    /// correction invisible.
    ///
    /// Default: 1 s.
    #[serde(default = "default_seek_drift_tolerance")]
    pub seek_drift_tolerance: Duration,

    /// Audio session routing applied before each new source is loaded.
    #[serde(default)]
    pub routing: PlaybackRouting,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            status_interval: default_status_interval(),
            seek_drift_tolerance: default_seek_drift_tolerance(),
            routing: PlaybackRouting::default(),
        }
    }
}

impl PlaybackConfig {
    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.status_interval.is_zero() {
            return Err("status_interval must be > 0".to_string());
        }
        if self.seek_drift_tolerance.is_zero() {
            return Err("seek_drift_tolerance must be > 0".to_string());
        }
        Ok(())
    }
}

fn default_status_interval() -> Duration {
    Duration::from_millis(500)
}

fn default_seek_drift_tolerance() -> Duration {
    Duration::from_secs(1)
}
