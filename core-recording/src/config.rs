//! # Recording Configuration

use crate::meter::DEFAULT_METERING_FLOOR_DB;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Recording controller configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordingConfig {
    /// Elapsed-counter tick interval.
    ///
    /// The counter is a wall-clock tick, deliberately independent of the
    /// engine's own timing. Default: 1 s.
    #[serde(default = "default_tick_interval")]
    pub tick_interval: Duration,

    /// Dynamic-range floor for the pulse mapping, in dB.
    ///
    /// Default: 80.
    #[serde(default = "default_metering_floor_db")]
    pub metering_floor_db: f32,

    /// Play the uploaded audio back after a successful publish, as an
    /// audible confirmation. Default: true.
    #[serde(default = "default_confirmation_playback")]
    pub confirmation_playback: bool,
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            tick_interval: default_tick_interval(),
            metering_floor_db: default_metering_floor_db(),
            confirmation_playback: default_confirmation_playback(),
        }
    }
}

impl RecordingConfig {
    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.tick_interval.is_zero() {
            return Err("tick_interval must be > 0".to_string());
        }
        if self.metering_floor_db <= 0.0 {
            return Err("metering_floor_db must be > 0".to_string());
        }
        Ok(())
    }
}

fn default_tick_interval() -> Duration {
    Duration::from_secs(1)
}

fn default_metering_floor_db() -> f32 {
    DEFAULT_METERING_FLOOR_DB
}

fn default_confirmation_playback() -> bool {
    true
}
