use bridge_traits::BridgeError;
use thiserror::Error;

/// Errors that can occur during playback operations.
#[derive(Error, Debug)]
pub enum PlaybackError {
    /// Failed to load the audio source into the engine.
    #[error("Failed to load audio source: {0}")]
    LoadFailed(String),

    /// The underlying audio engine reported an error.
    #[error("Audio engine error: {0}")]
    Engine(#[from] BridgeError),
}

/// Result type for playback operations.
pub type Result<T> = std::result::Result<T, PlaybackError>;
