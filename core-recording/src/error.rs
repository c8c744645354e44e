use bridge_traits::BridgeError;
use provider_dpop::DpopError;
use thiserror::Error;

/// Errors that can occur during recording operations.
#[derive(Error, Debug)]
pub enum RecordingError {
    /// A capture is already in progress; at most one exists at a time.
    #[error("A recording is already in progress")]
    RecordingInProgress,

    /// No capture is in progress.
    #[error("No recording in progress")]
    NotRecording,

    /// Microphone permission was denied by the user or platform.
    #[error("Microphone permission denied")]
    PermissionDenied,

    /// No camera bridge was configured for this host.
    #[error("Camera not available on this host")]
    CameraUnavailable,

    /// The recorder or camera engine reported an error.
    #[error("Capture engine error: {0}")]
    Engine(#[from] BridgeError),

    /// Uploading or publishing the finished capture failed.
    #[error("Publish failed: {0}")]
    Publish(#[from] DpopError),
}

/// Result type for recording operations.
pub type Result<T> = std::result::Result<T, RecordingError>;
