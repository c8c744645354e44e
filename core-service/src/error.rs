use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Core initialization failed: {0}")]
    InitializationFailed(String),

    #[error("Runtime error: {0}")]
    Runtime(#[from] core_runtime::Error),

    #[error("Authentication error: {0}")]
    Auth(#[from] core_auth::AuthError),

    #[error("Playback error: {0}")]
    Playback(#[from] core_playback::PlaybackError),

    #[error("Recording error: {0}")]
    Recording(#[from] core_recording::RecordingError),

    #[error("API error: {0}")]
    Api(#[from] provider_dpop::DpopError),
}

pub type Result<T> = std::result::Result<T, CoreError>;
