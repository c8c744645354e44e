use bridge_traits::BridgeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DpopError {
    #[error("API request failed with status {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Transport error: {0}")]
    Transport(#[from] BridgeError),

    #[error("Failed to decode response: {0}")]
    Decode(String),
}

impl DpopError {
    /// Returns `true` if the request may succeed on retry.
    pub fn is_transient(&self) -> bool {
        match self {
            DpopError::Transport(_) => true,
            DpopError::Api { status, .. } => *status >= 500 || *status == 429,
            DpopError::Decode(_) => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, DpopError>;
