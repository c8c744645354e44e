use thiserror::Error;

/// Error type shared by every bridge trait.
///
/// Host implementations translate their platform errors into one of these
/// variants with a message actionable enough to debug from a log line.
#[derive(Error, Debug)]
pub enum BridgeError {
    /// The platform API call itself failed (network, engine, storage).
    #[error("bridge operation failed: {0}")]
    OperationFailed(String),

    /// The user or platform refused a capability the operation needs.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BridgeError>;
