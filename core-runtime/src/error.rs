use thiserror::Error;

/// Failures raised while bootstrapping the runtime (configuration assembly,
/// logging setup).
#[derive(Error, Debug)]
pub enum Error {
    /// A configuration value is invalid.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A required bridge was not provided to the builder.
    #[error("missing capability {capability}: {message}")]
    CapabilityMissing { capability: String, message: String },

    /// Anything that should not happen given validated inputs.
    #[error("internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;
