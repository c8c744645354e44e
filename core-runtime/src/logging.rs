//! Logging bootstrap over `tracing-subscriber`.
//!
//! One `init_logging` call at host startup installs the global subscriber.
//! Filtering resolves in precedence order: an explicit filter string from
//! [`LoggingConfig::with_filter`], then the `RUST_LOG` environment variable,
//! then the configured minimum level.
//!
//! ```ignore
//! use core_runtime::logging::{init_logging, LogFormat, LoggingConfig};
//!
//! init_logging(
//!     LoggingConfig::default()
//!         .with_format(LogFormat::Pretty)
//!         .with_filter("core_playback=debug,core_recording=debug"),
//! )?;
//! ```

use crate::error::{Error, Result};
use tracing_subscriber::EnvFilter;

/// How log lines are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Multi-line human-readable output with colors.
    Pretty,
    /// One JSON object per event, for log shippers.
    Json,
    /// Single-line human-readable output.
    Compact,
}

impl Default for LogFormat {
    fn default() -> Self {
        if cfg!(debug_assertions) {
            Self::Pretty
        } else {
            Self::Compact
        }
    }
}

/// Minimum severity when no filter string applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn as_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Subscriber configuration, built fluently and passed to [`init_logging`].
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub format: LogFormat,
    pub level: LogLevel,
    /// EnvFilter directive string, e.g. `"core_playback=debug,sqlx=warn"`.
    /// Takes precedence over `level` and `RUST_LOG`.
    pub filter: Option<String>,
    /// Include the emitting module path on each line.
    pub show_target: bool,
    /// Include thread ids on each line.
    pub show_thread_ids: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            level: LogLevel::Info,
            filter: None,
            show_target: true,
            show_thread_ids: false,
        }
    }
}

impl LoggingConfig {
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn with_target(mut self, show: bool) -> Self {
        self.show_target = show;
        self
    }

    pub fn with_thread_ids(mut self, show: bool) -> Self {
        self.show_thread_ids = show;
        self
    }
}

/// Install the global tracing subscriber.
///
/// # Errors
///
/// Fails when a subscriber is already installed or the filter string does
/// not parse.
pub fn init_logging(config: LoggingConfig) -> Result<()> {
    let filter = resolve_filter(&config)?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(config.show_target)
        .with_thread_ids(config.show_thread_ids);

    match config.format {
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Compact => builder.compact().try_init(),
    }
    .map_err(|e| Error::Internal(format!("subscriber install failed: {}", e)))
}

fn resolve_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    if let Some(directives) = &config.filter {
        return EnvFilter::try_new(directives)
            .map_err(|e| Error::Config(format!("bad log filter {:?}: {}", directives, e)));
    }

    if let Ok(from_env) = EnvFilter::try_from_default_env() {
        return Ok(from_env);
    }

    EnvFilter::try_new(config.level.as_str())
        .map_err(|e| Error::Config(format!("bad log level: {}", e)))
}
