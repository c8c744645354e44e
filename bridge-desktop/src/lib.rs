//! # Desktop Bridge Implementations
//!
//! Ready-made storage and networking bridges for desktop hosts (macOS,
//! Windows, Linux): `HttpClient` over reqwest, `SettingsStore` over a
//! SQLite key-value table, and `SecureStore` over the OS keychain (behind
//! the default `secure-store` feature).
//!
//! The media bridges (`PlaybackEngine`, `RecorderEngine`, `CameraDevice`)
//! have no desktop defaults here; audio and camera hardware access is wired
//! by the embedding application.

mod http;
mod settings;

#[cfg(feature = "secure-store")]
mod secure_store;

pub use http::ReqwestHttpClient;
pub use settings::SqliteSettingsStore;

#[cfg(feature = "secure-store")]
pub use secure_store::KeyringSecureStore;

/// Default data directory for the Detroit Art core on this platform.
///
/// `{data_dir}/detroit-art` under the OS convention (e.g.
/// `~/.local/share/detroit-art` on Linux). `None` when the platform has no
/// data directory concept.
pub fn default_data_dir() -> Option<std::path::PathBuf> {
    dirs::data_dir().map(|dir| dir.join("detroit-art"))
}
