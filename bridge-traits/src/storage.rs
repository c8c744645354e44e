//! Storage bridge traits.
//!
//! The core keeps a deliberately small persistence footprint, mirroring the
//! mobile client it grew out of: one bearer token in platform secure
//! storage, and a handful of string-keyed JSON blobs (contact card, cached
//! user, per-event check-in records) in a key-value settings store.

use async_trait::async_trait;

use crate::error::Result;

/// Platform secure storage for credentials.
///
/// Backed by whatever the OS offers: Keychain on Apple platforms, Keystore
/// on Android, Credential Manager on Windows, Secret Service on Linux.
/// Values are UTF-8 strings (the only secret this system stores is a bearer
/// token).
///
/// Implementations must encrypt at rest and must never log secret values.
#[async_trait]
pub trait SecureStore: Send + Sync {
    /// Store a secret, replacing any previous value under the key.
    async fn set_secret(&self, key: &str, value: &str) -> Result<()>;

    /// Read a secret back; `Ok(None)` when the key was never stored.
    async fn get_secret(&self, key: &str) -> Result<Option<String>>;

    /// Remove a secret. Removing an absent key succeeds.
    async fn delete_secret(&self, key: &str) -> Result<()>;

    /// Whether a secret exists, without reading it.
    async fn has_secret(&self, key: &str) -> Result<bool> {
        Ok(self.get_secret(key).await?.is_some())
    }
}

/// Asynchronous string-keyed key-value store for non-secret state.
///
/// Values are opaque strings; callers that persist structured data serialize
/// it to JSON first. This matches the storage contract the original client
/// had (UserDefaults / SharedPreferences / a SQLite table on desktop).
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Write a value, replacing any previous value under the key.
    async fn set_string(&self, key: &str, value: &str) -> Result<()>;

    /// Read a value back; `Ok(None)` when the key was never stored.
    async fn get_string(&self, key: &str) -> Result<Option<String>>;

    /// Remove a key. Removing an absent key succeeds.
    async fn delete(&self, key: &str) -> Result<()>;

    /// Whether a key exists.
    async fn has_key(&self, key: &str) -> Result<bool>;

    /// All stored keys, sorted.
    async fn list_keys(&self) -> Result<Vec<String>>;

    /// Remove every key.
    async fn clear_all(&self) -> Result<()>;
}
