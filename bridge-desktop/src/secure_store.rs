//! OS keychain secure store.
//!
//! Holds the DPoP bearer token under the platform credential service:
//! Keychain on macOS, Credential Manager on Windows, Secret Service on
//! Linux. One keyring entry per key, scoped by a service name so multiple
//! installs do not collide.

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    storage::SecureStore,
};
use keyring::Entry;
use tracing::debug;

const DEFAULT_SERVICE: &str = "tech.dpop.detroit-art";

/// [`SecureStore`] over the `keyring` crate.
pub struct KeyringSecureStore {
    service: String,
}

impl KeyringSecureStore {
    pub fn new() -> Self {
        Self::with_service(DEFAULT_SERVICE)
    }

    /// Scope entries under a custom service name (tests, side-by-side
    /// installs).
    pub fn with_service(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    fn entry(&self, key: &str) -> Result<Entry> {
        Entry::new(&self.service, key)
            .map_err(|e| BridgeError::OperationFailed(format!("keyring entry: {}", e)))
    }
}

impl Default for KeyringSecureStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SecureStore for KeyringSecureStore {
    async fn set_secret(&self, key: &str, value: &str) -> Result<()> {
        self.entry(key)?
            .set_password(value)
            .map_err(|e| BridgeError::OperationFailed(format!("keyring write: {}", e)))?;
        debug!(key, "Secret stored");
        Ok(())
    }

    async fn get_secret(&self, key: &str) -> Result<Option<String>> {
        match self.entry(key)?.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(BridgeError::OperationFailed(format!(
                "keyring read: {}",
                e
            ))),
        }
    }

    async fn delete_secret(&self, key: &str) -> Result<()> {
        match self.entry(key)?.delete_credential() {
            // Deleting an absent entry still counts as deleted.
            Ok(()) | Err(keyring::Error::NoEntry) => {
                debug!(key, "Secret deleted");
                Ok(())
            }
            Err(e) => Err(BridgeError::OperationFailed(format!(
                "keyring delete: {}",
                e
            ))),
        }
    }
}
