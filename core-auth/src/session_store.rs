//! Local session persistence.
//!
//! The mobile client keeps a small set of string-keyed values: the auth
//! token, the current contact card, the cached user object, and one
//! check-in record per attended event. The token lives in the platform
//! secure store; everything else is serialized JSON in the settings store.
//!
//! Token values are never logged.

use crate::error::{AuthError, Result};
use crate::types::ContactCard;
use bridge_traits::storage::{SecureStore, SettingsStore};
use provider_dpop::models::{CheckIn, UserProfile};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

const TOKEN_KEY: &str = "dpop_auth_token";
const USER_KEY: &str = "dpop_cached_user";
const CONTACT_KEY: &str = "dpop_contact_card";

/// Storage facade over the two bridge stores.
#[derive(Clone)]
pub struct SessionStore {
    secure_store: Arc<dyn SecureStore>,
    settings_store: Arc<dyn SettingsStore>,
}

impl SessionStore {
    pub fn new(
        secure_store: Arc<dyn SecureStore>,
        settings_store: Arc<dyn SettingsStore>,
    ) -> Self {
        debug!("Initializing SessionStore");
        Self {
            secure_store,
            settings_store,
        }
    }

    // ------------------------------------------------------------------
    // Token (secure store)
    // ------------------------------------------------------------------

    /// Persist the bearer token, overwriting any previous value.
    pub async fn store_token(&self, token: &str) -> Result<()> {
        self.secure_store
            .set_secret(TOKEN_KEY, token)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to store auth token");
                AuthError::SecureStorageUnavailable(e.to_string())
            })?;
        info!("Auth token stored securely");
        Ok(())
    }

    /// Load the bearer token, if one is stored.
    pub async fn load_token(&self) -> Result<Option<String>> {
        self.secure_store
            .get_secret(TOKEN_KEY)
            .await
            .map_err(|e| AuthError::SecureStorageUnavailable(e.to_string()))
    }

    /// Delete the bearer token. Idempotent.
    pub async fn clear_token(&self) -> Result<()> {
        self.secure_store
            .delete_secret(TOKEN_KEY)
            .await
            .map_err(|e| AuthError::SecureStorageUnavailable(e.to_string()))?;
        info!("Auth token deleted");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Cached user / contact (settings store)
    // ------------------------------------------------------------------

    /// Cache the authenticated user object.
    pub async fn store_user(&self, user: &UserProfile) -> Result<()> {
        self.set_json(USER_KEY, user).await
    }

    /// Load the cached user object.
    pub async fn load_user(&self) -> Result<Option<UserProfile>> {
        self.get_json(USER_KEY).await
    }

    /// Remove the cached user object.
    pub async fn clear_user(&self) -> Result<()> {
        self.delete(USER_KEY).await
    }

    /// Persist the current contact card.
    pub async fn store_contact(&self, contact: &ContactCard) -> Result<()> {
        self.set_json(CONTACT_KEY, contact).await
    }

    /// Load the current contact card.
    pub async fn load_contact(&self) -> Result<Option<ContactCard>> {
        self.get_json(CONTACT_KEY).await
    }

    /// Remove the current contact card.
    pub async fn clear_contact(&self) -> Result<()> {
        self.delete(CONTACT_KEY).await
    }

    // ------------------------------------------------------------------
    // Check-ins (settings store, one record per event)
    // ------------------------------------------------------------------

    /// Record a check-in for an event.
    pub async fn record_check_in(&self, check_in: &CheckIn) -> Result<()> {
        self.set_json(&Self::check_in_key(check_in.event_id), check_in)
            .await
    }

    /// Load the check-in record for an event, if the device has one.
    pub async fn load_check_in(&self, event_id: i64) -> Result<Option<CheckIn>> {
        self.get_json(&Self::check_in_key(event_id)).await
    }

    fn check_in_key(event_id: i64) -> String {
        format!("event_checkin:{}", event_id)
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    async fn set_json<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let json = serde_json::to_string(value).map_err(|e| {
            warn!(key = key, error = %e, "Failed to serialize value");
            AuthError::SerializationFailed(e.to_string())
        })?;

        self.settings_store
            .set_string(key, &json)
            .await
            .map_err(|e| AuthError::SettingsStorageUnavailable(e.to_string()))?;
        debug!(key = key, "Stored session value");
        Ok(())
    }

    async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let raw = self
            .settings_store
            .get_string(key)
            .await
            .map_err(|e| AuthError::SettingsStorageUnavailable(e.to_string()))?;

        let Some(raw) = raw else {
            return Ok(None);
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                // Corrupted records are dropped rather than surfaced forever.
                warn!(key = key, error = %e, "Stored value is corrupted, deleting");
                if let Err(delete_err) = self.settings_store.delete(key).await {
                    warn!(key = key, error = %delete_err, "Failed to delete corrupted value");
                }
                Ok(None)
            }
        }
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.settings_store
            .delete(key)
            .await
            .map_err(|e| AuthError::SettingsStorageUnavailable(e.to_string()))?;
        debug!(key = key, "Deleted session value");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manager::tests::{MockSecureStore, MockSettingsStore};
    use chrono::Utc;

    fn store() -> SessionStore {
        SessionStore::new(
            Arc::new(MockSecureStore::new()),
            Arc::new(MockSettingsStore::new()),
        )
    }

    #[tokio::test]
    async fn test_token_round_trip() {
        let store = store();

        assert!(store.load_token().await.unwrap().is_none());

        store.store_token("jwt-abc").await.unwrap();
        assert_eq!(store.load_token().await.unwrap().as_deref(), Some("jwt-abc"));

        store.clear_token().await.unwrap();
        assert!(store.load_token().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_user_round_trip() {
        let store = store();
        let user = UserProfile {
            id: 17,
            name: "Rita".to_string(),
            email: Some("rita@example.com".to_string()),
            public_name: None,
            organization: None,
            profile_picture: None,
        };

        store.store_user(&user).await.unwrap();
        assert_eq!(store.load_user().await.unwrap(), Some(user));

        store.clear_user().await.unwrap();
        assert!(store.load_user().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_check_in_keyed_per_event() {
        let store = store();
        let check_in = CheckIn {
            event_id: 88,
            checked_in_at: Utc::now(),
        };

        store.record_check_in(&check_in).await.unwrap();

        let loaded = store.load_check_in(88).await.unwrap().unwrap();
        assert_eq!(loaded.event_id, 88);
        assert!(store.load_check_in(89).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_corrupted_record_is_dropped() {
        let secure = Arc::new(MockSecureStore::new());
        let settings = Arc::new(MockSettingsStore::new());
        settings.set_string(USER_KEY, "not json").await.unwrap();

        let store = SessionStore::new(secure, settings.clone());
        assert!(store.load_user().await.unwrap().is_none());
        // The corrupted value was deleted
        assert!(settings.get_string(USER_KEY).await.unwrap().is_none());
    }
}
