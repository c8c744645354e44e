//! # Authentication Manager
//!
//! Session orchestrator for the DPoP backend's password login.
//!
//! ## Overview
//!
//! The `AuthManager` provides a high-level API for signing in, registering,
//! restoring a persisted session and signing out. It owns the local session
//! state, persists credentials through [`SessionStore`], keeps the shared
//! [`DpopClient`] bearer token in sync, and emits auth events to the
//! application's event bus.
//!
//! ## Usage
//!
//! ```ignore
//! use core_auth::AuthManager;
//! use provider_dpop::models::LoginRequest;
//!
//! let manager = AuthManager::new(secure_store, settings_store, event_bus, client, clock);
//!
//! // Restore a previous session, if one is stored and unexpired
//! if manager.restore().await?.is_none() {
//!     manager
//!         .login(LoginRequest {
//!             email: "artist@example.com".into(),
//!             password: "secret".into(),
//!         })
//!         .await?;
//! }
//! ```

use crate::error::{AuthError, Result};
use crate::jwt::{self, TokenClaims};
use crate::session_store::SessionStore;
use crate::types::AuthState;
use bridge_traits::storage::{SecureStore, SettingsStore};
use bridge_traits::time::Clock;
use core_runtime::events::{AuthEvent, CoreEvent, EventBus};
use provider_dpop::models::{AuthResponse, LoginRequest, RegisterRequest, UserProfile};
use provider_dpop::DpopClient;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

/// Current authentication session information.
#[derive(Debug, Clone)]
pub struct Session {
    /// The authenticated user.
    pub user: UserProfile,
    /// Claims decoded from the bearer token, when the payload was readable.
    pub claims: Option<TokenClaims>,
    /// Current authentication state.
    pub state: AuthState,
}

/// Authentication orchestrator.
pub struct AuthManager {
    client: Arc<DpopClient>,
    store: SessionStore,
    event_bus: EventBus,
    clock: Arc<dyn Clock>,
    current_session: Arc<RwLock<Option<Session>>>,
}

impl AuthManager {
    /// Creates a new authentication manager.
    ///
    /// # Arguments
    ///
    /// * `secure_store` - Platform-specific secure storage for the token
    /// * `settings_store` - Key-value storage for cached user state
    /// * `event_bus` - Event bus for auth state events
    /// * `client` - Shared DPoP API client; its bearer token is managed here
    /// * `clock` - Time source for token expiry checks
    pub fn new(
        secure_store: Arc<dyn SecureStore>,
        settings_store: Arc<dyn SettingsStore>,
        event_bus: EventBus,
        client: Arc<DpopClient>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            client,
            store: SessionStore::new(secure_store, settings_store),
            event_bus,
            clock,
            current_session: Arc::new(RwLock::new(None)),
        }
    }

    /// Signs in with email and password.
    ///
    /// On success the bearer token is persisted, attached to the shared API
    /// client, and a `SignedIn` event is emitted.
    ///
    /// # Errors
    ///
    /// - [`AuthError::AuthenticationFailed`] when the backend accepts the
    ///   request but returns no token
    /// - [`AuthError::Api`] for transport or non-2xx failures
    #[instrument(skip(self, credentials), fields(email = %credentials.email))]
    pub async fn login(&self, credentials: LoginRequest) -> Result<UserProfile> {
        let _ = self.event_bus.emit(CoreEvent::Auth(AuthEvent::SigningIn));
        info!("Initiating sign-in");

        let response = match self.client.login(&credentials).await {
            Ok(response) => response,
            Err(e) => {
                self.emit_error(&e.to_string(), e.is_transient());
                return Err(e.into());
            }
        };

        self.establish_session(response, false).await
    }

    /// Creates an account and signs in with it.
    #[instrument(skip(self, form), fields(email = %form.email))]
    pub async fn register(&self, form: RegisterRequest) -> Result<UserProfile> {
        let _ = self.event_bus.emit(CoreEvent::Auth(AuthEvent::SigningIn));
        info!("Initiating registration");

        let response = match self.client.register(&form).await {
            Ok(response) => response,
            Err(e) => {
                self.emit_error(&e.to_string(), e.is_transient());
                return Err(e.into());
            }
        };

        self.establish_session(response, true).await
    }

    /// Restores a persisted session, if a stored token exists and has not
    /// expired.
    ///
    /// Expired tokens are cleared along with the cached user. When no cached
    /// user object exists, the profile is fetched from the backend.
    #[instrument(skip(self))]
    pub async fn restore(&self) -> Result<Option<UserProfile>> {
        let Some(token) = self.store.load_token().await? else {
            debug!("No stored token, nothing to restore");
            return Ok(None);
        };

        let claims = jwt::decode_claims(&token).ok();
        if let Some(c) = &claims {
            if c.is_expired_at(self.clock.unix_timestamp()) {
                info!("Stored token is expired, clearing session");
                self.store.clear_token().await?;
                self.store.clear_user().await?;
                return Ok(None);
            }
        }

        self.client.set_bearer(token);

        let user = match self.store.load_user().await? {
            Some(user) => user,
            None => {
                debug!("No cached user, fetching profile");
                let user = self.client.current_user().await?;
                self.store.store_user(&user).await?;
                user
            }
        };

        {
            let mut session = self.current_session.write().await;
            *session = Some(Session {
                user: user.clone(),
                claims,
                state: AuthState::SignedIn,
            });
        }

        let _ = self.event_bus.emit(CoreEvent::Auth(AuthEvent::SignedIn {
            user_id: user.id,
            email: user.email.clone(),
        }));

        info!(user_id = user.id, "Session restored");
        Ok(Some(user))
    }

    /// Signs out, clearing the stored token, cached user, client bearer and
    /// local session. Idempotent when no session exists.
    #[instrument(skip(self))]
    pub async fn sign_out(&self) -> Result<()> {
        let previous = self.current_session.write().await.take();

        self.store.clear_token().await?;
        self.store.clear_user().await?;
        self.client.clear_bearer();

        if let Some(session) = previous {
            let _ = self.event_bus.emit(CoreEvent::Auth(AuthEvent::SignedOut {
                user_id: session.user.id,
            }));
            info!(user_id = session.user.id, "Sign-out completed");
        }

        Ok(())
    }

    /// Gets the current session, if any.
    pub async fn current_session(&self) -> Option<Session> {
        self.current_session.read().await.clone()
    }

    /// Whether a user is currently signed in.
    pub async fn is_authenticated(&self) -> bool {
        self.current_session
            .read()
            .await
            .as_ref()
            .map(|s| s.state.is_authenticated())
            .unwrap_or(false)
    }

    /// Access to local session persistence (contact card, check-ins).
    pub fn session_store(&self) -> &SessionStore {
        &self.store
    }

    async fn establish_session(
        &self,
        response: AuthResponse,
        registered: bool,
    ) -> Result<UserProfile> {
        let token = match response.token {
            Some(token) => token,
            None => {
                let message = response
                    .message
                    .unwrap_or_else(|| "no token in response".to_string());
                self.emit_error(&message, true);
                return Err(AuthError::AuthenticationFailed(message));
            }
        };

        // The token is JWT-shaped but opaque; claims decoding is best-effort.
        let claims = match jwt::decode_claims(&token) {
            Ok(claims) => Some(claims),
            Err(e) => {
                warn!(error = %e, "Token claims could not be decoded");
                None
            }
        };

        self.store.store_token(&token).await?;
        self.client.set_bearer(token);

        let user = match response.user {
            Some(user) => user,
            None => self.client.current_user().await?,
        };
        self.store.store_user(&user).await?;

        {
            let mut session = self.current_session.write().await;
            *session = Some(Session {
                user: user.clone(),
                claims,
                state: AuthState::SignedIn,
            });
        }

        if registered {
            let _ = self
                .event_bus
                .emit(CoreEvent::Auth(AuthEvent::Registered { user_id: user.id }));
        }
        let _ = self.event_bus.emit(CoreEvent::Auth(AuthEvent::SignedIn {
            user_id: user.id,
            email: user.email.clone(),
        }));

        info!(user_id = user.id, "Sign-in completed");
        Ok(user)
    }

    fn emit_error(&self, message: &str, recoverable: bool) {
        let _ = self.event_bus.emit(CoreEvent::Auth(AuthEvent::AuthError {
            message: message.to_string(),
            recoverable,
        }));
    }
}
