use serde::{Deserialize, Serialize};
use std::fmt;

/// Authentication state for the local session.
///
/// # State Transitions
///
/// ```text
/// SignedOut -> SigningIn -> SignedIn -> SignedOut
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum AuthState {
    /// No user is authenticated
    #[default]
    SignedOut,
    /// Authentication flow is in progress
    SigningIn,
    /// User is authenticated with a stored token
    SignedIn,
}

impl AuthState {
    /// Check if the user is authenticated.
    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthState::SignedIn)
    }

    /// Check if an operation is in progress.
    pub fn is_in_progress(&self) -> bool {
        matches!(self, AuthState::SigningIn)
    }
}

impl fmt::Display for AuthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthState::SignedOut => write!(f, "Signed Out"),
            AuthState::SigningIn => write!(f, "Signing In..."),
            AuthState::SignedIn => write!(f, "Signed In"),
        }
    }
}

/// The contact card attached to RSVPs and kept as the "current contact" in
/// local persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactCard {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_state_is_authenticated() {
        assert!(!AuthState::SignedOut.is_authenticated());
        assert!(!AuthState::SigningIn.is_authenticated());
        assert!(AuthState::SignedIn.is_authenticated());
    }

    #[test]
    fn test_auth_state_default() {
        assert_eq!(AuthState::default(), AuthState::SignedOut);
    }

    #[test]
    fn test_contact_card_serialization() {
        let card = ContactCard {
            name: "Rita".to_string(),
            email: Some("rita@example.com".to_string()),
            phone: None,
        };
        let json = serde_json::to_string(&card).unwrap();
        let back: ContactCard = serde_json::from_str(&json).unwrap();
        assert_eq!(back, card);
    }
}
