//! Naive JWT claims decoding.
//!
//! The DPoP backend issues JWT-shaped bearer tokens. The client never
//! verifies signatures; it only base64url-decodes the payload segment to
//! read expiry and identity fields. Tokens remain opaque credentials for
//! every other purpose.

use crate::error::{AuthError, Result};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde::{Deserialize, Serialize};

/// Payload fields the client reads out of a bearer token.
///
/// Unknown fields are ignored; every field is optional because the backend's
/// token shape has changed over time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject (backend user id as a string).
    pub sub: Option<String>,
    pub email: Option<String>,
    /// Expiry as a Unix timestamp in seconds.
    pub exp: Option<i64>,
    /// Issued-at as a Unix timestamp in seconds.
    pub iat: Option<i64>,
}

impl TokenClaims {
    /// Whether the token is expired at the given Unix timestamp.
    ///
    /// Tokens without an `exp` claim never expire client-side.
    pub fn is_expired_at(&self, now_unix: i64) -> bool {
        match self.exp {
            Some(exp) => now_unix >= exp,
            None => false,
        }
    }
}

/// Decode the payload segment of a JWT-shaped token.
///
/// No signature verification is performed. Padding characters are tolerated
/// even though base64url payloads are normally unpadded.
///
/// # Errors
///
/// Returns [`AuthError::InvalidToken`] if the token has no payload segment,
/// the segment is not valid base64url, or the payload is not a JSON object.
pub fn decode_claims(token: &str) -> Result<TokenClaims> {
    let mut segments = token.split('.');
    let payload = match (segments.next(), segments.next()) {
        (Some(_header), Some(payload)) if !payload.is_empty() => payload,
        _ => {
            return Err(AuthError::InvalidToken(
                "token has no payload segment".to_string(),
            ))
        }
    };

    let raw = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| AuthError::InvalidToken(format!("payload is not base64url: {}", e)))?;

    serde_json::from_slice(&raw)
        .map_err(|e| AuthError::InvalidToken(format!("payload is not valid JSON: {}", e)))
}
