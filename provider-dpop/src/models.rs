//! Wire models for the DPoP backend.
//!
//! All response models tolerate missing optional fields; the backend evolved
//! alongside the mobile client and older records omit newer attributes.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An authenticated backend user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub name: String,
    pub email: Option<String>,
    pub public_name: Option<String>,
    pub organization: Option<String>,
    pub profile_picture: Option<String>,
}

/// Credentials payload for `POST login`.
#[derive(Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Payload for `POST register`.
#[derive(Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub public_name: Option<String>,
    pub organization: Option<String>,
}

impl std::fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Response from `login` and `register`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    /// Bearer token for subsequent requests. Absent on failure responses
    /// that still come back with a 2xx status.
    pub token: Option<String>,
    pub user: Option<UserProfile>,
    pub message: Option<String>,
}

/// Geographic coordinates for a venue.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

/// A physical venue hosting events or artwork.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Venue {
    pub id: i64,
    pub title: String,
    pub slug: Option<String>,
    pub address: Option<String>,
    pub geo: Option<GeoPoint>,
}

/// A calendar event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtEvent {
    pub id: i64,
    pub title: String,
    pub slug: Option<String>,
    /// HTML body as authored on the backend.
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub venue: Option<Venue>,
    pub start_at: Option<DateTime<Utc>>,
    pub end_at: Option<DateTime<Utc>>,
}

/// Contact card payload for `POST event/{id}/rsvp`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RsvpRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// Wallet-signed payload for `POST event/{id}/signed-rsvp`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignedRsvpRequest {
    /// Wallet address of the attendee.
    pub address: String,
    /// Signature over the event identifier.
    pub signature: String,
}

/// An RSVP record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rsvp {
    pub id: Option<i64>,
    pub event_id: i64,
    pub status: Option<String>,
}

/// Payload for `POST event/{id}/comment`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentRequest {
    pub text: String,
}

/// A comment on an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: Option<i64>,
    pub text: String,
    pub author: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// A check-in record for an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckIn {
    pub event_id: i64,
    pub checked_in_at: DateTime<Utc>,
}

/// A gallery artwork entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artwork {
    pub id: i64,
    pub title: String,
    pub artist: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

/// A timestamped cover image attached to an audio content item.
///
/// Entries arrive in list order from the backend; `elapsed_time` is the
/// playback position in seconds at which this image becomes current.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaTile {
    pub url: String,
    pub elapsed_time: f64,
}

/// A published content item (audio with time-synced cover art).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub title: Option<String>,
    /// Public URL of the audio media.
    pub url: Option<String>,
    /// Primary image, shown before the first tile threshold.
    pub image_url: Option<String>,
    #[serde(default)]
    pub media_tiles: Vec<MediaTile>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Payload for `POST content`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewContent {
    #[serde(rename = "type")]
    pub kind: String,
    /// Public URL of the uploaded audio media.
    pub url: String,
    pub image_url: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub duration_secs: Option<u64>,
    pub captured_at: DateTime<Utc>,
}

/// Payload for `POST flyer` (submit a flyer image for extraction).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlyerSubmission {
    pub image_url: String,
}

/// A submitted flyer and its extraction state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flyer {
    pub id: i64,
    pub image_url: Option<String>,
    pub title: Option<String>,
    pub status: Option<String>,
}

/// Receipt from `POST upload-media`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadedMedia {
    /// Public URL of the stored media.
    pub url: String,
    pub id: Option<i64>,
    pub mime_type: Option<String>,
}

/// Request-side description of a media file to upload.
///
/// Not a wire model; the bytes are encoded into the multipart body.
#[derive(Debug, Clone)]
pub struct MediaUpload {
    pub filename: String,
    pub content_type: String,
    pub data: Bytes,
}
