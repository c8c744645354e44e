//! DPoP REST client.
//!
//! One typed method per backend endpoint, executed through the host-provided
//! [`HttpClient`] bridge. Responses are status-checked before JSON decoding:
//! a non-2xx body is never treated as a successful payload.

use crate::error::{DpopError, Result};
use crate::models::*;
use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest, HttpResponse, MultipartForm};
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Maximum number of error-body characters carried into [`DpopError::Api`].
const ERROR_BODY_LIMIT: usize = 200;

/// Typed client for the DPoP backend.
///
/// The client is cheap to share behind an `Arc`. A bearer token can be set
/// after sign-in; every subsequent request carries it in the
/// `Authorization` header until [`DpopClient::clear_bearer`] is called.
///
/// # Example
///
/// ```ignore
/// use provider_dpop::{DpopClient, models::LoginRequest};
///
/// let client = DpopClient::new(http_client, "https://api.dpop.tech/api");
/// let auth = client
///     .login(&LoginRequest {
///         email: "artist@example.com".into(),
///         password: "secret".into(),
///     })
///     .await?;
/// if let Some(token) = auth.token {
///     client.set_bearer(token);
/// }
/// ```
pub struct DpopClient {
    http: Arc<dyn HttpClient>,
    base_url: String,
    bearer: RwLock<Option<String>>,
}

impl DpopClient {
    /// Create a client for the given backend base URL (including the `/api`
    /// prefix).
    pub fn new(http: Arc<dyn HttpClient>, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http,
            base_url,
            bearer: RwLock::new(None),
        }
    }

    /// Attach a bearer token to all subsequent requests.
    pub fn set_bearer(&self, token: impl Into<String>) {
        *self.bearer.write() = Some(token.into());
    }

    /// Remove the bearer token.
    pub fn clear_bearer(&self) {
        *self.bearer.write() = None;
    }

    /// Whether a bearer token is currently attached.
    pub fn has_bearer(&self) -> bool {
        self.bearer.read().is_some()
    }

    // ------------------------------------------------------------------
    // Auth
    // ------------------------------------------------------------------

    /// `POST login`
    #[instrument(skip_all)]
    pub async fn login(&self, request: &LoginRequest) -> Result<AuthResponse> {
        self.post("login", request).await
    }

    /// `POST register`
    #[instrument(skip_all)]
    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse> {
        self.post("register", request).await
    }

    /// `GET user` - the profile of the authenticated user.
    pub async fn current_user(&self) -> Result<UserProfile> {
        self.get("user").await
    }

    // ------------------------------------------------------------------
    // Events
    // ------------------------------------------------------------------

    /// `GET event/{id}`
    pub async fn event(&self, id: i64) -> Result<ArtEvent> {
        self.get(&format!("event/{}", id)).await
    }

    /// `POST event/{id}/rsvp`
    pub async fn rsvp(&self, event_id: i64, request: &RsvpRequest) -> Result<Rsvp> {
        self.post(&format!("event/{}/rsvp", event_id), request).await
    }

    /// `POST event/{id}/signed-rsvp` - RSVP authenticated by a wallet
    /// signature instead of a session.
    pub async fn signed_rsvp(&self, event_id: i64, request: &SignedRsvpRequest) -> Result<Rsvp> {
        self.post(&format!("event/{}/signed-rsvp", event_id), request)
            .await
    }

    /// `POST event/{id}/comment`
    pub async fn comment(&self, event_id: i64, request: &CommentRequest) -> Result<Comment> {
        self.post(&format!("event/{}/comment", event_id), request)
            .await
    }

    /// `POST event/{id}/check-in`
    pub async fn check_in(&self, event_id: i64) -> Result<CheckIn> {
        self.post(&format!("event/{}/check-in", event_id), &serde_json::json!({}))
            .await
    }

    /// `GET rsvps` - the authenticated user's RSVPs.
    pub async fn rsvps(&self) -> Result<Vec<Rsvp>> {
        self.get("rsvps").await
    }

    // ------------------------------------------------------------------
    // Venues / artwork / flyers
    // ------------------------------------------------------------------

    /// `GET venues`
    pub async fn venues(&self) -> Result<Vec<Venue>> {
        self.get("venues").await
    }

    /// `GET artwork/{id}`
    pub async fn artwork(&self, id: i64) -> Result<Artwork> {
        self.get(&format!("artwork/{}", id)).await
    }

    /// `POST flyer` - submit a flyer image for extraction.
    pub async fn submit_flyer(&self, submission: &FlyerSubmission) -> Result<Flyer> {
        self.post("flyer", submission).await
    }

    /// `GET flyers`
    pub async fn flyers(&self) -> Result<Vec<Flyer>> {
        self.get("flyers").await
    }

    // ------------------------------------------------------------------
    // Content
    // ------------------------------------------------------------------

    /// `GET content`
    pub async fn contents(&self) -> Result<Vec<ContentItem>> {
        self.get("content").await
    }

    /// `POST content`
    #[instrument(skip_all, fields(kind = %content.kind))]
    pub async fn create_content(&self, content: &NewContent) -> Result<ContentItem> {
        self.post("content", content).await
    }

    /// `POST upload-media` - multipart upload with an `image` file part and
    /// an `exif` JSON string part.
    #[instrument(skip_all, fields(filename = %upload.filename, bytes = upload.data.len()))]
    pub async fn upload_media(
        &self,
        upload: &MediaUpload,
        exif: &serde_json::Value,
    ) -> Result<UploadedMedia> {
        let form = MultipartForm::new()
            .file(
                "image",
                &upload.filename,
                &upload.content_type,
                &upload.data,
            )
            .text("exif", &exif.to_string());

        let request =
            HttpRequest::new(HttpMethod::Post, self.endpoint("upload-media")).multipart(form);
        let response = self.send(request).await?;
        Self::parse(&response)
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn apply_auth(&self, request: HttpRequest) -> HttpRequest {
        match self.bearer.read().as_deref() {
            Some(token) => request.bearer_token(token),
            None => request,
        }
    }

    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let request = self.apply_auth(request);
        let url = request.url.clone();
        debug!(url = %url, "Executing API request");

        let response = self.http.execute(request).await?;

        if response.is_success() {
            return Ok(response);
        }

        let message: String = response
            .text()
            .unwrap_or_default()
            .chars()
            .take(ERROR_BODY_LIMIT)
            .collect();
        warn!(url = %url, status = response.status, "API request failed");
        Err(DpopError::Api {
            status: response.status,
            message,
        })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let request = HttpRequest::new(HttpMethod::Get, self.endpoint(path));
        let response = self.send(request).await?;
        Self::parse(&response)
    }

    async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let request = HttpRequest::new(HttpMethod::Post, self.endpoint(path))
            .json(body)
            .map_err(DpopError::Transport)?;
        let response = self.send(request).await?;
        Self::parse(&response)
    }

    fn parse<T: DeserializeOwned>(response: &HttpResponse) -> Result<T> {
        response.json().map_err(|e| DpopError::Decode(e.to_string()))
    }
}

impl std::fmt::Debug for DpopClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DpopClient")
            .field("base_url", &self.base_url)
            .field("has_bearer", &self.has_bearer())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::error::Result as BridgeResult;
    use bytes::Bytes;
    use parking_lot::Mutex;
    use std::collections::HashMap;

    /// Mock HTTP client that records requests and returns canned responses.
    struct MockHttpClient {
        requests: Mutex<Vec<HttpRequest>>,
        responses: Mutex<Vec<(u16, &'static str)>>,
    }

    impl MockHttpClient {
        fn new(responses: Vec<(u16, &'static str)>) -> Self {
            Self {
                requests: Mutex::new(Vec::new()),
                responses: Mutex::new(responses),
            }
        }

        fn last_request(&self) -> HttpRequest {
            self.requests.lock().last().cloned().unwrap()
        }
    }

    #[async_trait::async_trait]
    impl HttpClient for MockHttpClient {
        async fn execute(&self, request: HttpRequest) -> BridgeResult<HttpResponse> {
            self.requests.lock().push(request);
            let (status, body) = self.responses.lock().remove(0);
            Ok(HttpResponse {
                status,
                headers: HashMap::new(),
                body: Bytes::from_static(body.as_bytes()),
            })
        }
    }

    fn client_with(responses: Vec<(u16, &'static str)>) -> (Arc<MockHttpClient>, DpopClient) {
        let http = Arc::new(MockHttpClient::new(responses));
        let client = DpopClient::new(http.clone(), "https://api.dpop.tech/api/");
        (http, client)
    }

    #[tokio::test]
    async fn test_base_url_trailing_slash_trimmed() {
        let (http, client) = client_with(vec![(200, r#"[]"#)]);
        client.venues().await.unwrap();
        assert_eq!(
            http.last_request().url,
            "https://api.dpop.tech/api/venues"
        );
    }

    #[tokio::test]
    async fn test_bearer_injected_when_set() {
        let (http, client) = client_with(vec![(200, r#"[]"#), (200, r#"[]"#)]);

        client.rsvps().await.unwrap();
        assert!(!http.last_request().headers.contains_key("Authorization"));

        client.set_bearer("tok123");
        client.rsvps().await.unwrap();
        assert_eq!(
            http.last_request().headers.get("Authorization"),
            Some(&"Bearer tok123".to_string())
        );
    }

    #[tokio::test]
    async fn test_non_success_status_is_error_not_decoded() {
        let (_, client) = client_with(vec![(401, r#"{"message":"unauthorized"}"#)]);

        let err = client.current_user().await.unwrap_err();
        match err {
            DpopError::Api { status, message } => {
                assert_eq!(status, 401);
                assert!(message.contains("unauthorized"));
            }
            other => panic!("Expected Api error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_login_decodes_token_and_user() {
        let (http, client) = client_with(vec![(
            200,
            r#"{"token":"jwt-abc","user":{"id":5,"name":"Rita"}}"#,
        )]);

        let auth = client
            .login(&LoginRequest {
                email: "rita@example.com".to_string(),
                password: "pw".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(auth.token.as_deref(), Some("jwt-abc"));
        assert_eq!(auth.user.unwrap().id, 5);
        assert_eq!(http.last_request().url, "https://api.dpop.tech/api/login");
        assert_eq!(
            http.last_request().headers.get("Content-Type"),
            Some(&"application/json".to_string())
        );
    }

    #[tokio::test]
    async fn test_upload_media_builds_multipart_body() {
        let (http, client) = client_with(vec![(
            200,
            r#"{"url":"https://cdn.dpop.tech/m/1.m4a"}"#,
        )]);

        let upload = MediaUpload {
            filename: "clip.m4a".to_string(),
            content_type: "audio/mp4".to_string(),
            data: Bytes::from_static(b"audio-bytes"),
        };
        let receipt = client
            .upload_media(&upload, &serde_json::json!({"duration_secs": 3}))
            .await
            .unwrap();

        assert_eq!(receipt.url, "https://cdn.dpop.tech/m/1.m4a");

        let request = http.last_request();
        assert_eq!(request.url, "https://api.dpop.tech/api/upload-media");
        let content_type = request.headers.get("Content-Type").unwrap();
        assert!(content_type.starts_with("multipart/form-data; boundary="));

        let body = String::from_utf8(request.body.unwrap().to_vec()).unwrap();
        assert!(body.contains("name=\"image\"; filename=\"clip.m4a\""));
        assert!(body.contains("name=\"exif\""));
        assert!(body.contains("audio-bytes"));
    }

    #[tokio::test]
    async fn test_endpoint_paths() {
        let (http, client) = client_with(vec![
            (200, r#"{"id":1,"title":"Opening Night"}"#),
            (200, r#"{"event_id":1,"status":"going"}"#),
            (200, r#"{"event_id":1,"status":"going"}"#),
            (200, r#"{"text":"see you there"}"#),
            (200, r#"{"event_id":1,"checked_in_at":"2025-06-01T20:00:00Z"}"#),
            (200, r#"{"id":2,"title":"Eastern Market Mural"}"#),
            (200, r#"{"id":3}"#),
            (200, r#"[]"#),
            (200, r#"[]"#),
        ]);

        client.event(1).await.unwrap();
        client
            .rsvp(
                1,
                &RsvpRequest {
                    name: Some("Rita".to_string()),
                    email: None,
                    phone: None,
                },
            )
            .await
            .unwrap();
        client
            .signed_rsvp(
                1,
                &SignedRsvpRequest {
                    address: "0xabc".to_string(),
                    signature: "0xdef".to_string(),
                },
            )
            .await
            .unwrap();
        client
            .comment(
                1,
                &CommentRequest {
                    text: "see you there".to_string(),
                },
            )
            .await
            .unwrap();
        client.check_in(1).await.unwrap();
        client.artwork(2).await.unwrap();
        client
            .submit_flyer(&FlyerSubmission {
                image_url: "https://cdn.dpop.tech/f/3.jpg".to_string(),
            })
            .await
            .unwrap();
        client.flyers().await.unwrap();
        client.contents().await.unwrap();

        let paths: Vec<String> = http
            .requests
            .lock()
            .iter()
            .map(|r| r.url.trim_start_matches("https://api.dpop.tech/api/").to_string())
            .collect();
        assert_eq!(
            paths,
            vec![
                "event/1",
                "event/1/rsvp",
                "event/1/signed-rsvp",
                "event/1/comment",
                "event/1/check-in",
                "artwork/2",
                "flyer",
                "flyers",
                "content",
            ]
        );
    }

    #[tokio::test]
    async fn test_transient_classification() {
        assert!(DpopError::Api {
            status: 503,
            message: String::new()
        }
        .is_transient());
        assert!(!DpopError::Api {
            status: 404,
            message: String::new()
        }
        .is_transient());
        assert!(!DpopError::Decode("bad".to_string()).is_transient());
    }
}
