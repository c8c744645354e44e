//! HTTP client bridge.
//!
//! The core never talks to a socket itself; it builds [`HttpRequest`] values
//! and hands them to a host-provided [`HttpClient`]. The request carries
//! everything the transport needs (method, URL, headers, body, per-request
//! timeout), so implementations stay a thin shim over their platform stack.
//!
//! Media publishing needs `multipart/form-data`; [`MultipartForm`] encodes
//! the body here so transports only ever see finished bytes.

use async_trait::async_trait;
use bytes::Bytes;
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use uuid::Uuid;

use crate::error::{BridgeError, Result};

/// Request method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
}

/// A fully described HTTP request, ready for a transport to execute.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: HashMap<String, String>,
    pub body: Option<Bytes>,
    /// Per-request deadline; transports fall back to their own default when
    /// absent.
    pub timeout: Option<Duration>,
}

impl HttpRequest {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HashMap::new(),
            body: None,
            timeout: None,
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Attach an `Authorization: Bearer` header.
    pub fn bearer_token(self, token: impl Into<String>) -> Self {
        self.header("Authorization", format!("Bearer {}", token.into()))
    }

    /// Serialize `body` as the JSON request body.
    pub fn json<T: Serialize>(mut self, body: &T) -> Result<Self> {
        let encoded = serde_json::to_vec(body)
            .map_err(|e| BridgeError::OperationFailed(format!("request body encoding: {}", e)))?;
        self.body = Some(Bytes::from(encoded));
        self.headers
            .insert("Content-Type".to_string(), "application/json".to_string());
        Ok(self)
    }

    /// Attach an encoded multipart form as the request body, including its
    /// boundary-bearing `Content-Type` header.
    pub fn multipart(mut self, form: MultipartForm) -> Self {
        self.headers
            .insert("Content-Type".to_string(), form.content_type());
        self.body = Some(form.finish());
        self
    }

    pub fn body(mut self, body: Bytes) -> Self {
        self.body = Some(body);
        self
    }

    pub fn timeout(mut self, deadline: Duration) -> Self {
        self.timeout = Some(deadline);
        self
    }
}

/// The transport's answer: status, headers and the complete body.
#[derive(Debug)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: Bytes,
}

impl HttpResponse {
    /// Whether the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decode the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body)
            .map_err(|e| BridgeError::OperationFailed(format!("response body decoding: {}", e)))
    }

    /// The body as a UTF-8 string.
    pub fn text(&self) -> Result<String> {
        String::from_utf8(self.body.to_vec())
            .map_err(|e| BridgeError::OperationFailed(format!("response body not UTF-8: {}", e)))
    }
}

/// Incrementally built `multipart/form-data` body.
///
/// The DPoP upload endpoint wants a file part named `image` plus plain text
/// fields (an `exif` JSON string). Parts are appended in call order; the
/// boundary is random per form.
#[derive(Debug, Clone)]
pub struct MultipartForm {
    boundary: String,
    encoded: Vec<u8>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self {
            boundary: format!("dpop-{}", Uuid::new_v4().simple()),
            encoded: Vec::new(),
        }
    }

    /// Append a plain text field.
    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.open_part();
        self.encoded.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
        );
        self.encoded.extend_from_slice(value.as_bytes());
        self.encoded.extend_from_slice(b"\r\n");
        self
    }

    /// Append a file field with a filename and content type.
    pub fn file(mut self, name: &str, filename: &str, content_type: &str, data: &[u8]) -> Self {
        self.open_part();
        self.encoded.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                name, filename, content_type
            )
            .as_bytes(),
        );
        self.encoded.extend_from_slice(data);
        self.encoded.extend_from_slice(b"\r\n");
        self
    }

    /// The `Content-Type` header value matching this form's boundary.
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    /// Write the closing boundary and return the encoded body.
    pub fn finish(mut self) -> Bytes {
        self.encoded
            .extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());
        Bytes::from(self.encoded)
    }

    fn open_part(&mut self) {
        self.encoded
            .extend_from_slice(format!("--{}\r\n", self.boundary).as_bytes());
    }
}

impl Default for MultipartForm {
    fn default() -> Self {
        Self::new()
    }
}

/// Retry behavior for transient transport failures.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Delay before the first retry.
    pub base_delay: Duration,
    /// Cap on any single delay.
    pub max_delay: Duration,
    /// Double the delay on each retry instead of keeping it flat.
    pub exponential: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(10),
            exponential: true,
        }
    }
}

impl RetryPolicy {
    /// The delay to sleep after a failed attempt (1-based).
    pub fn delay_after(&self, attempt: u32) -> Duration {
        if self.exponential {
            let doubled = self.base_delay * 2u32.saturating_pow(attempt.saturating_sub(1));
            doubled.min(self.max_delay)
        } else {
            self.base_delay
        }
    }
}

/// Asynchronous HTTP transport provided by the host.
///
/// Implementations own connection pooling, TLS, and honoring
/// [`HttpRequest::timeout`]. Retrying is policy-driven: `execute` uses no
/// retries; `execute_with_retry` lets callers opt in.
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Execute a single request attempt.
    ///
    /// # Errors
    ///
    /// Fails on connection errors, TLS failures, or a missed deadline. A
    /// response with a non-2xx status is NOT an error at this layer; status
    /// interpretation belongs to the caller.
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse>;

    /// Execute with retries per `policy`. The default implementation ignores
    /// the policy and performs a single attempt; transports with retry
    /// support override it.
    async fn execute_with_retry(
        &self,
        request: HttpRequest,
        policy: RetryPolicy,
    ) -> Result<HttpResponse> {
        let _ = policy;
        self.execute(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_builder_collects_headers_and_timeout() {
        let request = HttpRequest::new(HttpMethod::Post, "https://api.dpop.tech/api/login")
            .bearer_token("tok")
            .header("X-Client", "core")
            .timeout(Duration::from_secs(15));

        assert_eq!(request.url, "https://api.dpop.tech/api/login");
        assert_eq!(
            request.headers.get("Authorization").map(String::as_str),
            Some("Bearer tok")
        );
        assert_eq!(request.timeout, Some(Duration::from_secs(15)));
    }

    #[test]
    fn json_body_sets_content_type() {
        let request = HttpRequest::new(HttpMethod::Post, "https://example.com")
            .json(&serde_json::json!({"email": "a@b.c"}))
            .unwrap();

        assert_eq!(
            request.headers.get("Content-Type").map(String::as_str),
            Some("application/json")
        );
        assert!(request.body.is_some());
    }

    #[test]
    fn response_success_range() {
        let mk = |status| HttpResponse {
            status,
            headers: HashMap::new(),
            body: Bytes::new(),
        };
        assert!(mk(200).is_success());
        assert!(mk(204).is_success());
        assert!(!mk(301).is_success());
        assert!(!mk(404).is_success());
    }

    #[test]
    fn multipart_encodes_parts_in_order() {
        let form = MultipartForm::new()
            .file("image", "clip.m4a", "audio/mp4", b"abc")
            .text("exif", r#"{"duration_secs":3}"#);
        let boundary = form.boundary.clone();
        let body = String::from_utf8(form.finish().to_vec()).unwrap();

        let image_at = body.find("name=\"image\"; filename=\"clip.m4a\"").unwrap();
        let exif_at = body.find("name=\"exif\"").unwrap();
        assert!(image_at < exif_at);
        assert!(body.contains("Content-Type: audio/mp4"));
        assert!(body.ends_with(&format!("--{}--\r\n", boundary)));
    }

    #[test]
    fn multipart_request_carries_boundary_header() {
        let form = MultipartForm::new().text("exif", "{}");
        let content_type = form.content_type();
        let request = HttpRequest::new(HttpMethod::Post, "https://example.com").multipart(form);

        assert_eq!(request.headers.get("Content-Type"), Some(&content_type));
    }

    #[test]
    fn retry_delay_doubles_and_caps() {
        let policy = RetryPolicy {
            max_attempts: 5,
            base_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(1),
            exponential: true,
        };
        assert_eq!(policy.delay_after(1), Duration::from_millis(250));
        assert_eq!(policy.delay_after(2), Duration::from_millis(500));
        assert_eq!(policy.delay_after(3), Duration::from_secs(1));
        assert_eq!(policy.delay_after(4), Duration::from_secs(1));

        let flat = RetryPolicy {
            exponential: false,
            ..policy
        };
        assert_eq!(flat.delay_after(3), Duration::from_millis(250));
    }
}
