//! Reqwest-backed HTTP bridge.
//!
//! Desktop transport for the DPoP API client: connection pooling and TLS
//! come from reqwest, retry with backoff is layered here. Server errors and
//! rate limiting (5xx, 429) are retried; any other status is returned to the
//! caller untouched, since status interpretation belongs to the API layer.

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    http::{HttpClient, HttpMethod, HttpRequest, HttpResponse, RetryPolicy},
};
use reqwest::Client;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// [`HttpClient`] implementation over a shared reqwest [`Client`].
pub struct ReqwestHttpClient {
    client: Client,
}

impl ReqwestHttpClient {
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Build a client with a custom default request timeout. Per-request
    /// timeouts on [`HttpRequest`] still take precedence.
    pub fn with_timeout(timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(CONNECT_TIMEOUT)
            .user_agent(concat!("detroit-art-core/", env!("CARGO_PKG_VERSION")))
            .build()
            .expect("reqwest client construction only fails on TLS backend misconfiguration");
        Self { client }
    }

    /// Wrap an existing reqwest client (shared pools, custom proxies).
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    fn to_reqwest(&self, request: HttpRequest) -> reqwest::RequestBuilder {
        let method = match request.method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Delete => reqwest::Method::DELETE,
            HttpMethod::Head => reqwest::Method::HEAD,
        };

        let mut builder = self.client.request(method, &request.url);
        for (name, value) in request.headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }
        builder
    }

    async fn attempt(&self, request: HttpRequest) -> Result<HttpResponse> {
        let response = self.to_reqwest(request).send().await.map_err(|e| {
            if e.is_timeout() {
                BridgeError::OperationFailed("request deadline exceeded".to_string())
            } else {
                BridgeError::OperationFailed(format!("transport failure: {}", e))
            }
        })?;

        let status = response.status().as_u16();
        let headers: HashMap<String, String> = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.to_string(), v.to_string()))
            })
            .collect();
        let body = response
            .bytes()
            .await
            .map_err(|e| BridgeError::OperationFailed(format!("body read failed: {}", e)))?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }

    fn is_retryable_status(status: u16) -> bool {
        status >= 500 || status == 429
    }
}

impl Default for ReqwestHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        self.execute_with_retry(request, RetryPolicy::default())
            .await
    }

    async fn execute_with_retry(
        &self,
        request: HttpRequest,
        policy: RetryPolicy,
    ) -> Result<HttpResponse> {
        let attempts = policy.max_attempts.max(1);
        let mut last_error = None;

        for attempt in 1..=attempts {
            debug!(url = %request.url, attempt, attempts, "HTTP request");

            match self.attempt(request.clone()).await {
                Ok(response) if Self::is_retryable_status(response.status) => {
                    warn!(
                        url = %request.url,
                        status = response.status,
                        attempt,
                        "Retryable response status"
                    );
                    last_error = Some(BridgeError::OperationFailed(format!(
                        "server returned {}",
                        response.status
                    )));
                }
                Ok(response) => return Ok(response),
                Err(e) => {
                    warn!(url = %request.url, error = %e, attempt, "Request attempt failed");
                    last_error = Some(e);
                }
            }

            if attempt < attempts {
                tokio::time::sleep(policy.delay_after(attempt)).await;
            }
        }

        Err(last_error.unwrap_or_else(|| {
            BridgeError::OperationFailed("all retry attempts failed".to_string())
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    #[test]
    fn retryable_statuses() {
        assert!(ReqwestHttpClient::is_retryable_status(500));
        assert!(ReqwestHttpClient::is_retryable_status(503));
        assert!(ReqwestHttpClient::is_retryable_status(429));
        assert!(!ReqwestHttpClient::is_retryable_status(200));
        assert!(!ReqwestHttpClient::is_retryable_status(401));
        assert!(!ReqwestHttpClient::is_retryable_status(404));
    }

    #[tokio::test]
    async fn builds_reqwest_request_from_bridge_request() {
        let client = ReqwestHttpClient::new();
        let request = HttpRequest::new(HttpMethod::Post, "https://api.dpop.tech/api/content")
            .header("X-Check", "yes")
            .body(Bytes::from_static(b"{}"))
            .timeout(Duration::from_secs(5));

        let built = client.to_reqwest(request).build().unwrap();
        assert_eq!(built.method(), reqwest::Method::POST);
        assert_eq!(built.url().as_str(), "https://api.dpop.tech/api/content");
        assert_eq!(built.headers().get("X-Check").unwrap(), "yes");
        assert_eq!(built.timeout(), Some(&Duration::from_secs(5)));
    }
}
