//! HTTP transport seam.
//!
//! The delivery client only needs "POST these bytes, tell me the status
//! code". [`HttpTransport`] captures exactly that, so tests can count
//! requests without a socket and the binary can use `reqwest`.

#![allow(async_fn_in_trait)]

use crate::error::TransportError;
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;
use tracing::{debug, trace, warn};

/// One outbound POST.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    pub content_type: &'static str,
    pub body: Vec<u8>,
    pub timeout: Duration,
}

/// Something that can POST a body and report the response status.
///
/// Implementations perform exactly one request per call and never retry.
pub trait HttpTransport: Send + Sync {
    /// Send the request and return the HTTP status code.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] when no status line was received.
    async fn post(&self, request: HttpRequest) -> Result<u16, TransportError>;
}

/// [`HttpTransport`] backed by a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Build a transport whose connections are bounded by `connect_timeout`.
    ///
    /// Redirects are not followed: a 3xx answer is reported as received.
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialised.
    pub fn new(connect_timeout: Duration) -> Result<Self, TransportError> {
        // One request per call: 3xx answers are returned, never followed
        let client = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| TransportError::Request(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { client })
    }
}

impl HttpTransport for ReqwestTransport {
    async fn post(&self, request: HttpRequest) -> Result<u16, TransportError> {
        let timeout_ms = request.timeout.as_millis() as u64;
        trace!(url = %request.url, bytes = request.body.len(), "Posting request");

        let send = self
            .client
            .post(&request.url)
            .header(CONTENT_TYPE, request.content_type)
            .timeout(request.timeout)
            .body(request.body)
            .send();

        match tokio::time::timeout(request.timeout, send).await {
            Ok(Ok(response)) => {
                let status = response.status().as_u16();
                debug!(url = %request.url, status, "Server responded");
                Ok(status)
            }
            Ok(Err(e)) if e.is_timeout() => {
                warn!("Request timeout after {}ms", timeout_ms);
                Err(TransportError::Timeout(timeout_ms))
            }
            Ok(Err(e)) if e.is_connect() => {
                warn!(url = %request.url, "Connection failed: {}", e);
                Err(TransportError::Connect(e.to_string()))
            }
            Ok(Err(e)) => {
                warn!(url = %request.url, "Request failed: {}", e);
                Err(TransportError::Request(e.to_string()))
            }
            Err(_) => {
                warn!("Request timeout after {}ms", timeout_ms);
                Err(TransportError::Timeout(timeout_ms))
            }
        }
    }
}
