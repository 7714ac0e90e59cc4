//! Scripted transport for tests.

use crate::error::TransportError;
use crate::transport::{HttpRequest, HttpTransport};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

/// What the mock answers to one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockResponse {
    /// Respond with this HTTP status.
    Status(u16),

    /// Fail as if the connection was refused.
    Refused,

    /// Fail as if no response arrived before the timeout.
    Timeout,
}

#[derive(Debug)]
struct MockState {
    script: VecDeque<MockResponse>,
    fallback: MockResponse,
    requests: Vec<HttpRequest>,
}

/// Transport that records every request and replays scripted responses.
///
/// Clones share the script and the request log, so a test can keep one
/// clone while the client owns another.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use taplink_network::mock::{MockResponse, MockTransport};
/// use taplink_network::{HttpRequest, HttpTransport};
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() {
///     let transport = MockTransport::new(MockResponse::Status(200));
///     transport.push(MockResponse::Status(500));
///
///     let request = HttpRequest {
///         url: "http://backend/api/rfid".to_string(),
///         content_type: "application/json",
///         body: b"{}".to_vec(),
///         timeout: Duration::from_secs(5),
///     };
///
///     assert_eq!(transport.post(request.clone()).await, Ok(500));
///     assert_eq!(transport.post(request).await, Ok(200));
///     assert_eq!(transport.call_count(), 2);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    /// Create a transport that answers `fallback` once the script is empty.
    pub fn new(fallback: MockResponse) -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState {
                script: VecDeque::new(),
                fallback,
                requests: Vec::new(),
            })),
        }
    }

    /// Queue a response for the next unanswered request.
    pub fn push(&self, response: MockResponse) {
        self.lock().script.push_back(response);
    }

    /// Replace the response used once the script runs out.
    pub fn set_fallback(&self, response: MockResponse) {
        self.lock().fallback = response;
    }

    /// Number of requests received.
    pub fn call_count(&self) -> usize {
        self.lock().requests.len()
    }

    /// All requests received, oldest first.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.lock().requests.clone()
    }

    /// Body of the last request decoded as JSON.
    pub fn last_json(&self) -> Option<serde_json::Value> {
        self.lock()
            .requests
            .last()
            .and_then(|request| serde_json::from_slice(&request.body).ok())
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new(MockResponse::Status(200))
    }
}

impl HttpTransport for MockTransport {
    async fn post(&self, request: HttpRequest) -> Result<u16, TransportError> {
        let timeout_ms = request.timeout.as_millis() as u64;

        let response = {
            let mut state = self.lock();
            state.requests.push(request);
            state
                .script
                .pop_front()
                .unwrap_or_else(|| state.fallback.clone())
        };

        match response {
            MockResponse::Status(code) => Ok(code),
            MockResponse::Refused => Err(TransportError::Connect(
                "connection refused (mock)".to_string(),
            )),
            MockResponse::Timeout => Err(TransportError::Timeout(timeout_ms)),
        }
    }
}
