//! Delivery client for accepted card reads.
//!
//! # Architecture
//!
//! ```text
//! ReaderLoop
//!     │
//!     └─> DeliveryClient ──(link check)──> LinkMonitor
//!              │
//!              └─> HttpTransport ───(HTTP POST)───> Backend
//! ```
//!
//! # Design Principles
//!
//! - **Fail fast**: no request is made while the link is down
//! - **No automatic retry**: exactly one request per `send`
//! - **No queueing**: a failed delivery is reported and dropped
//! - **Bounded**: every request carries the configured timeout
//!
//! Retries would block the single-threaded loop against a dead endpoint;
//! the next presentation of a card is the retry.

use crate::error::TransportError;
use crate::payload::{ReadMetadata, ReadPayload};
use crate::transport::{HttpRequest, HttpTransport};
use std::fmt;
use std::time::Duration;
use taplink_core::constants::{CONTENT_TYPE_JSON, DEFAULT_DELIVERY_TIMEOUT_MS, DEFAULT_SERVER_URL};
use taplink_core::{CanonicalUid, LinkMonitor};
use tracing::{debug, info, warn};

/// Result of one delivery attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// The backend answered with a 2xx status.
    Delivered(u16),

    /// The backend answered with any other status.
    RejectedByServer(u16),

    /// No status was received.
    TransportFailed(TransportError),

    /// The link was down; nothing was sent.
    LinkUnavailable,
}

impl DeliveryOutcome {
    /// Map a transport result onto an outcome.
    pub fn from_response(result: Result<u16, TransportError>) -> Self {
        match result {
            Ok(status) if (200..=299).contains(&status) => Self::Delivered(status),
            Ok(status) => Self::RejectedByServer(status),
            Err(e) => Self::TransportFailed(e),
        }
    }

    /// Returns `true` for [`DeliveryOutcome::Delivered`].
    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered(_))
    }
}

impl fmt::Display for DeliveryOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Delivered(status) => write!(f, "delivered ({status})"),
            Self::RejectedByServer(status) => write!(f, "rejected by server ({status})"),
            Self::TransportFailed(e) => write!(f, "transport failed: {e}"),
            Self::LinkUnavailable => write!(f, "link unavailable"),
        }
    }
}

/// Configuration for the delivery client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryConfig {
    /// Endpoint every read is posted to
    pub url: String,

    /// Bound on a single POST
    pub timeout: Duration,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_SERVER_URL.to_string(),
            timeout: Duration::from_millis(DEFAULT_DELIVERY_TIMEOUT_MS),
        }
    }
}

/// Posts accepted reads to the configured endpoint.
///
/// # Example
///
/// ```
/// use chrono::Utc;
/// use taplink_core::CanonicalUid;
/// use taplink_network::mock::{MockResponse, MockTransport};
/// use taplink_network::{DeliveryClient, DeliveryConfig, DeliveryOutcome, ReadMetadata};
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() {
///     let transport = MockTransport::new(MockResponse::Status(201));
///     let client = DeliveryClient::new(transport.clone(), DeliveryConfig::default());
///
///     let uid = CanonicalUid::from_bytes(&[0x04, 0xA3, 0x1B, 0x9C]).unwrap();
///     let metadata = ReadMetadata::new("taplink-01", Utc::now());
///
///     let outcome = client.send(&true, &uid, &metadata).await;
///     assert_eq!(outcome, DeliveryOutcome::Delivered(201));
///
///     let outcome = client.send(&false, &uid, &metadata).await;
///     assert_eq!(outcome, DeliveryOutcome::LinkUnavailable);
///     assert_eq!(transport.call_count(), 1);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct DeliveryClient<T> {
    transport: T,
    config: DeliveryConfig,
}

impl<T: HttpTransport> DeliveryClient<T> {
    pub fn new(transport: T, config: DeliveryConfig) -> Self {
        debug!(url = %config.url, "Creating delivery client");
        Self { transport, config }
    }

    /// Endpoint reads are posted to.
    pub fn url(&self) -> &str {
        &self.config.url
    }

    /// The underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Deliver one read.
    ///
    /// Checks `link` first and returns [`DeliveryOutcome::LinkUnavailable`]
    /// without touching the transport when it is down. Otherwise performs
    /// exactly one POST.
    pub async fn send(
        &self,
        link: &impl LinkMonitor,
        uid: &CanonicalUid,
        metadata: &ReadMetadata,
    ) -> DeliveryOutcome {
        if !link.is_connected() {
            warn!(uid_hex = %uid.hex, "Link down, read dropped");
            return DeliveryOutcome::LinkUnavailable;
        }

        let payload = ReadPayload::new(uid, metadata);
        let body = match serde_json::to_vec(&payload) {
            Ok(body) => body,
            Err(e) => {
                return DeliveryOutcome::TransportFailed(TransportError::Request(format!(
                    "Failed to encode payload: {e}"
                )));
            }
        };

        let request = HttpRequest {
            url: self.config.url.clone(),
            content_type: CONTENT_TYPE_JSON,
            body,
            timeout: self.config.timeout,
        };

        let outcome = DeliveryOutcome::from_response(self.transport.post(request).await);
        match &outcome {
            DeliveryOutcome::Delivered(status) => {
                info!(uid_hex = %uid.hex, status, "Read delivered");
            }
            DeliveryOutcome::RejectedByServer(status) => {
                warn!(uid_hex = %uid.hex, status, "Read rejected by server");
            }
            DeliveryOutcome::TransportFailed(e) => {
                warn!(uid_hex = %uid.hex, error = %e, "Read not delivered");
            }
            DeliveryOutcome::LinkUnavailable => {}
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockResponse, MockTransport};
    use chrono::DateTime;
    use rstest::rstest;
    use taplink_core::LinkState;

    fn uid() -> CanonicalUid {
        CanonicalUid::from_bytes(&[0x04, 0xA3, 0x1B, 0x9C]).unwrap()
    }

    fn metadata() -> ReadMetadata {
        ReadMetadata::new(
            "taplink-01",
            DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
        )
    }

    #[rstest]
    #[case(MockResponse::Status(200), DeliveryOutcome::Delivered(200))]
    #[case(MockResponse::Status(204), DeliveryOutcome::Delivered(204))]
    #[case(MockResponse::Status(299), DeliveryOutcome::Delivered(299))]
    #[case(MockResponse::Status(302), DeliveryOutcome::RejectedByServer(302))]
    #[case(MockResponse::Status(400), DeliveryOutcome::RejectedByServer(400))]
    #[case(MockResponse::Status(500), DeliveryOutcome::RejectedByServer(500))]
    #[case(
        MockResponse::Timeout,
        DeliveryOutcome::TransportFailed(TransportError::Timeout(5000))
    )]
    #[tokio::test]
    async fn test_status_mapping(
        #[case] response: MockResponse,
        #[case] expected: DeliveryOutcome,
    ) {
        let transport = MockTransport::new(response);
        let client = DeliveryClient::new(transport.clone(), DeliveryConfig::default());

        let outcome = client.send(&LinkState::Connected, &uid(), &metadata()).await;
        assert_eq!(outcome, expected);
        assert_eq!(transport.call_count(), 1);
    }

    #[tokio::test]
    async fn test_refused_is_transport_failure() {
        let transport = MockTransport::new(MockResponse::Refused);
        let client = DeliveryClient::new(transport, DeliveryConfig::default());

        let outcome = client.send(&true, &uid(), &metadata()).await;
        assert!(matches!(
            outcome,
            DeliveryOutcome::TransportFailed(TransportError::Connect(_))
        ));
    }

    #[rstest]
    #[case(LinkState::Disconnected)]
    #[case(LinkState::Connecting)]
    #[tokio::test]
    async fn test_link_down_makes_no_request(#[case] state: LinkState) {
        let transport = MockTransport::default();
        let client = DeliveryClient::new(transport.clone(), DeliveryConfig::default());

        let outcome = client.send(&state, &uid(), &metadata()).await;
        assert_eq!(outcome, DeliveryOutcome::LinkUnavailable);
        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test]
    async fn test_request_shape() {
        let transport = MockTransport::default();
        let config = DeliveryConfig {
            url: "http://10.0.0.5:5000/api/rfid".to_string(),
            timeout: Duration::from_millis(1234),
        };
        let client = DeliveryClient::new(transport.clone(), config);
        assert_eq!(client.url(), "http://10.0.0.5:5000/api/rfid");

        client.send(&true, &uid(), &metadata()).await;

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].url, "http://10.0.0.5:5000/api/rfid");
        assert_eq!(requests[0].content_type, "application/json");
        assert_eq!(requests[0].timeout, Duration::from_millis(1234));

        let body = transport.last_json().unwrap();
        assert_eq!(body["uid_hex"], "04A31B9C");
        assert_eq!(body["uid_dec"], "77798300");
        assert_eq!(body["device"], "taplink-01");
        assert_eq!(body["timestamp"], 1_700_000_000);
    }

    #[tokio::test]
    async fn test_no_internal_retry() {
        let transport = MockTransport::new(MockResponse::Status(503));
        let client = DeliveryClient::new(transport.clone(), DeliveryConfig::default());

        let outcome = client.send(&true, &uid(), &metadata()).await;
        assert_eq!(outcome, DeliveryOutcome::RejectedByServer(503));
        assert_eq!(transport.call_count(), 1);
    }

    #[test]
    fn test_outcome_display() {
        assert_eq!(DeliveryOutcome::Delivered(200).to_string(), "delivered (200)");
        assert_eq!(
            DeliveryOutcome::LinkUnavailable.to_string(),
            "link unavailable"
        );
        assert!(DeliveryOutcome::Delivered(201).is_delivered());
        assert!(!DeliveryOutcome::RejectedByServer(500).is_delivered());
    }
}
