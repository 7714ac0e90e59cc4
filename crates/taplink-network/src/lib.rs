//! Delivery of card reads to the backend over HTTP.
//!
//! This crate turns an accepted card read into one JSON POST and classifies
//! the result. The HTTP layer sits behind [`HttpTransport`] so the reader
//! loop can be tested without sockets.
//!
//! # Components
//!
//! - **DeliveryClient**: link precondition, payload encoding, outcome mapping
//! - **ReqwestTransport**: production transport on `reqwest`
//! - **MockTransport**: scripted transport that records requests
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use chrono::Utc;
//! use taplink_core::CanonicalUid;
//! use taplink_network::{DeliveryClient, DeliveryConfig, ReadMetadata, ReqwestTransport};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let transport = ReqwestTransport::new(Duration::from_secs(5))?;
//! let client = DeliveryClient::new(transport, DeliveryConfig::default());
//!
//! let uid = CanonicalUid::from_bytes(&[0x04, 0xA3, 0x1B, 0x9C])?;
//! let outcome = client
//!     .send(&true, &uid, &ReadMetadata::new("taplink-01", Utc::now()))
//!     .await;
//! println!("{outcome}");
//! # Ok(())
//! # }
//! ```

mod client;
mod error;
pub mod mock;
mod payload;
mod transport;

pub use client::{DeliveryClient, DeliveryConfig, DeliveryOutcome};
pub use error::TransportError;
pub use payload::{ReadMetadata, ReadPayload};
pub use transport::{HttpRequest, HttpTransport, ReqwestTransport};
