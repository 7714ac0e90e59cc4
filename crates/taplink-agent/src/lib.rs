//! Reader agent: the read, debounce and deliver loop.
//!
//! This crate wires the card reader, the wireless link and the HTTP delivery
//! client into a single-threaded loop, and owns the link supervisor that
//! keeps the network up.
//!
//! # Example
//!
//! ```no_run
//! use taplink_agent::{AgentConfig, ReaderLoop};
//! use taplink_hardware::mock::{MockIndicator, MockLink, MockReader};
//! use taplink_network::mock::MockTransport;
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> taplink_agent::Result<()> {
//!     let config = AgentConfig::default();
//!     let (reader, _cards) = MockReader::new();
//!     let (link, _) = MockLink::new();
//!     let (link_indicator, _) = MockIndicator::new();
//!     let (event_indicator, _) = MockIndicator::new();
//!
//!     let mut agent = ReaderLoop::from_config(
//!         &config,
//!         reader,
//!         link,
//!         link_indicator,
//!         event_indicator,
//!         MockTransport::default(),
//!     );
//!     agent.boot().await?;
//!     agent.run(CancellationToken::new()).await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod link;
pub mod reader_loop;
pub mod stats;

pub use config::{AgentConfig, ReaderConfig, ServerConfig, WifiConfig};
pub use error::{AgentError, Result};
pub use link::{LinkSettings, LinkSupervisor, LinkTransition};
pub use reader_loop::{IterationOutcome, LoopSettings, ReaderLoop};
pub use stats::LoopStats;
