//! Hardware abstraction layer for the taplink card reader.
//!
//! This crate provides trait-based abstractions for the peripherals the
//! reader loop drives: the card transceiver, the wireless link and the
//! indicator outputs. Implementations are interchangeable between mocks (for
//! tests), host devices (for running on a workstation) and on-target drivers.
//!
//! # Design Philosophy
//!
//! - **Async-first**: All I/O operations are asynchronous using native `async fn`
//!   in traits (Rust 1.90 + Edition 2024 RPITIT).
//! - **Enum dispatch**: The traits are not object-safe; [`devices`] provides
//!   `Any*` enums for runtime selection.
//! - **Thread-safe**: All traits require `Send + Sync` for use with Tokio.
//! - **Error-aware**: All operations return `Result<T>` with detailed error information.
//!
//! # Device Traits
//!
//! ## Card Readers
//!
//! The [`CardReader`] trait is polled by the main loop:
//!
//! ```no_run
//! use taplink_hardware::traits::CardReader;
//! use taplink_hardware::error::Result;
//!
//! async fn next_uid<R: CardReader>(reader: &mut R) -> Result<Option<String>> {
//!     if !reader.is_new_card_present().await? {
//!         return Ok(None);
//!     }
//!     let card = reader.read_serial().await?;
//!     reader.halt().await?;
//!     Ok(card.map(|c| c.uid.canonical().hex))
//! }
//! ```
//!
//! ## Wireless Links
//!
//! The [`WirelessLink`] trait separates starting an association from polling
//! its status, so the caller owns the timeout.
//!
//! ## Indicators
//!
//! The [`Indicator`] trait shows an [`IndicatorSignal`]. Indicator failures
//! are cosmetic and never stop the loop.
//!
//! # Error Handling
//!
//! All operations return [`Result<T>`][error::Result] which uses the
//! [`HardwareError`] error type.
//!
//! [`CardReader`]: traits::CardReader
//! [`WirelessLink`]: traits::WirelessLink
//! [`Indicator`]: traits::Indicator

pub mod devices;
pub mod error;
pub mod host;
pub mod mock;
pub mod traits;
pub mod types;

// Re-export commonly used types for convenience
pub use devices::{AnyCardReader, AnyIndicator, AnyWirelessLink};
pub use error::{HardwareError, Result};
pub use host::{HostLink, LogIndicator};
pub use traits::{CardData, CardReader, CardType, Indicator, WirelessLink};
pub use types::{Credentials, IndicatorSignal, Pulse, ReaderInfo};
