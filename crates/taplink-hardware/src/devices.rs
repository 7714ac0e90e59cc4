//! Enum wrappers for hardware device dispatch.
//!
//! Native `async fn` in traits (RPITIT, Rust Edition 2024) is not
//! object-safe, so `Box<dyn CardReader>` is not available. These enums give
//! the binary one concrete type per capability and pick the implementation
//! at startup.
//!
//! # Examples
//!
//! ```
//! use taplink_hardware::devices::AnyCardReader;
//! use taplink_hardware::mock::MockReader;
//!
//! let (reader, _handle) = MockReader::new();
//! let any_reader = AnyCardReader::Mock(reader);
//!
//! // Can now be used polymorphically through the CardReader trait
//! ```

use crate::host::{HostLink, LogIndicator};
use crate::mock::{MockIndicator, MockLink, MockReader};
use crate::traits::{CardReader, Indicator, WirelessLink};
use crate::{CardData, Credentials, IndicatorSignal, ReaderInfo, Result};
use taplink_core::LinkState;

/// Enum wrapper for card reader dispatch.
///
/// # Examples
///
/// ```
/// use taplink_hardware::devices::AnyCardReader;
/// use taplink_hardware::traits::CardReader;
/// use taplink_hardware::mock::MockReader;
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() -> taplink_hardware::Result<()> {
///     let (reader, _handle) = MockReader::new();
///     let mut any_reader = AnyCardReader::Mock(reader);
///
///     let info = any_reader.reader_info().await?;
///     println!("Reader: {}", info.name);
///
///     Ok(())
/// }
/// ```
#[derive(Debug)]
#[non_exhaustive]
pub enum AnyCardReader {
    /// Mock or console-fed reader.
    Mock(MockReader),
    // TODO: add an Mfrc522 variant behind the `hardware-spi` feature once a
    // linux-embedded-hal SPI driver is wired in.
}

impl CardReader for AnyCardReader {
    async fn reader_info(&mut self) -> Result<ReaderInfo> {
        match self {
            Self::Mock(device) => device.reader_info().await,
        }
    }

    async fn is_new_card_present(&mut self) -> Result<bool> {
        match self {
            Self::Mock(device) => device.is_new_card_present().await,
        }
    }

    async fn read_serial(&mut self) -> Result<Option<CardData>> {
        match self {
            Self::Mock(device) => device.read_serial().await,
        }
    }

    async fn halt(&mut self) -> Result<()> {
        match self {
            Self::Mock(device) => device.halt().await,
        }
    }
}

/// Enum wrapper for wireless link dispatch.
#[derive(Debug)]
#[non_exhaustive]
pub enum AnyWirelessLink {
    /// Simulated link for testing.
    Mock(MockLink),

    /// The host's network stack.
    Host(HostLink),
}

impl WirelessLink for AnyWirelessLink {
    async fn connect(&mut self, credentials: &Credentials) -> Result<()> {
        match self {
            Self::Mock(link) => link.connect(credentials).await,
            Self::Host(link) => link.connect(credentials).await,
        }
    }

    async fn status(&mut self) -> Result<LinkState> {
        match self {
            Self::Mock(link) => link.status().await,
            Self::Host(link) => link.status().await,
        }
    }

    async fn disconnect(&mut self) -> Result<()> {
        match self {
            Self::Mock(link) => link.disconnect().await,
            Self::Host(link) => link.disconnect().await,
        }
    }
}

/// Enum wrapper for indicator dispatch.
#[derive(Debug)]
#[non_exhaustive]
pub enum AnyIndicator {
    /// Recording indicator for testing.
    Mock(MockIndicator),

    /// Indicator that writes to the log.
    Log(LogIndicator),
}

impl Indicator for AnyIndicator {
    async fn show(&mut self, signal: IndicatorSignal) -> Result<()> {
        match self {
            Self::Mock(indicator) => indicator.show(signal).await,
            Self::Log(indicator) => indicator.show(signal).await,
        }
    }
}
