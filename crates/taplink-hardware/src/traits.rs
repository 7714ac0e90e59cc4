//! Hardware capability trait definitions.
//!
//! The reader loop treats its peripherals as capabilities: a card transceiver
//! that is polled for cards, a wireless link with connect/status semantics and
//! indicator outputs. These traits are the contract between the loop and the
//! drivers, so mock, host and on-target implementations are interchangeable.
//!
//! All traits use native `async fn` methods (Rust 1.90 + Edition 2024 RPITIT),
//! eliminating the need for the `async_trait` macro.

#![allow(async_fn_in_trait)]

use crate::error::Result;
use crate::types::{Credentials, IndicatorSignal, ReaderInfo};
use taplink_core::{CardUid, LinkState};

/// Card type identification from the SAK byte.
///
/// The SAK (select acknowledge) byte returned during anticollision tells the
/// card family apart. Only the families an MFRC522 commonly sees are named.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum CardType {
    /// Mifare Classic 1K (SAK 0x08).
    MifareClassic1K,

    /// Mifare Classic 4K (SAK 0x18).
    MifareClassic4K,

    /// Mifare Ultralight / NTAG (SAK 0x00).
    MifareUltralight,

    /// Mifare DESFire or other ISO 14443-4 card (SAK 0x20).
    MifareDESFire,

    /// Unknown card type with raw SAK byte.
    Unknown(u8),
}

impl CardType {
    /// Identify the card family from a SAK byte.
    pub fn from_sak(sak: u8) -> Self {
        match sak {
            0x08 => Self::MifareClassic1K,
            0x18 => Self::MifareClassic4K,
            0x00 => Self::MifareUltralight,
            0x20 => Self::MifareDESFire,
            other => Self::Unknown(other),
        }
    }

    /// Get a human-readable name for the card type.
    pub fn name(&self) -> &str {
        match self {
            Self::MifareClassic1K => "Mifare Classic 1K",
            Self::MifareClassic4K => "Mifare Classic 4K",
            Self::MifareUltralight => "Mifare Ultralight",
            Self::MifareDESFire => "Mifare DESFire",
            Self::Unknown(_) => "Unknown",
        }
    }

    /// Check if this is a known card type.
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown(_))
    }
}

/// Data for one successful card read.
///
/// Produced fresh on every read and consumed within the same loop iteration.
#[derive(Debug, Clone)]
pub struct CardData {
    /// Card unique identifier (1-10 bytes, validated).
    pub uid: CardUid,

    /// Card type identification.
    pub card_type: CardType,

    /// Wall-clock time of the read.
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl CardData {
    /// Create new card data with the current timestamp.
    ///
    /// # Errors
    ///
    /// Returns an error if the UID is empty or longer than 10 bytes.
    ///
    /// # Examples
    ///
    /// ```
    /// use taplink_hardware::traits::{CardData, CardType};
    ///
    /// let card = CardData::new(vec![0x04, 0xAB, 0xCD, 0xEF], CardType::MifareClassic1K).unwrap();
    /// assert_eq!(card.uid.to_string(), "04ABCDEF");
    ///
    /// assert!(CardData::new(vec![], CardType::MifareClassic1K).is_err());
    /// ```
    pub fn new(uid: Vec<u8>, card_type: CardType) -> Result<Self> {
        CardDataBuilder::new(uid, card_type).build()
    }

    /// Create a builder for constructing card data with optional fields.
    ///
    /// This allows setting custom timestamps for testing or replaying
    /// recorded reads.
    ///
    /// # Examples
    ///
    /// ```
    /// use taplink_hardware::traits::{CardData, CardType};
    /// use chrono::{Utc, TimeZone};
    ///
    /// let read_at = Utc.with_ymd_and_hms(2025, 1, 15, 12, 30, 0).unwrap();
    /// let card = CardData::builder(vec![0x01, 0x02, 0x03, 0x04], CardType::MifareClassic1K)
    ///     .timestamp(read_at)
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(card.timestamp, read_at);
    /// ```
    pub fn builder(uid: Vec<u8>, card_type: CardType) -> CardDataBuilder {
        CardDataBuilder::new(uid, card_type)
    }
}

/// Builder for constructing CardData with optional fields.
#[derive(Debug, Clone)]
pub struct CardDataBuilder {
    uid: Vec<u8>,
    card_type: CardType,
    timestamp: Option<chrono::DateTime<chrono::Utc>>,
}

impl CardDataBuilder {
    /// Create a new CardDataBuilder with required fields.
    pub fn new(uid: Vec<u8>, card_type: CardType) -> Self {
        Self {
            uid,
            card_type,
            timestamp: None,
        }
    }

    /// Set a custom timestamp for the card read event.
    ///
    /// If not set, the current time will be used when build() is called.
    pub fn timestamp(mut self, timestamp: chrono::DateTime<chrono::Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Build the CardData instance with validation.
    ///
    /// # Errors
    ///
    /// Returns `HardwareError::Identifier` if the UID length is outside 1-10 bytes.
    pub fn build(self) -> Result<CardData> {
        let uid = CardUid::new(self.uid)?;

        Ok(CardData {
            uid,
            card_type: self.card_type,
            timestamp: self.timestamp.unwrap_or_else(chrono::Utc::now),
        })
    }
}

/// Card transceiver capability (e.g. an MFRC522 on SPI).
///
/// The transceiver is polled, never event-driven: the loop asks whether a new
/// card entered the field, then reads its serial, then releases it.
///
/// # Object Safety and Dynamic Dispatch
///
/// **NOTE**: This trait is NOT object-safe because `async fn` methods return
/// `impl Future`. Use generic type parameters, or
/// [`AnyCardReader`](crate::devices::AnyCardReader) for dispatch over the
/// implementations shipped with this crate.
///
/// # Examples
///
/// ```no_run
/// use taplink_hardware::traits::CardReader;
/// use taplink_hardware::error::Result;
///
/// async fn poll_once<R: CardReader>(reader: &mut R) -> Result<Option<String>> {
///     if !reader.is_new_card_present().await? {
///         return Ok(None);
///     }
///
///     let uid = reader.read_serial().await?.map(|card| card.uid.to_string());
///     reader.halt().await?;
///     Ok(uid)
/// }
/// ```
pub trait CardReader: Send + Sync {
    /// Query the reader for its identity and firmware version.
    ///
    /// Called once at boot as a self-test.
    ///
    /// # Errors
    ///
    /// Returns an error if the reader does not answer.
    async fn reader_info(&mut self) -> Result<ReaderInfo>;

    /// Check whether a new card entered the field since the last release.
    ///
    /// This is a short, non-blocking probe.
    ///
    /// # Errors
    ///
    /// Returns an error if a communication error occurs while probing.
    async fn is_new_card_present(&mut self) -> Result<bool>;

    /// Read the serial of the card found by the last presence probe.
    ///
    /// Returns `Ok(None)` when the card left the field before the read
    /// completed.
    ///
    /// # Errors
    ///
    /// Returns an error on a communication failure.
    async fn read_serial(&mut self) -> Result<Option<CardData>>;

    /// Release the current card (HALT the PICC).
    ///
    /// # Errors
    ///
    /// Returns an error on a communication failure.
    async fn halt(&mut self) -> Result<()>;
}

/// Wireless link capability.
///
/// `connect` starts an association and returns without waiting for it to
/// complete; callers poll `status` until it reports `Connected`.
///
/// # Examples
///
/// ```no_run
/// use taplink_core::LinkState;
/// use taplink_hardware::traits::WirelessLink;
/// use taplink_hardware::types::Credentials;
/// use taplink_hardware::error::Result;
///
/// async fn join<W: WirelessLink>(link: &mut W, creds: &Credentials) -> Result<()> {
///     link.connect(creds).await?;
///     while link.status().await? != LinkState::Connected {
///         tokio::time::sleep(std::time::Duration::from_millis(500)).await;
///     }
///     Ok(())
/// }
/// ```
pub trait WirelessLink: Send + Sync {
    /// Begin associating with the network.
    ///
    /// # Errors
    ///
    /// Returns an error if the association could not be started.
    async fn connect(&mut self, credentials: &Credentials) -> Result<()>;

    /// Current link status.
    ///
    /// # Errors
    ///
    /// Returns an error if the radio does not answer.
    async fn status(&mut self) -> Result<LinkState>;

    /// Drop the current association, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the radio does not answer.
    async fn disconnect(&mut self) -> Result<()>;
}

/// Binary/blink indicator output (an LED, a buzzer, a log line).
pub trait Indicator: Send + Sync {
    /// Show a signal.
    ///
    /// # Errors
    ///
    /// Returns an error if the output cannot be driven. Callers treat
    /// indicator errors as cosmetic.
    async fn show(&mut self, signal: IndicatorSignal) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_type_from_sak() {
        assert_eq!(CardType::from_sak(0x08), CardType::MifareClassic1K);
        assert_eq!(CardType::from_sak(0x18), CardType::MifareClassic4K);
        assert_eq!(CardType::from_sak(0x00), CardType::MifareUltralight);
        assert_eq!(CardType::from_sak(0x20), CardType::MifareDESFire);
        assert_eq!(CardType::from_sak(0x88), CardType::Unknown(0x88));
    }

    #[test]
    fn test_card_type_name() {
        assert_eq!(CardType::MifareClassic1K.name(), "Mifare Classic 1K");
        assert_eq!(CardType::MifareDESFire.name(), "Mifare DESFire");
        assert_eq!(CardType::Unknown(0x01).name(), "Unknown");
    }

    #[test]
    fn test_card_type_is_known() {
        assert!(CardType::MifareClassic1K.is_known());
        assert!(CardType::MifareUltralight.is_known());
        assert!(!CardType::Unknown(0x01).is_known());
    }

    #[test]
    fn test_card_data_uid_forms() {
        let card = CardData::new(vec![0x04, 0xA3, 0x1B, 0x9C], CardType::MifareClassic1K).unwrap();
        let canonical = card.uid.canonical();
        assert_eq!(canonical.hex, "04A31B9C");
        assert_eq!(canonical.decimal, 77_798_300);
    }

    #[test]
    fn test_card_data_invalid_uid_length() {
        // Empty
        let result = CardData::new(vec![], CardType::MifareClassic1K);
        assert!(result.is_err());

        // Too long
        let result = CardData::new(vec![0x01; 11], CardType::MifareClassic1K);
        assert!(result.is_err());

        // Valid lengths
        assert!(CardData::new(vec![0x01; 4], CardType::MifareClassic1K).is_ok());
        assert!(CardData::new(vec![0x01; 7], CardType::MifareUltralight).is_ok());
        assert!(CardData::new(vec![0x01; 10], CardType::MifareDESFire).is_ok());
    }

    #[test]
    fn test_card_data_builder_timestamp() {
        let ts = chrono::DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let card = CardData::builder(vec![0x01, 0x02, 0x03, 0x04], CardType::MifareClassic1K)
            .timestamp(ts)
            .build()
            .unwrap();
        assert_eq!(card.timestamp.timestamp(), 1_700_000_000);
    }
}
