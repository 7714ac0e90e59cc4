//! Mock card reader implementation for testing and development.
//!
//! This module provides a simulated transceiver that can be controlled
//! programmatically for testing without requiring physical hardware.

use crate::{
    HardwareError, Result,
    traits::{CardData, CardReader, CardType},
    types::ReaderInfo,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::mpsc;

/// Mock card reader for testing and development.
///
/// Presentations queued through the [`MockReaderHandle`] are picked up one
/// per presence probe, mirroring a transceiver polled by the main loop.
///
/// # Examples
///
/// ```
/// use taplink_hardware::mock::MockReader;
/// use taplink_hardware::traits::CardReader;
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() -> taplink_hardware::Result<()> {
///     let (mut reader, handle) = MockReader::new();
///
///     handle.present_card(vec![0x04, 0xAB, 0xCD, 0xEF]).await?;
///
///     assert!(reader.is_new_card_present().await?);
///     let card = reader.read_serial().await?.unwrap();
///     assert_eq!(card.uid.to_string(), "04ABCDEF");
///     reader.halt().await?;
///
///     assert!(!reader.is_new_card_present().await?);
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct MockReader {
    /// Channel receiver for card events
    event_rx: mpsc::Receiver<CardEvent>,

    /// Event picked up by the last presence probe
    pending: Option<CardEvent>,

    /// Device name
    name: String,

    /// Version register value reported by the self-test
    firmware_version: u8,

    /// Shared counters, also visible through the handle
    counters: Arc<ReaderCounters>,
}

/// MFRC522 version 2.0 register value.
const MOCK_FIRMWARE_VERSION: u8 = 0x92;

impl MockReader {
    /// Create a new mock reader with the default name.
    ///
    /// Returns a tuple of (MockReader, MockReaderHandle) where the handle
    /// can be used to simulate card presentations.
    pub fn new() -> (Self, MockReaderHandle) {
        Self::with_name("Mock MFRC522".to_string())
    }

    /// Create a new mock reader with a custom name.
    pub fn with_name(name: String) -> (Self, MockReaderHandle) {
        let (event_tx, event_rx) = mpsc::channel(32);
        let counters = Arc::new(ReaderCounters::default());

        let reader = Self {
            event_rx,
            pending: None,
            name: name.clone(),
            firmware_version: MOCK_FIRMWARE_VERSION,
            counters: Arc::clone(&counters),
        };

        let handle = MockReaderHandle {
            event_tx,
            name,
            card_types: HashMap::new(),
            counters,
        };

        (reader, handle)
    }

    /// Create a reader whose self-test reports an absent chip.
    ///
    /// The version register of a missing MFRC522 reads back as `0x00`.
    pub fn unresponsive() -> (Self, MockReaderHandle) {
        let (mut reader, handle) = Self::new();
        reader.firmware_version = 0x00;
        (reader, handle)
    }
}

impl CardReader for MockReader {
    async fn reader_info(&mut self) -> Result<ReaderInfo> {
        Ok(
            ReaderInfo::new(self.name.clone(), vec!["ISO14443A".to_string()])
                .with_firmware_version(self.firmware_version),
        )
    }

    async fn is_new_card_present(&mut self) -> Result<bool> {
        self.counters.polls.fetch_add(1, Ordering::Relaxed);

        if self.pending.is_some() {
            return Ok(true);
        }

        match self.event_rx.try_recv() {
            Ok(CardEvent::Fault(message)) => Err(HardwareError::bus(message)),
            Ok(event) => {
                self.pending = Some(event);
                Ok(true)
            }
            Err(_) => Ok(false),
        }
    }

    async fn read_serial(&mut self) -> Result<Option<CardData>> {
        match self.pending.take() {
            Some(CardEvent::Presented(card)) => {
                self.counters.reads.fetch_add(1, Ordering::Relaxed);
                Ok(Some(card))
            }
            Some(CardEvent::Withdrawn) | None => Ok(None),
            Some(CardEvent::Fault(message)) => Err(HardwareError::bus(message)),
        }
    }

    async fn halt(&mut self) -> Result<()> {
        self.pending = None;
        self.counters.halts.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

/// Internal event type for mock card reader.
#[derive(Debug, Clone)]
enum CardEvent {
    /// A card entered the field and can be read.
    Presented(CardData),

    /// A card entered the field but left before its serial was read.
    Withdrawn,

    /// The next probe fails with a communication error.
    Fault(String),
}

#[derive(Debug, Default)]
struct ReaderCounters {
    polls: AtomicUsize,
    reads: AtomicUsize,
    halts: AtomicUsize,
}

/// Handle for controlling a mock card reader.
///
/// Clones share the event channel and counters but keep separate card type
/// tables.
#[derive(Debug, Clone)]
pub struct MockReaderHandle {
    /// Channel sender for card events
    event_tx: mpsc::Sender<CardEvent>,

    /// Device name
    name: String,

    /// Card type table (UID -> CardType)
    card_types: HashMap<Vec<u8>, CardType>,

    /// Counters shared with the reader
    counters: Arc<ReaderCounters>,
}

impl MockReaderHandle {
    /// Register the card type reported for a UID.
    ///
    /// Unregistered UIDs are reported as Mifare Classic 1K.
    pub fn add_card(&mut self, uid: Vec<u8>, card_type: CardType) {
        self.card_types.insert(uid, card_type);
    }

    /// Present a card to the reader.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The UID is empty or longer than 10 bytes
    /// - The reader has been dropped and the channel is closed
    pub async fn present_card(&self, uid: Vec<u8>) -> Result<()> {
        let card_type = self
            .card_types
            .get(&uid)
            .copied()
            .unwrap_or(CardType::MifareClassic1K);

        let card = CardData::new(uid, card_type)?;
        self.send(CardEvent::Presented(card)).await
    }

    /// Simulate a card that is detected but pulled away before its serial
    /// can be read.
    ///
    /// # Errors
    ///
    /// Returns an error if the reader has been dropped.
    pub async fn present_withdrawn_card(&self) -> Result<()> {
        self.send(CardEvent::Withdrawn).await
    }

    /// Make the next presence probe fail with a bus error.
    ///
    /// # Errors
    ///
    /// Returns an error if the reader has been dropped.
    pub async fn inject_fault(&self, message: impl Into<String>) -> Result<()> {
        self.send(CardEvent::Fault(message.into())).await
    }

    async fn send(&self, event: CardEvent) -> Result<()> {
        self.event_tx
            .send(event)
            .await
            .map_err(|_| HardwareError::disconnected("card event channel closed"))
    }

    /// Number of presence probes made so far.
    pub fn poll_count(&self) -> usize {
        self.counters.polls.load(Ordering::Relaxed)
    }

    /// Number of serials successfully read.
    pub fn read_count(&self) -> usize {
        self.counters.reads.load(Ordering::Relaxed)
    }

    /// Number of times a card was released.
    pub fn halt_count(&self) -> usize {
        self.counters.halts.load(Ordering::Relaxed)
    }

    /// Get the device name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the number of registered card types.
    pub fn card_count(&self) -> usize {
        self.card_types.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_reader_present_and_read() {
        let (mut reader, handle) = MockReader::new();

        assert!(!reader.is_new_card_present().await.unwrap());

        handle
            .present_card(vec![0x04, 0xAB, 0xCD, 0xEF])
            .await
            .unwrap();

        assert!(reader.is_new_card_present().await.unwrap());
        let card = reader.read_serial().await.unwrap().unwrap();
        assert_eq!(card.uid.to_string(), "04ABCDEF");
        assert_eq!(card.card_type, CardType::MifareClassic1K);

        reader.halt().await.unwrap();
        assert_eq!(handle.read_count(), 1);
        assert_eq!(handle.halt_count(), 1);
        assert_eq!(handle.poll_count(), 2);
    }

    #[tokio::test]
    async fn test_mock_reader_presence_is_sticky_until_read() {
        let (mut reader, handle) = MockReader::new();
        handle.present_card(vec![0x01, 0x02, 0x03, 0x04]).await.unwrap();

        assert!(reader.is_new_card_present().await.unwrap());
        assert!(reader.is_new_card_present().await.unwrap());

        assert!(reader.read_serial().await.unwrap().is_some());
        assert!(reader.read_serial().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_mock_reader_multiple_cards() {
        let (mut reader, mut handle) = MockReader::new();

        let card1 = vec![0x01, 0x02, 0x03, 0x04];
        let card2 = vec![0x05, 0x06, 0x07, 0x08, 0x09, 0x0A, 0x0B];

        handle.add_card(card2.clone(), CardType::MifareUltralight);
        assert_eq!(handle.card_count(), 1);

        handle.present_card(card1).await.unwrap();
        handle.present_card(card2).await.unwrap();

        assert!(reader.is_new_card_present().await.unwrap());
        let read1 = reader.read_serial().await.unwrap().unwrap();
        assert_eq!(read1.card_type, CardType::MifareClassic1K);

        assert!(reader.is_new_card_present().await.unwrap());
        let read2 = reader.read_serial().await.unwrap().unwrap();
        assert_eq!(read2.card_type, CardType::MifareUltralight);
        assert_eq!(read2.uid.len(), 7);
    }

    #[tokio::test]
    async fn test_mock_reader_withdrawn_card() {
        let (mut reader, handle) = MockReader::new();
        handle.present_withdrawn_card().await.unwrap();

        assert!(reader.is_new_card_present().await.unwrap());
        assert!(reader.read_serial().await.unwrap().is_none());
        assert_eq!(handle.read_count(), 0);
    }

    #[tokio::test]
    async fn test_mock_reader_fault() {
        let (mut reader, handle) = MockReader::new();
        handle.inject_fault("SPI timeout").await.unwrap();

        let result = reader.is_new_card_present().await;
        assert!(matches!(
            result,
            Err(HardwareError::Bus { .. })
        ));
        assert!(!reader.is_new_card_present().await.unwrap());
    }

    #[tokio::test]
    async fn test_mock_reader_invalid_uid() {
        let (_reader, handle) = MockReader::new();

        let result = handle.present_card(vec![]).await;
        assert!(matches!(result, Err(HardwareError::Identifier(_))));
    }

    #[tokio::test]
    async fn test_mock_reader_info() {
        let (mut reader, handle) = MockReader::with_name("Test Reader".to_string());
        assert_eq!(handle.name(), "Test Reader");

        let info = reader.reader_info().await.unwrap();
        assert_eq!(info.name, "Test Reader");
        assert!(info.protocols.contains(&"ISO14443A".to_string()));
        assert_eq!(info.firmware_version, Some(0x92));
        assert!(info.is_responsive());
    }

    #[tokio::test]
    async fn test_mock_reader_unresponsive() {
        let (mut reader, _handle) = MockReader::unresponsive();

        let info = reader.reader_info().await.unwrap();
        assert!(!info.is_responsive());
    }

    #[tokio::test]
    async fn test_mock_reader_handle_closed() {
        let (reader, handle) = MockReader::new();
        drop(reader);

        let result = handle.present_card(vec![0x01, 0x02, 0x03, 0x04]).await;
        assert!(matches!(result, Err(HardwareError::Disconnected { .. })));
    }
}
