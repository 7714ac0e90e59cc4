//! Common types shared across hardware device implementations.
//!
//! This module defines the reader self-test report, wireless credentials and
//! the indicator signals the loop drives.

use serde::{Deserialize, Serialize};
use std::fmt;
use taplink_core::LinkState;

/// Card reader information reported at boot.
///
/// The firmware version comes from the transceiver's version register. A
/// reader that answers `0x00` or `0xFF` is not on the bus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReaderInfo {
    /// Reader name (e.g., "MFRC522").
    pub name: String,

    /// List of supported protocols (e.g., ["ISO14443A"]).
    pub protocols: Vec<String>,

    /// Raw firmware version register value, if the reader exposes one.
    pub firmware_version: Option<u8>,
}

impl ReaderInfo {
    /// Create a new ReaderInfo.
    pub fn new(name: impl Into<String>, protocols: Vec<String>) -> Self {
        Self {
            name: name.into(),
            protocols,
            firmware_version: None,
        }
    }

    /// Set the firmware version register value.
    pub fn with_firmware_version(mut self, version: u8) -> Self {
        self.firmware_version = Some(version);
        self
    }

    /// Check whether the reader answered the self-test.
    ///
    /// Readers without a version register are assumed responsive once they
    /// returned this struct at all.
    ///
    /// # Examples
    ///
    /// ```
    /// use taplink_hardware::ReaderInfo;
    ///
    /// let ok = ReaderInfo::new("MFRC522", vec![]).with_firmware_version(0x92);
    /// assert!(ok.is_responsive());
    ///
    /// let floating_bus = ReaderInfo::new("MFRC522", vec![]).with_firmware_version(0xFF);
    /// assert!(!floating_bus.is_responsive());
    /// ```
    pub fn is_responsive(&self) -> bool {
        !matches!(self.firmware_version, Some(0x00) | Some(0xFF))
    }
}

/// Wireless network credentials.
#[derive(Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Credentials {
    /// Network name.
    pub ssid: String,

    /// Pre-shared key. Never logged.
    pub password: String,
}

impl Credentials {
    /// Create new credentials.
    pub fn new(ssid: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            ssid: ssid.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("ssid", &self.ssid)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Outcome shown by a short pulse on the event indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pulse {
    /// The read was delivered.
    Success,

    /// The read was rejected or could not be sent.
    Failure,
}

/// What an indicator output should show.
///
/// Exact timing of blinks and pulses is up to the implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum IndicatorSignal {
    /// Output off.
    Off,

    /// Output steadily on.
    Steady,

    /// Output blinking until told otherwise.
    Blinking,

    /// A single short pulse, then back to the previous state.
    Pulse(Pulse),
}

impl IndicatorSignal {
    /// Signal for the link indicator in a given link state.
    ///
    /// # Examples
    ///
    /// ```
    /// use taplink_core::LinkState;
    /// use taplink_hardware::IndicatorSignal;
    ///
    /// assert_eq!(IndicatorSignal::for_link(LinkState::Connected), IndicatorSignal::Steady);
    /// assert_eq!(IndicatorSignal::for_link(LinkState::Connecting), IndicatorSignal::Blinking);
    /// assert_eq!(IndicatorSignal::for_link(LinkState::Disconnected), IndicatorSignal::Off);
    /// ```
    pub fn for_link(state: LinkState) -> Self {
        match state {
            LinkState::Connected => Self::Steady,
            LinkState::Connecting => Self::Blinking,
            LinkState::Disconnected => Self::Off,
        }
    }

    /// Pulse for a delivery result.
    pub fn pulse(success: bool) -> Self {
        if success {
            Self::Pulse(Pulse::Success)
        } else {
            Self::Pulse(Pulse::Failure)
        }
    }
}

impl fmt::Display for IndicatorSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Off => write!(f, "off"),
            Self::Steady => write!(f, "steady"),
            Self::Blinking => write!(f, "blinking"),
            Self::Pulse(Pulse::Success) => write!(f, "pulse:success"),
            Self::Pulse(Pulse::Failure) => write!(f, "pulse:failure"),
        }
    }
}
