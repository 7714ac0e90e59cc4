use crate::{
    Result,
    constants::{DECIMAL_WIDTH_BYTES, MAX_UID_LENGTH, MIN_UID_LENGTH},
    error::Error,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Raw card identifier bytes as delivered by the transceiver (1-10 bytes).
///
/// Immutable once read. The length is validated on construction so every
/// `CardUid` can be turned into a [`CanonicalUid`] without further checks.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CardUid(Vec<u8>);

impl CardUid {
    /// Create a card identifier with length validation.
    ///
    /// # Errors
    /// - `Error::EmptyIdentifier` if `bytes` is empty
    /// - `Error::IdentifierTooLong` if `bytes` exceeds [`MAX_UID_LENGTH`]
    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self> {
        let bytes = bytes.into();
        let len = bytes.len();
        if len < MIN_UID_LENGTH {
            return Err(Error::EmptyIdentifier);
        }
        if len > MAX_UID_LENGTH {
            return Err(Error::IdentifierTooLong {
                len,
                max: MAX_UID_LENGTH,
            });
        }
        Ok(CardUid(bytes))
    }

    /// Get the identifier bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Number of identifier bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false`; kept for API symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Derive both canonical forms.
    #[must_use]
    pub fn canonical(&self) -> CanonicalUid {
        CanonicalUid {
            hex: encode_hex(&self.0),
            decimal: fold_decimal(&self.0),
        }
    }
}

impl fmt::Display for CardUid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&encode_hex(&self.0))
    }
}

/// Parse a hex identifier such as `"04A31B9C"`, `"04 a3 1b 9c"` or `"04:A3:1B:9C"`.
impl std::str::FromStr for CardUid {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let digits: Vec<u8> = s
            .bytes()
            .filter(|b| !matches!(b, b' ' | b':' | b'-'))
            .collect();

        if digits.len() % 2 != 0 {
            return Err(Error::Config(format!(
                "Card identifier '{s}' has an odd number of hex digits"
            )));
        }

        if !digits.iter().all(u8::is_ascii_hexdigit) {
            return Err(Error::Config(format!(
                "Card identifier '{s}' is not valid hex"
            )));
        }

        let bytes = digits
            .chunks(2)
            .map(|pair| (hex_value(pair[0]) << 4) | hex_value(pair[1]))
            .collect::<Vec<u8>>();

        CardUid::new(bytes)
    }
}

/// Canonical textual and numeric forms of a card identifier.
///
/// - `hex`: every byte as two uppercase hex digits, no separator
///   (`[0x04, 0xA3]` becomes `"04A3"`).
/// - `decimal`: the bytes folded big-endian into a `u64`
///   (`acc = (acc << 8) | byte`). Identifiers longer than 8 bytes lose their
///   leading bytes: only the trailing [`DECIMAL_WIDTH_BYTES`] bytes survive.
///   Use `hex` when the full identifier matters.
///
/// Debounce comparisons use `hex`, which is lossless.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CanonicalUid {
    pub hex: String,
    pub decimal: u64,
}

impl CanonicalUid {
    /// Canonicalize raw identifier bytes.
    ///
    /// # Errors
    /// Same as [`CardUid::new`]: empty or over-long input is rejected rather
    /// than producing an empty string.
    ///
    /// # Examples
    /// ```
    /// use taplink_core::CanonicalUid;
    ///
    /// let uid = CanonicalUid::from_bytes(&[0x04, 0xA3, 0x1B, 0x9C]).unwrap();
    /// assert_eq!(uid.hex, "04A31B9C");
    /// assert_eq!(uid.decimal, 77_798_300);
    ///
    /// assert!(CanonicalUid::from_bytes(&[]).is_err());
    /// ```
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(CardUid::new(bytes)?.canonical())
    }

    /// `true` if the decimal form dropped leading bytes of an identifier
    /// with `len` bytes.
    #[must_use]
    pub fn is_truncated(len: usize) -> bool {
        len > DECIMAL_WIDTH_BYTES
    }

    /// Decimal form as a string, the way the backend stores it.
    #[must_use]
    pub fn decimal_string(&self) -> String {
        self.decimal.to_string()
    }
}

impl fmt::Display for CanonicalUid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} ({})", self.hex, self.decimal)
    }
}

fn encode_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02X}")).collect()
}

/// Value of one ASCII hex digit; callers check `is_ascii_hexdigit` first.
fn hex_value(digit: u8) -> u8 {
    match digit {
        b'0'..=b'9' => digit - b'0',
        b'a'..=b'f' => digit - b'a' + 10,
        _ => digit - b'A' + 10,
    }
}

fn fold_decimal(bytes: &[u8]) -> u64 {
    // Shifting a u64 left by 8 discards the top byte, which is the documented
    // truncation for identifiers longer than 8 bytes.
    bytes
        .iter()
        .fold(0u64, |acc, &byte| (acc << 8) | u64::from(byte))
}

/// Wireless link state.
///
/// `Disconnected -> Connecting -> Connected`, with `Connecting -> Disconnected`
/// on timeout and `Connected -> Disconnected` when a liveness check fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkState {
    Disconnected,
    Connecting,
    Connected,
}

impl LinkState {
    /// Check if moving to `target` is a legal transition.
    ///
    /// # Examples
    /// ```
    /// use taplink_core::LinkState;
    ///
    /// assert!(LinkState::Disconnected.can_transition_to(&LinkState::Connecting));
    /// assert!(!LinkState::Disconnected.can_transition_to(&LinkState::Connected));
    /// ```
    pub fn can_transition_to(&self, target: &LinkState) -> bool {
        matches!(
            (self, target),
            (LinkState::Disconnected, LinkState::Connecting)
                | (
                    LinkState::Connecting,
                    LinkState::Connected | LinkState::Disconnected
                )
                | (LinkState::Connected, LinkState::Disconnected)
        )
    }

    /// Returns `true` if the link is usable.
    #[inline]
    #[must_use]
    pub fn is_connected(self) -> bool {
        matches!(self, LinkState::Connected)
    }
}

impl fmt::Display for LinkState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LinkState::Disconnected => write!(f, "Disconnected"),
            LinkState::Connecting => write!(f, "Connecting"),
            LinkState::Connected => write!(f, "Connected"),
        }
    }
}

/// Read-only view of the link, used by the delivery client's precondition.
///
/// Implementations must not block.
pub trait LinkMonitor {
    fn is_connected(&self) -> bool;
}

impl LinkMonitor for LinkState {
    fn is_connected(&self) -> bool {
        LinkState::is_connected(*self)
    }
}

impl LinkMonitor for bool {
    fn is_connected(&self) -> bool {
        *self
    }
}
