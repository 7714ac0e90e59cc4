//! Core constants for the card reader loop.
//!
//! Defaults for every timing knob live here so the agent configuration, the
//! delivery client and the tests agree on the same numbers. All durations are
//! expressed in milliseconds.
//!
//! # Usage
//!
//! ```
//! use std::time::Duration;
//! use taplink_core::constants::*;
//!
//! let window = Duration::from_millis(DEFAULT_MIN_READ_INTERVAL_MS);
//! assert_eq!(window.as_secs(), 3);
//!
//! fn uid_len_ok(len: usize) -> bool {
//!     (MIN_UID_LENGTH..=MAX_UID_LENGTH).contains(&len)
//! }
//! assert!(uid_len_ok(4));
//! ```

// ============================================================================
// Card Identifiers
// ============================================================================

/// Minimum identifier length accepted by the codec.
///
/// ISO 14443 cards use 4, 7 or 10 byte identifiers, but the codec only
/// requires a non-empty sequence. Shorter values are accepted so readers for
/// other card families still work.
pub const MIN_UID_LENGTH: usize = 1;

/// Maximum identifier length in bytes (ISO 14443 triple-size UID).
pub const MAX_UID_LENGTH: usize = 10;

/// Number of identifier bytes the decimal form can hold without truncation.
///
/// The decimal form is a `u64`; identifiers longer than this keep only their
/// trailing (least significant) bytes.
pub const DECIMAL_WIDTH_BYTES: usize = 8;

// ============================================================================
// Debounce
// ============================================================================

/// Minimum time between two accepted reads of the same card.
pub const DEFAULT_MIN_READ_INTERVAL_MS: u64 = 3_000;

// ============================================================================
// Main Loop Cadence
// ============================================================================

/// Sleep when no card is in the field.
pub const DEFAULT_IDLE_POLL_MS: u64 = 50;

/// Sleep after a handled card before polling again.
pub const DEFAULT_SETTLE_MS: u64 = 100;

// ============================================================================
// Wireless Link
// ============================================================================

/// How often the Main Loop asks the Link Supervisor for a liveness check.
pub const DEFAULT_LIVENESS_INTERVAL_MS: u64 = 30_000;

/// Upper bound on a single connect sequence.
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 15_000;

/// Interval between status queries while connecting.
pub const DEFAULT_STATUS_POLL_MS: u64 = 500;

/// Connect attempts made at boot before handing over to the liveness cadence.
pub const DEFAULT_INITIAL_CONNECT_ATTEMPTS: u32 = 3;

/// First backoff between boot connect attempts; doubles after each failure.
pub const DEFAULT_INITIAL_BACKOFF_MS: u64 = 1_000;

// ============================================================================
// Delivery
// ============================================================================

/// Upper bound on one HTTP POST.
pub const DEFAULT_DELIVERY_TIMEOUT_MS: u64 = 5_000;

/// Endpoint used when no server URL is configured.
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:5000/api/rfid";

/// Device name reported in the payload when none is configured.
pub const DEFAULT_DEVICE_NAME: &str = "taplink";

/// Content type of the delivery payload.
pub const CONTENT_TYPE_JSON: &str = "application/json";
