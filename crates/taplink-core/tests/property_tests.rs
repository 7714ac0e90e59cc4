//! Property-based tests for the identifier codec and debounce gate.
//!
//! The decimal form is a `u64`, so it holds at most 8 identifier bytes. For
//! longer identifiers the properties compare against the trailing 8 bytes.

use proptest::prelude::*;
use std::time::{Duration, Instant};
use taplink_core::constants::{DECIMAL_WIDTH_BYTES, MAX_UID_LENGTH};
use taplink_core::{CanonicalUid, CardUid, DebounceGate, Decision};

/// Strategy for identifiers of any supported length (1-10 bytes).
fn valid_uid_bytes() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 1..=MAX_UID_LENGTH)
}

fn hex_to_u64_truncated(hex: &str) -> u64 {
    let keep = DECIMAL_WIDTH_BYTES * 2;
    let tail = &hex[hex.len().saturating_sub(keep)..];
    u64::from_str_radix(tail, 16).unwrap()
}

proptest! {
    /// Property: hex and decimal describe the same number, truncated to 64 bits.
    #[test]
    fn prop_hex_and_decimal_agree(bytes in valid_uid_bytes()) {
        let uid = CanonicalUid::from_bytes(&bytes).unwrap();

        prop_assert_eq!(uid.hex.len(), bytes.len() * 2);
        prop_assert!(uid.hex.chars().all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
        prop_assert_eq!(hex_to_u64_truncated(&uid.hex), uid.decimal);
    }

    /// Property: the hex form parses back to the original bytes.
    #[test]
    fn prop_hex_parses_back(bytes in valid_uid_bytes()) {
        let uid = CardUid::new(bytes.clone()).unwrap();
        let parsed: CardUid = uid.canonical().hex.parse().unwrap();
        prop_assert_eq!(parsed.as_bytes(), bytes.as_slice());
    }

    /// Property: the same card inside the window is suppressed, outside accepted.
    #[test]
    fn prop_same_card_window(
        bytes in valid_uid_bytes(),
        interval_ms in 1u64..10_000,
        delta_ms in 0u64..20_000,
    ) {
        let mut gate = DebounceGate::new(Duration::from_millis(interval_ms));
        let uid = CanonicalUid::from_bytes(&bytes).unwrap();
        let t0 = Instant::now();

        prop_assert_eq!(gate.decide(&uid, t0), Decision::Accept);

        let expected = if delta_ms < interval_ms { Decision::Suppress } else { Decision::Accept };
        prop_assert_eq!(gate.decide(&uid, t0 + Duration::from_millis(delta_ms)), expected);
    }

    /// Property: two different cards back to back are both accepted.
    #[test]
    fn prop_different_cards_accepted(a in valid_uid_bytes(), b in valid_uid_bytes()) {
        prop_assume!(a != b);

        let mut gate = DebounceGate::default();
        let t0 = Instant::now();

        prop_assert!(gate.decide(&CanonicalUid::from_bytes(&a).unwrap(), t0).is_accept());
        prop_assert!(gate.decide(&CanonicalUid::from_bytes(&b).unwrap(), t0).is_accept());
    }
}
