//! Duplicate-read suppression.
//!
//! A card resting on the reader re-triggers the presence check on every poll.
//! The [`DebounceGate`] turns that stream into one accepted read per card per
//! window: a read is accepted when the card differs from the last accepted
//! one, or when at least the configured interval has passed since that
//! acceptance.
//!
//! The gate records "read accepted", not "read delivered": state is updated
//! before the caller attempts delivery and is never rolled back.
//!
//! # Examples
//!
//! ```
//! use std::time::{Duration, Instant};
//! use taplink_core::{CanonicalUid, Decision, DebounceGate};
//!
//! let mut gate = DebounceGate::new(Duration::from_millis(3000));
//! let uid = CanonicalUid::from_bytes(&[0x04, 0xA3, 0x1B, 0x9C]).unwrap();
//! let t0 = Instant::now();
//!
//! assert_eq!(gate.decide(&uid, t0), Decision::Accept);
//! assert_eq!(gate.decide(&uid, t0 + Duration::from_millis(1000)), Decision::Suppress);
//! assert_eq!(gate.decide(&uid, t0 + Duration::from_millis(3500)), Decision::Accept);
//! ```

use std::time::{Duration, Instant};

use crate::constants::DEFAULT_MIN_READ_INTERVAL_MS;
use crate::types::CanonicalUid;

/// Outcome of a debounce check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// New read; deliver it.
    Accept,
    /// Repeat of the last accepted read inside the window; ignore it.
    Suppress,
}

impl Decision {
    #[inline]
    #[must_use]
    pub fn is_accept(self) -> bool {
        matches!(self, Decision::Accept)
    }
}

/// The most recently accepted read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebounceState {
    pub last: CanonicalUid,
    pub accepted_at: Instant,
}

/// Single-writer debounce state plus the suppression window.
#[derive(Debug, Clone)]
pub struct DebounceGate {
    interval: Duration,
    state: Option<DebounceState>,
}

impl DebounceGate {
    /// Create a gate with no prior read.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            state: None,
        }
    }

    /// Suppression window.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Last accepted read, if any.
    pub fn state(&self) -> Option<&DebounceState> {
        self.state.as_ref()
    }

    /// Decide whether `candidate` read at `now` is new.
    ///
    /// On [`Decision::Accept`] the state is replaced with `candidate` and
    /// `now` before returning. A `now` earlier than the last acceptance
    /// counts as zero elapsed time.
    pub fn decide(&mut self, candidate: &CanonicalUid, now: Instant) -> Decision {
        let accept = match &self.state {
            None => true,
            Some(state) => {
                state.last.hex != candidate.hex
                    || now.saturating_duration_since(state.accepted_at) >= self.interval
            }
        };

        if !accept {
            return Decision::Suppress;
        }

        self.state = Some(DebounceState {
            last: candidate.clone(),
            accepted_at: now,
        });
        Decision::Accept
    }
}

impl Default for DebounceGate {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_MIN_READ_INTERVAL_MS))
    }
}
