//! Wireless link supervisor.
//!
//! Owns the link lifecycle and is the only writer of [`LinkState`]:
//!
//! - `Disconnected` → `Connecting`: a connect sequence starts
//! - `Connecting` → `Connected`: the radio reported an association
//! - `Connecting` → `Disconnected`: the sequence failed or timed out
//! - `Connected` → `Disconnected`: a liveness check found the link gone
//!
//! A connect sequence is `connect` followed by `status` polls, bounded by
//! the connect timeout, so the supervisor never stays in `Connecting`. After
//! a failure it stays `Disconnected` and the next liveness check tries again.
//!
//! Every transition drives the link indicator: steady when connected,
//! blinking while connecting, off when disconnected.
//!
//! # Examples
//!
//! ```
//! use taplink_agent::{LinkSettings, LinkSupervisor};
//! use taplink_core::LinkState;
//! use taplink_hardware::Credentials;
//! use taplink_hardware::mock::{MockIndicator, MockLink};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> taplink_agent::Result<()> {
//!     let (link, _link_handle) = MockLink::new();
//!     let (indicator, _indicator_handle) = MockIndicator::new();
//!     let mut supervisor = LinkSupervisor::new(
//!         link,
//!         indicator,
//!         Credentials::new("shop-floor", "secret"),
//!         LinkSettings::default(),
//!     );
//!
//!     assert!(supervisor.start().await?);
//!     assert_eq!(supervisor.state(), LinkState::Connected);
//!     Ok(())
//! }
//! ```

use crate::error::Result;
use std::collections::VecDeque;
use std::time::{Duration, Instant};
use taplink_core::constants::*;
use taplink_core::{Error, LinkMonitor, LinkState};
use taplink_hardware::{Credentials, Indicator, IndicatorSignal, WirelessLink};
use tracing::{debug, info, warn};

/// Number of transitions kept for diagnostics.
const MAX_HISTORY_SIZE: usize = 32;

/// Current time on the Tokio clock, so paused-clock tests control it.
pub(crate) fn now() -> Instant {
    tokio::time::Instant::now().into_std()
}

/// Timing for link supervision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkSettings {
    /// Upper bound on one connect sequence.
    pub connect_timeout: Duration,
    /// Interval between status queries while connecting.
    pub status_poll: Duration,
    /// Connect attempts made by [`LinkSupervisor::start`].
    pub initial_attempts: u32,
    /// Delay after the first failed boot attempt; doubles each time.
    pub initial_backoff: Duration,
    /// Cadence of liveness checks from the main loop.
    pub liveness_interval: Duration,
}

impl Default for LinkSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_millis(DEFAULT_CONNECT_TIMEOUT_MS),
            status_poll: Duration::from_millis(DEFAULT_STATUS_POLL_MS),
            initial_attempts: DEFAULT_INITIAL_CONNECT_ATTEMPTS,
            initial_backoff: Duration::from_millis(DEFAULT_INITIAL_BACKOFF_MS),
            liveness_interval: Duration::from_millis(DEFAULT_LIVENESS_INTERVAL_MS),
        }
    }
}

/// One recorded link state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkTransition {
    pub from: LinkState,
    pub to: LinkState,
    pub at: Instant,
}

/// Wireless link supervisor.
///
/// Not thread-safe; it lives inside the single-threaded reader loop.
pub struct LinkSupervisor<W, I> {
    link: W,
    indicator: I,
    credentials: Credentials,
    settings: LinkSettings,
    state: LinkState,
    last_check: Option<Instant>,
    history: VecDeque<LinkTransition>,
}

impl<W: WirelessLink, I: Indicator> LinkSupervisor<W, I> {
    /// Create a supervisor in the `Disconnected` state.
    pub fn new(link: W, indicator: I, credentials: Credentials, settings: LinkSettings) -> Self {
        Self {
            link,
            indicator,
            credentials,
            settings,
            state: LinkState::Disconnected,
            last_check: None,
            history: VecDeque::with_capacity(MAX_HISTORY_SIZE),
        }
    }

    pub fn state(&self) -> LinkState {
        self.state
    }

    pub fn settings(&self) -> &LinkSettings {
        &self.settings
    }

    /// Recent transitions, oldest first.
    pub fn history(&self) -> &VecDeque<LinkTransition> {
        &self.history
    }

    /// Non-blocking view of the last known state.
    pub fn is_connected(&self) -> bool {
        self.state.is_connected()
    }

    /// Boot-time connect: up to `initial_attempts` sequences with doubling
    /// backoff in between.
    ///
    /// Returns whether the link came up. Failure is not an error; the main
    /// loop keeps retrying on the liveness cadence.
    ///
    /// # Errors
    ///
    /// Only an illegal state transition, which would be a bug.
    pub async fn start(&mut self) -> Result<bool> {
        let attempts = self.settings.initial_attempts.max(1);
        let mut backoff = self.settings.initial_backoff;

        for attempt in 1..=attempts {
            info!(attempt, max_attempts = attempts, ssid = %self.credentials.ssid, "Connecting to wireless network");

            if self.connect_sequence().await? {
                self.last_check = Some(now());
                return Ok(true);
            }

            if attempt < attempts {
                debug!(attempt, backoff_ms = backoff.as_millis() as u64, "Backing off before next attempt");
                tokio::time::sleep(backoff).await;
                backoff = backoff.saturating_mul(2);
            }
        }

        warn!(attempts, "Wireless network unavailable, retrying on liveness cadence");
        self.last_check = Some(now());
        Ok(false)
    }

    /// Whether a liveness check is due at `now`.
    pub fn liveness_due(&self, now: Instant) -> bool {
        self.last_check
            .is_none_or(|last| now.saturating_duration_since(last) >= self.settings.liveness_interval)
    }

    /// Liveness check, reconnecting if the link is gone.
    ///
    /// Blocks for at most one connect timeout. Returns whether the link is
    /// connected afterwards.
    ///
    /// # Errors
    ///
    /// Only an illegal state transition, which would be a bug.
    pub async fn ensure_connected(&mut self, now: Instant) -> Result<bool> {
        self.last_check = Some(now);

        if self.state == LinkState::Connected {
            match self.link.status().await {
                Ok(LinkState::Connected) => {
                    debug!("Liveness check passed");
                    return Ok(true);
                }
                Ok(reported) => {
                    warn!(%reported, "Wireless link lost");
                }
                Err(e) => {
                    warn!(error = %e, "Wireless status query failed, assuming link lost");
                }
            }
            self.transition_to(LinkState::Disconnected).await?;
        }

        info!(ssid = %self.credentials.ssid, "Reconnecting to wireless network");
        self.connect_sequence().await
    }

    /// Drop the association and go `Disconnected`.
    ///
    /// # Errors
    ///
    /// Only an illegal state transition, which would be a bug.
    pub async fn shutdown(&mut self) -> Result<()> {
        if let Err(e) = self.link.disconnect().await {
            debug!(error = %e, "Disconnect failed during shutdown");
        }
        if self.state != LinkState::Disconnected {
            self.transition_to(LinkState::Disconnected).await?;
        }
        Ok(())
    }

    /// Move to `next`, recording the change and updating the indicator.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidStateTransition` if the move is not allowed.
    pub async fn transition_to(&mut self, next: LinkState) -> Result<LinkTransition> {
        if !self.state.can_transition_to(&next) {
            return Err(Error::InvalidStateTransition {
                from: self.state.to_string(),
                to: next.to_string(),
            }
            .into());
        }

        let transition = LinkTransition {
            from: self.state,
            to: next,
            at: now(),
        };
        self.state = next;

        self.history.push_back(transition);
        if self.history.len() > MAX_HISTORY_SIZE {
            self.history.pop_front();
        }

        debug!(from = %transition.from, to = %transition.to, "Link state changed");

        if let Err(e) = self.indicator.show(IndicatorSignal::for_link(next)).await {
            debug!(error = %e, "Link indicator update failed");
        }

        Ok(transition)
    }

    /// One bounded connect sequence from `Disconnected`.
    async fn connect_sequence(&mut self) -> Result<bool> {
        self.transition_to(LinkState::Connecting).await?;

        let timeout = self.settings.connect_timeout;
        let attempt = associate(
            &mut self.link,
            &self.credentials,
            self.settings.status_poll,
        );

        match tokio::time::timeout(timeout, attempt).await {
            Ok(Ok(())) => {
                self.transition_to(LinkState::Connected).await?;
                info!(ssid = %self.credentials.ssid, "Wireless network connected");
                Ok(true)
            }
            Ok(Err(e)) => {
                warn!(error = %e, "Wireless connect failed");
                self.abandon_attempt().await?;
                Ok(false)
            }
            Err(_) => {
                warn!("Wireless connect timeout after {}ms", timeout.as_millis());
                self.abandon_attempt().await?;
                Ok(false)
            }
        }
    }

    async fn abandon_attempt(&mut self) -> Result<()> {
        if let Err(e) = self.link.disconnect().await {
            debug!(error = %e, "Disconnect after failed attempt failed");
        }
        self.transition_to(LinkState::Disconnected).await?;
        Ok(())
    }
}

/// `connect`, then poll `status` until the radio reports an association.
async fn associate<W: WirelessLink>(
    link: &mut W,
    credentials: &Credentials,
    status_poll: Duration,
) -> taplink_hardware::Result<()> {
    link.connect(credentials).await?;
    loop {
        if link.status().await? == LinkState::Connected {
            return Ok(());
        }
        tokio::time::sleep(status_poll).await;
    }
}

impl<W, I> LinkMonitor for LinkSupervisor<W, I> {
    fn is_connected(&self) -> bool {
        self.state.is_connected()
    }
}
