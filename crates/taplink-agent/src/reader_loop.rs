//! The read, debounce and deliver loop.
//!
//! Each iteration:
//!
//! 1. Runs a link liveness check if one is due.
//! 2. Probes the reader for a new card; idles briefly if there is none.
//! 3. Reads the serial; a card that left mid-read abandons the iteration
//!    without touching the debounce state.
//! 4. Canonicalizes the identifier.
//! 5. Asks the debounce gate; a suppressed read releases the card and ends
//!    the iteration.
//! 6. Delivers an accepted read, pulses the event indicator with the result
//!    and releases the card whatever the outcome.
//! 7. Settles briefly before the next iteration.
//!
//! Everything is awaited in place. Only the link's connect sequence and the
//! HTTP POST can hold the loop for long, and both are bounded by timeouts.
//! A failed delivery is logged, counted and dropped; it never reverts the
//! debounce decision.

use crate::config::AgentConfig;
use crate::error::{AgentError, Result};
use crate::link::{self, LinkSupervisor};
use crate::stats::LoopStats;
use std::time::Duration;
use taplink_core::constants::*;
use taplink_core::{CanonicalUid, DebounceGate};
use taplink_hardware::{CardReader, HardwareError, Indicator, IndicatorSignal, ReaderInfo, WirelessLink};
use taplink_network::{DeliveryClient, DeliveryOutcome, HttpTransport, ReadMetadata};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

/// Loop timing and identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopSettings {
    /// Device identifier sent with every read.
    pub device: String,
    /// Debounce window for repeated reads of one card.
    pub min_read_interval: Duration,
    /// Sleep when no card is present.
    pub idle_poll: Duration,
    /// Sleep after a delivered read.
    pub settle: Duration,
}

impl Default for LoopSettings {
    fn default() -> Self {
        Self {
            device: DEFAULT_DEVICE_NAME.to_string(),
            min_read_interval: Duration::from_millis(DEFAULT_MIN_READ_INTERVAL_MS),
            idle_poll: Duration::from_millis(DEFAULT_IDLE_POLL_MS),
            settle: Duration::from_millis(DEFAULT_SETTLE_MS),
        }
    }
}

/// What one iteration did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IterationOutcome {
    /// No card in the field.
    Idle,

    /// A card was seen but could not be read.
    ReadAbandoned,

    /// The same card was read again inside the debounce window.
    Suppressed(CanonicalUid),

    /// A new read was accepted and a delivery attempted.
    Accepted {
        uid: CanonicalUid,
        outcome: DeliveryOutcome,
    },
}

/// The reader loop.
///
/// `I` is used for both indicator outputs: the link indicator owned by the
/// supervisor and the per-event indicator owned by the loop.
pub struct ReaderLoop<R, W, I, T> {
    reader: R,
    supervisor: LinkSupervisor<W, I>,
    event_indicator: I,
    gate: DebounceGate,
    client: DeliveryClient<T>,
    settings: LoopSettings,
    stats: LoopStats,
}

impl<R, W, I, T> ReaderLoop<R, W, I, T>
where
    R: CardReader,
    W: WirelessLink,
    I: Indicator,
    T: HttpTransport,
{
    pub fn new(
        reader: R,
        supervisor: LinkSupervisor<W, I>,
        event_indicator: I,
        client: DeliveryClient<T>,
        settings: LoopSettings,
    ) -> Self {
        Self {
            reader,
            supervisor,
            event_indicator,
            gate: DebounceGate::new(settings.min_read_interval),
            client,
            settings,
            stats: LoopStats::default(),
        }
    }

    /// Wire a loop from configuration and concrete devices.
    pub fn from_config(
        config: &AgentConfig,
        reader: R,
        link: W,
        link_indicator: I,
        event_indicator: I,
        transport: T,
    ) -> Self {
        let supervisor = LinkSupervisor::new(
            link,
            link_indicator,
            config.wifi.credentials(),
            config.wifi.link_settings(),
        );
        let client = DeliveryClient::new(transport, config.server.delivery_config());
        Self::new(reader, supervisor, event_indicator, client, config.loop_settings())
    }

    pub fn stats(&self) -> &LoopStats {
        &self.stats
    }

    pub fn supervisor(&self) -> &LinkSupervisor<W, I> {
        &self.supervisor
    }

    pub fn gate(&self) -> &DebounceGate {
        &self.gate
    }

    pub fn client(&self) -> &DeliveryClient<T> {
        &self.client
    }

    /// Self-test the reader, then bring the link up.
    ///
    /// # Errors
    ///
    /// Returns `AgentError::HardwareInit` if the reader does not answer or
    /// reports an absent chip. The caller must not run the loop after that.
    /// A link that does not come up is not an error.
    pub async fn boot(&mut self) -> Result<ReaderInfo> {
        info!(
            version = taplink_core::VERSION,
            device = %self.settings.device,
            url = %self.client.url(),
            "taplink starting"
        );

        let info = match self.reader.reader_info().await {
            Ok(info) => info,
            Err(e) => {
                error!(error = %e, "Card reader did not answer");
                return Err(AgentError::HardwareInit(e));
            }
        };

        if !info.is_responsive() {
            let version = info.firmware_version.unwrap_or_default();
            error!(reader = %info.name, version = %format!("{version:#04x}"), "Card reader not detected");
            return Err(AgentError::HardwareInit(HardwareError::self_test(
                format!("{} version register reads {version:#04x}", info.name),
            )));
        }

        info!(
            reader = %info.name,
            firmware = ?info.firmware_version,
            protocols = ?info.protocols,
            "Card reader ready"
        );

        self.supervisor.start().await?;
        info!("Waiting for cards");
        Ok(info)
    }

    /// Run one iteration.
    ///
    /// # Errors
    ///
    /// Only an illegal link state transition. Reader, link and delivery
    /// failures are handled inside the iteration.
    pub async fn run_once(&mut self) -> Result<IterationOutcome> {
        let now = link::now();
        if self.supervisor.liveness_due(now) {
            self.stats.liveness_checks += 1;
            self.supervisor.ensure_connected(now).await?;
        }

        self.stats.polls += 1;
        match self.reader.is_new_card_present().await {
            Ok(true) => {}
            Ok(false) => {
                tokio::time::sleep(self.settings.idle_poll).await;
                return Ok(IterationOutcome::Idle);
            }
            Err(e) => {
                self.stats.reader_errors += 1;
                warn!(error = %e, "Card presence probe failed");
                tokio::time::sleep(self.settings.idle_poll).await;
                return Ok(IterationOutcome::ReadAbandoned);
            }
        }

        let card = match self.reader.read_serial().await {
            Ok(Some(card)) => card,
            Ok(None) => {
                self.stats.read_failures += 1;
                debug!("Card left the field before its serial was read");
                return Ok(IterationOutcome::ReadAbandoned);
            }
            Err(e) => {
                self.stats.reader_errors += 1;
                warn!(error = %e, "Card serial read failed");
                return Ok(IterationOutcome::ReadAbandoned);
            }
        };
        self.stats.reads += 1;

        let uid = card.uid.canonical();

        if !self.gate.decide(&uid, link::now()).is_accept() {
            self.stats.suppressed += 1;
            debug!(uid_hex = %uid.hex, "Repeated read suppressed");
            self.release().await;
            return Ok(IterationOutcome::Suppressed(uid));
        }

        self.stats.accepted += 1;
        info!(
            uid_hex = %uid.hex,
            uid_dec = uid.decimal,
            card_type = card.card_type.name(),
            "Card read"
        );
        if CanonicalUid::is_truncated(card.uid.len()) {
            debug!(
                uid_hex = %uid.hex,
                bytes = card.uid.len(),
                "Decimal form keeps only the trailing {} bytes",
                DECIMAL_WIDTH_BYTES
            );
        }

        let metadata = ReadMetadata::new(self.settings.device.clone(), card.timestamp);
        let outcome = self.client.send(&self.supervisor, &uid, &metadata).await;
        self.stats.record_delivery(&outcome);

        if let Err(e) = self
            .event_indicator
            .show(IndicatorSignal::pulse(outcome.is_delivered()))
            .await
        {
            debug!(error = %e, "Event indicator update failed");
        }

        self.release().await;
        tokio::time::sleep(self.settings.settle).await;

        Ok(IterationOutcome::Accepted { uid, outcome })
    }

    /// Run until `shutdown` is cancelled, then drop the link.
    ///
    /// Cancellation is checked between iterations, so an in-flight POST or
    /// connect sequence always runs to its own timeout.
    ///
    /// # Errors
    ///
    /// Only an illegal link state transition.
    pub async fn run(&mut self, shutdown: CancellationToken) -> Result<LoopStats> {
        while !shutdown.is_cancelled() {
            let outcome = self.run_once().await?;
            trace!(?outcome, "Iteration finished");
        }

        info!("Shutting down");
        self.supervisor.shutdown().await?;
        info!(stats = %self.stats, "Reader loop stopped");
        Ok(self.stats.clone())
    }

    async fn release(&mut self) {
        if let Err(e) = self.reader.halt().await {
            debug!(error = %e, "Card release failed");
        }
    }
}
