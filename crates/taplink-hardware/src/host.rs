//! Devices for running the reader loop on a development host.
//!
//! A workstation has no radio to associate and no LEDs to drive: the network
//! is assumed up, and indicator changes go to the log instead.

use crate::{
    Result,
    traits::{Indicator, WirelessLink},
    types::{Credentials, IndicatorSignal},
};
use taplink_core::LinkState;
use tracing::{debug, info};

/// Wireless link backed by the host's own network stack.
///
/// Reports `Connected` once `connect` has been called and until `disconnect`.
#[derive(Debug, Default)]
pub struct HostLink {
    up: bool,
}

impl HostLink {
    /// Create a host link that has not been brought up yet.
    pub fn new() -> Self {
        Self::default()
    }
}

impl WirelessLink for HostLink {
    async fn connect(&mut self, credentials: &Credentials) -> Result<()> {
        debug!(ssid = %credentials.ssid, "Host link up, association skipped");
        self.up = true;
        Ok(())
    }

    async fn status(&mut self) -> Result<LinkState> {
        Ok(if self.up {
            LinkState::Connected
        } else {
            LinkState::Disconnected
        })
    }

    async fn disconnect(&mut self) -> Result<()> {
        self.up = false;
        Ok(())
    }
}

/// Indicator that logs its state changes.
#[derive(Debug, Clone)]
pub struct LogIndicator {
    label: String,
    current: Option<IndicatorSignal>,
}

impl LogIndicator {
    /// Create a log indicator; `label` names it in the log (e.g. "link").
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            current: None,
        }
    }

    /// Last signal shown, if any.
    pub fn current(&self) -> Option<IndicatorSignal> {
        self.current
    }
}

impl Indicator for LogIndicator {
    async fn show(&mut self, signal: IndicatorSignal) -> Result<()> {
        match signal {
            IndicatorSignal::Pulse(_) => {
                info!(indicator = %self.label, %signal, "Indicator pulse");
            }
            _ if self.current == Some(signal) => {}
            _ => {
                info!(indicator = %self.label, %signal, "Indicator changed");
                self.current = Some(signal);
            }
        }
        Ok(())
    }
}
