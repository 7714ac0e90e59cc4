//! Agent configuration.
//!
//! Loaded from a TOML file; every field has a default so an empty file (or
//! no file at all) yields a working host setup.
//!
//! ```toml
//! device = "taplink-01"
//!
//! [wifi]
//! ssid = "shop-floor"
//! password = "secret"
//!
//! [server]
//! url = "http://192.168.1.5:5000/api/rfid"
//!
//! [reader]
//! min_read_interval_ms = 3000
//! ```

use crate::error::{AgentError, Result};
use crate::link::LinkSettings;
use crate::reader_loop::LoopSettings;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::Duration;
use taplink_core::constants::*;
use taplink_hardware::Credentials;
use taplink_network::DeliveryConfig;

/// Environment variable that overrides `server.url`.
pub const SERVER_URL_ENV: &str = "TAPLINK_SERVER_URL";

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AgentConfig {
    /// Device identifier sent with every read.
    pub device: String,
    pub wifi: WifiConfig,
    pub server: ServerConfig,
    pub reader: ReaderConfig,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            device: DEFAULT_DEVICE_NAME.to_string(),
            wifi: WifiConfig::default(),
            server: ServerConfig::default(),
            reader: ReaderConfig::default(),
        }
    }
}

/// Wireless credentials and link supervision timing.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WifiConfig {
    pub ssid: String,
    pub password: String,
    pub connect_timeout_ms: u64,
    pub status_poll_ms: u64,
    pub initial_attempts: u32,
    pub initial_backoff_ms: u64,
    pub liveness_interval_ms: u64,
}

impl Default for WifiConfig {
    fn default() -> Self {
        Self {
            ssid: String::new(),
            password: String::new(),
            connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT_MS,
            status_poll_ms: DEFAULT_STATUS_POLL_MS,
            initial_attempts: DEFAULT_INITIAL_CONNECT_ATTEMPTS,
            initial_backoff_ms: DEFAULT_INITIAL_BACKOFF_MS,
            liveness_interval_ms: DEFAULT_LIVENESS_INTERVAL_MS,
        }
    }
}

impl fmt::Debug for WifiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WifiConfig")
            .field("ssid", &self.ssid)
            .field("password", &"<redacted>")
            .field("connect_timeout_ms", &self.connect_timeout_ms)
            .field("status_poll_ms", &self.status_poll_ms)
            .field("initial_attempts", &self.initial_attempts)
            .field("initial_backoff_ms", &self.initial_backoff_ms)
            .field("liveness_interval_ms", &self.liveness_interval_ms)
            .finish()
    }
}

impl WifiConfig {
    pub fn credentials(&self) -> Credentials {
        Credentials::new(self.ssid.clone(), self.password.clone())
    }

    pub fn link_settings(&self) -> LinkSettings {
        LinkSettings {
            connect_timeout: Duration::from_millis(self.connect_timeout_ms),
            status_poll: Duration::from_millis(self.status_poll_ms),
            initial_attempts: self.initial_attempts,
            initial_backoff: Duration::from_millis(self.initial_backoff_ms),
            liveness_interval: Duration::from_millis(self.liveness_interval_ms),
        }
    }
}

/// Delivery endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub url: String,
    pub timeout_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_SERVER_URL.to_string(),
            timeout_ms: DEFAULT_DELIVERY_TIMEOUT_MS,
        }
    }
}

impl ServerConfig {
    pub fn delivery_config(&self) -> DeliveryConfig {
        DeliveryConfig {
            url: self.url.clone(),
            timeout: Duration::from_millis(self.timeout_ms),
        }
    }
}

/// Main loop timing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReaderConfig {
    /// Debounce window for repeated reads of one card.
    pub min_read_interval_ms: u64,
    /// Sleep when no card is present.
    pub idle_poll_ms: u64,
    /// Sleep after a delivered read.
    pub settle_ms: u64,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            min_read_interval_ms: DEFAULT_MIN_READ_INTERVAL_MS,
            idle_poll_ms: DEFAULT_IDLE_POLL_MS,
            settle_ms: DEFAULT_SETTLE_MS,
        }
    }
}

impl AgentConfig {
    /// Read and validate a TOML file.
    ///
    /// # Errors
    ///
    /// Returns `AgentError::Io` if the file cannot be read and
    /// `AgentError::Config` if it does not parse or validate.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content).map_err(|e| match e {
            AgentError::Config(message) => {
                AgentError::Config(format!("{}: {message}", path.display()))
            }
            other => other,
        })
    }

    /// Parse and validate TOML text.
    ///
    /// # Errors
    ///
    /// Returns `AgentError::Config` on a parse or validation failure.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| AgentError::config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides through `lookup` (normally
    /// `std::env::var`), then re-validate.
    ///
    /// # Errors
    ///
    /// Returns `AgentError::Config` if an override produces an invalid value.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(SERVER_URL_ENV) {
            self.server.url = url;
        }
        self.validate()
    }

    /// Check the configuration for values the agent cannot run with.
    ///
    /// # Errors
    ///
    /// Returns `AgentError::Config` naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        let url = self.server.url.trim();
        if url.is_empty() {
            return Err(AgentError::config("server.url must not be empty"));
        }
        let host = url
            .strip_prefix("http://")
            .or_else(|| url.strip_prefix("https://"))
            .ok_or_else(|| {
                AgentError::config(format!("server.url must be http(s), got '{url}'"))
            })?;
        if host.is_empty() || host.starts_with('/') {
            return Err(AgentError::config(format!(
                "server.url has no host: '{url}'"
            )));
        }

        if self.device.trim().is_empty() {
            return Err(AgentError::config("device must not be empty"));
        }

        let timeouts = [
            ("server.timeout_ms", self.server.timeout_ms),
            ("wifi.connect_timeout_ms", self.wifi.connect_timeout_ms),
            ("wifi.status_poll_ms", self.wifi.status_poll_ms),
            ("wifi.liveness_interval_ms", self.wifi.liveness_interval_ms),
        ];
        if let Some((name, _)) = timeouts.iter().find(|(_, value)| *value == 0) {
            return Err(AgentError::config(format!("{name} must be greater than 0")));
        }

        if self.wifi.initial_attempts == 0 {
            return Err(AgentError::config(
                "wifi.initial_attempts must be at least 1",
            ));
        }

        Ok(())
    }

    /// Settings for the reader loop.
    pub fn loop_settings(&self) -> LoopSettings {
        LoopSettings {
            device: self.device.clone(),
            min_read_interval: Duration::from_millis(self.reader.min_read_interval_ms),
            idle_poll: Duration::from_millis(self.reader.idle_poll_ms),
            settle: Duration::from_millis(self.reader.settle_ms),
        }
    }
}
