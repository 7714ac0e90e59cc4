use taplink_hardware::HardwareError;
use thiserror::Error;

/// Result type for agent operations.
pub type Result<T> = std::result::Result<T, AgentError>;

/// Errors that stop the agent.
///
/// Network and delivery problems never surface here: the loop reports them
/// and keeps running. What remains is either fatal at boot or a bug.
#[derive(Debug, Error)]
pub enum AgentError {
    /// The card reader did not pass its boot self-test.
    #[error("Reader initialization failed: {0}")]
    HardwareInit(#[source] HardwareError),

    /// Configuration could not be read or is invalid.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Core invariant violated (e.g. an illegal link transition).
    #[error(transparent)]
    Core(#[from] taplink_core::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AgentError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Returns `true` for errors raised by the boot self-test.
    pub fn is_hardware_init(&self) -> bool {
        matches!(self, Self::HardwareInit(_))
    }
}
