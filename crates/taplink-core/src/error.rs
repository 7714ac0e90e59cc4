use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    // Identifier errors
    #[error("Card identifier is empty")]
    EmptyIdentifier,

    #[error("Card identifier too long: {len} bytes (max {max})")]
    IdentifierTooLong { len: usize, max: usize },

    // Link errors
    #[error("Invalid state transition from {from} to {to}")]
    InvalidStateTransition { from: String, to: String },

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
