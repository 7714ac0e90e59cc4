//! Core types for the taplink card reader.
//!
//! Holds the pieces with no I/O: the identifier codec ([`CardUid`],
//! [`CanonicalUid`]), the [`DebounceGate`], the [`LinkState`] machine rules
//! and the shared timing constants.

pub mod constants;
pub mod debounce;
pub mod error;
pub mod types;

pub use debounce::{DebounceGate, DebounceState, Decision};
pub use error::{Error, Result};
pub use types::*;

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
