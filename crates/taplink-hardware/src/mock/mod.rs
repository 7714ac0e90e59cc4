//! Mock device implementations for testing and development.
//!
//! This module provides simulated device implementations that can be controlled
//! programmatically without requiring physical hardware. Each mock comes with a
//! handle that stays with the test (or the host console) while the device
//! itself is moved into the reader loop.

pub mod indicator;
pub mod link;
pub mod reader;

// Re-export commonly used types
pub use indicator::{MockIndicator, MockIndicatorHandle};
pub use link::{MockLink, MockLinkHandle};
pub use reader::{MockReader, MockReaderHandle};
