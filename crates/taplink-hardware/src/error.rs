//! Errors raised by the reader, link and indicator devices.

/// Result type alias for device operations.
pub type Result<T> = std::result::Result<T, HardwareError>;

/// Device failure.
///
/// The reader loop treats every variant as recoverable except when it comes
/// out of the boot self-test.
#[derive(Debug, thiserror::Error)]
pub enum HardwareError {
    /// The device or its control channel went away.
    #[error("Device disconnected: {device}")]
    Disconnected { device: String },

    /// The device cannot perform this operation.
    #[error("Unsupported operation: {operation}")]
    Unsupported { operation: String },

    /// A transfer on the reader bus failed.
    #[error("Reader bus error: {message}")]
    Bus { message: String },

    /// The reader did not pass its self-test.
    #[error("Self-test failed: {message}")]
    SelfTest { message: String },

    /// The radio refused or failed a link operation.
    #[error("Link error: {message}")]
    Link { message: String },

    /// The reader produced an identifier outside 1-10 bytes.
    #[error("Invalid card identifier: {0}")]
    Identifier(#[from] taplink_core::Error),

    #[error("{0}")]
    Other(String),
}

impl HardwareError {
    pub fn disconnected(device: impl Into<String>) -> Self {
        Self::Disconnected {
            device: device.into(),
        }
    }

    pub fn unsupported(operation: impl Into<String>) -> Self {
        Self::Unsupported {
            operation: operation.into(),
        }
    }

    pub fn bus(message: impl Into<String>) -> Self {
        Self::Bus {
            message: message.into(),
        }
    }

    pub fn self_test(message: impl Into<String>) -> Self {
        Self::SelfTest {
            message: message.into(),
        }
    }

    pub fn link(message: impl Into<String>) -> Self {
        Self::Link {
            message: message.into(),
        }
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_self_test_display() {
        let error = HardwareError::self_test("version register reads 0x00");
        assert!(matches!(error, HardwareError::SelfTest { .. }));
        assert_eq!(error.to_string(), "Self-test failed: version register reads 0x00");
    }

    #[test]
    fn test_identifier_error_conversion() {
        let error: HardwareError = taplink_core::Error::EmptyIdentifier.into();
        assert!(matches!(error, HardwareError::Identifier(_)));
        assert_eq!(
            error.to_string(),
            "Invalid card identifier: Card identifier is empty"
        );
    }

    #[test]
    fn test_messages_name_the_device_side() {
        assert_eq!(
            HardwareError::bus("SPI transfer failed").to_string(),
            "Reader bus error: SPI transfer failed"
        );
        assert_eq!(
            HardwareError::link("association rejected").to_string(),
            "Link error: association rejected"
        );
        assert_eq!(
            HardwareError::disconnected("card event channel").to_string(),
            "Device disconnected: card event channel"
        );
    }
}
