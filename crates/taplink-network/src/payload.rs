//! JSON body posted for every accepted read.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use taplink_core::CanonicalUid;

/// Context attached to a read by the loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadMetadata {
    /// Device identifier reported to the backend.
    pub device: String,

    /// Wall-clock time of the read.
    pub timestamp: DateTime<Utc>,
}

impl ReadMetadata {
    pub fn new(device: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            device: device.into(),
            timestamp,
        }
    }
}

/// Request body.
///
/// ```json
/// {"uid_hex":"04A31B9C","uid_dec":"77798300","device":"taplink-01","timestamp":1700000000}
/// ```
///
/// `uid_dec` is a string so backends that store it as text (and JavaScript
/// consumers) never lose precision on 7-byte identifiers. Only `uid_hex` is
/// required by the receiving side; the other fields are additive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadPayload {
    pub uid_hex: String,
    pub uid_dec: String,
    pub device: String,
    /// Unix seconds.
    pub timestamp: i64,
}

impl ReadPayload {
    pub fn new(uid: &CanonicalUid, metadata: &ReadMetadata) -> Self {
        Self {
            uid_hex: uid.hex.clone(),
            uid_dec: uid.decimal_string(),
            device: metadata.device.clone(),
            timestamp: metadata.timestamp.timestamp(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_json_shape() {
        let uid = CanonicalUid::from_bytes(&[0x04, 0xA3, 0x1B, 0x9C]).unwrap();
        let ts = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let payload = ReadPayload::new(&uid, &ReadMetadata::new("taplink-01", ts));

        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "uid_hex": "04A31B9C",
                "uid_dec": "77798300",
                "device": "taplink-01",
                "timestamp": 1_700_000_000,
            })
        );
    }
}
