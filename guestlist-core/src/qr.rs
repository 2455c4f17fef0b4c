use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// The app marker embedded in issued check-in payloads
pub const QR_APP_NAME: &str = "guestlist";

/// Loyalty check-in payloads carry a version so the backend can invalidate
/// codes issued before a version bump.
pub const QR_VERSION: u32 = 1;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QrError {
    #[error("Payload is not valid JSON")]
    NotJson,
    #[error("Payload has no recognized type")]
    UnknownKind,
    #[error("Payload is incomplete: {0}")]
    Malformed(String),
}

/// A QR payload, either issued by this client for the user to present,
/// or captured by a scanner. The payload is advisory; the server
/// independently validates ownership and freshness.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QrPayload {
    LoyaltyCheckin {
        user_id: String,
        timestamp: DateTime<Utc>,
        app: String,
        #[serde(default = "default_version")]
        version: u32,
    },
    FreeEntry {
        voucher_id: String,
        code: String,
        user_id: String,
    },
}

fn default_version() -> u32 {
    QR_VERSION
}

impl QrPayload {
    /// The payload a user presents at the door for a loyalty check-in
    pub fn checkin(user_id: &str) -> Self {
        Self::LoyaltyCheckin {
            user_id: user_id.to_string(),
            timestamp: Utc::now(),
            app: QR_APP_NAME.to_string(),
            version: QR_VERSION,
        }
    }

    /// The payload rendered inside a free-entry voucher's QR code
    pub fn free_entry(voucher_id: &str, code: &str, user_id: &str) -> Self {
        Self::FreeEntry {
            voucher_id: voucher_id.to_string(),
            code: code.to_string(),
            user_id: user_id.to_string(),
        }
    }

    /// The JSON string a QR image of this payload carries
    pub fn encode(&self) -> String {
        serde_json::to_string(self).expect("payload serializes")
    }

    /// Parses a captured payload. Anything that is not JSON, or is JSON
    /// without a recognized `type` tag, is rejected here without ever
    /// reaching the network.
    pub fn parse(raw: &str) -> Result<Self, QrError> {
        let value: Value = serde_json::from_str(raw).map_err(|_| QrError::NotJson)?;

        let kind = value
            .get("type")
            .and_then(Value::as_str)
            .ok_or(QrError::UnknownKind)?;

        match kind {
            "loyalty_checkin" | "free_entry" => {
                serde_json::from_value(value).map_err(|e| QrError::Malformed(e.to_string()))
            }
            _ => Err(QrError::UnknownKind),
        }
    }
}
