//! Structured acknowledgement returned for every SOS invocation.

use serde::{Deserialize, Serialize};

use crate::alert::SosAlert;

/// Outcome marker of an SOS acknowledgement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AckStatus {
    /// The event was handled.
    Success,
    /// The event was rejected or a collaborator failed.
    Error,
}

/// Acknowledgement payload sent back to the originating client.
///
/// The SOS handler never raises toward its caller: failures surface
/// here with [`AckStatus::Error`] and a message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SosAck {
    /// Outcome marker.
    pub status: AckStatus,
    /// Human-readable summary.
    pub message: String,
    /// The persisted record, present when a new alert was created.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<SosAlert>,
}

impl SosAck {
    /// Build a success acknowledgement.
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: AckStatus::Success,
            message: message.into(),
            data: None,
        }
    }

    /// Build a success acknowledgement carrying the persisted record.
    pub fn success_with(message: impl Into<String>, alert: SosAlert) -> Self {
        Self {
            status: AckStatus::Success,
            message: message.into(),
            data: Some(alert),
        }
    }

    /// Build an error acknowledgement.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: AckStatus::Error,
            message: message.into(),
            data: None,
        }
    }

    /// Whether this acknowledgement reports success.
    pub fn is_success(&self) -> bool {
        self.status == AckStatus::Success
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_ack_omits_data() {
        let ack = SosAck::error("store unreachable");
        let json = serde_json::to_value(&ack).expect("serialize");
        assert_eq!(json["status"], "error");
        assert!(json.get("data").is_none());
    }
}
