//! Inbound and outbound event type definitions.
//!
//! Events are internally tagged JSON objects; the `type` tag carries
//! the wire event name. Optional payload keys deserialize to `None`
//! rather than failing, matching the loosely-typed clients.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use citywatch_core::alert::{AlertStatus, GeoPoint, SosAlert};
use citywatch_core::types::ack::SosAck;
use citywatch_core::types::id::CitizenId;

/// Payload of a `sos_triggered` event.
///
/// Every field is optional on the wire; the session manager applies
/// the defaults (generated citizen id, current UTC timestamp) and
/// rejects a missing location on the alert/update path.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SosRequest {
    /// Stable per-device citizen identifier.
    #[serde(rename = "citizenId", default, skip_serializing_if = "Option::is_none")]
    pub citizen_id: Option<CitizenId>,
    /// Reported position.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoPoint>,
    /// Client-side event time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    /// Lifecycle marker; `"deactivated"` selects the deactivation
    /// branch, anything else (or absence) the alert/update branch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl SosRequest {
    /// Whether this request asks to deactivate the citizen's alerts.
    pub fn is_deactivation(&self) -> bool {
        self.status.as_deref() == Some(AlertStatus::Deactivated.as_str())
    }
}

/// Events sent by clients to the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundEvent {
    /// A police console joins the broadcast audience.
    JoinPoliceRoom,
    /// A police console leaves the broadcast audience.
    LeavePoliceRoom,
    /// A citizen triggers, updates, or cancels an SOS.
    SosTriggered(SosRequest),
}

/// Events sent by the server to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundEvent {
    /// Connection acknowledgement sent on registration.
    Connected {
        /// Always `"connected"`.
        status: String,
    },
    /// New active alert, pushed to the police room.
    SosAlert {
        /// The full persisted record, `_id` as a string.
        #[serde(flatten)]
        alert: SosAlert,
    },
    /// An alert was cancelled; police consoles drop its marker.
    SosDeactivated {
        /// The citizen whose alerts were deactivated.
        citizen_id: CitizenId,
    },
    /// Synchronous acknowledgement for a `sos_triggered` event.
    SosAck {
        /// The acknowledgement body.
        #[serde(flatten)]
        ack: SosAck,
    },
    /// Error reply for an undecodable or rejected event.
    Error {
        /// Machine-readable error code.
        code: String,
        /// Human-readable message.
        message: String,
    },
}

impl OutboundEvent {
    /// The standard connection acknowledgement.
    pub fn connected() -> Self {
        Self::Connected {
            status: "connected".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sos_triggered_decodes_with_all_keys_missing() {
        let event: InboundEvent =
            serde_json::from_str(r#"{"type": "sos_triggered"}"#).expect("decode");
        match event {
            InboundEvent::SosTriggered(req) => {
                assert!(req.citizen_id.is_none());
                assert!(req.location.is_none());
                assert!(!req.is_deactivation());
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn test_sos_triggered_decodes_full_payload() {
        let raw = r#"{
            "type": "sos_triggered",
            "citizenId": "c1",
            "location": {"latitude": 19.07, "longitude": 72.88},
            "timestamp": "2024-03-01T10:00:00Z"
        }"#;
        let event: InboundEvent = serde_json::from_str(raw).expect("decode");
        match event {
            InboundEvent::SosTriggered(req) => {
                assert_eq!(req.citizen_id, Some(CitizenId::new("c1")));
                let location = req.location.expect("location");
                assert_eq!(location.latitude, 19.07);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn test_deactivation_marker() {
        let req = SosRequest {
            status: Some("deactivated".to_string()),
            ..SosRequest::default()
        };
        assert!(req.is_deactivation());

        // Any other marker selects the alert/update branch.
        let req = SosRequest {
            status: Some("active".to_string()),
            ..SosRequest::default()
        };
        assert!(!req.is_deactivation());
    }

    #[test]
    fn test_join_room_decodes_from_bare_tag() {
        let event: InboundEvent =
            serde_json::from_str(r#"{"type": "join_police_room"}"#).expect("decode");
        assert!(matches!(event, InboundEvent::JoinPoliceRoom));
    }

    #[test]
    fn test_sos_alert_event_flattens_record() {
        use citywatch_core::types::id::AlertId;

        let alert = SosAlert {
            id: Some(AlertId::new()),
            citizen_id: CitizenId::new("c1"),
            location: GeoPoint {
                latitude: 19.07,
                longitude: 72.88,
            },
            timestamp: Utc::now(),
            status: AlertStatus::Active,
        };
        let json = serde_json::to_value(OutboundEvent::SosAlert { alert }).expect("serialize");
        assert_eq!(json["type"], "sos_alert");
        assert!(json["_id"].is_string());
        assert_eq!(json["citizen_id"], "c1");
        assert_eq!(json["status"], "active");
    }
}
