//! The SOS alert entity and its lifecycle status.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::id::{AlertId, CitizenId};

/// A geographic position reported by a citizen device.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
}

/// Lifecycle status of an SOS alert.
///
/// Alerts are never deleted: deactivation flips the status and the
/// record is retained for audit/history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertStatus {
    /// The alert is live and visible to police consoles.
    Active,
    /// The alert has been cancelled by the citizen.
    Deactivated,
}

impl AlertStatus {
    /// Return the wire/storage representation of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Deactivated => "deactivated",
        }
    }

    /// Parse a storage representation back into a status.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(Self::Active),
            "deactivated" => Some(Self::Deactivated),
            _ => None,
        }
    }
}

impl std::fmt::Display for AlertStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A persisted SOS alert record.
///
/// Invariant: at most one record with [`AlertStatus::Active`] exists
/// per citizen at any time. A repeated SOS while one is active is a
/// location update to the existing record, never a new insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SosAlert {
    /// Store-assigned identifier; `None` until the record is persisted.
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<AlertId>,
    /// Stable per-device citizen identifier.
    pub citizen_id: CitizenId,
    /// Last reported position.
    pub location: GeoPoint,
    /// Last report time (ISO-8601 on the wire).
    pub timestamp: DateTime<Utc>,
    /// Lifecycle status.
    pub status: AlertStatus,
}

impl SosAlert {
    /// Construct a fresh, not-yet-persisted active alert.
    pub fn new_active(citizen_id: CitizenId, location: GeoPoint, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: None,
            citizen_id,
            location,
            timestamp,
            status: AlertStatus::Active,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SosAlert {
        SosAlert {
            id: Some(AlertId::new()),
            citizen_id: CitizenId::new("c1"),
            location: GeoPoint {
                latitude: 19.07,
                longitude: 72.88,
            },
            timestamp: Utc::now(),
            status: AlertStatus::Active,
        }
    }

    #[test]
    fn test_id_serializes_under_underscore_id() {
        let alert = sample();
        let json = serde_json::to_value(&alert).expect("serialize");
        assert!(json.get("_id").is_some());
        assert!(json["_id"].is_string());
        assert_eq!(json["status"], "active");
    }

    #[test]
    fn test_unpersisted_alert_omits_id() {
        let alert = SosAlert::new_active(
            CitizenId::new("c1"),
            GeoPoint {
                latitude: 0.0,
                longitude: 0.0,
            },
            Utc::now(),
        );
        let json = serde_json::to_value(&alert).expect("serialize");
        assert!(json.get("_id").is_none());
    }

    #[test]
    fn test_status_parse_roundtrip() {
        assert_eq!(AlertStatus::parse("active"), Some(AlertStatus::Active));
        assert_eq!(
            AlertStatus::parse("deactivated"),
            Some(AlertStatus::Deactivated)
        );
        assert_eq!(AlertStatus::parse("archived"), None);
    }
}
