//! Typed identifiers for the SOS domain.
//!
//! [`AlertId`] is store-assigned and UUID-backed; it always serializes
//! as its string form so the wire never carries a native database
//! identifier type. [`CitizenId`] wraps an opaque client-supplied
//! string: mobile clients persist their own identifier per device, and
//! the server generates one only when a payload arrives without it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a persisted SOS alert record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AlertId(pub Uuid);

impl AlertId {
    /// Create a new random identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create an identifier from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Return the inner UUID value.
    pub fn into_uuid(self) -> Uuid {
        self.0
    }
}

impl Default for AlertId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AlertId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for AlertId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

impl From<Uuid> for AlertId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// Stable per-device citizen identifier.
///
/// Treated as an opaque string: clients may send any stable token, and
/// [`CitizenId::generate`] mints a v4 UUID string for payloads that
/// omit one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CitizenId(String);

impl CitizenId {
    /// Wrap an existing citizen identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh identifier for a citizen that supplied none.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Return the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CitizenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for CitizenId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for CitizenId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alert_id_new_is_unique() {
        let id1 = AlertId::new();
        let id2 = AlertId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_alert_id_serializes_as_string() {
        let id = AlertId::new();
        let json = serde_json::to_string(&id).expect("serialize");
        assert_eq!(json, format!("\"{id}\""));
    }

    #[test]
    fn test_alert_id_from_str() {
        let uuid = Uuid::new_v4();
        let id: AlertId = uuid.to_string().parse().expect("should parse");
        assert_eq!(id.0, uuid);
    }

    #[test]
    fn test_citizen_id_generate_is_unique() {
        assert_ne!(CitizenId::generate(), CitizenId::generate());
    }

    #[test]
    fn test_citizen_id_roundtrip() {
        let id = CitizenId::new("device-42");
        let json = serde_json::to_string(&id).expect("serialize");
        assert_eq!(json, "\"device-42\"");
        let parsed: CitizenId = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed, id);
    }
}
