//! In-memory alert store for tests and standalone runs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;

use citywatch_core::alert::{AlertStatus, GeoPoint, SosAlert};
use citywatch_core::result::AppResult;
use citywatch_core::traits::AlertStore;
use citywatch_core::types::id::{AlertId, CitizenId};

/// [`AlertStore`] implementation over a concurrent map.
///
/// Mirrors the PostgreSQL store's semantics, including last-write-wins
/// on concurrent location updates.
#[derive(Debug, Default)]
pub struct MemoryAlertStore {
    alerts: DashMap<AlertId, SosAlert>,
}

impl MemoryAlertStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records (any status). Test helper.
    pub fn len(&self) -> usize {
        self.alerts.len()
    }

    /// Whether the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }
}

#[async_trait]
impl AlertStore for MemoryAlertStore {
    async fn insert(&self, alert: &SosAlert) -> AppResult<AlertId> {
        let id = alert.id.unwrap_or_default();
        let mut stored = alert.clone();
        stored.id = Some(id);
        self.alerts.insert(id, stored);
        Ok(id)
    }

    async fn find_active(&self, citizen_id: &CitizenId) -> AppResult<Option<SosAlert>> {
        Ok(self
            .alerts
            .iter()
            .find(|entry| {
                entry.status == AlertStatus::Active && &entry.citizen_id == citizen_id
            })
            .map(|entry| entry.value().clone()))
    }

    async fn update_location(
        &self,
        id: &AlertId,
        location: GeoPoint,
        timestamp: DateTime<Utc>,
    ) -> AppResult<bool> {
        match self.alerts.get_mut(id) {
            Some(mut entry) if entry.status == AlertStatus::Active => {
                entry.location = location;
                entry.timestamp = timestamp;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn deactivate_all(&self, citizen_id: &CitizenId) -> AppResult<u64> {
        let mut count = 0;
        for mut entry in self.alerts.iter_mut() {
            if entry.status == AlertStatus::Active && &entry.citizen_id == citizen_id {
                entry.status = AlertStatus::Deactivated;
                count += 1;
            }
        }
        Ok(count)
    }

    async fn list_active(&self) -> AppResult<Vec<SosAlert>> {
        let mut active: Vec<SosAlert> = self
            .alerts
            .iter()
            .filter(|entry| entry.status == AlertStatus::Active)
            .map(|entry| entry.value().clone())
            .collect();
        active.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(active)
    }
}
