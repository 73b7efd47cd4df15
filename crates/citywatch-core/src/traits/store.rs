//! Persistence seam for SOS alert records.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::alert::{GeoPoint, SosAlert};
use crate::result::AppResult;
use crate::types::id::{AlertId, CitizenId};

/// Persistence interface consumed by the SOS session manager.
///
/// Implementations live in `citywatch-store` (PostgreSQL and
/// in-memory). The filter shapes mirror the queries the lifecycle
/// needs: one active record per citizen, bulk deactivation, and an
/// in-place location update addressed by record id.
#[async_trait]
pub trait AlertStore: Send + Sync + 'static {
    /// Persist a new alert and return the store-assigned id.
    async fn insert(&self, alert: &SosAlert) -> AppResult<AlertId>;

    /// Find the citizen's active alert, if any.
    async fn find_active(&self, citizen_id: &CitizenId) -> AppResult<Option<SosAlert>>;

    /// Update location and timestamp of an active alert in place.
    ///
    /// Returns `true` when a record was updated.
    async fn update_location(
        &self,
        id: &AlertId,
        location: GeoPoint,
        timestamp: DateTime<Utc>,
    ) -> AppResult<bool>;

    /// Transition every active alert of the citizen to deactivated.
    ///
    /// Returns the number of records updated. Updating more than one is
    /// defensive: the one-active invariant should make this 0 or 1.
    async fn deactivate_all(&self, citizen_id: &CitizenId) -> AppResult<u64>;

    /// List all currently active alerts, newest first.
    async fn list_active(&self) -> AppResult<Vec<SosAlert>>;
}
