//! PostgreSQL-backed alert store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use citywatch_core::alert::{AlertStatus, GeoPoint, SosAlert};
use citywatch_core::error::{AppError, ErrorKind};
use citywatch_core::result::AppResult;
use citywatch_core::traits::AlertStore;
use citywatch_core::types::id::{AlertId, CitizenId};

/// Row shape shared by the read queries.
type AlertRow = (Uuid, String, f64, f64, DateTime<Utc>, String);

/// [`AlertStore`] implementation over PostgreSQL.
#[derive(Debug, Clone)]
pub struct PgAlertStore {
    pool: PgPool,
}

impl PgAlertStore {
    /// Create a new store over an established pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_alert(row: AlertRow) -> AppResult<SosAlert> {
        let (id, citizen_id, latitude, longitude, timestamp, status) = row;
        let status = AlertStatus::parse(&status).ok_or_else(|| {
            AppError::database(format!("Unknown alert status in storage: {status}"))
        })?;
        Ok(SosAlert {
            id: Some(AlertId::from_uuid(id)),
            citizen_id: CitizenId::new(citizen_id),
            location: GeoPoint {
                latitude,
                longitude,
            },
            timestamp,
            status,
        })
    }
}

#[async_trait]
impl AlertStore for PgAlertStore {
    async fn insert(&self, alert: &SosAlert) -> AppResult<AlertId> {
        let id = alert.id.unwrap_or_default();
        sqlx::query(
            "INSERT INTO sos_alerts (id, citizen_id, latitude, longitude, timestamp, status) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(id.into_uuid())
        .bind(alert.citizen_id.as_str())
        .bind(alert.location.latitude)
        .bind(alert.location.longitude)
        .bind(alert.timestamp)
        .bind(alert.status.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to insert SOS alert", e))?;
        Ok(id)
    }

    async fn find_active(&self, citizen_id: &CitizenId) -> AppResult<Option<SosAlert>> {
        let row = sqlx::query_as::<_, AlertRow>(
            "SELECT id, citizen_id, latitude, longitude, timestamp, status \
             FROM sos_alerts WHERE citizen_id = $1 AND status = 'active' LIMIT 1",
        )
        .bind(citizen_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to look up active alert", e)
        })?;

        row.map(Self::row_to_alert).transpose()
    }

    async fn update_location(
        &self,
        id: &AlertId,
        location: GeoPoint,
        timestamp: DateTime<Utc>,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE sos_alerts SET latitude = $2, longitude = $3, timestamp = $4 \
             WHERE id = $1 AND status = 'active'",
        )
        .bind(id.into_uuid())
        .bind(location.latitude)
        .bind(location.longitude)
        .bind(timestamp)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to update alert location", e)
        })?;
        Ok(result.rows_affected() > 0)
    }

    async fn deactivate_all(&self, citizen_id: &CitizenId) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE sos_alerts SET status = 'deactivated' \
             WHERE citizen_id = $1 AND status = 'active'",
        )
        .bind(citizen_id.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to deactivate alerts", e)
        })?;
        Ok(result.rows_affected())
    }

    async fn list_active(&self) -> AppResult<Vec<SosAlert>> {
        let rows = sqlx::query_as::<_, AlertRow>(
            "SELECT id, citizen_id, latitude, longitude, timestamp, status \
             FROM sos_alerts WHERE status = 'active' ORDER BY timestamp DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list active alerts", e)
        })?;

        rows.into_iter().map(Self::row_to_alert).collect()
    }
}
