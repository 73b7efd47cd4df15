//! Schema bootstrap for the SOS alert table.

use sqlx::PgPool;
use tracing::info;

use citywatch_core::error::{AppError, ErrorKind};
use citywatch_core::result::AppResult;

const CREATE_SOS_ALERTS: &str = r#"
CREATE TABLE IF NOT EXISTS sos_alerts (
    id          UUID PRIMARY KEY,
    citizen_id  TEXT NOT NULL,
    latitude    DOUBLE PRECISION NOT NULL,
    longitude   DOUBLE PRECISION NOT NULL,
    timestamp   TIMESTAMPTZ NOT NULL,
    status      TEXT NOT NULL DEFAULT 'active',
    created_at  TIMESTAMPTZ NOT NULL DEFAULT NOW()
)
"#;

// Storage-level backstop for the one-active-alert-per-citizen invariant.
const CREATE_ACTIVE_INDEX: &str = r#"
CREATE UNIQUE INDEX IF NOT EXISTS sos_alerts_one_active
    ON sos_alerts (citizen_id) WHERE status = 'active'
"#;

/// Create the schema objects if they do not exist.
pub async fn run_migrations(pool: &PgPool) -> AppResult<()> {
    sqlx::query(CREATE_SOS_ALERTS)
        .execute(pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to create sos_alerts table", e)
        })?;

    sqlx::query(CREATE_ACTIVE_INDEX)
        .execute(pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to create active-alert index", e)
        })?;

    info!("SOS alert schema is up to date");
    Ok(())
}
