//! System status repository for database operations.

use domain::models::{NewSystemStatus, Phase, SystemStatus};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::SystemStatusEntity;
use crate::metrics::QueryTimer;

/// Repository for per-client system status rows.
#[derive(Clone)]
pub struct SystemStatusRepository {
    pool: PgPool,
}

impl SystemStatusRepository {
    /// Create a new repository instance.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_client(&self, client_id: Uuid) -> Result<Option<SystemStatus>, sqlx::Error> {
        let timer = QueryTimer::new("find_system_status_by_client");
        let result = sqlx::query_as::<_, SystemStatusEntity>(
            r#"
            SELECT id, client_id, crm_integration, sms_registration, workflow_automation,
                   calendar_sync, estimated_go_live, current_phase, created_at, updated_at
            FROM portal_system_status
            WHERE client_id = $1
            "#,
        )
        .bind(client_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();

        Ok(result?.map(Into::into))
    }

    /// Insert the status row for a client unless it already has one.
    pub async fn insert_if_absent(&self, status: &NewSystemStatus) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("insert_system_status");
        let result = sqlx::query(
            r#"
            INSERT INTO portal_system_status (client_id, current_phase)
            VALUES ($1, $2)
            ON CONFLICT (client_id) DO NOTHING
            "#,
        )
        .bind(status.client_id)
        .bind(status.current_phase.number())
        .execute(&self.pool)
        .await;
        timer.record();

        Ok(result?.rows_affected() > 0)
    }

    /// Move the phase forward. Rows already at or past `phase` are untouched.
    pub async fn advance_phase(&self, client_id: Uuid, phase: Phase) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("advance_system_status_phase");
        let result = sqlx::query(
            r#"
            UPDATE portal_system_status
            SET current_phase = $2, updated_at = NOW()
            WHERE client_id = $1 AND current_phase < $2
            "#,
        )
        .bind(client_id)
        .bind(phase.number())
        .execute(&self.pool)
        .await;
        timer.record();

        Ok(result?.rows_affected() > 0)
    }
}
