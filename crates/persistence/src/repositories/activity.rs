//! Activity log repository for database operations.

use domain::models::{ActivityLogEntry, NewActivity};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::ActivityEntity;
use crate::metrics::QueryTimer;

/// Repository for the append-only activity log.
#[derive(Clone)]
pub struct ActivityRepository {
    pool: PgPool,
}

impl ActivityRepository {
    /// Create a new repository instance.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, activity: &NewActivity) -> Result<(), sqlx::Error> {
        let timer = QueryTimer::new("insert_portal_activity");
        let result = sqlx::query(
            r#"
            INSERT INTO portal_activity (client_id, action, details)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(activity.client_id)
        .bind(&activity.action)
        .bind(&activity.details)
        .execute(&self.pool)
        .await;
        timer.record();

        result?;
        Ok(())
    }

    /// Newest entries first.
    pub async fn list_for_client(
        &self,
        client_id: Uuid,
        limit: i64,
    ) -> Result<Vec<ActivityLogEntry>, sqlx::Error> {
        let timer = QueryTimer::new("list_portal_activity");
        let result = sqlx::query_as::<_, ActivityEntity>(
            r#"
            SELECT id, client_id, action, details, created_at
            FROM portal_activity
            WHERE client_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(client_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await;
        timer.record();

        Ok(result?.into_iter().map(Into::into).collect())
    }
}
