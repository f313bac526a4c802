//! Portal client repository for database operations.

use domain::models::{ClientProfile, ClientProfileUpdate, NewClientProfile};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::ClientEntity;
use crate::metrics::QueryTimer;

/// Repository for portal client database operations.
#[derive(Clone)]
pub struct ClientRepository {
    pool: PgPool,
}

impl ClientRepository {
    /// Create a new repository instance.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a client by identity id.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<ClientProfile>, sqlx::Error> {
        let timer = QueryTimer::new("find_portal_client_by_id");
        let result = sqlx::query_as::<_, ClientEntity>(
            r#"
            SELECT id, email, first_name, last_name, company_name, user_type,
                   ghl_location_id, onboarding_status, created_at, updated_at
            FROM portal_clients
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();

        Ok(result?.map(Into::into))
    }

    /// Insert a client unless one with the same id exists.
    ///
    /// Returns true when a row was created.
    pub async fn insert_if_absent(&self, client: &NewClientProfile) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("insert_portal_client");
        let result = sqlx::query(
            r#"
            INSERT INTO portal_clients (id, email, first_name, last_name, company_name)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(client.id)
        .bind(&client.email)
        .bind(&client.first_name)
        .bind(&client.last_name)
        .bind(&client.company_name)
        .execute(&self.pool)
        .await;
        timer.record();

        Ok(result?.rows_affected() > 0)
    }

    /// Apply a partial update. Fails with `RowNotFound` for an unknown id.
    pub async fn update(
        &self,
        id: Uuid,
        update: &ClientProfileUpdate,
    ) -> Result<ClientProfile, sqlx::Error> {
        let timer = QueryTimer::new("update_portal_client");
        let result = sqlx::query_as::<_, ClientEntity>(
            r#"
            UPDATE portal_clients
            SET email = COALESCE($2, email),
                first_name = COALESCE($3, first_name),
                last_name = COALESCE($4, last_name),
                company_name = COALESCE($5, company_name),
                ghl_location_id = COALESCE($6, ghl_location_id),
                onboarding_status = COALESCE($7, onboarding_status),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, email, first_name, last_name, company_name, user_type,
                      ghl_location_id, onboarding_status, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&update.email)
        .bind(&update.first_name)
        .bind(&update.last_name)
        .bind(&update.company_name)
        .bind(&update.ghl_location_id)
        .bind(update.onboarding_status.map(|s| s.as_str()))
        .fetch_one(&self.pool)
        .await;
        timer.record();

        Ok(result?.into())
    }
}
