//! Postgres-backed implementation of the portal data store.

use domain::models::{
    A2PSubmission, ActivityLogEntry, ClientProfile, ClientProfileUpdate, NewA2PSubmission,
    NewActivity, NewClientProfile, NewSystemStatus, Phase, SystemStatus,
};
use domain::services::{PortalStore, StoreError};
use sqlx::PgPool;
use uuid::Uuid;

use crate::metrics::record_store_error;
use crate::repositories::{
    A2PSubmissionRepository, ActivityRepository, ClientRepository, SystemStatusRepository,
};

/// Portal store over the four portal tables.
#[derive(Clone)]
pub struct PgPortalStore {
    clients: ClientRepository,
    statuses: SystemStatusRepository,
    submissions: A2PSubmissionRepository,
    activity: ActivityRepository,
}

impl PgPortalStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            clients: ClientRepository::new(pool.clone()),
            statuses: SystemStatusRepository::new(pool.clone()),
            submissions: A2PSubmissionRepository::new(pool.clone()),
            activity: ActivityRepository::new(pool),
        }
    }
}

/// Maps a sqlx error onto the store boundary error.
///
/// Unique violations keep the database message so it can be shown to the user.
pub fn map_store_error(err: sqlx::Error) -> StoreError {
    let mapped = match err {
        sqlx::Error::RowNotFound => StoreError::NotFound,
        sqlx::Error::Database(db_err) => match db_err.code().as_deref() {
            Some("23505") => StoreError::Conflict(db_err.message().to_string()),
            _ => StoreError::Backend(format!("Database error: {}", db_err)),
        },
        other => StoreError::Backend(format!("Database error: {}", other)),
    };

    let kind = match &mapped {
        StoreError::NotFound => "not_found",
        StoreError::Conflict(_) => "conflict",
        StoreError::Backend(_) => "backend",
    };
    record_store_error(kind);
    if !matches!(mapped, StoreError::NotFound) {
        tracing::warn!(kind, error = %mapped, "Portal store query failed");
    }
    mapped
}

#[async_trait::async_trait]
impl PortalStore for PgPortalStore {
    async fn find_client(&self, id: Uuid) -> Result<Option<ClientProfile>, StoreError> {
        self.clients.find_by_id(id).await.map_err(map_store_error)
    }

    async fn insert_client(&self, client: &NewClientProfile) -> Result<bool, StoreError> {
        self.clients
            .insert_if_absent(client)
            .await
            .map_err(map_store_error)
    }

    async fn update_client(
        &self,
        id: Uuid,
        update: &ClientProfileUpdate,
    ) -> Result<ClientProfile, StoreError> {
        self.clients.update(id, update).await.map_err(map_store_error)
    }

    async fn find_system_status(
        &self,
        client_id: Uuid,
    ) -> Result<Option<SystemStatus>, StoreError> {
        self.statuses
            .find_by_client(client_id)
            .await
            .map_err(map_store_error)
    }

    async fn insert_system_status(&self, status: &NewSystemStatus) -> Result<bool, StoreError> {
        self.statuses
            .insert_if_absent(status)
            .await
            .map_err(map_store_error)
    }

    async fn advance_phase(&self, client_id: Uuid, phase: Phase) -> Result<bool, StoreError> {
        self.statuses
            .advance_phase(client_id, phase)
            .await
            .map_err(map_store_error)
    }

    async fn find_a2p_submission(
        &self,
        client_id: Uuid,
    ) -> Result<Option<A2PSubmission>, StoreError> {
        self.submissions
            .find_by_client(client_id)
            .await
            .map_err(map_store_error)
    }

    async fn insert_a2p_submission(
        &self,
        submission: &NewA2PSubmission,
    ) -> Result<A2PSubmission, StoreError> {
        self.submissions
            .insert(submission)
            .await
            .map_err(map_store_error)
    }

    async fn insert_activity(&self, activity: &NewActivity) -> Result<(), StoreError> {
        self.activity.insert(activity).await.map_err(map_store_error)
    }

    async fn list_activity(
        &self,
        client_id: Uuid,
        limit: i64,
    ) -> Result<Vec<ActivityLogEntry>, StoreError> {
        self.activity
            .list_for_client(client_id, limit)
            .await
            .map_err(map_store_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        assert_eq!(map_store_error(sqlx::Error::RowNotFound), StoreError::NotFound);
    }

    #[test]
    fn test_pool_timeout_maps_to_backend() {
        let err = map_store_error(sqlx::Error::PoolTimedOut);
        assert!(matches!(err, StoreError::Backend(_)));
    }
}
