//! Portal data store boundary.
//!
//! Lookups return `Ok(None)` when the row is absent; `Err` is reserved for
//! store failures.

use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use thiserror::Error;
use uuid::Uuid;

use crate::models::client::DEFAULT_USER_TYPE;
use crate::models::{
    A2PSubmission, ActivityLogEntry, ClientProfile, ClientProfileUpdate, IntegrationStatus,
    NewA2PSubmission, NewActivity, NewClientProfile, NewSystemStatus, OnboardingStatus, Phase,
    SmsRegistrationStatus, SystemStatus, WorkflowStatus,
};

/// Errors reported by a data store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Record not found")]
    NotFound,

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Backend(String),
}

#[async_trait::async_trait]
pub trait PortalStore: Send + Sync {
    async fn find_client(&self, id: Uuid) -> Result<Option<ClientProfile>, StoreError>;

    /// Inserts a client row. Returns false when a row with that id already exists.
    async fn insert_client(&self, client: &NewClientProfile) -> Result<bool, StoreError>;

    async fn update_client(
        &self,
        id: Uuid,
        update: &ClientProfileUpdate,
    ) -> Result<ClientProfile, StoreError>;

    async fn find_system_status(&self, client_id: Uuid)
        -> Result<Option<SystemStatus>, StoreError>;

    /// Inserts a status row. Returns false when the client already has one.
    async fn insert_system_status(&self, status: &NewSystemStatus) -> Result<bool, StoreError>;

    /// Moves the client's phase forward. Returns false when the stored phase
    /// is already at or past `phase`.
    async fn advance_phase(&self, client_id: Uuid, phase: Phase) -> Result<bool, StoreError>;

    async fn find_a2p_submission(
        &self,
        client_id: Uuid,
    ) -> Result<Option<A2PSubmission>, StoreError>;

    /// Inserts a submission. A second submission for a client is a `Conflict`.
    async fn insert_a2p_submission(
        &self,
        submission: &NewA2PSubmission,
    ) -> Result<A2PSubmission, StoreError>;

    async fn insert_activity(&self, activity: &NewActivity) -> Result<(), StoreError>;

    /// Entries for a client, newest first.
    async fn list_activity(
        &self,
        client_id: Uuid,
        limit: i64,
    ) -> Result<Vec<ActivityLogEntry>, StoreError>;
}

#[derive(Debug, Default)]
struct Tables {
    clients: Vec<ClientProfile>,
    statuses: Vec<SystemStatus>,
    submissions: Vec<A2PSubmission>,
    activity: Vec<ActivityLogEntry>,
}

/// In-memory store for development and testing.
///
/// Enforces the same uniqueness rules as the database schema.
#[derive(Debug, Default)]
pub struct InMemoryPortalStore {
    tables: Mutex<Tables>,
    simulate_failure: AtomicBool,
    fail_activity: AtomicBool,
    fail_status: AtomicBool,
}

impl InMemoryPortalStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every call fail with a backend error.
    pub fn set_failing(&self, failing: bool) {
        self.simulate_failure.store(failing, Ordering::SeqCst);
    }

    /// Makes only activity writes fail.
    pub fn set_activity_failing(&self, failing: bool) {
        self.fail_activity.store(failing, Ordering::SeqCst);
    }

    /// Makes only system status inserts fail.
    pub fn set_status_failing(&self, failing: bool) {
        self.fail_status.store(failing, Ordering::SeqCst);
    }

    pub fn client_count(&self) -> usize {
        self.tables().clients.len()
    }

    pub fn status_count(&self) -> usize {
        self.tables().statuses.len()
    }

    pub fn submission_count(&self) -> usize {
        self.tables().submissions.len()
    }

    pub fn activity_actions(&self, client_id: Uuid) -> Vec<String> {
        self.tables()
            .activity
            .iter()
            .filter(|a| a.client_id == client_id)
            .map(|a| a.action.clone())
            .collect()
    }

    /// Overwrites a stored phase, bypassing the forward-only guard.
    pub fn force_phase(&self, client_id: Uuid, phase: Phase) {
        if let Some(status) = self
            .tables()
            .statuses
            .iter_mut()
            .find(|s| s.client_id == client_id)
        {
            status.current_phase = phase;
        }
    }

    fn tables(&self) -> std::sync::MutexGuard<'_, Tables> {
        self.tables
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.simulate_failure.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("connection refused".to_string()));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl PortalStore for InMemoryPortalStore {
    async fn find_client(&self, id: Uuid) -> Result<Option<ClientProfile>, StoreError> {
        self.check_available()?;
        Ok(self.tables().clients.iter().find(|c| c.id == id).cloned())
    }

    async fn insert_client(&self, client: &NewClientProfile) -> Result<bool, StoreError> {
        self.check_available()?;
        let mut tables = self.tables();
        if tables.clients.iter().any(|c| c.id == client.id) {
            return Ok(false);
        }
        let now = Utc::now();
        tables.clients.push(ClientProfile {
            id: client.id,
            email: client.email.clone(),
            first_name: client.first_name.clone(),
            last_name: client.last_name.clone(),
            company_name: client.company_name.clone(),
            user_type: DEFAULT_USER_TYPE.to_string(),
            ghl_location_id: None,
            onboarding_status: OnboardingStatus::default(),
            created_at: now,
            updated_at: now,
        });
        Ok(true)
    }

    async fn update_client(
        &self,
        id: Uuid,
        update: &ClientProfileUpdate,
    ) -> Result<ClientProfile, StoreError> {
        self.check_available()?;
        let mut tables = self.tables();
        let client = tables
            .clients
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(StoreError::NotFound)?;
        update.apply_to(client);
        client.updated_at = Utc::now();
        Ok(client.clone())
    }

    async fn find_system_status(
        &self,
        client_id: Uuid,
    ) -> Result<Option<SystemStatus>, StoreError> {
        self.check_available()?;
        Ok(self
            .tables()
            .statuses
            .iter()
            .find(|s| s.client_id == client_id)
            .cloned())
    }

    async fn insert_system_status(&self, status: &NewSystemStatus) -> Result<bool, StoreError> {
        self.check_available()?;
        if self.fail_status.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("status write rejected".to_string()));
        }
        let mut tables = self.tables();
        if !tables.clients.iter().any(|c| c.id == status.client_id) {
            return Err(StoreError::Backend(
                "insert or update on table \"portal_system_status\" violates foreign key constraint"
                    .to_string(),
            ));
        }
        if tables.statuses.iter().any(|s| s.client_id == status.client_id) {
            return Ok(false);
        }
        let now = Utc::now();
        tables.statuses.push(SystemStatus {
            id: Uuid::new_v4(),
            client_id: status.client_id,
            crm_integration: IntegrationStatus::default(),
            sms_registration: SmsRegistrationStatus::default(),
            workflow_automation: WorkflowStatus::default(),
            calendar_sync: IntegrationStatus::default(),
            estimated_go_live: None,
            current_phase: status.current_phase,
            created_at: now,
            updated_at: now,
        });
        Ok(true)
    }

    async fn advance_phase(&self, client_id: Uuid, phase: Phase) -> Result<bool, StoreError> {
        self.check_available()?;
        let mut tables = self.tables();
        match tables
            .statuses
            .iter_mut()
            .find(|s| s.client_id == client_id && s.current_phase < phase)
        {
            Some(status) => {
                status.current_phase = phase;
                status.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn find_a2p_submission(
        &self,
        client_id: Uuid,
    ) -> Result<Option<A2PSubmission>, StoreError> {
        self.check_available()?;
        Ok(self
            .tables()
            .submissions
            .iter()
            .find(|s| s.client_id == client_id)
            .cloned())
    }

    async fn insert_a2p_submission(
        &self,
        submission: &NewA2PSubmission,
    ) -> Result<A2PSubmission, StoreError> {
        self.check_available()?;
        let mut tables = self.tables();
        if tables
            .submissions
            .iter()
            .any(|s| s.client_id == submission.client_id)
        {
            return Err(StoreError::Conflict(
                "duplicate key value violates unique constraint \"portal_a2p_submissions_client_id_key\""
                    .to_string(),
            ));
        }
        let stored = submission
            .clone()
            .into_submission(Uuid::new_v4(), Utc::now());
        tables.submissions.push(stored.clone());
        Ok(stored)
    }

    async fn insert_activity(&self, activity: &NewActivity) -> Result<(), StoreError> {
        self.check_available()?;
        if self.fail_activity.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("activity write rejected".to_string()));
        }
        self.tables().activity.push(ActivityLogEntry {
            id: Uuid::new_v4(),
            client_id: activity.client_id,
            action: activity.action.clone(),
            details: activity.details.clone(),
            created_at: Utc::now(),
        });
        Ok(())
    }

    async fn list_activity(
        &self,
        client_id: Uuid,
        limit: i64,
    ) -> Result<Vec<ActivityLogEntry>, StoreError> {
        self.check_available()?;
        let limit = usize::try_from(limit.max(0)).unwrap_or(0);
        // Appended in insertion order, so newest first is reverse order.
        Ok(self
            .tables()
            .activity
            .iter()
            .rev()
            .filter(|a| a.client_id == client_id)
            .take(limit)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::activity::actions;
    use crate::models::FormDraft;

    async fn seeded() -> (InMemoryPortalStore, Uuid) {
        let store = InMemoryPortalStore::new();
        let id = Uuid::new_v4();
        store
            .insert_client(&NewClientProfile::new(id, "a@b.com"))
            .await
            .unwrap();
        (store, id)
    }

    #[tokio::test]
    async fn test_insert_client_ignores_duplicates() {
        let (store, id) = seeded().await;
        let inserted = store
            .insert_client(&NewClientProfile::new(id, "a@b.com"))
            .await
            .unwrap();
        assert!(!inserted);
        assert_eq!(store.client_count(), 1);
        let client = store.find_client(id).await.unwrap().unwrap();
        assert_eq!(client.user_type, "client");
        assert_eq!(client.onboarding_status, OnboardingStatus::InProgress);
    }

    #[tokio::test]
    async fn test_missing_rows_are_none() {
        let store = InMemoryPortalStore::new();
        let id = Uuid::new_v4();
        assert!(store.find_client(id).await.unwrap().is_none());
        assert!(store.find_system_status(id).await.unwrap().is_none());
        assert!(store.find_a2p_submission(id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_status_requires_client() {
        let store = InMemoryPortalStore::new();
        let result = store
            .insert_system_status(&NewSystemStatus::initial(Uuid::new_v4()))
            .await;
        assert!(matches!(result, Err(StoreError::Backend(_))));
    }

    #[tokio::test]
    async fn test_advance_phase_is_forward_only() {
        let (store, id) = seeded().await;
        store
            .insert_system_status(&NewSystemStatus::initial(id))
            .await
            .unwrap();

        assert!(store.advance_phase(id, Phase::TestingQa).await.unwrap());
        assert!(!store.advance_phase(id, Phase::SystemIntegration).await.unwrap());
        assert!(!store.advance_phase(id, Phase::TestingQa).await.unwrap());

        let status = store.find_system_status(id).await.unwrap().unwrap();
        assert_eq!(status.current_phase, Phase::TestingQa);
    }

    #[tokio::test]
    async fn test_second_submission_conflicts() {
        let (store, id) = seeded().await;
        let submission = FormDraft::sample().to_submission(id);

        let stored = store.insert_a2p_submission(&submission).await.unwrap();
        assert_eq!(stored.status.as_str(), "submitted");

        let err = store.insert_a2p_submission(&submission).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
        assert_eq!(store.submission_count(), 1);
    }

    #[tokio::test]
    async fn test_activity_newest_first_with_limit() {
        let (store, id) = seeded().await;
        for action in [actions::ACCOUNT_CREATED, actions::SIGN_IN, actions::A2P_SUBMITTED] {
            store
                .insert_activity(&NewActivity::new(id, action, None))
                .await
                .unwrap();
        }
        let entries = store.list_activity(id, 2).await.unwrap();
        let codes: Vec<&str> = entries.iter().map(|e| e.action.as_str()).collect();
        assert_eq!(codes, vec!["a2p_submitted", "sign_in"]);
    }

    #[tokio::test]
    async fn test_update_client() {
        let (store, id) = seeded().await;
        let update = ClientProfileUpdate {
            company_name: Some("Acme".to_string()),
            ..Default::default()
        };
        let client = store.update_client(id, &update).await.unwrap();
        assert_eq!(client.company_name.as_deref(), Some("Acme"));

        let missing = store.update_client(Uuid::new_v4(), &update).await;
        assert_eq!(missing.unwrap_err(), StoreError::NotFound);
    }

    #[tokio::test]
    async fn test_failure_injection() {
        let (store, id) = seeded().await;
        store.set_activity_failing(true);
        assert!(store
            .insert_activity(&NewActivity::new(id, actions::SIGN_IN, None))
            .await
            .is_err());
        assert!(store.find_client(id).await.is_ok());

        store.set_status_failing(true);
        assert!(store
            .insert_system_status(&NewSystemStatus::initial(id))
            .await
            .is_err());

        store.set_failing(true);
        assert!(store.find_client(id).await.is_err());
    }
}
