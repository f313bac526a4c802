//! Portal record store.
//!
//! Wraps the data store with the portal's provisioning, fetch and logging
//! rules. Callers on the auth path never fail because of it.

use std::sync::Arc;

use domain::models::activity::{actions, DEFAULT_HISTORY_LIMIT};
use domain::models::{
    A2PSubmission, ActivityLogEntry, ClientProfile, ClientProfileUpdate, NewA2PSubmission,
    NewActivity, NewClientProfile, NewSystemStatus, Phase, PortalUserData,
};
use domain::services::{PortalStore, StoreError};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::error::{FetchError, ProvisioningError, SubmissionError};

#[derive(Clone)]
pub struct RecordStore {
    store: Arc<dyn PortalStore>,
    history_limit: i64,
}

impl RecordStore {
    pub fn new(store: Arc<dyn PortalStore>) -> Self {
        Self {
            store,
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }

    pub fn with_history_limit(mut self, limit: i64) -> Self {
        self.history_limit = limit;
        self
    }

    /// Makes sure a profile and status row exist for an authenticated identity.
    pub async fn ensure_client_profile(&self, id: Uuid, email: &str) -> Result<(), ProvisioningError> {
        self.provision_client(NewClientProfile::new(id, email)).await
    }

    /// Creates the profile and its default status row.
    ///
    /// Both inserts ignore conflicts, so concurrent calls for the same identity
    /// leave exactly one row of each. The status insert runs even when the
    /// profile already exists, which repairs a half-provisioned client.
    pub async fn provision_client(&self, profile: NewClientProfile) -> Result<(), ProvisioningError> {
        let existing = self
            .store
            .find_client(profile.id)
            .await
            .map_err(ProvisioningError::Lookup)?;

        let created = match existing {
            Some(_) => false,
            None => self
                .store
                .insert_client(&profile)
                .await
                .map_err(ProvisioningError::ClientProfile)?,
        };

        let status_created = self
            .store
            .insert_system_status(&NewSystemStatus::initial(profile.id))
            .await
            .map_err(ProvisioningError::SystemStatus)?;

        if created {
            info!(client_id = %profile.id, "Client profile provisioned");
        } else if status_created {
            warn!(client_id = %profile.id, "Missing system status restored for existing client");
        }
        Ok(())
    }

    /// Loads profile, status and submission concurrently.
    pub async fn try_fetch_portal_user_data(&self, id: Uuid) -> Result<PortalUserData, FetchError> {
        let (client, system_status, a2p_submission) = tokio::join!(
            self.store.find_client(id),
            self.store.find_system_status(id),
            self.store.find_a2p_submission(id),
        );

        let client = client?.ok_or(FetchError::ProfileMissing)?;

        Ok(PortalUserData {
            client,
            system_status: optional_lookup(id, "system status", system_status),
            a2p_submission: optional_lookup(id, "A2P submission", a2p_submission),
        })
    }

    /// Like `try_fetch_portal_user_data`, logging the failure instead of returning it.
    pub async fn fetch_portal_user_data(&self, id: Uuid) -> Option<PortalUserData> {
        match self.try_fetch_portal_user_data(id).await {
            Ok(data) => Some(data),
            Err(e) => {
                error!(client_id = %id, error = %e, "Failed to fetch portal user data");
                None
            }
        }
    }

    /// Inserts the client's registration. There is no upsert.
    pub async fn insert_a2p_submission(
        &self,
        submission: &NewA2PSubmission,
    ) -> Result<A2PSubmission, SubmissionError> {
        match self.store.insert_a2p_submission(submission).await {
            Ok(stored) => {
                info!(
                    client_id = %stored.client_id,
                    submission_id = %stored.id,
                    "A2P submission stored"
                );
                Ok(stored)
            }
            Err(e) => {
                warn!(client_id = %submission.client_id, error = %e, "A2P submission rejected");
                Err(e.into())
            }
        }
    }

    /// Appends an activity entry. Failures are logged and swallowed.
    pub async fn log_activity(&self, client_id: Uuid, action: &str, details: Option<&str>) {
        let activity = NewActivity::new(client_id, action, details);
        if let Err(e) = self.store.insert_activity(&activity).await {
            error!(
                client_id = %client_id,
                action = %action,
                error = %e,
                "Failed to log activity"
            );
        }
    }

    pub async fn update_client_profile(
        &self,
        id: Uuid,
        update: &ClientProfileUpdate,
    ) -> Result<ClientProfile, FetchError> {
        self.store.update_client(id, update).await.map_err(|e| match e {
            StoreError::NotFound => FetchError::ProfileMissing,
            other => FetchError::Store(other),
        })
    }

    /// Moves the client's phase forward; a lower or equal phase is ignored.
    pub async fn advance_phase(&self, client_id: Uuid, phase: Phase) -> Result<bool, FetchError> {
        let advanced = self.store.advance_phase(client_id, phase).await?;
        if !advanced {
            warn!(
                client_id = %client_id,
                phase = phase.number(),
                "Phase not advanced; stored phase is already at or past it"
            );
        }
        Ok(advanced)
    }

    /// Newest entries first. `None` uses the configured limit.
    pub async fn activity_history(&self, client_id: Uuid, limit: Option<i64>) -> Vec<ActivityLogEntry> {
        let limit = limit.unwrap_or(self.history_limit);
        match self.store.list_activity(client_id, limit).await {
            Ok(entries) => entries,
            Err(e) => {
                error!(client_id = %client_id, error = %e, "Failed to load activity history");
                Vec::new()
            }
        }
    }

    /// Records that the client submitted the registration form.
    pub async fn log_submission(&self, client_id: Uuid) {
        self.log_activity(
            client_id,
            actions::A2P_SUBMITTED,
            Some("A2P registration form submitted"),
        )
        .await;
    }
}

fn optional_lookup<T>(client_id: Uuid, what: &str, result: Result<Option<T>, StoreError>) -> Option<T> {
    match result {
        Ok(value) => value,
        Err(e) => {
            warn!(client_id = %client_id, error = %e, "Failed to load {}", what);
            None
        }
    }
}
