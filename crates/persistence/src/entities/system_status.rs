//! System status entity (database row mapping).

use chrono::{DateTime, NaiveDate, Utc};
use domain::models::{IntegrationStatus, Phase, SmsRegistrationStatus, WorkflowStatus};
use sqlx::FromRow;
use std::str::FromStr;
use uuid::Uuid;

/// Database row mapping for the portal_system_status table.
#[derive(Debug, Clone, FromRow)]
pub struct SystemStatusEntity {
    pub id: Uuid,
    pub client_id: Uuid,
    pub crm_integration: String,
    pub sms_registration: String,
    pub workflow_automation: String,
    pub calendar_sync: String,
    pub estimated_go_live: Option<NaiveDate>,
    pub current_phase: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<SystemStatusEntity> for domain::models::SystemStatus {
    fn from(entity: SystemStatusEntity) -> Self {
        Self {
            id: entity.id,
            client_id: entity.client_id,
            crm_integration: IntegrationStatus::from_str(&entity.crm_integration)
                .unwrap_or_default(),
            sms_registration: SmsRegistrationStatus::from_str(&entity.sms_registration)
                .unwrap_or_default(),
            workflow_automation: WorkflowStatus::from_str(&entity.workflow_automation)
                .unwrap_or_default(),
            calendar_sync: IntegrationStatus::from_str(&entity.calendar_sync).unwrap_or_default(),
            estimated_go_live: entity.estimated_go_live,
            current_phase: Phase::from_number_clamped(entity.current_phase),
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_status_entity_to_domain() {
        let entity = SystemStatusEntity {
            id: Uuid::new_v4(),
            client_id: Uuid::new_v4(),
            crm_integration: "connected".to_string(),
            sms_registration: "in_progress".to_string(),
            workflow_automation: "active".to_string(),
            calendar_sync: "bogus".to_string(),
            estimated_go_live: NaiveDate::from_ymd_opt(2025, 6, 1),
            current_phase: 3,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let status: domain::models::SystemStatus = entity.clone().into();
        assert_eq!(status.client_id, entity.client_id);
        assert_eq!(status.crm_integration, IntegrationStatus::Connected);
        assert_eq!(status.sms_registration, SmsRegistrationStatus::InProgress);
        assert_eq!(status.workflow_automation, WorkflowStatus::Active);
        assert_eq!(status.calendar_sync, IntegrationStatus::Pending);
        assert_eq!(status.current_phase, Phase::SystemIntegration);
    }
}
