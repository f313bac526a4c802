//! Portal client entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::OnboardingStatus;
use sqlx::FromRow;
use std::str::FromStr;
use uuid::Uuid;

/// Database row mapping for the portal_clients table.
#[derive(Debug, Clone, FromRow)]
pub struct ClientEntity {
    pub id: Uuid,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub company_name: Option<String>,
    pub user_type: String,
    pub ghl_location_id: Option<String>,
    pub onboarding_status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ClientEntity> for domain::models::ClientProfile {
    fn from(entity: ClientEntity) -> Self {
        Self {
            id: entity.id,
            email: entity.email,
            first_name: entity.first_name,
            last_name: entity.last_name,
            company_name: entity.company_name,
            user_type: entity.user_type,
            ghl_location_id: entity.ghl_location_id,
            onboarding_status: OnboardingStatus::from_str(&entity.onboarding_status)
                .unwrap_or_default(),
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}
