//! Activity log entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the portal_activity table.
#[derive(Debug, Clone, FromRow)]
pub struct ActivityEntity {
    pub id: Uuid,
    pub client_id: Uuid,
    pub action: String,
    pub details: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<ActivityEntity> for domain::models::ActivityLogEntry {
    fn from(entity: ActivityEntity) -> Self {
        Self {
            id: entity.id,
            client_id: entity.client_id,
            action: entity.action,
            details: entity.details,
            created_at: entity.created_at,
        }
    }
}
