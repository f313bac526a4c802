//! Activity log models. Entries are append-only.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Action codes written by the portal.
pub mod actions {
    pub const ACCOUNT_CREATED: &str = "account_created";
    pub const SIGN_IN: &str = "sign_in";
    pub const A2P_SUBMITTED: &str = "a2p_submitted";
}

/// Default number of entries returned by an activity history lookup.
pub const DEFAULT_HISTORY_LIMIT: i64 = 50;

/// A single activity log entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLogEntry {
    pub id: Uuid,
    pub client_id: Uuid,
    pub action: String,
    pub details: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Input for appending an activity entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewActivity {
    pub client_id: Uuid,
    pub action: String,
    pub details: Option<String>,
}

impl NewActivity {
    pub fn new(client_id: Uuid, action: impl Into<String>, details: Option<&str>) -> Self {
        Self {
            client_id,
            action: action.into(),
            // Blank details are stored as NULL.
            details: details.filter(|d| !d.is_empty()).map(str::to_string),
        }
    }
}
