//! Client profile domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Default `user_type` for accounts created through the portal.
pub const DEFAULT_USER_TYPE: &str = "client";

/// Onboarding progress of a client account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnboardingStatus {
    #[default]
    InProgress,
    Complete,
}

impl OnboardingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OnboardingStatus::InProgress => "in_progress",
            OnboardingStatus::Complete => "complete",
        }
    }
}

impl FromStr for OnboardingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in_progress" => Ok(OnboardingStatus::InProgress),
            "complete" => Ok(OnboardingStatus::Complete),
            _ => Err(format!("Invalid onboarding status: {}", s)),
        }
    }
}

impl fmt::Display for OnboardingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A portal client. One row per authenticated identity; `id` is the identity id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientProfile {
    pub id: Uuid,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub company_name: Option<String>,
    pub user_type: String,
    pub ghl_location_id: Option<String>,
    pub onboarding_status: OnboardingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ClientProfile {
    /// Name shown in the dashboard header, falling back to the email.
    pub fn display_name(&self) -> String {
        match (self.first_name.as_deref(), self.last_name.as_deref()) {
            (Some(first), Some(last)) if !first.is_empty() && !last.is_empty() => {
                format!("{} {}", first, last)
            }
            (Some(first), _) if !first.is_empty() => first.to_string(),
            _ => self.email.clone(),
        }
    }
}

/// Input for provisioning a client row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewClientProfile {
    pub id: Uuid,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub company_name: Option<String>,
}

impl NewClientProfile {
    /// Bare profile carrying only the identity fields.
    pub fn new(id: Uuid, email: impl Into<String>) -> Self {
        Self {
            id,
            email: email.into(),
            first_name: None,
            last_name: None,
            company_name: None,
        }
    }
}

/// Partial update of a client row. `None` leaves a column untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientProfileUpdate {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub company_name: Option<String>,
    pub ghl_location_id: Option<String>,
    pub onboarding_status: Option<OnboardingStatus>,
}

impl ClientProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Applies the update to an in-memory copy of the row.
    pub fn apply_to(&self, client: &mut ClientProfile) {
        if let Some(email) = &self.email {
            client.email = email.clone();
        }
        if let Some(first_name) = &self.first_name {
            client.first_name = Some(first_name.clone());
        }
        if let Some(last_name) = &self.last_name {
            client.last_name = Some(last_name.clone());
        }
        if let Some(company_name) = &self.company_name {
            client.company_name = Some(company_name.clone());
        }
        if let Some(location) = &self.ghl_location_id {
            client.ghl_location_id = Some(location.clone());
        }
        if let Some(status) = self.onboarding_status {
            client.onboarding_status = status;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> ClientProfile {
        ClientProfile {
            id: Uuid::new_v4(),
            email: "a@b.com".to_string(),
            first_name: None,
            last_name: None,
            company_name: None,
            user_type: DEFAULT_USER_TYPE.to_string(),
            ghl_location_id: None,
            onboarding_status: OnboardingStatus::InProgress,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_onboarding_status_round_trip() {
        assert_eq!(
            OnboardingStatus::from_str("complete").unwrap(),
            OnboardingStatus::Complete
        );
        assert_eq!(OnboardingStatus::InProgress.to_string(), "in_progress");
        assert!(OnboardingStatus::from_str("done").is_err());
    }

    #[test]
    fn test_display_name_falls_back_to_email() {
        let mut c = client();
        assert_eq!(c.display_name(), "a@b.com");
        c.first_name = Some("Ada".to_string());
        assert_eq!(c.display_name(), "Ada");
        c.last_name = Some("Lovelace".to_string());
        assert_eq!(c.display_name(), "Ada Lovelace");
    }

    #[test]
    fn test_update_apply_to() {
        let mut c = client();
        let update = ClientProfileUpdate {
            company_name: Some("Acme".to_string()),
            onboarding_status: Some(OnboardingStatus::Complete),
            ..Default::default()
        };
        update.apply_to(&mut c);
        assert_eq!(c.company_name.as_deref(), Some("Acme"));
        assert_eq!(c.onboarding_status, OnboardingStatus::Complete);
        assert_eq!(c.email, "a@b.com");
    }

    #[test]
    fn test_update_is_empty() {
        assert!(ClientProfileUpdate::default().is_empty());
        let update = ClientProfileUpdate {
            first_name: Some("Ada".to_string()),
            ..Default::default()
        };
        assert!(!update.is_empty());
    }
}
