//! A2P 10DLC registration submission models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Review status of a submission. New submissions start as `Submitted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum A2PStatus {
    #[default]
    Submitted,
    UnderReview,
    ActionRequired,
    Processing,
    Approved,
    Rejected,
}

impl A2PStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            A2PStatus::Submitted => "submitted",
            A2PStatus::UnderReview => "under_review",
            A2PStatus::ActionRequired => "action_required",
            A2PStatus::Processing => "processing",
            A2PStatus::Approved => "approved",
            A2PStatus::Rejected => "rejected",
        }
    }

    pub fn is_final(&self) -> bool {
        matches!(self, A2PStatus::Approved | A2PStatus::Rejected)
    }
}

impl FromStr for A2PStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "submitted" => Ok(A2PStatus::Submitted),
            "under_review" => Ok(A2PStatus::UnderReview),
            "action_required" => Ok(A2PStatus::ActionRequired),
            "processing" => Ok(A2PStatus::Processing),
            "approved" => Ok(A2PStatus::Approved),
            "rejected" => Ok(A2PStatus::Rejected),
            _ => Err(format!("Invalid A2P status: {}", s)),
        }
    }
}

impl fmt::Display for A2PStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A persisted A2P submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct A2PSubmission {
    pub id: Uuid,
    pub client_id: Uuid,
    pub status: A2PStatus,

    pub legal_business_name: String,
    pub street_address: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub country: String,
    pub business_phone: String,
    pub business_email: String,
    pub business_website: Option<String>,

    pub rep_first_name: String,
    pub rep_last_name: String,
    pub rep_email: String,
    pub rep_job_title: String,
    pub rep_phone: String,

    pub business_type: String,
    pub business_industry: String,
    pub tax_id: String,

    pub privacy_policy_url: Option<String>,
    pub terms_url: Option<String>,
    pub opt_in_url: Option<String>,

    pub admin_notes: Option<String>,

    pub submitted_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert shape of a submission, built from a form draft.
///
/// The status column is left to its default (`submitted`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewA2PSubmission {
    pub client_id: Uuid,

    pub legal_business_name: String,
    pub street_address: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub country: String,
    pub business_phone: String,
    pub business_email: String,
    pub business_website: Option<String>,

    pub rep_first_name: String,
    pub rep_last_name: String,
    pub rep_email: String,
    pub rep_job_title: String,
    pub rep_phone: String,

    pub business_type: String,
    pub business_industry: String,
    pub tax_id: String,

    pub privacy_policy_url: Option<String>,
    pub terms_url: Option<String>,
    pub opt_in_url: Option<String>,
}

impl NewA2PSubmission {
    /// Materializes the row the store would return for this insert.
    pub fn into_submission(self, id: Uuid, now: DateTime<Utc>) -> A2PSubmission {
        A2PSubmission {
            id,
            client_id: self.client_id,
            status: A2PStatus::default(),
            legal_business_name: self.legal_business_name,
            street_address: self.street_address,
            city: self.city,
            state: self.state,
            zip: self.zip,
            country: self.country,
            business_phone: self.business_phone,
            business_email: self.business_email,
            business_website: self.business_website,
            rep_first_name: self.rep_first_name,
            rep_last_name: self.rep_last_name,
            rep_email: self.rep_email,
            rep_job_title: self.rep_job_title,
            rep_phone: self.rep_phone,
            business_type: self.business_type,
            business_industry: self.business_industry,
            tax_id: self.tax_id,
            privacy_policy_url: self.privacy_policy_url,
            terms_url: self.terms_url,
            opt_in_url: self.opt_in_url,
            admin_notes: None,
            submitted_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_a2p_status_from_str() {
        assert_eq!(
            A2PStatus::from_str("under_review").unwrap(),
            A2PStatus::UnderReview
        );
        assert_eq!(
            A2PStatus::from_str("action_required").unwrap(),
            A2PStatus::ActionRequired
        );
        assert!(A2PStatus::from_str("pending").is_err());
    }

    #[test]
    fn test_a2p_status_default_is_submitted() {
        assert_eq!(A2PStatus::default(), A2PStatus::Submitted);
        assert_eq!(
            serde_json::to_string(&A2PStatus::Processing).unwrap(),
            "\"processing\""
        );
    }

    #[test]
    fn test_a2p_status_is_final() {
        assert!(A2PStatus::Approved.is_final());
        assert!(A2PStatus::Rejected.is_final());
        assert!(!A2PStatus::ActionRequired.is_final());
    }
}
