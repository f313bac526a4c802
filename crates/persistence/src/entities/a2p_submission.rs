//! A2P submission entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::A2PStatus;
use sqlx::FromRow;
use std::str::FromStr;
use uuid::Uuid;

/// Column list shared by every query returning a submission row.
pub const A2P_SUBMISSION_COLUMNS: &str = "id, client_id, status, \
    legal_business_name, street_address, city, state, zip, country, \
    business_phone, business_email, business_website, \
    rep_first_name, rep_last_name, rep_email, rep_job_title, rep_phone, \
    business_type, business_industry, tax_id, \
    privacy_policy_url, terms_url, opt_in_url, \
    admin_notes, submitted_at, updated_at";

/// Database row mapping for the portal_a2p_submissions table.
#[derive(Debug, Clone, FromRow)]
pub struct A2PSubmissionEntity {
    pub id: Uuid,
    pub client_id: Uuid,
    pub status: String,
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

impl From<A2PSubmissionEntity> for domain::models::A2PSubmission {
    fn from(entity: A2PSubmissionEntity) -> Self {
        Self {
            id: entity.id,
            client_id: entity.client_id,
            status: A2PStatus::from_str(&entity.status).unwrap_or_default(),
            legal_business_name: entity.legal_business_name,
            street_address: entity.street_address,
            city: entity.city,
            state: entity.state,
            zip: entity.zip,
            country: entity.country,
            business_phone: entity.business_phone,
            business_email: entity.business_email,
            business_website: entity.business_website,
            rep_first_name: entity.rep_first_name,
            rep_last_name: entity.rep_last_name,
            rep_email: entity.rep_email,
            rep_job_title: entity.rep_job_title,
            rep_phone: entity.rep_phone,
            business_type: entity.business_type,
            business_industry: entity.business_industry,
            tax_id: entity.tax_id,
            privacy_policy_url: entity.privacy_policy_url,
            terms_url: entity.terms_url,
            opt_in_url: entity.opt_in_url,
            admin_notes: entity.admin_notes,
            submitted_at: entity.submitted_at,
            updated_at: entity.updated_at,
        }
    }
}
