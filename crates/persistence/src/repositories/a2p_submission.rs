//! A2P submission repository for database operations.

use domain::models::{A2PSubmission, NewA2PSubmission};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{A2PSubmissionEntity, A2P_SUBMISSION_COLUMNS};
use crate::metrics::QueryTimer;

/// Repository for A2P registration submissions.
#[derive(Clone)]
pub struct A2PSubmissionRepository {
    pool: PgPool,
}

impl A2PSubmissionRepository {
    /// Create a new repository instance.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_client(
        &self,
        client_id: Uuid,
    ) -> Result<Option<A2PSubmission>, sqlx::Error> {
        let timer = QueryTimer::new("find_a2p_submission_by_client");
        let query = format!(
            "SELECT {} FROM portal_a2p_submissions WHERE client_id = $1",
            A2P_SUBMISSION_COLUMNS
        );
        let result = sqlx::query_as::<_, A2PSubmissionEntity>(&query)
            .bind(client_id)
            .fetch_optional(&self.pool)
            .await;
        timer.record();

        Ok(result?.map(Into::into))
    }

    /// Insert a submission. The unique `client_id` constraint rejects a second one.
    pub async fn insert(&self, submission: &NewA2PSubmission) -> Result<A2PSubmission, sqlx::Error> {
        let timer = QueryTimer::new("insert_a2p_submission");
        let query = format!(
            r#"
            INSERT INTO portal_a2p_submissions (
                client_id,
                legal_business_name, street_address, city, state, zip, country,
                business_phone, business_email, business_website,
                rep_first_name, rep_last_name, rep_email, rep_job_title, rep_phone,
                business_type, business_industry, tax_id,
                privacy_policy_url, terms_url, opt_in_url
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11,
                    $12, $13, $14, $15, $16, $17, $18, $19, $20, $21)
            RETURNING {}
            "#,
            A2P_SUBMISSION_COLUMNS
        );
        let result = sqlx::query_as::<_, A2PSubmissionEntity>(&query)
            .bind(submission.client_id)
            .bind(&submission.legal_business_name)
            .bind(&submission.street_address)
            .bind(&submission.city)
            .bind(&submission.state)
            .bind(&submission.zip)
            .bind(&submission.country)
            .bind(&submission.business_phone)
            .bind(&submission.business_email)
            .bind(&submission.business_website)
            .bind(&submission.rep_first_name)
            .bind(&submission.rep_last_name)
            .bind(&submission.rep_email)
            .bind(&submission.rep_job_title)
            .bind(&submission.rep_phone)
            .bind(&submission.business_type)
            .bind(&submission.business_industry)
            .bind(&submission.tax_id)
            .bind(&submission.privacy_policy_url)
            .bind(&submission.terms_url)
            .bind(&submission.opt_in_url)
            .fetch_one(&self.pool)
            .await;
        timer.record();

        Ok(result?.into())
    }
}
