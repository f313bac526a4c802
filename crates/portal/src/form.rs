//! Onboarding form controller.
//!
//! Holds the in-progress draft for the registration form together with the
//! UI-facing state around it: which sections are expanded, whether a
//! submission is in flight and the last submission error.

use std::collections::BTreeSet;

use domain::models::{A2PSubmission, FormDraft, FormField, FormSection};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{PortalResult, SubmissionError, ValidationError};
use crate::services::record_store::RecordStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OnboardingForm {
    draft: FormDraft,
    expanded: BTreeSet<FormSection>,
    in_flight: bool,
    last_error: Option<String>,
}

impl Default for OnboardingForm {
    fn default() -> Self {
        Self::new()
    }
}

impl OnboardingForm {
    /// A fresh form with only the first section expanded.
    pub fn new() -> Self {
        Self {
            draft: FormDraft::default(),
            expanded: BTreeSet::from([FormSection::LegalBusinessDetails]),
            in_flight: false,
            last_error: None,
        }
    }

    pub fn draft(&self) -> &FormDraft {
        &self.draft
    }

    /// Merges one field into the draft. No validation happens here.
    pub fn set_field(&mut self, field: FormField, value: impl Into<String>) {
        self.draft.set(field, value);
    }

    pub fn is_expanded(&self, section: FormSection) -> bool {
        self.expanded.contains(&section)
    }

    pub fn expanded_sections(&self) -> Vec<FormSection> {
        self.expanded.iter().copied().collect()
    }

    pub fn toggle_section(&mut self, section: FormSection) {
        if !self.expanded.remove(&section) {
            self.expanded.insert(section);
        }
    }

    pub fn expand_all(&mut self) {
        self.expanded.extend(FormSection::ALL);
    }

    /// Replaces the draft with the sample record and opens every section.
    pub fn fill_sample(&mut self) {
        self.draft = FormDraft::sample();
        self.expand_all();
    }

    pub fn is_valid(&self) -> bool {
        self.draft.is_valid()
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn can_submit(&self) -> bool {
        !self.in_flight && self.is_valid()
    }

    /// Inserts the draft as the client's A2P submission.
    ///
    /// An invalid draft is refused before any network call. On failure the
    /// message is kept in `last_error` and the draft stays as it was.
    pub async fn submit(
        &mut self,
        records: &RecordStore,
        identity: Option<Uuid>,
    ) -> PortalResult<A2PSubmission> {
        if self.in_flight {
            return Err(ValidationError::SubmissionInFlight.into());
        }
        if !self.draft.is_valid() {
            return Err(ValidationError::IncompleteForm(self.draft.invalid_fields()).into());
        }

        let Some(client_id) = identity else {
            let err = SubmissionError::NotAuthenticated;
            self.last_error = Some(err.to_string());
            return Err(err.into());
        };

        self.in_flight = true;
        self.last_error = None;
        let submission = self.draft.to_submission(client_id);
        let result = records.insert_a2p_submission(&submission).await;
        self.in_flight = false;

        match result {
            Ok(stored) => {
                records.log_submission(client_id).await;
                info!(client_id = %client_id, "A2P registration submitted");
                Ok(stored)
            }
            Err(e) => {
                warn!(client_id = %client_id, error = %e, "A2P registration submit failed");
                self.last_error = Some(e.to_string());
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PortalError;
    use domain::models::activity::actions;
    use domain::models::NewClientProfile;
    use domain::services::{InMemoryPortalStore, PortalStore};
    use std::sync::Arc;

    async fn setup() -> (Arc<InMemoryPortalStore>, RecordStore, Uuid) {
        let store = Arc::new(InMemoryPortalStore::new());
        let records = RecordStore::new(store.clone());
        let id = Uuid::new_v4();
        records
            .provision_client(NewClientProfile::new(id, "a@b.com"))
            .await
            .unwrap();
        (store, records, id)
    }

    #[test]
    fn test_new_form_defaults() {
        let form = OnboardingForm::new();
        assert_eq!(form.expanded_sections(), vec![FormSection::LegalBusinessDetails]);
        assert_eq!(form.draft().country, "United States");
        assert!(!form.can_submit());
        assert_eq!(form.last_error(), None);
    }

    #[test]
    fn test_toggle_section_is_symmetric() {
        let mut form = OnboardingForm::new();
        form.toggle_section(FormSection::ComplianceAssets);
        assert!(form.is_expanded(FormSection::ComplianceAssets));
        form.toggle_section(FormSection::ComplianceAssets);
        assert!(!form.is_expanded(FormSection::ComplianceAssets));
        form.toggle_section(FormSection::LegalBusinessDetails);
        assert!(form.expanded_sections().is_empty());
    }

    #[test]
    fn test_fill_sample_expands_everything() {
        let mut form = OnboardingForm::new();
        form.fill_sample();
        assert_eq!(form.expanded_sections(), FormSection::ALL.to_vec());
        assert!(form.can_submit());
    }

    #[test]
    fn test_set_field_merges_without_validation() {
        let mut form = OnboardingForm::new();
        form.set_field(FormField::City, "Austin");
        assert_eq!(form.draft().get(FormField::City), "Austin");
        assert!(!form.is_valid());
    }

    #[tokio::test]
    async fn test_submit_invalid_draft_makes_no_call() {
        let (store, records, id) = setup().await;
        let mut form = OnboardingForm::new();

        let err = form.submit(&records, Some(id)).await.unwrap_err();
        match err {
            PortalError::Validation(ValidationError::IncompleteForm(fields)) => {
                assert!(fields.contains(&"legalBusinessName".to_string()));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(store.submission_count(), 0);
    }

    #[tokio::test]
    async fn test_submit_success_logs_activity() {
        let (store, records, id) = setup().await;
        let mut form = OnboardingForm::new();
        form.fill_sample();

        let stored = form.submit(&records, Some(id)).await.unwrap();
        assert_eq!(stored.client_id, id);
        assert!(!form.in_flight());
        assert_eq!(store.activity_actions(id), vec![actions::A2P_SUBMITTED]);
        assert!(store.find_a2p_submission(id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_submit_failure_keeps_draft_and_allows_retry() {
        let (store, records, id) = setup().await;
        let mut form = OnboardingForm::new();
        form.fill_sample();
        let before = form.draft().clone();

        store.set_failing(true);
        let err = form.submit(&records, Some(id)).await.unwrap_err();
        assert!(matches!(err, PortalError::Submission(SubmissionError::Rejected(_))));
        assert!(form.last_error().is_some());
        assert_eq!(form.draft(), &before);
        assert!(form.can_submit());

        store.set_failing(false);
        form.submit(&records, Some(id)).await.unwrap();
        assert_eq!(form.last_error(), None);
        assert_eq!(store.submission_count(), 1);
    }

    #[tokio::test]
    async fn test_second_submission_surfaces_conflict() {
        let (_store, records, id) = setup().await;
        let mut form = OnboardingForm::new();
        form.fill_sample();
        form.submit(&records, Some(id)).await.unwrap();

        let err = form.submit(&records, Some(id)).await.unwrap_err();
        assert!(err.to_string().contains("duplicate key"));
        assert!(form.last_error().unwrap().contains("duplicate key"));
    }

    #[tokio::test]
    async fn test_submit_without_identity() {
        let (_store, records, _id) = setup().await;
        let mut form = OnboardingForm::new();
        form.fill_sample();
        let err = form.submit(&records, None).await.unwrap_err();
        assert_eq!(err, PortalError::Submission(SubmissionError::NotAuthenticated));
    }
}
