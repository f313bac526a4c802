//! Domain models for the onboarding portal.

pub mod a2p_submission;
pub mod activity;
pub mod client;
pub mod dashboard;
pub mod form;
pub mod session;
pub mod system_status;

pub use a2p_submission::{A2PStatus, A2PSubmission, NewA2PSubmission};
pub use activity::{ActivityLogEntry, NewActivity};
pub use client::{ClientProfile, ClientProfileUpdate, NewClientProfile, OnboardingStatus};
pub use dashboard::{DashboardSummary, PortalUserData};
pub use form::{FormDraft, FormField, FormSection};
pub use session::{AuthEvent, AuthUser, Session, UserMetadata};
pub use system_status::{
    IntegrationStatus, NewSystemStatus, Phase, SmsRegistrationStatus, SystemStatus,
    WorkflowStatus,
};
