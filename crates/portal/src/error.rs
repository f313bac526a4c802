//! Error taxonomy of the portal core.
//!
//! None of these are fatal. Auth errors are shown inline, provisioning and
//! fetch errors are logged, submission errors stay on the form.

use domain::services::navigation::AppView;
use domain::services::{ProviderError, StoreError};
use thiserror::Error;

/// Normalized authentication failures.
///
/// Provider-originated variants carry the provider's message verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("{0}")]
    InvalidCredentials(String),

    #[error("{0}")]
    AlreadyRegistered(String),

    #[error("{0}")]
    WeakPassword(String),

    #[error("{0}")]
    NetworkOrProviderFailure(String),

    #[error("No active session")]
    NoSession,

    #[error("An auth event subscription is already active")]
    AlreadySubscribed,
}

impl From<ProviderError> for AuthError {
    fn from(err: ProviderError) -> Self {
        let message = err.message;

        // Error code first.
        match err.code.as_deref() {
            Some("invalid_credentials") | Some("invalid_grant") => {
                return AuthError::InvalidCredentials(message)
            }
            Some("user_already_exists") | Some("email_exists") => {
                return AuthError::AlreadyRegistered(message)
            }
            Some("weak_password") => return AuthError::WeakPassword(message),
            _ => {}
        }

        // Then message text.
        let lower = message.to_lowercase();
        if lower.contains("invalid login credentials") {
            AuthError::InvalidCredentials(message)
        } else if lower.contains("already registered") || lower.contains("already exists") {
            AuthError::AlreadyRegistered(message)
        } else if lower.contains("password should be") || lower.contains("weak password") {
            AuthError::WeakPassword(message)
        } else {
            AuthError::NetworkOrProviderFailure(message)
        }
    }
}

/// Failure creating the client profile or its status row. Logged only.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProvisioningError {
    #[error("Failed to look up client profile: {0}")]
    Lookup(StoreError),

    #[error("Failed to create client profile: {0}")]
    ClientProfile(StoreError),

    #[error("Failed to create system status: {0}")]
    SystemStatus(StoreError),
}

/// Failure loading or updating portal data. The cached copy is kept.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("Client profile not found")]
    ProfileMissing,

    #[error("Failed to load portal data: {0}")]
    Store(#[from] StoreError),
}

/// Failure inserting the A2P submission. Stored on the form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmissionError {
    #[error("{0}")]
    Rejected(String),

    #[error("You must be signed in to submit the registration")]
    NotAuthenticated,
}

impl From<StoreError> for SubmissionError {
    fn from(err: StoreError) -> Self {
        SubmissionError::Rejected(err.to_string())
    }
}

/// Local input failures. Nothing was sent over the network.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please complete all required fields")]
    IncompleteForm(Vec<String>),

    #[error("A submission is already in progress")]
    SubmissionInFlight,

    #[error("{0}")]
    InvalidInput(String),
}

impl From<validator::ValidationError> for ValidationError {
    fn from(err: validator::ValidationError) -> Self {
        let message = err
            .message
            .map(|m| m.to_string())
            .unwrap_or_else(|| err.code.to_string());
        ValidationError::InvalidInput(message)
    }
}

/// Umbrella error returned by controller actions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PortalError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Submission(#[from] SubmissionError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Provisioning(#[from] ProvisioningError),

    #[error("This action is not available from the {0} view")]
    InvalidView(AppView),
}

pub type PortalResult<T> = Result<T, PortalError>;
