//! Identity provider boundary.
//!
//! Abstracts the hosted identity service the portal authenticates against.

use chrono::{Duration, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{AuthUser, Session, UserMetadata};

/// Error reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ProviderError {
    /// HTTP status, when the failure came from a provider response.
    pub status: Option<u16>,
    /// Machine readable error code, when the provider sent one.
    pub code: Option<String>,
    pub message: String,
}

impl ProviderError {
    pub fn new(status: u16, code: &str, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            code: Some(code.to_string()),
            message: message.into(),
        }
    }

    /// Failure with no provider response (transport error, timeout).
    pub fn network(message: impl Into<String>) -> Self {
        Self {
            status: None,
            code: None,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignUpParams {
    pub email: String,
    pub password: String,
    pub metadata: UserMetadata,
    /// Where the confirmation email should send the user back to.
    pub email_redirect_to: Option<String>,
}

/// Result of a sign-up. `session` is absent while email confirmation is pending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderAuthResponse {
    pub user: AuthUser,
    pub session: Option<Session>,
}

/// Identity provider trait.
#[async_trait::async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_up(&self, params: SignUpParams) -> Result<ProviderAuthResponse, ProviderError>;

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, ProviderError>;

    /// Revokes the session behind `access_token`.
    async fn sign_out(&self, access_token: &str) -> Result<(), ProviderError>;

    /// Resolves the user an access token belongs to.
    async fn get_user(&self, access_token: &str) -> Result<AuthUser, ProviderError>;

    async fn reset_password_for_email(
        &self,
        email: &str,
        redirect_to: Option<&str>,
    ) -> Result<(), ProviderError>;

    async fn update_user_password(
        &self,
        access_token: &str,
        password: &str,
    ) -> Result<AuthUser, ProviderError>;

    /// Re-sends the sign-up confirmation email.
    async fn resend_signup(
        &self,
        email: &str,
        redirect_to: Option<&str>,
    ) -> Result<(), ProviderError>;
}

/// Kind of email the mock provider recorded as sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailKind {
    Confirmation,
    Recovery,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentEmail {
    pub kind: EmailKind,
    pub email: String,
    pub redirect_to: Option<String>,
}

#[derive(Debug, Clone)]
struct MockAccount {
    id: Uuid,
    email: String,
    password: String,
    confirmed: bool,
    metadata: UserMetadata,
}

/// In-memory identity provider for development and testing.
///
/// Mirrors the error codes and messages of a GoTrue-compatible service.
#[derive(Debug, Default)]
pub struct MockIdentityProvider {
    /// Sign-ups return no session until the email is confirmed.
    pub require_email_confirmation: bool,
    simulate_failure: AtomicBool,
    accounts: Mutex<HashMap<String, MockAccount>>,
    tokens: Mutex<HashMap<String, Uuid>>,
    sent_emails: Mutex<Vec<SentEmail>>,
}

const MIN_PASSWORD_LENGTH: usize = 6;
const SESSION_LIFETIME_SECS: i64 = 3600;

impl MockIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// A provider whose sign-ups wait for email confirmation.
    pub fn with_email_confirmation() -> Self {
        Self {
            require_email_confirmation: true,
            ..Self::default()
        }
    }

    /// Makes every call fail as if the provider were unreachable.
    pub fn set_failing(&self, failing: bool) {
        self.simulate_failure.store(failing, Ordering::SeqCst);
    }

    /// Registers a confirmed account directly.
    pub fn register(&self, email: &str, password: &str) -> Uuid {
        let id = Uuid::new_v4();
        let account = MockAccount {
            id,
            email: email.to_string(),
            password: password.to_string(),
            confirmed: true,
            metadata: UserMetadata::default(),
        };
        lock(&self.accounts).insert(normalize(email), account);
        id
    }

    pub fn confirm_email(&self, email: &str) -> bool {
        match lock(&self.accounts).get_mut(&normalize(email)) {
            Some(account) => {
                account.confirmed = true;
                true
            }
            None => false,
        }
    }

    /// Issues the tokens a recovery link for `email` would carry.
    pub fn issue_recovery_tokens(&self, email: &str) -> Option<(String, String)> {
        let account = lock(&self.accounts).get(&normalize(email)).cloned()?;
        let session = self.issue_session(&account);
        Some((session.access_token, session.refresh_token))
    }

    pub fn metadata_for(&self, email: &str) -> Option<UserMetadata> {
        lock(&self.accounts)
            .get(&normalize(email))
            .map(|a| a.metadata.clone())
    }

    pub fn password_for(&self, email: &str) -> Option<String> {
        lock(&self.accounts)
            .get(&normalize(email))
            .map(|a| a.password.clone())
    }

    pub fn sent_emails(&self) -> Vec<SentEmail> {
        lock(&self.sent_emails).clone()
    }

    pub fn active_token_count(&self) -> usize {
        lock(&self.tokens).len()
    }

    fn check_available(&self) -> Result<(), ProviderError> {
        if self.simulate_failure.load(Ordering::SeqCst) {
            tracing::warn!("Mock identity provider simulating failure");
            return Err(ProviderError::network("Failed to fetch"));
        }
        Ok(())
    }

    fn issue_session(&self, account: &MockAccount) -> Session {
        let access_token = Uuid::new_v4().to_string();
        lock(&self.tokens).insert(access_token.clone(), account.id);
        Session {
            access_token,
            refresh_token: Uuid::new_v4().to_string(),
            expires_at: Utc::now() + Duration::seconds(SESSION_LIFETIME_SECS),
            user: AuthUser {
                id: account.id,
                email: account.email.clone(),
            },
        }
    }

    fn account_for_token(&self, access_token: &str) -> Result<MockAccount, ProviderError> {
        let id = lock(&self.tokens)
            .get(access_token)
            .copied()
            .ok_or_else(|| ProviderError::new(401, "bad_jwt", "invalid JWT"))?;
        lock(&self.accounts)
            .values()
            .find(|a| a.id == id)
            .cloned()
            .ok_or_else(|| ProviderError::new(404, "user_not_found", "User not found"))
    }

    fn record_email(&self, kind: EmailKind, email: &str, redirect_to: Option<&str>) {
        tracing::info!(
            email = %email,
            kind = ?kind,
            "Mock: Would send email"
        );
        lock(&self.sent_emails).push(SentEmail {
            kind,
            email: email.to_string(),
            redirect_to: redirect_to.map(str::to_string),
        });
    }
}

fn normalize(email: &str) -> String {
    email.trim().to_lowercase()
}

fn weak_password() -> ProviderError {
    ProviderError::new(
        422,
        "weak_password",
        "Password should be at least 6 characters.",
    )
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait::async_trait]
impl IdentityProvider for MockIdentityProvider {
    async fn sign_up(&self, params: SignUpParams) -> Result<ProviderAuthResponse, ProviderError> {
        self.check_available()?;
        if params.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(weak_password());
        }

        let key = normalize(&params.email);
        let account = {
            let mut accounts = lock(&self.accounts);
            if accounts.contains_key(&key) {
                return Err(ProviderError::new(
                    422,
                    "user_already_exists",
                    "User already registered",
                ));
            }
            let account = MockAccount {
                id: Uuid::new_v4(),
                email: params.email.trim().to_string(),
                password: params.password,
                confirmed: !self.require_email_confirmation,
                metadata: params.metadata,
            };
            accounts.insert(key, account.clone());
            account
        };

        let user = AuthUser {
            id: account.id,
            email: account.email.clone(),
        };

        if account.confirmed {
            Ok(ProviderAuthResponse {
                user,
                session: Some(self.issue_session(&account)),
            })
        } else {
            self.record_email(
                EmailKind::Confirmation,
                &account.email,
                params.email_redirect_to.as_deref(),
            );
            Ok(ProviderAuthResponse {
                user,
                session: None,
            })
        }
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, ProviderError> {
        self.check_available()?;
        let account = lock(&self.accounts)
            .get(&normalize(email))
            .filter(|a| a.password == password)
            .cloned()
            .ok_or_else(|| {
                ProviderError::new(400, "invalid_credentials", "Invalid login credentials")
            })?;

        if !account.confirmed {
            return Err(ProviderError::new(
                400,
                "email_not_confirmed",
                "Email not confirmed",
            ));
        }

        Ok(self.issue_session(&account))
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), ProviderError> {
        self.check_available()?;
        lock(&self.tokens).remove(access_token);
        Ok(())
    }

    async fn get_user(&self, access_token: &str) -> Result<AuthUser, ProviderError> {
        self.check_available()?;
        let account = self.account_for_token(access_token)?;
        Ok(AuthUser {
            id: account.id,
            email: account.email,
        })
    }

    async fn reset_password_for_email(
        &self,
        email: &str,
        redirect_to: Option<&str>,
    ) -> Result<(), ProviderError> {
        self.check_available()?;
        // Unknown addresses succeed silently.
        if lock(&self.accounts).contains_key(&normalize(email)) {
            self.record_email(EmailKind::Recovery, email, redirect_to);
        }
        Ok(())
    }

    async fn update_user_password(
        &self,
        access_token: &str,
        password: &str,
    ) -> Result<AuthUser, ProviderError> {
        self.check_available()?;
        let account = self.account_for_token(access_token)?;
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(weak_password());
        }
        if account.password == password {
            return Err(ProviderError::new(
                422,
                "same_password",
                "New password should be different from the old password.",
            ));
        }

        if let Some(stored) = lock(&self.accounts).get_mut(&normalize(&account.email)) {
            stored.password = password.to_string();
        }

        Ok(AuthUser {
            id: account.id,
            email: account.email,
        })
    }

    async fn resend_signup(
        &self,
        email: &str,
        redirect_to: Option<&str>,
    ) -> Result<(), ProviderError> {
        self.check_available()?;
        self.record_email(EmailKind::Confirmation, email, redirect_to);
        Ok(())
    }
}
