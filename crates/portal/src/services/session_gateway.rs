//! Session gateway.
//!
//! Pass-through to the identity provider that normalizes every failure into
//! `AuthError`, caches the single active session, and publishes auth events
//! to at most one subscriber.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{Duration, Utc};
use domain::models::activity::actions;
use domain::models::{AuthEvent, AuthUser, NewClientProfile, Session, UserMetadata};
use domain::services::identity::{IdentityProvider, SignUpParams};
use shared::recovery::RecoveryLink;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::error::AuthError;
use crate::services::record_store::RecordStore;

/// Lifetime assumed for a recovery session; the link does not carry one.
const RECOVERY_SESSION_SECS: i64 = 3600;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub company_name: Option<String>,
}

/// Successful sign-in or sign-up. `session` is absent while the sign-up
/// waits for email confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthOutcome {
    pub user: AuthUser,
    pub session: Option<Session>,
}

/// Gateway settings taken from configuration.
#[derive(Debug, Clone, Default)]
pub struct GatewayOptions {
    pub email_redirect_to: Option<String>,
    pub reset_redirect_to: Option<String>,
    pub storage_path: Option<PathBuf>,
}

type Slot = Option<(u64, mpsc::UnboundedSender<AuthEvent>)>;

/// Single-consumer event hub.
#[derive(Debug, Default)]
struct EventHub {
    slot: Mutex<Slot>,
    next_id: AtomicU64,
}

impl EventHub {
    fn slot(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn subscribe(self: &Arc<Self>) -> Result<AuthSubscription, AuthError> {
        let mut slot = self.slot();
        if let Some((_, sender)) = slot.as_ref() {
            if !sender.is_closed() {
                return Err(AuthError::AlreadySubscribed);
            }
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let (sender, receiver) = mpsc::unbounded_channel();
        *slot = Some((id, sender));
        Ok(AuthSubscription {
            id,
            receiver,
            hub: Arc::clone(self),
        })
    }

    fn emit(&self, event: AuthEvent) {
        let mut slot = self.slot();
        match slot.as_ref() {
            Some((_, sender)) => {
                if sender.send(event).is_err() {
                    *slot = None;
                    debug!(event = %event, "Auth event subscriber gone; event discarded");
                }
            }
            None => debug!(event = %event, "No auth event subscriber; event discarded"),
        }
    }

    fn release(&self, id: u64) {
        let mut slot = self.slot();
        if matches!(slot.as_ref(), Some((current, _)) if *current == id) {
            *slot = None;
        }
    }
}

/// Handle on the auth event stream. Dropping it releases the subscription.
#[derive(Debug)]
pub struct AuthSubscription {
    id: u64,
    receiver: mpsc::UnboundedReceiver<AuthEvent>,
    hub: Arc<EventHub>,
}

impl AuthSubscription {
    /// Next pending event, without waiting.
    pub fn try_next(&mut self) -> Option<AuthEvent> {
        self.receiver.try_recv().ok()
    }

    /// Waits for the next event.
    pub async fn next(&mut self) -> Option<AuthEvent> {
        self.receiver.recv().await
    }

    pub fn unsubscribe(self) {}
}

impl Drop for AuthSubscription {
    fn drop(&mut self) {
        self.hub.release(self.id);
    }
}

#[derive(Debug, Default)]
struct SessionCache {
    loaded: bool,
    session: Option<Session>,
}

pub struct SessionGateway {
    provider: Arc<dyn IdentityProvider>,
    records: RecordStore,
    options: GatewayOptions,
    cache: Mutex<SessionCache>,
    events: Arc<EventHub>,
}

impl SessionGateway {
    pub fn new(
        provider: Arc<dyn IdentityProvider>,
        records: RecordStore,
        options: GatewayOptions,
    ) -> Self {
        Self {
            provider,
            records,
            options,
            cache: Mutex::new(SessionCache::default()),
            events: Arc::new(EventHub::default()),
        }
    }

    /// Opens the single auth event subscription.
    pub fn subscribe(&self) -> Result<AuthSubscription, AuthError> {
        self.events.subscribe()
    }

    pub async fn sign_up(&self, request: SignUpRequest) -> Result<AuthOutcome, AuthError> {
        let params = SignUpParams {
            email: request.email.clone(),
            password: request.password,
            metadata: UserMetadata {
                first_name: request.first_name.clone(),
                last_name: request.last_name.clone(),
                company_name: request.company_name.clone(),
            },
            email_redirect_to: self.options.email_redirect_to.clone(),
        };

        let response = self.provider.sign_up(params).await.map_err(|e| {
            warn!(email = %request.email, error = %e, "Sign-up failed");
            AuthError::from(e)
        })?;
        let user = response.user;

        let profile = NewClientProfile {
            id: user.id,
            email: if user.email.is_empty() {
                request.email.clone()
            } else {
                user.email.clone()
            },
            first_name: request.first_name,
            last_name: request.last_name,
            company_name: request.company_name,
        };
        if let Err(e) = self.records.provision_client(profile).await {
            warn!(user_id = %user.id, error = %e, "Client provisioning failed after sign-up");
        }
        self.records
            .log_activity(user.id, actions::ACCOUNT_CREATED, Some("Portal account created"))
            .await;

        match &response.session {
            Some(session) => {
                self.store_session(session.clone()).await;
                self.events.emit(AuthEvent::SignedIn);
                info!(user_id = %user.id, "User signed up");
            }
            None => info!(user_id = %user.id, "User signed up; email confirmation pending"),
        }

        Ok(AuthOutcome {
            user,
            session: response.session,
        })
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<AuthOutcome, AuthError> {
        let session = self
            .provider
            .sign_in_with_password(email, password)
            .await
            .map_err(|e| {
                warn!(email = %email, error = %e, "Sign-in failed");
                AuthError::from(e)
            })?;

        let user = session.user.clone();
        self.store_session(session.clone()).await;
        self.events.emit(AuthEvent::SignedIn);
        info!(user_id = %user.id, "User signed in");

        if let Err(e) = self.records.ensure_client_profile(user.id, &user.email).await {
            warn!(user_id = %user.id, error = %e, "Client provisioning failed after sign-in");
        }
        self.records
            .log_activity(user.id, actions::SIGN_IN, Some("User signed in"))
            .await;

        Ok(AuthOutcome {
            user,
            session: Some(session),
        })
    }

    /// Ends the session. Local state is cleared even when the provider call fails.
    pub async fn sign_out(&self) -> Result<(), AuthError> {
        let previous = self.take_session().await;
        self.events.emit(AuthEvent::SignedOut);

        let Some(session) = previous else {
            return Ok(());
        };
        info!(user_id = %session.user.id, "User signed out");

        self.provider
            .sign_out(&session.access_token)
            .await
            .map_err(|e| {
                warn!(error = %e, "Provider sign-out failed; local session cleared");
                AuthError::from(e)
            })
    }

    /// Forgets the cached and persisted session without contacting the
    /// provider or emitting `SignedOut`.
    pub async fn discard_local_session(&self) {
        if let Some(session) = self.take_session().await {
            info!(user_id = %session.user.id, "Local session discarded");
        }
    }

    /// The cached session, loading the persisted one on first use.
    /// Expired sessions are dropped.
    pub async fn get_session(&self) -> Option<Session> {
        let loaded = self.cache().loaded;
        if !loaded {
            let persisted = self.load_persisted().await;
            let mut cache = self.cache();
            if !cache.loaded {
                cache.loaded = true;
                if cache.session.is_none() {
                    cache.session = persisted;
                }
            }
        }

        let session = self.cache().session.clone();
        match session {
            Some(session) if !session.is_expired() => Some(session),
            Some(_) => {
                debug!("Cached session expired");
                self.cache().session = None;
                self.remove_persisted().await;
                None
            }
            None => None,
        }
    }

    pub async fn current_user(&self) -> Option<AuthUser> {
        self.get_session().await.map(|s| s.user)
    }

    /// Sends the password recovery email.
    pub async fn reset_password(&self, email: &str) -> Result<(), AuthError> {
        self.provider
            .reset_password_for_email(email, self.options.reset_redirect_to.as_deref())
            .await
            .map_err(|e| {
                warn!(email = %email, error = %e, "Password reset request failed");
                AuthError::from(e)
            })?;
        info!(email = %email, "Password reset email requested");
        Ok(())
    }

    /// Changes the password of the session's user.
    pub async fn update_password(&self, new_password: &str) -> Result<(), AuthError> {
        let session = self.get_session().await.ok_or(AuthError::NoSession)?;
        self.provider
            .update_user_password(&session.access_token, new_password)
            .await
            .map_err(|e| {
                warn!(user_id = %session.user.id, error = %e, "Password update failed");
                AuthError::from(e)
            })?;
        self.events.emit(AuthEvent::UserUpdated);
        info!(user_id = %session.user.id, "Password updated");
        Ok(())
    }

    pub async fn resend_confirmation(&self, email: &str) -> Result<(), AuthError> {
        self.provider
            .resend_signup(email, self.options.email_redirect_to.as_deref())
            .await
            .map_err(AuthError::from)
    }

    /// Turns the tokens of a recovery link into the active session.
    pub async fn establish_recovery_session(&self, link: &RecoveryLink) -> Result<(), AuthError> {
        let access_token = link.access_token.clone().ok_or(AuthError::NoSession)?;
        let user = self.provider.get_user(&access_token).await.map_err(|e| {
            warn!(error = %e, "Recovery link token rejected");
            AuthError::from(e)
        })?;

        let session = Session {
            access_token,
            refresh_token: link.refresh_token.clone().unwrap_or_default(),
            expires_at: Utc::now() + Duration::seconds(RECOVERY_SESSION_SECS),
            user,
        };
        info!(user_id = %session.user.id, "Recovery session established");
        self.store_session(session).await;
        self.events.emit(AuthEvent::PasswordRecovery);
        Ok(())
    }

    fn cache(&self) -> MutexGuard<'_, SessionCache> {
        self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    async fn store_session(&self, session: Session) {
        {
            let mut cache = self.cache();
            cache.loaded = true;
            cache.session = Some(session.clone());
        }
        self.persist(&session).await;
    }

    async fn take_session(&self) -> Option<Session> {
        let previous = {
            let mut cache = self.cache();
            cache.loaded = true;
            cache.session.take()
        };
        self.remove_persisted().await;
        previous
    }

    async fn load_persisted(&self) -> Option<Session> {
        let path = self.options.storage_path.as_ref()?;
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to read session file");
                return None;
            }
        };
        match serde_json::from_slice(&bytes) {
            Ok(session) => Some(session),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Ignoring unreadable session file");
                None
            }
        }
    }

    async fn persist(&self, session: &Session) {
        let Some(path) = self.options.storage_path.as_ref() else {
            return;
        };
        let bytes = match serde_json::to_vec(session) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(error = %e, "Failed to serialize session");
                return;
            }
        };
        if let Err(e) = tokio::fs::write(path, bytes).await {
            warn!(path = %path.display(), error = %e, "Failed to write session file");
        }
    }

    async fn remove_persisted(&self) {
        let Some(path) = self.options.storage_path.as_ref() else {
            return;
        };
        match tokio::fs::remove_file(path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %path.display(), error = %e, "Failed to remove session file"),
        }
    }
}
