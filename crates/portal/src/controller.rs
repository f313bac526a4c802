//! Portal controller.
//!
//! Owns the portal context and the navigation state, feeds user actions and
//! auth events through the transition function and performs the side effects
//! around each transition: portal data refresh on landing in the dashboard
//! and draft discard when the form is left.

use std::sync::Arc;

use domain::models::{
    A2PSubmission, ActivityLogEntry, AuthEvent, ClientProfile, ClientProfileUpdate,
    DashboardSummary, PortalUserData,
};
use domain::services::identity::IdentityProvider;
use domain::services::navigation::{discards_draft, needs_refresh, transition};
use domain::services::{AppView, NavEvent, NavigationState, PortalStore};
use shared::recovery::RecoveryLink;
use shared::validation::{validate_passwords_match, validate_password_length, validate_required};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::error::{AuthError, PortalError, PortalResult, ValidationError};
use crate::form::OnboardingForm;
use crate::services::record_store::RecordStore;
use crate::services::session_gateway::{
    AuthSubscription, GatewayOptions, SessionGateway, SignUpRequest,
};

/// The collaborators shared by every view. One per process.
pub struct PortalContext {
    pub gateway: SessionGateway,
    pub records: RecordStore,
}

impl PortalContext {
    pub fn new(gateway: SessionGateway, records: RecordStore) -> Self {
        Self { gateway, records }
    }

    /// Wires the gateway and record store from configuration.
    pub fn from_config(
        config: &Config,
        provider: Arc<dyn IdentityProvider>,
        store: Arc<dyn PortalStore>,
    ) -> Self {
        let records =
            RecordStore::new(store).with_history_limit(config.portal.activity_history_limit);
        let options = GatewayOptions {
            email_redirect_to: config.identity.redirect_url.clone(),
            reset_redirect_to: config.identity.reset_redirect_url.clone(),
            storage_path: config.session.storage_path.clone(),
        };
        let gateway = SessionGateway::new(provider, records.clone(), options);
        Self { gateway, records }
    }
}

/// Informational messages shown on the auth screens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthNotice {
    /// Sign-up succeeded but the account needs email confirmation first.
    ConfirmationEmailSent(String),
    ConfirmationEmailResent(String),
    PasswordResetEmailSent(String),
    PasswordUpdated,
}

impl AuthNotice {
    pub fn message(&self) -> String {
        match self {
            AuthNotice::ConfirmationEmailSent(email) => format!(
                "Check {} for a confirmation link to finish creating your account.",
                email
            ),
            AuthNotice::ConfirmationEmailResent(email) => {
                format!("Confirmation email sent again to {}.", email)
            }
            AuthNotice::PasswordResetEmailSent(email) => {
                format!("Password reset instructions sent to {}.", email)
            }
            AuthNotice::PasswordUpdated => {
                "Password updated. Please sign in with your new password.".to_string()
            }
        }
    }
}

pub struct PortalController {
    context: PortalContext,
    state: NavigationState,
    subscription: Option<AuthSubscription>,
    user_data: Option<PortalUserData>,
    form: Option<OnboardingForm>,
    notice: Option<AuthNotice>,
}

impl PortalController {
    /// Takes the gateway's auth subscription for the controller's lifetime.
    pub fn new(context: PortalContext) -> Result<Self, AuthError> {
        let subscription = context.gateway.subscribe()?;
        Ok(Self {
            context,
            state: NavigationState::initial(),
            subscription: Some(subscription),
            user_data: None,
            form: None,
            notice: None,
        })
    }

    pub fn context(&self) -> &PortalContext {
        &self.context
    }

    pub fn state(&self) -> NavigationState {
        self.state
    }

    /// Current view. Meaningless while `is_loading` is true.
    pub fn view(&self) -> AppView {
        self.state.view
    }

    pub fn is_loading(&self) -> bool {
        self.state.is_loading()
    }

    pub fn identity(&self) -> Option<Uuid> {
        self.state.identity
    }

    pub fn user_data(&self) -> Option<&PortalUserData> {
        self.user_data.as_ref()
    }

    pub fn dashboard_summary(&self) -> Option<DashboardSummary> {
        self.user_data.as_ref().map(DashboardSummary::from_user_data)
    }

    pub fn form(&self) -> Option<&OnboardingForm> {
        self.form.as_ref()
    }

    pub fn form_mut(&mut self) -> Option<&mut OnboardingForm> {
        self.form.as_mut()
    }

    pub fn notice(&self) -> Option<&AuthNotice> {
        self.notice.as_ref()
    }

    /// Resolves the initial view from the start location and the cached session.
    pub async fn start(&mut self, location: &str) -> PortalResult<()> {
        let recovery = match RecoveryLink::parse(location) {
            Ok(link) => link,
            Err(e) => {
                debug!(location = %location, error = %e, "Start location not parsed");
                None
            }
        };

        if let Some(link) = recovery {
            info!("Password recovery link detected");
            self.apply(NavEvent::RecoveryLinkDetected).await;
            // Only a session from the link itself may change the password.
            self.context.gateway.discard_local_session().await;
            if link.access_token.is_some() {
                if let Err(e) = self.context.gateway.establish_recovery_session(&link).await {
                    warn!(error = %e, "Failed to establish recovery session");
                }
            }
            self.pump_auth_events().await;
            return Ok(());
        }

        match self.context.gateway.get_session().await {
            Some(session) => {
                let user = session.user;
                if let Err(e) = self
                    .context
                    .records
                    .ensure_client_profile(user.id, &user.email)
                    .await
                {
                    warn!(user_id = %user.id, error = %e, "Client provisioning failed at start");
                }
                self.apply(NavEvent::SessionRestored(user.id)).await;
            }
            None => self.apply(NavEvent::NoSession).await,
        }
        Ok(())
    }

    /// Applies every pending auth event. Returns how many were drained.
    pub async fn pump_auth_events(&mut self) -> usize {
        let mut events = Vec::new();
        if let Some(subscription) = self.subscription.as_mut() {
            while let Some(event) = subscription.try_next() {
                events.push(event);
            }
        }

        for event in &events {
            match event {
                AuthEvent::PasswordRecovery => self.apply(NavEvent::PasswordRecovery).await,
                AuthEvent::SignedOut => self.apply(NavEvent::SignedOut).await,
                AuthEvent::SignedIn | AuthEvent::UserUpdated => {
                    debug!(event = %event, "Auth event handled by the originating action")
                }
            }
        }
        events.len()
    }

    pub async fn sign_in(&mut self, email: &str, password: &str) -> PortalResult<()> {
        self.expect_view(AppView::Auth)?;
        validate_required(email).map_err(ValidationError::from)?;
        validate_required(password).map_err(ValidationError::from)?;
        self.notice = None;

        let outcome = self.context.gateway.sign_in(email, password).await?;
        self.apply(NavEvent::Authenticated(outcome.user.id)).await;
        self.pump_auth_events().await;
        Ok(())
    }

    /// Creates the account. Without a session (email confirmation pending)
    /// the view stays on auth with a notice.
    pub async fn sign_up(&mut self, request: SignUpRequest) -> PortalResult<()> {
        self.expect_view(AppView::Auth)?;
        validate_required(&request.email).map_err(ValidationError::from)?;
        validate_required(&request.password).map_err(ValidationError::from)?;
        self.notice = None;

        let email = request.email.clone();
        let outcome = self.context.gateway.sign_up(request).await?;
        match outcome.session {
            Some(_) => self.apply(NavEvent::Authenticated(outcome.user.id)).await,
            None => self.notice = Some(AuthNotice::ConfirmationEmailSent(email)),
        }
        self.pump_auth_events().await;
        Ok(())
    }

    pub async fn finish_intro(&mut self) -> PortalResult<()> {
        self.expect_view(AppView::Intro)?;
        self.apply(NavEvent::IntroFinished).await;
        Ok(())
    }

    /// Opens a fresh registration form.
    pub async fn start_registration(&mut self) -> PortalResult<()> {
        self.expect_view(AppView::Dashboard)?;
        self.form = Some(OnboardingForm::new());
        self.apply(NavEvent::StartRegistration).await;
        Ok(())
    }

    /// Leaves the form for the dashboard, discarding the draft.
    pub async fn back(&mut self) -> PortalResult<()> {
        self.expect_view(AppView::Form)?;
        self.apply(NavEvent::Back).await;
        Ok(())
    }

    pub async fn submit_form(&mut self) -> PortalResult<A2PSubmission> {
        self.expect_view(AppView::Form)?;
        let form = self
            .form
            .as_mut()
            .ok_or(PortalError::InvalidView(self.state.view))?;
        let stored = form
            .submit(&self.context.records, self.state.identity)
            .await?;

        self.apply(NavEvent::SubmissionSucceeded).await;
        self.form = None;
        self.refresh().await;
        Ok(stored)
    }

    pub async fn return_to_dashboard(&mut self) -> PortalResult<()> {
        self.expect_view(AppView::Confirmation)?;
        self.apply(NavEvent::Return).await;
        Ok(())
    }

    /// Sets a new password from the reset view, then signs out.
    pub async fn update_password(&mut self, new_password: &str, confirmation: &str) -> PortalResult<()> {
        self.expect_view(AppView::ResetPassword)?;
        validate_password_length(new_password).map_err(ValidationError::from)?;
        validate_passwords_match(new_password, confirmation).map_err(ValidationError::from)?;

        self.context.gateway.update_password(new_password).await?;
        if let Err(e) = self.context.gateway.sign_out().await {
            warn!(error = %e, "Sign-out after password update failed");
        }
        self.apply(NavEvent::PasswordUpdated).await;
        self.pump_auth_events().await;
        self.notice = Some(AuthNotice::PasswordUpdated);
        Ok(())
    }

    pub async fn request_password_reset(&mut self, email: &str) -> PortalResult<()> {
        validate_required(email).map_err(ValidationError::from)?;
        self.context.gateway.reset_password(email).await?;
        self.notice = Some(AuthNotice::PasswordResetEmailSent(email.to_string()));
        Ok(())
    }

    pub async fn resend_confirmation(&mut self, email: &str) -> PortalResult<()> {
        validate_required(email).map_err(ValidationError::from)?;
        self.context.gateway.resend_confirmation(email).await?;
        self.notice = Some(AuthNotice::ConfirmationEmailResent(email.to_string()));
        Ok(())
    }

    /// Signs out. The view moves to auth even when the provider call fails.
    pub async fn sign_out(&mut self) -> PortalResult<()> {
        let result = self.context.gateway.sign_out().await;
        self.apply(NavEvent::SignedOut).await;
        self.pump_auth_events().await;
        result.map_err(PortalError::from)
    }

    /// Updates the signed-in client's profile and the cached copy.
    pub async fn update_profile(&mut self, update: ClientProfileUpdate) -> PortalResult<ClientProfile> {
        let id = self.state.identity.ok_or(AuthError::NoSession)?;
        let client = self.context.records.update_client_profile(id, &update).await?;
        if let Some(data) = self.user_data.as_mut() {
            data.client = client.clone();
        }
        Ok(client)
    }

    /// Recent activity of the signed-in client, newest first.
    pub async fn activity_history(&self, limit: Option<i64>) -> Vec<ActivityLogEntry> {
        match self.state.identity {
            Some(id) => self.context.records.activity_history(id, limit).await,
            None => Vec::new(),
        }
    }

    /// Reloads the portal data of the signed-in client. A failed fetch keeps
    /// the cached copy.
    pub async fn refresh(&mut self) {
        let Some(id) = self.state.identity else {
            return;
        };
        if let Some(data) = self.context.records.fetch_portal_user_data(id).await {
            self.merge_user_data(data);
        }
    }

    /// Releases the auth subscription.
    pub fn shutdown(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
            debug!("Auth subscription released");
        }
    }

    fn expect_view(&self, view: AppView) -> PortalResult<()> {
        if self.state.view == view && !self.state.is_loading() {
            Ok(())
        } else {
            Err(PortalError::InvalidView(self.state.view))
        }
    }

    async fn apply(&mut self, event: NavEvent) {
        let prev = self.state;
        let next = transition(&prev, event);
        self.state = next;

        if prev.view != next.view {
            debug!(from = %prev.view, to = %next.view, event = ?event, "View transition");
        }
        if discards_draft(&prev, &next) {
            self.form = None;
        }
        if next.identity.is_none() {
            self.user_data = None;
        }
        if needs_refresh(&prev, &next) {
            self.refresh().await;
        }
    }

    fn merge_user_data(&mut self, mut data: PortalUserData) {
        if let Some(cached) = self
            .user_data
            .as_ref()
            .filter(|cached| cached.client.id == data.client.id)
        {
            let cached_phase = cached.current_phase();
            if data.current_phase() < cached_phase {
                warn!(
                    client_id = %data.client.id,
                    cached_phase = cached_phase.number(),
                    observed_phase = data.current_phase().number(),
                    "Observed phase is behind the cached phase; keeping cached phase"
                );
                match data.system_status.as_mut() {
                    Some(status) => status.current_phase = cached_phase,
                    None => data.system_status = cached.system_status.clone(),
                }
            }
        }
        self.user_data = Some(data);
    }
}
