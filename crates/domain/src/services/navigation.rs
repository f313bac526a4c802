//! Navigation state machine.
//!
//! The portal shows exactly one view at a time. `transition` is a pure
//! function of the current state and an event; the portal controller feeds it
//! events from the user and from the session gateway and performs the side
//! effects (data refresh, draft discard) around it.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// The views of the portal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppView {
    Auth,
    Intro,
    Dashboard,
    Form,
    Confirmation,
    ResetPassword,
}

impl AppView {
    pub const ALL: [AppView; 6] = [
        AppView::Auth,
        AppView::Intro,
        AppView::Dashboard,
        AppView::Form,
        AppView::Confirmation,
        AppView::ResetPassword,
    ];

    /// Views reachable without an authenticated identity.
    pub fn is_public(&self) -> bool {
        matches!(self, AppView::Auth | AppView::ResetPassword)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AppView::Auth => "auth",
            AppView::Intro => "intro",
            AppView::Dashboard => "dashboard",
            AppView::Form => "form",
            AppView::Confirmation => "confirmation",
            AppView::ResetPassword => "reset_password",
        }
    }
}

impl fmt::Display for AppView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Inputs to the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavEvent {
    /// The start location is a password recovery link.
    RecoveryLinkDetected,
    /// A cached session was found at start.
    SessionRestored(Uuid),
    /// No cached session was found at start.
    NoSession,
    /// The gateway reported a password recovery session.
    PasswordRecovery,
    /// The gateway reported a sign-out.
    SignedOut,
    /// Sign-in or sign-up produced a session.
    Authenticated(Uuid),
    IntroFinished,
    StartRegistration,
    SubmissionSucceeded,
    Back,
    Return,
    PasswordUpdated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationState {
    pub view: AppView,
    pub identity: Option<Uuid>,
    pub loading_complete: bool,
}

impl Default for NavigationState {
    fn default() -> Self {
        Self::initial()
    }
}

impl NavigationState {
    /// State before the initial session check resolves.
    pub fn initial() -> Self {
        Self {
            view: AppView::Auth,
            identity: None,
            loading_complete: false,
        }
    }

    pub fn is_loading(&self) -> bool {
        !self.loading_complete
    }
}

/// Applies an event, then the protected-route check.
///
/// Events that are not valid in the current view leave the state unchanged.
pub fn transition(state: &NavigationState, event: NavEvent) -> NavigationState {
    enforce_protected_route(apply(state, event))
}

fn apply(state: &NavigationState, event: NavEvent) -> NavigationState {
    let mut next = *state;
    match (state.view, event) {
        (_, NavEvent::RecoveryLinkDetected) | (_, NavEvent::PasswordRecovery) => {
            next.view = AppView::ResetPassword;
            next.loading_complete = true;
        }
        (_, NavEvent::SessionRestored(id)) => {
            next.identity = Some(id);
            next.view = AppView::Dashboard;
            next.loading_complete = true;
        }
        (_, NavEvent::NoSession) => {
            next.loading_complete = true;
        }
        (_, NavEvent::SignedOut) => {
            next.identity = None;
            next.view = AppView::Auth;
        }
        (AppView::Auth, NavEvent::Authenticated(id)) => {
            next.identity = Some(id);
            next.view = AppView::Intro;
        }
        (AppView::Intro, NavEvent::IntroFinished)
        | (AppView::Form, NavEvent::Back)
        | (AppView::Confirmation, NavEvent::Return) => {
            next.view = AppView::Dashboard;
        }
        (AppView::Dashboard, NavEvent::StartRegistration) => {
            next.view = AppView::Form;
        }
        (AppView::Form, NavEvent::SubmissionSucceeded) => {
            next.view = AppView::Confirmation;
        }
        (AppView::ResetPassword, NavEvent::PasswordUpdated) => {
            next.identity = None;
            next.view = AppView::Auth;
        }
        _ => {}
    }
    next
}

/// Forces the auth view once loading is done and no identity is present.
pub fn enforce_protected_route(state: NavigationState) -> NavigationState {
    if state.loading_complete && state.identity.is_none() && !state.view.is_public() {
        NavigationState {
            view: AppView::Auth,
            ..state
        }
    } else {
        state
    }
}

/// True when the move from `prev` to `next` lands on the dashboard with a
/// known identity, which calls for a portal data refresh.
pub fn needs_refresh(prev: &NavigationState, next: &NavigationState) -> bool {
    next.view == AppView::Dashboard
        && next.identity.is_some()
        && (prev.view != AppView::Dashboard || prev.identity != next.identity)
}

/// True when the form is left for anything but the confirmation view.
pub fn discards_draft(prev: &NavigationState, next: &NavigationState) -> bool {
    prev.view == AppView::Form && !matches!(next.view, AppView::Form | AppView::Confirmation)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(view: AppView, identity: Option<Uuid>) -> NavigationState {
        NavigationState {
            view,
            identity,
            loading_complete: true,
        }
    }

    fn all_events(id: Uuid) -> Vec<NavEvent> {
        vec![
            NavEvent::RecoveryLinkDetected,
            NavEvent::SessionRestored(id),
            NavEvent::NoSession,
            NavEvent::PasswordRecovery,
            NavEvent::SignedOut,
            NavEvent::Authenticated(id),
            NavEvent::IntroFinished,
            NavEvent::StartRegistration,
            NavEvent::SubmissionSucceeded,
            NavEvent::Back,
            NavEvent::Return,
            NavEvent::PasswordUpdated,
        ]
    }

    fn assert_protected(state: &NavigationState) {
        if state.loading_complete && state.identity.is_none() {
            assert!(state.view.is_public(), "unprotected state {:?}", state);
        }
    }

    #[test]
    fn test_initial_state_is_loading() {
        let state = NavigationState::initial();
        assert!(state.is_loading());
        assert_eq!(state.view, AppView::Auth);
        assert_eq!(state.identity, None);
    }

    #[test]
    fn test_start_without_session() {
        let state = transition(&NavigationState::initial(), NavEvent::NoSession);
        assert_eq!(state, at(AppView::Auth, None));
    }

    #[test]
    fn test_start_with_session() {
        let id = Uuid::new_v4();
        let state = transition(&NavigationState::initial(), NavEvent::SessionRestored(id));
        assert_eq!(state, at(AppView::Dashboard, Some(id)));
    }

    #[test]
    fn test_recovery_link_at_start() {
        let state = transition(&NavigationState::initial(), NavEvent::RecoveryLinkDetected);
        assert_eq!(state, at(AppView::ResetPassword, None));
    }

    #[test]
    fn test_happy_path() {
        let id = Uuid::new_v4();
        let mut state = transition(&NavigationState::initial(), NavEvent::NoSession);
        let expected = [
            (NavEvent::Authenticated(id), AppView::Intro),
            (NavEvent::IntroFinished, AppView::Dashboard),
            (NavEvent::StartRegistration, AppView::Form),
            (NavEvent::SubmissionSucceeded, AppView::Confirmation),
            (NavEvent::Return, AppView::Dashboard),
        ];
        for (event, view) in expected {
            state = transition(&state, event);
            assert_eq!(state.view, view, "after {:?}", event);
            assert_eq!(state.identity, Some(id));
        }
    }

    #[test]
    fn test_back_from_form() {
        let id = Uuid::new_v4();
        let state = transition(&at(AppView::Form, Some(id)), NavEvent::Back);
        assert_eq!(state.view, AppView::Dashboard);
    }

    #[test]
    fn test_events_invalid_in_current_view_are_ignored() {
        let id = Uuid::new_v4();
        let dashboard = at(AppView::Dashboard, Some(id));
        for event in [
            NavEvent::Authenticated(Uuid::new_v4()),
            NavEvent::IntroFinished,
            NavEvent::SubmissionSucceeded,
            NavEvent::Back,
            NavEvent::Return,
            NavEvent::PasswordUpdated,
        ] {
            assert_eq!(transition(&dashboard, event), dashboard, "{:?}", event);
        }
    }

    #[test]
    fn test_password_recovery_from_any_view() {
        let id = Uuid::new_v4();
        for view in AppView::ALL {
            let state = transition(&at(view, Some(id)), NavEvent::PasswordRecovery);
            assert_eq!(state.view, AppView::ResetPassword);
        }
    }

    #[test]
    fn test_signed_out_from_any_view() {
        let id = Uuid::new_v4();
        for view in AppView::ALL {
            let state = transition(&at(view, Some(id)), NavEvent::SignedOut);
            assert_eq!(state, at(AppView::Auth, None));
        }
    }

    #[test]
    fn test_password_updated_returns_to_auth() {
        let id = Uuid::new_v4();
        let state = transition(&at(AppView::ResetPassword, Some(id)), NavEvent::PasswordUpdated);
        assert_eq!(state, at(AppView::Auth, None));
    }

    #[test]
    fn test_protected_route_forces_auth() {
        for view in AppView::ALL {
            let forced = enforce_protected_route(at(view, None));
            if view.is_public() {
                assert_eq!(forced.view, view);
            } else {
                assert_eq!(forced.view, AppView::Auth);
            }
        }
        // Not enforced while loading.
        let loading = NavigationState {
            view: AppView::Dashboard,
            identity: None,
            loading_complete: false,
        };
        assert_eq!(enforce_protected_route(loading), loading);
    }

    #[test]
    fn test_protected_route_holds_for_all_short_sequences() {
        let id = Uuid::new_v4();
        let events = all_events(id);

        let mut frontier = vec![NavigationState::initial()];
        for _ in 0..4 {
            let mut next_frontier = Vec::new();
            for state in &frontier {
                for event in &events {
                    let next = transition(state, *event);
                    assert_protected(&next);
                    if !next_frontier.contains(&next) {
                        next_frontier.push(next);
                    }
                }
            }
            frontier = next_frontier;
        }
    }

    #[test]
    fn test_needs_refresh() {
        let id = Uuid::new_v4();
        let intro = at(AppView::Intro, Some(id));
        let dashboard = at(AppView::Dashboard, Some(id));
        assert!(needs_refresh(&intro, &dashboard));
        assert!(needs_refresh(&NavigationState::initial(), &dashboard));
        assert!(!needs_refresh(&dashboard, &dashboard));
        assert!(!needs_refresh(&dashboard, &at(AppView::Form, Some(id))));
    }

    #[test]
    fn test_discards_draft() {
        let id = Uuid::new_v4();
        let form = at(AppView::Form, Some(id));
        assert!(discards_draft(&form, &at(AppView::Dashboard, Some(id))));
        assert!(discards_draft(&form, &at(AppView::Auth, None)));
        assert!(!discards_draft(&form, &at(AppView::Confirmation, Some(id))));
        assert!(!discards_draft(&form, &form));
    }
}
