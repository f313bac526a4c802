//! Onboarding portal core.
//!
//! Authentication through a hosted identity provider, the A2P registration
//! form and the status dashboard, driven by a single [`PortalController`].

pub mod config;
pub mod controller;
pub mod error;
pub mod form;
pub mod logging;
pub mod services;

pub use controller::{AuthNotice, PortalContext, PortalController};
pub use error::{PortalError, PortalResult};
pub use form::OnboardingForm;
