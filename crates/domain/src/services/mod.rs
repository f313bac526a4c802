//! Domain services for the onboarding portal.
//!
//! Boundary traits for the external collaborators plus the pure navigation
//! state machine.

pub mod identity;
pub mod navigation;
pub mod store;

pub use identity::{
    IdentityProvider, MockIdentityProvider, ProviderAuthResponse, ProviderError, SignUpParams,
};
pub use navigation::{transition, AppView, NavEvent, NavigationState};
pub use store::{InMemoryPortalStore, PortalStore, StoreError};
