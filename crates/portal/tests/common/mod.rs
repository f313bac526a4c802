//! Shared fixtures for portal flow tests.

#![allow(dead_code)]

use std::sync::Arc;

use domain::services::{InMemoryPortalStore, MockIdentityProvider};
use fake::faker::internet::en::SafeEmail;
use fake::Fake;
use onboarding_portal::services::{GatewayOptions, RecordStore, SessionGateway};
use onboarding_portal::{PortalContext, PortalController};

pub const APP_URL: &str = "http://localhost:3000/";

/// A controller wired to in-memory collaborators the test can inspect.
pub struct TestPortal {
    pub provider: Arc<MockIdentityProvider>,
    pub store: Arc<InMemoryPortalStore>,
    pub controller: PortalController,
}

pub fn portal_with(provider: MockIdentityProvider, options: GatewayOptions) -> TestPortal {
    let provider = Arc::new(provider);
    let store = Arc::new(InMemoryPortalStore::new());
    let records = RecordStore::new(store.clone());
    let gateway = SessionGateway::new(provider.clone(), records.clone(), options);
    let controller = PortalController::new(PortalContext::new(gateway, records))
        .expect("fresh gateway has no subscriber");
    TestPortal {
        provider,
        store,
        controller,
    }
}

pub fn portal() -> TestPortal {
    portal_with(MockIdentityProvider::new(), GatewayOptions::default())
}

pub fn random_email() -> String {
    SafeEmail().fake()
}

pub fn session_file() -> std::path::PathBuf {
    std::env::temp_dir().join(format!("portal-flow-{}.json", uuid::Uuid::new_v4()))
}

/// Recovery redirect the identity provider would send for these tokens.
pub fn recovery_location(access_token: &str, refresh_token: &str) -> String {
    format!(
        "{}#access_token={}&refresh_token={}&expires_in=3600&type=recovery",
        APP_URL, access_token, refresh_token
    )
}
