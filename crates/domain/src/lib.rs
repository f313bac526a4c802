//! Domain layer for the onboarding portal.
//!
//! This crate contains:
//! - Domain models (ClientProfile, SystemStatus, A2PSubmission, FormDraft)
//! - The navigation state machine as a pure transition function
//! - Boundary traits for the identity provider and the data store

pub mod models;
pub mod services;
