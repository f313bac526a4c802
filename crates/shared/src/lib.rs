//! Shared utilities and common types for the onboarding portal.
//!
//! This crate provides common functionality used across all other crates:
//! - Common validation logic (required fields, password rules)
//! - Recovery-link detection for the start location

pub mod recovery;
pub mod validation;
