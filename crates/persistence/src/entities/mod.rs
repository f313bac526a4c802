//! Database entity definitions.
//!
//! Entities map directly to database rows and are converted to domain models.

pub mod a2p_submission;
pub mod activity;
pub mod client;
pub mod system_status;

pub use a2p_submission::{A2PSubmissionEntity, A2P_SUBMISSION_COLUMNS};
pub use activity::ActivityEntity;
pub use client::ClientEntity;
pub use system_status::SystemStatusEntity;
