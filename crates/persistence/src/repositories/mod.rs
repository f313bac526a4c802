//! Repository implementations for database operations.

pub mod a2p_submission;
pub mod activity;
pub mod client;
pub mod system_status;

pub use a2p_submission::A2PSubmissionRepository;
pub use activity::ActivityRepository;
pub use client::ClientRepository;
pub use system_status::SystemStatusRepository;
