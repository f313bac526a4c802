//! Portal services.

pub mod gotrue;
pub mod record_store;
pub mod session_gateway;

pub use gotrue::GoTrueClient;
pub use record_store::RecordStore;
pub use session_gateway::{
    AuthOutcome, AuthSubscription, GatewayOptions, SessionGateway, SignUpRequest,
};
