use std::sync::Arc;

use anyhow::Result;
use domain::services::{IdentityProvider, InMemoryPortalStore, MockIdentityProvider, PortalStore};
use onboarding_portal::config::Config;
use onboarding_portal::logging::init_logging;
use onboarding_portal::services::GoTrueClient;
use onboarding_portal::{PortalContext, PortalController};
use persistence::PgPortalStore;
use tracing::info;

const DEFAULT_LOCATION: &str = "http://localhost:3000/";

/// Resolves the portal's start view for a location and prints the result.
///
/// Usage: `onboarding-portal [--mock] [location]`
#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let use_mocks = args.iter().any(|a| a == "--mock");
    let location = args
        .iter()
        .find(|a| !a.starts_with("--"))
        .map(String::as_str)
        .unwrap_or(DEFAULT_LOCATION);

    let config = Config::load()?;
    init_logging(&config.logging)?;

    info!("Starting onboarding portal v{}", env!("CARGO_PKG_VERSION"));

    let (provider, store): (Arc<dyn IdentityProvider>, Arc<dyn PortalStore>) = if use_mocks {
        info!("Using in-memory identity provider and store");
        (
            Arc::new(MockIdentityProvider::new()),
            Arc::new(InMemoryPortalStore::new()),
        )
    } else {
        let pool = persistence::db::create_pool(&(&config.database).into()).await?;

        info!("Running database migrations...");
        persistence::db::run_migrations(&pool).await?;
        info!("Migrations completed");

        (
            Arc::new(GoTrueClient::new(&config.identity)?),
            Arc::new(PgPortalStore::new(pool)),
        )
    };

    let context = PortalContext::from_config(&config, provider, store);
    let mut controller = PortalController::new(context)?;
    controller.start(location).await?;
    controller.pump_auth_events().await;

    info!(
        view = %controller.view(),
        identity = ?controller.identity(),
        "Portal ready"
    );
    println!("{}", serde_json::to_string_pretty(&controller.state())?);
    if let Some(summary) = controller.dashboard_summary() {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }

    controller.shutdown();
    Ok(())
}
