//! Sprout API Server
//!
//! Main entry point for the Sprout event-processing service.

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sprout_api::{AppState, create_router};
use sprout_db::connect;
use sprout_processor::{EventProcessor, RulesCache};
use sprout_shared::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sprout=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::load().expect("Failed to load configuration");

    // Connect to database
    let db = connect(&config.database).await?;
    info!("Connected to database");

    // Create the rules cache and event processor
    let cache = RulesCache::with_config(config.cache.rules_capacity, config.cache.rules_ttl_secs);
    let processor = EventProcessor::new(db, cache);
    info!(
        rules_ttl_secs = config.cache.rules_ttl_secs,
        "Event processor ready"
    );

    // Create application state
    let state = AppState {
        processor: Arc::new(processor),
    };

    // Create router
    let app = create_router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
