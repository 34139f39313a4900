//! Feedback API - accepts user feedback over HTTP
//!
//! This application validates and normalizes feedback submissions arriving
//! in either of two JSON shapes and stores them in PostgreSQL.

use std::sync::Arc;

use feedback_api::{api, config, logging, Result};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration from environment
    let config = Arc::new(config::Config::from_env()?);

    // Validate configuration
    config.validate()?;

    // Initialize logging/tracing
    logging::init_tracing(&config.server.log_level, &config.server.environment)?;

    // Log configuration (with sensitive data masked)
    config.log_config();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting feedback API");

    api::server::create_server(config).await?;

    tracing::info!("Feedback API shutdown complete");
    Ok(())
}
