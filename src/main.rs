//! # API Edge
//!
//! Request-edge server for a chat platform API.
//!
//! This is the application entry point that initializes:
//! - Tracing/logging subsystem
//! - Configuration loading
//! - Snowflake generator and rate limiter
//! - HTTP server

use anyhow::Result;
use tracing::info;

use api_edge::config::Settings;
use api_edge::startup::Application;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber for structured logging
    api_edge::telemetry::init_tracing();

    info!("Starting API edge...");

    // Load configuration from environment and config files
    let settings = Settings::load()?;
    info!(
        host = %settings.server.host,
        port = %settings.server.port,
        environment = %settings.environment,
        "Configuration loaded"
    );

    // Build and run the application
    let application = Application::build(settings).await?;

    info!("Server ready to accept connections");
    application.run_until_stopped().await?;

    Ok(())
}
