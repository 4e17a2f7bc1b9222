//! Application Startup
//!
//! Application building and server initialization.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::Router;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::config::Settings;
use crate::infrastructure::cache::RateLimiter;
use crate::presentation::http::{handlers, routes};
use crate::presentation::middleware::{cors, logging, ClientKeyExtractor, KeyExtractor};
use crate::shared::clock::{Clock, SystemClock};
use crate::shared::codec::{Codec, JsonCodec};
use crate::shared::snowflake::SnowflakeGenerator;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub snowflake: Arc<SnowflakeGenerator>,
    pub rate_limiter: Arc<RateLimiter>,
    pub key_extractor: Arc<dyn KeyExtractor>,
    pub codec: Arc<dyn Codec>,
    pub settings: Arc<Settings>,
}

impl AppState {
    /// State backed by the system clock and the JSON codec
    pub fn from_settings(settings: Settings) -> Self {
        Self::with_clock(settings, Arc::new(SystemClock))
    }

    /// State whose generator and limiter read time from `clock`
    pub fn with_clock(settings: Settings, clock: Arc<dyn Clock>) -> Self {
        let snowflake = SnowflakeGenerator::from_settings(&settings.snowflake, clock.clone());
        let rate_limiter = RateLimiter::from_settings(&settings.rate_limit, clock);

        Self {
            snowflake: Arc::new(snowflake),
            rate_limiter: Arc::new(rate_limiter),
            key_extractor: Arc::new(ClientKeyExtractor::new(settings.rate_limit.trust_proxy)),
            codec: Arc::new(JsonCodec),
            settings: Arc::new(settings),
        }
    }

    /// Replace the response codec
    pub fn with_codec(mut self, codec: Arc<dyn Codec>) -> Self {
        self.codec = codec;
        self
    }

    /// Replace the client identity strategy
    pub fn with_key_extractor(mut self, key_extractor: Arc<dyn KeyExtractor>) -> Self {
        self.key_extractor = key_extractor;
        self
    }
}

/// Application instance
pub struct Application {
    listener: TcpListener,
    router: Router,
    sweeper: JoinHandle<()>,
}

impl Application {
    /// Build the application from settings, without resource routes
    pub async fn build(settings: Settings) -> Result<Self> {
        Self::build_with(AppState::from_settings(settings), Router::new()).await
    }

    /// Build the application around prepared state and resource routes
    pub async fn build_with(state: AppState, resources: Router<AppState>) -> Result<Self> {
        handlers::health::init_server_start();

        let settings = state.settings.clone();
        let sweep_interval = Duration::from_secs(settings.rate_limit.sweep_interval_secs.max(1));
        let sweeper = state.rate_limiter.spawn_sweeper(sweep_interval);
        tracing::info!(
            worker_id = state.snowflake.worker_id(),
            process_id = state.snowflake.process_id(),
            rate_limit_enabled = settings.rate_limit.enabled,
            "Application state initialized"
        );

        // Build router with middleware
        let router = routes::create_router(state, resources)
            .layer(logging::create_trace_layer())
            .layer(cors::create_cors_layer(&settings.cors));

        // Bind to address
        let listener = TcpListener::bind(settings.server_addr()).await?;
        tracing::info!("Listening on {}", listener.local_addr()?);

        Ok(Self { listener, router, sweeper })
    }

    /// Run the server until stopped
    pub async fn run_until_stopped(self) -> Result<()> {
        let service = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(self.listener, service)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        self.sweeper.abort();
        tracing::info!("Server stopped");
        Ok(())
    }

    /// Get the bound address
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
