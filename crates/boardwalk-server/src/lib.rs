//! Boardwalk Server
//!
//! HTTP transport for the board engine. Parses JSON requests into engine
//! inputs, maps engine failures onto status codes and wires up storage
//! and calendar event publishing from configuration.

pub mod config;
pub mod conversions;
pub mod handlers;

use boardwalk_engine::{BoardEngine, EventSettings, WebhookPublisher};
use boardwalk_store::{SqliteStore, StoreError};
use config::ServerConfig;
use handlers::{create_router, AppState, Engine};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Server error
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Database could not be opened
    #[error("Failed to open database: {0}")]
    Store(#[from] StoreError),

    /// Server binding error
    #[error("Failed to bind server: {0}")]
    Bind(#[from] std::io::Error),

    /// Server error
    #[error("Server error: {0}")]
    Server(String),
}

/// Install the global `tracing` subscriber
///
/// `RUST_LOG` takes precedence over the configured filter.
pub fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    // A subscriber installed earlier (e.g. by a test harness) stays in place
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Build the engine described by `config`
pub fn build_engine(config: &ServerConfig) -> Result<Engine, ServerError> {
    config.validate()?;
    let store = SqliteStore::new(&config.database_path)?;
    let engine = BoardEngine::new(store);

    if !config.events.enabled {
        info!("Calendar events disabled, logging only");
        return Ok(engine);
    }

    info!(
        endpoint = %config.events.endpoint,
        topic = %config.events.topic,
        "Calendar events enabled"
    );
    let settings = EventSettings {
        topic: config.events.topic.clone(),
        timeout: config.events.timeout(),
    };
    Ok(engine.with_publisher(
        Arc::new(WebhookPublisher::new(config.events.endpoint.clone())),
        settings,
    ))
}

/// Start the HTTP server
///
/// Opens the database, builds the engine and serves until Ctrl-C.
pub async fn start_server(config: ServerConfig) -> Result<(), ServerError> {
    init_tracing(&config.log_filter);

    info!("Starting Boardwalk");
    info!("Bind address: {}", config.bind_addr());
    info!("Database: {}", config.database_path);

    let engine = build_engine(&config)?;
    let app = create_router(AppState { engine });

    let listener = TcpListener::bind(&config.bind_addr()).await?;
    info!("Boardwalk listening on {}", config.bind_addr());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ServerError::Server(e.to_string()))?;

    info!("Boardwalk stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_engine_rejects_invalid_config() {
        let mut config = ServerConfig::default_test_config();
        config.events.enabled = true;
        config.events.endpoint = String::new();
        assert!(matches!(build_engine(&config), Err(ServerError::Config(_))));
    }

    #[tokio::test]
    async fn test_build_engine_with_events() {
        let mut config = ServerConfig::default_test_config();
        config.events.enabled = true;
        let engine = build_engine(&config).unwrap();
        assert!(engine.list_boards("alice").await.unwrap().is_empty());
    }
}
