//! seatbook server entry point.
//!
//! Starts the Axum HTTP server with REST and WebSocket endpoints.

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use seatbook::api;
use seatbook::app_state::AppState;
use seatbook::config::{LogFormat, ServiceConfig};
use seatbook::domain::EventBus;
use seatbook::inventory::InventoryStore;
use seatbook::notify::spawn_ticket_dispatcher;
use seatbook::persistence::{MemoryBackend, PersistenceBackend, PostgresBackend};
use seatbook::service::BookingService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = ServiceConfig::from_env().context("invalid LISTEN_ADDR")?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init(),
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
    tracing::info!(addr = %config.listen_addr, "starting seatbook");

    // Select the persistence backend
    let backend: Arc<dyn PersistenceBackend> = if config.persistence_enabled {
        let postgres = PostgresBackend::connect(&config)
            .await
            .context("connecting to PostgreSQL")?;
        postgres.migrate().await.context("running migrations")?;
        tracing::info!("persistence: postgres");
        Arc::new(postgres)
    } else {
        tracing::info!("persistence: in-memory");
        Arc::new(MemoryBackend::new())
    };

    // Rebuild live state from the ledger
    let store = Arc::new(
        InventoryStore::recover(backend)
            .await
            .context("recovering inventory")?,
    );

    // Build service layer
    let event_bus = EventBus::new(config.event_bus_capacity);
    let dispatcher = config
        .ticket_dispatch_enabled
        .then(|| spawn_ticket_dispatcher(&event_bus));
    let service = BookingService::new(store, event_bus, config.limits());

    // Build router
    let app = api::build_app(AppState::new(service), config.request_timeout());

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("binding {}", config.listen_addr))?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(dispatcher) = dispatcher {
        dispatcher.abort();
    }
    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        tracing::warn!("ctrl-c handler unavailable; running until killed");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
