//! ticker-gateway server entry point.
//!
//! Starts the Axum HTTP server with REST and WebSocket endpoints and the
//! broadcast scheduler.

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use ticker_gateway::app_state::{AppState, StreamSettings};
use ticker_gateway::config::{GatewayConfig, LogFormat};
use ticker_gateway::domain::{
    BroadcastScheduler, ConnectionRegistry, PriceFeed, PriceSimulator, UserStore,
};
use ticker_gateway::persistence::PostgresUserStore;
use ticker_gateway::router::build_router;
use ticker_gateway::service::AccountService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = GatewayConfig::from_env().context("loading configuration")?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
    tracing::info!(addr = %config.listen_addr, "starting ticker-gateway");

    // Build domain layer
    let store = Arc::new(UserStore::new());
    let registry = Arc::new(ConnectionRegistry::new());
    let simulator = PriceSimulator::new(
        config.initial_tickers.iter().cloned(),
        config.simulator_settings(),
    );
    let feed = PriceFeed::new(simulator.board().clone());
    tracing::info!(
        tickers = simulator.board().len(),
        max_step_pct = simulator.settings().max_step_pct,
        floor = simulator.settings().floor,
        "price simulator ready"
    );

    // Optional persistence
    let persistence = if config.persistence_enabled {
        let db =
            PostgresUserStore::connect(&config.database_url, config.database_max_connections)
                .await?;
        db.ensure_schema().await?;
        let accounts = db.load_accounts().await?;
        tracing::info!(count = accounts.len(), "accounts loaded");
        store.load(accounts).await;
        Some(db)
    } else {
        None
    };

    // Build service layer
    let account_service = Arc::new(AccountService::new(
        Arc::clone(&store),
        feed.clone(),
        persistence,
    ));

    // Start the broadcast tick
    let scheduler = BroadcastScheduler::new(
        simulator,
        Arc::clone(&registry),
        Arc::clone(&store),
        feed.clone(),
        config.tick_interval,
    )
    .spawn();

    // Build application state
    let app_state = AppState {
        account_service,
        registry,
        feed,
        stream: StreamSettings {
            outbound_queue_capacity: config.outbound_queue_capacity,
            send_timeout: config.ws_send_timeout,
        },
    };

    // Start server
    let app = build_router(app_state);
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    let ticks = scheduler.stop().await;
    tracing::info!(ticks, "ticker-gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
