use std::net::SocketAddr;

use anyhow::Context;
use dotenvy::dotenv;
use tracing::{error, info};

use quizzler::logging::init_logging;
use quizzler::router::init_router;
use quizzler::state::init_app_state;
use quizzler_config::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    init_logging();

    if let Err(e) = run().await {
        error!(error = ?e, "Server failed to start");
        return Err(e);
    }

    Ok(())
}

async fn run() -> anyhow::Result<()> {
    let state = init_app_state().await?;
    let app = init_router(state);

    let server_config = ServerConfig::from_env();
    let address = server_config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {address}"))?;

    info!(address = %address, "Server running");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
