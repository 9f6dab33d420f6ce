mod app;
mod atlas;
mod config;
mod routes;
mod state;

use anyhow::Context;
use tokio::signal;
use tracing_subscriber::EnvFilter;

use crate::atlas::AtlasSnapshot;
use crate::state::AppState;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    if let Err(e) = run().await {
        tracing::error!("endonym-map-server failed: {e:#}");
        return;
    }

    tracing::info!("Server shut down gracefully");
}

async fn run() -> anyhow::Result<()> {
    let geojson_path = config::world_geojson_path();
    let atlas = AtlasSnapshot::load(&geojson_path).await?;

    let dist_dir = config::client_dist_dir();
    if !dist_dir.is_dir() {
        tracing::warn!(
            dist_dir = %dist_dir.display(),
            "client dist directory not found; only the API will be served"
        );
    }

    let app = app::build_app(AppState::new(atlas, dist_dir));

    let addr = format!("0.0.0.0:{}", config::server_port());
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind TCP listener on {addr}"))?;
    tracing::info!("Endonym map server listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server failed")
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        let mut sigterm = match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(sigterm) => sigterm,
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                return;
            }
        };
        sigterm.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
