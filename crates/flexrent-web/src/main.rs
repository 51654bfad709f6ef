use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use flexrent_core::IncomeExtractor;
use flexrent_pdf_mupdf::MupdfBackend;

mod app;
mod handlers;
#[cfg(test)]
mod mock;
mod models;
mod state;
mod upload;

use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = flexrent_core::load_config();

    // Resolve the listen address: env vars > config file > defaults
    let host = std::env::var("FLEXRENT_HOST").unwrap_or_else(|_| config.host());
    let port = match std::env::var("FLEXRENT_PORT") {
        Ok(value) => value
            .parse::<u16>()
            .with_context(|| format!("FLEXRENT_PORT is not a valid port: {value}"))?,
        Err(_) => config.port(),
    };
    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .with_context(|| format!("invalid listen address {host}:{port}"))?;

    let mut backend = MupdfBackend::new().with_layout(config.layout_config());
    if let Some(ratio) = config.gap_ratio() {
        backend = backend.with_gap_ratio(ratio);
    }

    let state = Arc::new(AppState {
        backend: Arc::new(backend),
        extractor: IncomeExtractor::with_config(config.extractor_config()),
        threshold: config.threshold(),
    });

    let app = app::router(state, config.max_upload_bytes());

    tracing::info!(%addr, threshold = config.threshold(), "listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
