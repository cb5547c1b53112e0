//! Ad-creative DNA server
//!
//! Exposes adna-core over HTTP:
//! - POST   /generate-dna      - Issue a certificate for an uploaded creative
//! - POST   /verify            - Classify an uploaded creative
//! - GET    /verify-dna?dna=   - Look up a DNA token
//! - DELETE /remove-dna/{dna}  - Revoke a certificate
//! - GET    /stats             - Registry statistics

use std::net::SocketAddr;

use adna_server::{create_router_with_state, AppState, Config};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const DEFAULT_LOG_FILTER: &str = "adna_server=info,adna_core=info,tower_http=info";

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(filter)
        .init();
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    init_tracing();

    let config = Config::from_env();
    let state = AppState::from_config(&config);

    tracing::info!(
        brand_rule_version = %config.brand_rule_version,
        brand_colors = config.brand_colors.len(),
        text_detector = ?config.text_detector,
        max_file_size_mb = config.max_file_size_mb,
        extraction_timeout_secs = config.extraction_timeout_secs,
        public_verify_url = ?config.public_verify_url,
        "Fingerprint service configured"
    );

    let app = create_router_with_state(state, &config);

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "adna-server listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
}
