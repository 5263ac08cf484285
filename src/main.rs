//! epiwatch dashboard server
//!
//! Run with: cargo run --bin epiwatch
//!
//! # Configuration
//!
//! Read from `~/.config/epiwatch/config.toml`, `/etc/epiwatch/config.toml`
//! or `./config.toml`, then overridden by `EPIWATCH_*` variables.
//! `RUST_LOG` takes precedence over `logging.level`.

use anyhow::Context;
use epiwatch::api::{serve, AppState};
use epiwatch::config::Config;
use epiwatch::dashboard::DashboardService;
use epiwatch::remote::ApiClient;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let load = Config::load_default();
    load.config.logging.init();
    load.log();
    let config = load.config;

    tracing::info!("Starting epiwatch v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Remote API: {}", config.remote.base_url);

    let client = Arc::new(
        ApiClient::new(config.remote_config()).context("Failed to build the HTTP client")?,
    );

    match client.health_check().await {
        Ok(_) => tracing::info!("Remote API reachable"),
        Err(e) => tracing::warn!("Remote API not reachable yet: {}", e),
    }

    let dashboard = Arc::new(DashboardService::new(
        Arc::clone(&client) as _,
        config.dashboard_config(),
    ));

    // Initial load runs in the background; readiness reports it
    {
        let dashboard = Arc::clone(&dashboard);
        tokio::spawn(async move {
            dashboard.refresh().await;
        });
    }
    let refresh_handle = Arc::clone(&dashboard).start_background_refresh();

    let api_config = config.api_config();
    let state = AppState::new(dashboard, client, api_config.clone());

    serve(state, &api_config)
        .await
        .context("API server failed")?;

    if let Some(handle) = refresh_handle {
        handle.abort();
    }
    tracing::info!("epiwatch stopped");

    Ok(())
}
