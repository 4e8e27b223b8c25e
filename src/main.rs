// Main entry point - Dependency injection and server setup
mod domain;
mod application;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc, time::Duration};
use anyhow::Context;
use tracing_subscriber::EnvFilter;

use crate::application::aggregator::Aggregator;
use crate::application::fleet_host::FleetHost;
use crate::infrastructure::config::{load_dashboard_config, DEFAULT_CONFIG_PATH};
use crate::infrastructure::fly_client::FlyClient;
use crate::infrastructure::github_client::GitHubClient;
use crate::presentation::app_state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let config_path =
        std::env::var("DASHBOARD_CONFIG_PATH").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let dashboard_config = load_dashboard_config(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path))?;

    let github_token = std::env::var("GITHUB_TOKEN").context("GITHUB_TOKEN must be set")?;
    let fly_token = std::env::var("FLY_API_TOKEN").ok().filter(|t| !t.is_empty());
    let api_key = std::env::var("DASHBOARD_API_KEY").ok().filter(|k| !k.is_empty());
    if api_key.is_none() {
        tracing::warn!("DASHBOARD_API_KEY is not set; /api/dashboard will answer 500");
    }

    // One HTTP client shared by both upstream hosts for the lifetime of the process
    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(dashboard_config.server.request_timeout_secs))
        .build()
        .context("Failed to build HTTP client")?;

    // Create upstream clients (infrastructure layer)
    let upstream = &dashboard_config.upstream;
    let github = Arc::new(
        GitHubClient::new(http.clone(), github_token).with_base_url(&upstream.github_api_url),
    );
    let fly = fly_token.map(|token| {
        Arc::new(FlyClient::new(http, token).with_base_url(&upstream.fly_api_url)) as Arc<dyn FleetHost>
    });
    if fly.is_none() {
        tracing::info!("FLY_API_TOKEN not set; fleet data disabled");
    }

    let bind_addr: SocketAddr = dashboard_config
        .server
        .bind_addr
        .parse()
        .with_context(|| format!("Invalid bind address {}", dashboard_config.server.bind_addr))?;

    // Create services (application layer)
    let aggregator = Aggregator::new(Arc::new(dashboard_config), github, fly);

    // Create application state
    let state = Arc::new(AppState { aggregator, api_key });

    // Build router (presentation layer)
    let router = presentation::router(state);

    // Start server
    tracing::info!("Starting repo-dashboard on {}", bind_addr);
    axum::serve(tokio::net::TcpListener::bind(bind_addr).await?, router).await?;

    Ok(())
}
