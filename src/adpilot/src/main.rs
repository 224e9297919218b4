//! AdPilot — campaign performance reconciliation and rule-based automation.
//!
//! Main entry point: loads configuration, wires the store, platform client,
//! and engines together, and serves the REST API.

use adpilot_api::{api_router, build_state};
use adpilot_core::AppConfig;
use adpilot_platform::{AdPlatform, GraphClient, OfflinePlatform};
use adpilot_store::MemoryStore;
use clap::Parser;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "adpilot")]
#[command(about = "Campaign performance reconciliation and rule-based automation")]
#[command(version)]
struct Cli {
    /// HTTP port (overrides config)
    #[arg(long, env = "ADPILOT__API__HTTP_PORT")]
    http_port: Option<u16>,

    /// Ad platform access token (overrides config)
    #[arg(long, env = "ADPILOT__PLATFORM__ACCESS_TOKEN")]
    access_token: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "adpilot=info,tower_http=info".into()),
        )
        .json()
        .init();

    let cli = Cli::parse();

    info!("AdPilot starting up");

    let mut config = AppConfig::load().unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        AppConfig::default()
    });

    if let Some(port) = cli.http_port {
        config.api.http_port = port;
    }
    if let Some(token) = cli.access_token {
        config.platform.access_token = token;
    }

    info!(
        http_port = config.api.http_port,
        base_url = %config.platform.base_url,
        max_fanout = config.reconcile.max_fanout,
        "Configuration loaded"
    );

    let store = Arc::new(MemoryStore::new());

    let platform: Arc<dyn AdPlatform> = if config.platform.access_token.is_empty() {
        warn!("No platform access token configured, running in offline mode");
        Arc::new(OfflinePlatform)
    } else {
        Arc::new(GraphClient::new(&config.platform)?)
    };

    let state = build_state(store, platform, config.reconcile.max_fanout);
    let app = api_router(state);

    let addr = format!("{}:{}", config.api.host, config.api.http_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "AdPilot is ready to serve traffic");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("AdPilot shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
    }
}
