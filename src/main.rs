//! CSE-Proxy: a credential-rotating proxy for the Google Custom Search JSON API
//!
//! This is the main entry point for the application.

use anyhow::Result;
use clap::Parser;
use cse_proxy::{
    config,
    network::HttpClient,
    web::{create_router, AppState},
};
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Command line options
#[derive(Debug, Parser)]
#[command(name = "cse-proxy", version, about)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Server port
    #[arg(short, long)]
    port: Option<u16>,

    /// Bind address
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let (mut settings, settings_path) = config::load(cli.config.as_deref())?;
    if let Some(port) = cli.port {
        settings.server.port = port;
    }
    if let Some(bind) = cli.bind {
        settings.server.bind_address = bind;
    }

    // Initialize logging
    let default_level = if settings.general.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .init();

    info!("Starting CSE-Proxy v{}", cse_proxy::VERSION);
    match settings_path {
        Some(path) => info!("Loaded settings from: {}", path.display()),
        None => info!("No settings file found, using defaults"),
    }

    settings.validate()?;

    // Initialize HTTP client
    let client = HttpClient::with_settings(&settings.upstream)?;
    info!(timeout = ?client.timeout(), "HTTP client initialized");

    // Create application state
    let state = AppState::new(settings.clone(), client)?;
    let pool_size = state.proxy.pool_size();
    if pool_size > 0 {
        info!(
            profile = ?state.proxy.profile(),
            "Loaded {} credential pair(s)", pool_size
        );
    } else {
        warn!("No usable credentials, searches will fail until configured");
    }

    // Create router
    let app = create_router(state);

    // Bind address
    let addr = SocketAddr::new(
        settings.server.bind_address.parse()?,
        settings.server.port,
    );

    info!("Starting server on http://{}", addr);

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
