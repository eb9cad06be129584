//! modelgate server binary

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use mg_config::ConfigManager;
use mg_server::{app, AppState};

#[derive(Parser, Debug)]
#[command(
    name = "modelgate",
    version,
    about = "Model-aware request routing gateway with mapping and remote fallback"
)]
struct Cli {
    /// Path to the configuration file
    #[arg(long, default_value = "modelgate.yaml")]
    config: PathBuf,

    /// Override the configured bind host
    #[arg(long)]
    host: Option<String>,

    /// Override the configured bind port
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_manager = Arc::new(
        ConfigManager::load_from_path(cli.config.clone())
            .await
            .with_context(|| format!("failed to load configuration from {:?}", cli.config))?,
    );

    let default_filter = config_manager.get().logging.level;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    let mut server_config = config_manager.get().server;
    if let Some(host) = cli.host {
        server_config.host = host;
    }
    if let Some(port) = cli.port {
        server_config.port = port;
    }

    let state = AppState::new(config_manager);
    let router = app(state);

    let addr: SocketAddr = format!("{}:{}", server_config.host, server_config.port)
        .parse()
        .with_context(|| {
            format!(
                "invalid bind address {}:{}",
                server_config.host, server_config.port
            )
        })?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("modelgate listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutdown signal received");
}
