//! relay server - multi-client chat relay

use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tracing::{error, info};

use relay_utils::{LogConfig, RelayError, Result};

mod broadcast;
mod cli;
mod config;
mod connection;
mod handlers;
mod history;
mod notice;
mod observability;
mod registry;
mod tcp;

use crate::broadcast::Broadcaster;
use crate::cli::Cli;
use crate::config::{AppConfig, ConfigLoader};
use crate::history::HistoryCache;
use crate::observability::Metrics;
use crate::registry::SessionRegistry;

/// State shared by every connection task
#[derive(Clone)]
pub struct SharedState {
    /// Broadcast engine, owning the registry and history
    pub broadcaster: Arc<Broadcaster>,
    pub config: Arc<AppConfig>,
    /// Fires once when the server should stop accepting
    pub shutdown_tx: tokio::sync::broadcast::Sender<()>,
}

impl SharedState {
    pub fn new(config: AppConfig) -> Self {
        let (shutdown_tx, _) = tokio::sync::broadcast::channel(1);
        let broadcaster = Broadcaster::new(
            Arc::new(SessionRegistry::new()),
            Arc::new(HistoryCache::new(config.server.history_size)),
        );

        Self {
            broadcaster: Arc::new(broadcaster),
            config: Arc::new(config),
            shutdown_tx,
        }
    }

    pub fn subscribe_shutdown(&self) -> tokio::sync::broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }
}

/// Run the server until Ctrl-C
async fn run_server(config: AppConfig) -> Result<()> {
    let addr = config.server.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|source| RelayError::Bind {
            addr: addr.clone(),
            source,
        })?;

    let state = SharedState::new(config);
    let shutdown_tx = state.shutdown_tx.clone();

    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {}", e);
            return;
        }
        info!("Received Ctrl-C, shutting down");
        let _ = shutdown_tx.send(());
    });

    tcp::run_tcp_accept_loop(listener, state).await;

    info!("relay server stopped ({})", Metrics::global().snapshot());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.print_default_config {
        print!("{}", config::DEFAULT_CONFIG_TOML);
        return Ok(());
    }

    let mut config = ConfigLoader::load_and_validate(cli.config.as_deref())?;
    cli.apply_to(&mut config.server)?;

    relay_utils::init_logging_with_config(LogConfig::server(
        config.logging.output,
        &config.logging.filter,
    ))?;

    run_server(config).await
}
