//! Meta-deck crawler service
//!
//! Serves the crawl and player-sync triggers over HTTP, backed by a local
//! SQLite database.
//!
//! Usage:
//!   CR_API_KEY=... metadeck-service --port 3001 --database metadeck.db

use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use metadeck_crawler::{CrawlerConfig, RoyaleClient};
use metadeck_service::{AppState, build_router};
use metadeck_store::SqliteStore;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "metadeck-service")]
#[command(about = "Top-ladder meta-deck crawler")]
struct Args {
    /// HTTP port to listen on
    #[arg(short, long, env = "PORT", default_value = "3001")]
    port: u16,

    /// Game API bearer token
    #[arg(long, env = "CR_API_KEY", hide_env_values = true)]
    api_token: String,

    /// Game API base URL
    #[arg(long, env = "CR_API_BASE_URL")]
    api_base_url: Option<String>,

    /// SQLite database file
    #[arg(long, env = "METADECK_DB", default_value = "metadeck.db")]
    database: PathBuf,

    /// Minimum pause between battle-log requests (ms)
    #[arg(long, default_value = "100")]
    pacing_ms: u64,

    /// Battle logs fetched at once
    #[arg(long, default_value = "1")]
    concurrency: usize,

    /// Default number of players sampled per run
    #[arg(long)]
    player_limit: Option<usize>,

    /// Cancel a run that takes longer than this
    #[arg(long)]
    run_timeout_secs: Option<u64>,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn crawler_config(&self) -> CrawlerConfig {
        let defaults = CrawlerConfig::default();
        CrawlerConfig {
            api_base_url: self.api_base_url.clone().unwrap_or(defaults.api_base_url),
            api_token: self.api_token.clone(),
            player_limit: self.player_limit.unwrap_or(defaults.player_limit),
            pacing_interval_ms: self.pacing_ms,
            max_concurrency: self.concurrency.max(1),
            run_timeout_secs: self.run_timeout_secs,
            ..defaults
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let filter = if args.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();

    info!("Meta-deck service starting...");
    let config = args.crawler_config();
    let api = RoyaleClient::new(&config).context("Failed to build game API client")?;
    let store = SqliteStore::open(&args.database)
        .with_context(|| format!("Failed to open database {}", args.database.display()))?;
    info!("Using database {}", args.database.display());

    let shutdown = CancellationToken::new();
    let state = AppState::new(Arc::new(api), Arc::new(store), config, shutdown.clone());
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", args.port))
        .await
        .with_context(|| format!("Failed to bind HTTP port {}", args.port))?;
    info!("Backend running on http://localhost:{}", args.port);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down, cancelling in-flight runs");
            shutdown.cancel();
        })
        .await
        .context("HTTP server failed")?;

    Ok(())
}
