//! Teburu server
//!
//! Serves spreadsheet rows as JSON over HTTP.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use teburu_server::{build_app, AppState, Config};
use teburu_sheets::SheetsClient;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info, Level};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "teburu")]
#[command(about = "JSON API over spreadsheet rows")]
struct Args {
    /// Configuration file; created with defaults if missing
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Address to bind to, overriding the configuration
    #[arg(short, long)]
    bind: Option<String>,

    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(short, long, default_value = "info")]
    log_level: Level,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    // Setup logging
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(args.log_level).into())
        .from_env_lossy();
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut config = Config::load(&args.config)?;
    if let Some(bind) = args.bind {
        config.bind = bind;
    }

    let credentials = config.credentials()?;
    info!("Credentials: {}", credentials.kind());
    let client = SheetsClient::new(config.sheets_client(), credentials)
        .context("failed to build Sheets client")?;

    let layers = config.middleware();
    info!(
        cors = layers.cors,
        rate_limit = config.rate_limit,
        cache = config.cache,
        "Middleware configured"
    );
    let app = build_app(AppState::new(Arc::new(client)), &layers);

    let addr = config.listen_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    match signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(err) => error!("Unable to listen for shutdown signal: {}", err),
    }
}
