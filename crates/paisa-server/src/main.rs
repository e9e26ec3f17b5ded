//! Paisa server binary
//!
//! Usage:
//!   paisa-server --db paisa.db --port 8001
//!
//! Oracle settings come from the environment (ORACLE_HOST, ORACLE_MODEL,
//! ORACLE_VISION_MODEL, ORACLE_TIMEOUT_SECS) and are read once at startup.

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use paisa_core::ai::ExtractionClient;
use paisa_core::db::Database;
use paisa_core::AppConfig;
use paisa_server::create_router;

#[derive(Parser)]
#[command(name = "paisa-server", about = "Paisa budget planner API server")]
struct Cli {
    /// Path to the SQLite database (overrides PAISA_DB)
    #[arg(long)]
    db: Option<String>,

    /// Address to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on
    #[arg(long, default_value_t = 8001)]
    port: u16,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    // Environment is read exactly once, here
    let mut config = AppConfig::from_env();
    if let Some(db_path) = cli.db {
        config.db_path = db_path;
    }

    let db = Database::new(&config.db_path)
        .with_context(|| format!("Failed to open database at {}", config.db_path))?;
    info!(path = %config.db_path, "Database ready");

    let oracle = match &config.oracle {
        Some(oracle_config) => Some(
            ExtractionClient::from_config(oracle_config)
                .context("Failed to construct extraction oracle client")?,
        ),
        None => None,
    };

    let app = create_router(db, oracle);

    let addr = format!("{}:{}", cli.host, cli.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!(addr = %addr, "Paisa server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
