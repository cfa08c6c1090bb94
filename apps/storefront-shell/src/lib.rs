//! # storefront-shell
//!
//! Terminal front-end for the storefront client services.
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Shell Startup                                  │
//! │                                                                         │
//! │  1. Initialize Logging ───────────────────────────────────────────────► │
//! │     • tracing-subscriber with env filter                                │
//! │     • Default: info,storefront=debug,sqlx=warn; RUST_LOG overrides      │
//! │                                                                         │
//! │  2. Load Configuration ───────────────────────────────────────────────► │
//! │     • defaults ◄ storefront.toml ◄ STOREFRONT_* ◄ command-line flags    │
//! │                                                                         │
//! │  3. Open Preference Store ────────────────────────────────────────────► │
//! │     • SQLite with WAL mode, pending migrations applied                  │
//! │                                                                         │
//! │  4. Build AppContainer ───────────────────────────────────────────────► │
//! │     • HttpApi, session, cart, search, catalog, settings, listeners      │
//! │                                                                         │
//! │  5. Prompt Loop ──────────────────────────────────────────────────────► │
//! │     • one command per line until `quit` or end of input                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod commands;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use storefront_client::{AppContainer, ClientConfig};
use storefront_db::{Database, DbConfig};

/// Command-line arguments.
#[derive(Debug, Parser)]
#[command(name = "storefront")]
#[command(author, version, about = "Interactive storefront client")]
pub struct Args {
    /// Path to storefront.toml (defaults to the platform config directory)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Preference database file
    #[arg(long)]
    pub db: Option<PathBuf>,

    /// Shop API base URL
    #[arg(long)]
    pub api_url: Option<String>,
}

/// Parses arguments, builds the services and runs the prompt loop.
pub async fn run() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();

    info!("Starting storefront shell");

    let config = load_config(&args).inspect_err(|e| {
        if let Some(hint) = commands::hint(e) {
            error!(hint, "Configuration rejected");
        }
    })?;
    let db_path = config.database_path()?;
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating data directory {}", parent.display()))?;
    }
    info!(?db_path, "Database path determined");

    let db = Database::new(DbConfig::new(db_path))
        .await
        .context("opening preference store")?;
    let app = AppContainer::build(config, db)
        .await
        .context("building client services")?;

    commands::run_prompt(&app).await?;

    app.db.close().await;
    info!("Shell stopped");
    Ok(())
}

/// Config file and environment first, then command-line flags.
fn load_config(args: &Args) -> anyhow::Result<ClientConfig> {
    let mut config = ClientConfig::load(args.config.clone()).context("loading configuration")?;

    if let Some(db) = &args.db {
        config.storage.database_path = Some(db.clone());
    }
    if let Some(url) = &args.api_url {
        config.api.base_url = url.clone();
        config.validate().context("validating --api-url")?;
    }

    Ok(config)
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug and above
/// - `RUST_LOG=storefront_client=trace` - Trace the client services only
/// - Default: `info,storefront=debug,sqlx=warn`
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,storefront=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
