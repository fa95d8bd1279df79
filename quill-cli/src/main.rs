//! quill CLI - administration for the quill blog store
//!
//! Creates and drops the schema, lists entities and manages post labels
//! against SQLite or PostgreSQL, configured from `~/.quill/config.toml`,
//! `$QUILL_CONFIG` or `$DATABASE_URL`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use quill_store::{Store, StoreConfig};
use tracing::debug;

mod commands;
mod tracing_setup;

#[derive(Parser, Debug)]
#[command(
    name = "quill",
    author,
    version,
    about = "Manage the quill blog database (schema, users, posts, labels)"
)]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Export traces over OTLP (requires the telemetry feature)
    #[arg(long, global = true)]
    otel: bool,

    /// Config file (default: ~/.quill/config.toml)
    #[arg(long, global = true, env = "QUILL_CONFIG")]
    config: Option<PathBuf>,

    /// Database URL; overrides the config file
    #[arg(long, global = true, env = "DATABASE_URL")]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create or drop all tables
    Schema(commands::schema::SchemaArgs),
    /// List registered users
    Users(commands::users::UsersArgs),
    /// List posts
    Posts(commands::posts::PostsArgs),
    /// List, attach and detach labels
    Labels(commands::labels::LabelsArgs),
    /// Show backend and row counts
    Status(commands::status::StatusArgs),
}

fn load_config(cli: &Cli) -> Result<StoreConfig> {
    let mut config = match &cli.config {
        Some(path) if path.exists() => StoreConfig::load_from(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        Some(path) => {
            debug!(path = %path.display(), "config file missing, using defaults");
            StoreConfig::default()
        }
        None => StoreConfig::load().context("Failed to load config")?,
    };

    if let Some(url) = cli.database_url.as_deref().filter(|u| !u.trim().is_empty()) {
        config = config.with_database_url(url.trim());
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    tracing_setup::init(&tracing_setup::TracingConfig {
        debug: cli.debug,
        otel: cli.otel,
    })
    .ok();

    let config = load_config(&cli)?;
    let store = Store::from_config(&config)
        .await
        .context("Failed to open store")?;

    let result = match cli.command {
        Commands::Schema(args) => commands::run_schema(&store, args).await,
        Commands::Users(args) => commands::run_users(&store, args).await,
        Commands::Posts(args) => commands::run_posts(&store, args).await,
        Commands::Labels(args) => commands::run_labels(&store, args).await,
        Commands::Status(args) => commands::run_status(&store, args).await,
    };

    store.close().await;
    tracing_setup::shutdown_otel();
    result
}
