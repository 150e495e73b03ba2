//! # Buildings API Main Entry Point
//!
//! Runs the HTTP server by default; `migrate` and `seed` are one-shot
//! maintenance commands.

use anyhow::Context;
use buildings::{config::ConfigLoader, db, seeds, server::run_server, telemetry};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "buildings")]
#[command(about = "Buildings API with per-client custom fields", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve,
    /// Apply pending database migrations and exit
    Migrate,
    /// Load the demo clients, fields and buildings
    Seed,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = ConfigLoader::new()
        .load()
        .context("loading configuration")?;
    telemetry::init_tracing(&config)?;

    tracing::info!(profile = %config.profile, "Loaded configuration");
    if let Ok(redacted_json) = config.redacted_json() {
        tracing::debug!(config = %redacted_json, "Effective configuration");
    }

    let db = db::init_pool(&config)
        .await
        .context("initializing database connection pool")?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            if config.run_migrations {
                db::run_migrations(&db).await?;
            }
            run_server(config, db).await
        }
        Commands::Migrate => db::run_migrations(&db).await,
        Commands::Seed => {
            db::run_migrations(&db).await?;
            let summary = seeds::seed_demo_data(&db).await?;
            tracing::info!(?summary, "Seed complete");
            Ok(())
        }
    }
}
