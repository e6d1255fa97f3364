//! CLI for running schema migrations without starting the server.
//!
//! Deploy pipelines run `migrate_cli run` before rolling the API; `status`
//! prints what has been applied.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use server_core::Config;
use sqlx::PgPool;

#[derive(Parser)]
#[command(name = "migrate_cli")]
#[command(about = "Schema migration CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply all pending migrations
    Run,

    /// Show applied migrations
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run => cmd_run().await,
        Commands::Status => cmd_status().await,
    }
}

async fn get_pool() -> Result<PgPool> {
    let config = Config::from_env()?;
    PgPool::connect(&config.database_url)
        .await
        .context("Failed to connect to database")
}

async fn cmd_run() -> Result<()> {
    let pool = get_pool().await?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;

    println!("Migrations applied");
    Ok(())
}

async fn cmd_status() -> Result<()> {
    let pool = get_pool().await?;

    let rows = sqlx::query_as::<_, (i64, String)>(
        "SELECT version, description FROM _sqlx_migrations ORDER BY version",
    )
    .fetch_all(&pool)
    .await
    .context("Failed to read migration history (has `run` been executed?)")?;

    if rows.is_empty() {
        println!("No migrations applied");
        return Ok(());
    }

    for (version, description) in rows {
        println!("{:>14}  {}", version, description);
    }
    Ok(())
}
