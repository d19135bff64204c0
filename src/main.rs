use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use configuration::{load_config, Config};
use database::{bootstrap_schema, connect, report_for_year, DbRepository};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use web_server::AppState;

/// The main entry point for the visit report service.
#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Parse command-line arguments
    let cli = Cli::parse();
    let config = load_config(&cli.config)
        .with_context(|| format!("failed to load configuration from {}", cli.config.display()))?;

    // Execute the appropriate command
    match cli.command {
        Commands::Serve => handle_serve(config).await,
        Commands::Report(args) => handle_report(config, args).await,
        Commands::Bootstrap => handle_bootstrap(config).await,
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Caregiver visit reports over PostgreSQL.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, global = true, default_value = "config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the schema, then serve the HTTP API.
    Serve,
    /// Print the caregiver report for one year as JSON.
    Report(ReportArgs),
    /// Create the caregiver, patient and visit tables and exit.
    Bootstrap,
}

#[derive(Parser)]
struct ReportArgs {
    /// The calendar year to report on (e.g., 2023).
    #[arg(long)]
    year: i32,
}

// ==============================================================================
// Command Handlers
// ==============================================================================

async fn handle_serve(config: Config) -> Result<()> {
    let pool = connect(&config.database)
        .await
        .context("failed to connect to the database")?;

    // Requests are only accepted once every table exists.
    bootstrap_schema(&pool, &config.database.schema_dir)
        .await
        .ensure_ready()
        .context("schema bootstrap failed; refusing to serve")?;

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("invalid server address")?;

    let store = Arc::new(DbRepository::new(pool.clone()));
    let result = web_server::run_server(addr, AppState::new(store)).await;

    pool.close().await;
    result
}

async fn handle_report(config: Config, args: ReportArgs) -> Result<()> {
    let pool = connect(&config.database)
        .await
        .context("failed to connect to the database")?;
    let repo = DbRepository::new(pool.clone());

    let report = report_for_year(&repo, args.year).await;
    pool.close().await;

    let report = report.with_context(|| format!("failed to build report for {}", args.year))?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

async fn handle_bootstrap(config: Config) -> Result<()> {
    let pool = connect(&config.database)
        .await
        .context("failed to connect to the database")?;

    let report = bootstrap_schema(&pool, &config.database.schema_dir).await;
    pool.close().await;

    for outcome in &report.outcomes {
        match &outcome.result {
            Ok(()) => println!("{}: ok", outcome.script),
            Err(e) => println!("{}: FAILED ({})", outcome.script, e),
        }
    }
    report.ensure_ready()?;
    Ok(())
}
