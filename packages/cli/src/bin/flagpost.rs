use std::io;
use std::process;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use flagpost_cli::{logging, Config, TokensCommands};
use flagpost_security::{SqliteApiTokenStore, TimedApiTokenStore};
use tracing::debug;

#[derive(Parser)]
#[command(name = "flagpost")]
#[command(about = "Flagpost CLI - manage API tokens for the feature-flag service")]
#[command(version)]
struct Cli {
    /// Database URL (overrides FLAGPOST_DATABASE_URL)
    #[arg(long, global = true)]
    database: Option<String>,

    /// Print JSON instead of tables
    #[arg(long, global = true)]
    json: bool,

    /// Verbose logging, including store timings
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage API tokens
    #[command(subcommand)]
    Tokens(TokensCommands),
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    logging::init(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("{} {:#}", "✗".red().bold(), e);
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::from_env()
        .context("Invalid configuration")?
        .with_database_url(cli.database);

    debug!(database = %config.storage.database_url, "Opening token store");

    let pool = flagpost_storage::connect(&config.storage)
        .await
        .context("Failed to open database")?;
    let store = TimedApiTokenStore::new(SqliteApiTokenStore::new(pool));

    let mut stdout = io::stdout().lock();
    match cli.command {
        Commands::Tokens(command) => command.execute(&store, cli.json, &mut stdout).await,
    }
}
