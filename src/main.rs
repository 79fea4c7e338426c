mod api;
mod cli;
mod config;
mod db;
mod models;
mod services;
mod utils;
mod views;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;

#[derive(Parser)]
#[command(name = "footy-cards")]
#[command(about = "Football player stats proxy with a cached card view")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the proxy server
    Serve {
        #[arg(short, long, default_value = "5000")]
        port: u16,
    },
    /// Search a player, cache the results and print their cards
    Search {
        #[arg(short, long)]
        name: String,
        /// Season start year; defaults to the latest available
        #[arg(short, long)]
        season: Option<i32>,
        /// Call API-Football directly instead of going through the proxy
        #[arg(long)]
        direct: bool,
        /// Include the extra stats panel
        #[arg(short, long)]
        expanded: bool,
    },
    /// Print every cached player, grouped by player
    Players {
        #[arg(short, long)]
        expanded: bool,
    },
    /// List the selectable seasons of the configured league
    Seasons {
        #[arg(long)]
        direct: bool,
    },
    /// Initialize the database
    InitDb,
}

#[tokio::main]
async fn main() -> Result<()> {
    // --help and argument errors must not depend on a valid environment
    let cli = Cli::parse();

    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::from_env()?;

    match cli.command {
        Some(Commands::Serve { port }) => {
            tracing::info!("Starting player stats proxy on port {}", port);
            api::serve(config, port).await?;
        }
        Some(Commands::Search { name, season, direct, expanded }) => {
            tracing::info!("Searching player: {}", name);
            cli::search_player(&config, &name, season, direct, expanded).await?;
        }
        Some(Commands::Players { expanded }) => {
            cli::list_players(&config, expanded).await?;
        }
        Some(Commands::Seasons { direct }) => {
            cli::list_seasons(&config, direct).await?;
        }
        Some(Commands::InitDb) => {
            tracing::info!("Initializing database...");
            db::init_database(&config.database_url).await?;
        }
        None => {
            // Default to serving
            tracing::info!("Starting player stats proxy on port 5000");
            api::serve(config, 5000).await?;
        }
    }

    Ok(())
}
