mod discover;
mod links;
mod points;
mod records;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use laundrygo_core::{AppConfig, ConfigError};
use tracing_subscriber::EnvFilter;

use crate::records::{EditArgs, ShopArgs};

#[derive(Debug, Parser)]
#[command(name = "laundrygo")]
#[command(about = "Find, rank and manage laundry shops")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Rank the shop feed once and print the result
    List(DiscoverArgs),
    /// Keep ranking the live feed, printing every change until interrupted
    Watch(DiscoverArgs),
    /// List registered points grouped by shop name
    Points {
        #[arg(long)]
        json: bool,
    },
    /// Print map markers and the viewport that fits them
    Markers {
        #[arg(long)]
        json: bool,
    },
    /// Register a new shop
    Add(ShopArgs),
    /// Update fields of an existing shop
    Edit(EditArgs),
    /// Remove a shop
    Delete {
        /// Key of the shop to remove
        #[arg(allow_hyphen_values = true)]
        id: String,
    },
    /// Show map, directions, phone and WhatsApp links for a shop
    Links {
        /// Key of the shop
        #[arg(allow_hyphen_values = true)]
        id: String,
        /// Target platform for native links: android, ios or web
        #[arg(long, default_value = "web")]
        platform: String,
    },
}

/// Options shared by `list` and `watch`.
#[derive(Debug, Args)]
struct DiscoverArgs {
    /// Ranking filter: nearest, cheapest, best_facilities or all
    #[arg(long, default_value = "all")]
    filter: String,
    /// Latitude of the current position
    #[arg(long, requires = "lng", allow_negative_numbers = true)]
    lat: Option<f64>,
    /// Longitude of the current position
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    lng: Option<f64>,
    /// Rank records from a JSON export instead of the live database
    #[arg(long)]
    snapshot: Option<PathBuf>,
    /// Print the render state as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = laundrygo_core::load_app_config();
    init_tracing(config.as_ref().ok())?;

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::List(args)) => discover::run_list(config.ok().as_ref(), &args).await?,
        Some(Commands::Watch(args)) => discover::run_watch(config.ok().as_ref(), &args).await?,
        Some(Commands::Points { json }) => points::run_points(&require(config)?, json).await?,
        Some(Commands::Markers { json }) => points::run_markers(&require(config)?, json).await?,
        Some(Commands::Add(args)) => records::run_add(&require(config)?, &args).await?,
        Some(Commands::Edit(args)) => records::run_edit(&require(config)?, &args).await?,
        Some(Commands::Delete { id }) => records::run_delete(&require(config)?, &id).await?,
        Some(Commands::Links { id, platform }) => {
            links::run_links(&require(config)?, &id, &platform).await?;
        }
        None => println!("laundrygo: no command given, see --help"),
    }

    Ok(())
}

/// Install the global subscriber. `RUST_LOG` wins; otherwise the configured
/// level applies, and `info` when configuration could not be loaded.
fn init_tracing(config: Option<&AppConfig>) -> anyhow::Result<()> {
    let fallback = config.map_or("info", |c| c.log_level.as_str());
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(fallback))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

fn require(config: Result<AppConfig, ConfigError>) -> anyhow::Result<AppConfig> {
    Ok(config?)
}

#[cfg(test)]
mod tests;
