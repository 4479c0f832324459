//! Pricing Collector
//!
//! Refreshes the static pricing table from the Azure Retail Prices API.
//! Can run as a one-shot collection or as a scheduled cron job; the result
//! is the JSON table the calculator falls back to when live data is
//! unavailable.

use clap::{Parser, Subcommand};
use core_config::Environment;
use core_config::tracing::{init_tracing, install_color_eyre};
use eyre::Result;
use std::path::PathBuf;
use tracing::info;

mod azure;
mod collector;
mod config;

use collector::PriceCollector;
use config::Config;

#[derive(Parser)]
#[command(name = "pricing-collector")]
#[command(about = "Refresh the static pricing table from the Azure Retail Prices API")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a one-time collection
    Collect {
        /// Regions to refresh. Defaults to the configured regions.
        #[arg(short = 'R', long, value_delimiter = ',')]
        regions: Option<Vec<String>>,

        /// Where to write the refreshed table
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Run as a scheduled service
    Schedule {
        /// Cron expression for scheduling (default: Mondays at 03:00)
        #[arg(short, long, default_value = "0 0 3 * * Mon")]
        cron: String,
    },

    /// Show collector and upstream API status
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    install_color_eyre();

    let environment = Environment::from_env();
    init_tracing(&environment);
    observability::init_metrics();

    let mut config = Config::from_env()?;
    let cli = Cli::parse();

    match cli.command {
        Commands::Collect { regions, output } => {
            if let Some(output) = output {
                config.output_path = output;
            }

            info!("Starting one-time price collection");
            let collector = PriceCollector::new(config)?;
            let result = collector.collect(regions.as_deref()).await?;

            info!(
                regions = result.regions_collected,
                services = result.services_refreshed,
                errors = result.errors,
                duration_ms = result.duration_ms,
                "Collection complete"
            );
        }

        Commands::Schedule { cron } => {
            info!("Starting scheduled collection with cron: {}", cron);
            let collector = PriceCollector::new(config)?;
            collector.run_scheduled(&cron).await?;
        }

        Commands::Status => {
            let collector = PriceCollector::new(config)?;
            let status = collector.status().await?;
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
    }

    Ok(())
}
