//! Configuration for the pricing collector

use core_config::{env_or_default, env_parse_or, ConfigError};
use std::path::PathBuf;
use std::time::Duration;

/// Azure Retail Prices API endpoint
pub const AZURE_PRICING_API: &str = "https://prices.azure.com/api/retail/prices";

/// Regions tracked by the static table
pub const DEFAULT_REGIONS: &[&str] = &[
    "eastus",
    "westus2",
    "centralus",
    "westeurope",
    "southeastasia",
];

/// Where the refreshed table is written
pub const DEFAULT_OUTPUT_PATH: &str = "libs/domains/pricing/data/fallback-pricing.json";

#[derive(Debug, Clone)]
pub struct Config {
    /// Pricing API base URL
    pub api_url: String,
    /// Regions to refresh
    pub regions: Vec<String>,
    /// Path of the JSON table to republish
    pub output_path: PathBuf,
    /// Timeout for a single API request
    pub request_timeout: Duration,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let regions = match std::env::var("PRICING_REGIONS") {
            Ok(raw) => raw
                .split(',')
                .map(|r| r.trim().to_string())
                .filter(|r| !r.is_empty())
                .collect(),
            Err(_) => DEFAULT_REGIONS.iter().map(|r| r.to_string()).collect(),
        };

        Ok(Self {
            api_url: env_or_default("PRICING_API_URL", AZURE_PRICING_API),
            regions,
            output_path: PathBuf::from(env_or_default("PRICING_OUTPUT_PATH", DEFAULT_OUTPUT_PATH)),
            request_timeout: Duration::from_secs(env_parse_or("REQUEST_TIMEOUT_SECS", 30u64)?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_env_defaults() {
        temp_env::with_vars(
            [
                ("PRICING_REGIONS", None::<&str>),
                ("PRICING_API_URL", None),
                ("PRICING_OUTPUT_PATH", None),
            ],
            || {
                let config = Config::from_env().unwrap();
                assert_eq!(config.api_url, AZURE_PRICING_API);
                assert_eq!(config.regions.len(), 5);
                assert_eq!(
                    config.output_path,
                    PathBuf::from(DEFAULT_OUTPUT_PATH)
                );
            },
        );
    }

    #[test]
    fn test_from_env_parses_region_list() {
        temp_env::with_var("PRICING_REGIONS", Some("eastus, westeurope ,"), || {
            let config = Config::from_env().unwrap();
            assert_eq!(config.regions, vec!["eastus", "westeurope"]);
        });
    }
}
