//! Configuration for the pricing proxy

use core_config::{env_or_default, env_parse_or, ConfigError};
use std::time::Duration;

/// Azure Retail Prices API endpoint
pub const AZURE_PRICING_API: &str = "https://prices.azure.com/api/retail/prices";

/// Ports tried in order when `PORT` is not set
pub const DEFAULT_PORTS: &[u16] = &[3000, 3001, 3002, 3003, 8080, 8081];

#[derive(Debug, Clone)]
pub struct ProxyConfig {
    pub host: String,
    /// Candidate listen ports, tried in order until one binds
    pub ports: Vec<u16>,
    /// Upstream pricing API base URL
    pub upstream: String,
    /// Timeout for a single upstream request
    pub request_timeout: Duration,
}

impl ProxyConfig {
    /// Load configuration from environment variables.
    ///
    /// With `PORT` set only that port is tried; otherwise the default port
    /// ladder is walked until a free one is found.
    pub fn from_env() -> Result<Self, ConfigError> {
        let ports = match std::env::var("PORT") {
            Ok(raw) => vec![raw.parse().map_err(|e: std::num::ParseIntError| {
                ConfigError::ParseError {
                    key: "PORT".to_string(),
                    details: e.to_string(),
                }
            })?],
            Err(_) => DEFAULT_PORTS.to_vec(),
        };

        Ok(Self {
            host: env_or_default("HOST", "0.0.0.0"),
            ports,
            upstream: env_or_default("UPSTREAM_PRICING_API", AZURE_PRICING_API),
            request_timeout: Duration::from_secs(env_parse_or("REQUEST_TIMEOUT_SECS", 30u64)?),
        })
    }
}
