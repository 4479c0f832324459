//! Pricing table loader
//!
//! Fetches the current pricing table from a configured endpoint (typically
//! the pricing proxy, or a statically hosted copy of the collector's output)
//! and falls back to the bundled table whenever retrieval fails. The loader
//! always delivers a table; callers never have to handle a missing one.
//!
//! All knobs live in an explicit [`LoaderConfig`] injected at construction.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::PricingResult;
use crate::table::{self, PricingTable};

/// Configuration for a [`PricingLoader`]
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// URL serving the pricing table as JSON. `None` means bundled-only.
    pub endpoint: Option<String>,
    /// How long a fetched table may be served before refetching
    pub cache_ttl: Duration,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            cache_ttl: Duration::from_secs(3600),
        }
    }
}

/// Anything that can supply a pricing table on demand
#[async_trait]
pub trait PricingSource: Send + Sync {
    async fn load(&self) -> PricingTable;
}

/// Loader with remote fetch and bundled fallback
pub struct PricingLoader {
    config: LoaderConfig,
    client: reqwest::Client,
    cached: Mutex<Option<CachedTable>>,
}

struct CachedTable {
    fetched_at: Instant,
    table: PricingTable,
}

impl PricingLoader {
    pub fn new(config: LoaderConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
            cached: Mutex::new(None),
        }
    }

    /// The table bundled into the binary
    pub fn bundled() -> &'static PricingTable {
        table::bundled()
    }

    fn fresh_cached(&self) -> Option<PricingTable> {
        let cached = self.cached.lock().ok()?;
        cached
            .as_ref()
            .filter(|c| c.fetched_at.elapsed() < self.config.cache_ttl)
            .map(|c| c.table.clone())
    }

    fn store(&self, table: PricingTable) {
        if let Ok(mut cached) = self.cached.lock() {
            *cached = Some(CachedTable {
                fetched_at: Instant::now(),
                table,
            });
        }
    }

    async fn fetch(&self, endpoint: &str) -> PricingResult<PricingTable> {
        let response = self.client.get(endpoint).send().await?.error_for_status()?;
        let bytes = response.bytes().await?;
        PricingTable::from_json(&bytes)
    }
}

#[async_trait]
impl PricingSource for PricingLoader {
    async fn load(&self) -> PricingTable {
        let Some(endpoint) = self.config.endpoint.clone() else {
            debug!("no pricing endpoint configured, using bundled table");
            return table::bundled().clone();
        };

        if let Some(table) = self.fresh_cached() {
            debug!("serving pricing table from cache");
            return table;
        }

        match self.fetch(&endpoint).await {
            Ok(table) => {
                debug!(endpoint = %endpoint, last_updated = %table.last_updated, "fetched pricing table");
                self.store(table.clone());
                table
            }
            Err(e) => {
                warn!(endpoint = %endpoint, error = %e, "pricing fetch failed, falling back to bundled table");
                table::bundled().clone()
            }
        }
    }
}
