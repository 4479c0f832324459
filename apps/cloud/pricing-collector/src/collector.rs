//! Price collector service
//!
//! Orchestrates the refresh of the static pricing table: fetch meters per
//! region and service, fold them into the previous table, stamp
//! `lastUpdated`, republish the JSON file the calculator ships with.

use chrono::{DateTime, Utc};
use domain_pricing::ServiceKind;
use domain_pricing::table::{self, PricingTable};
use eyre::{Result, WrapErr};
use serde::Serialize;
use std::path::Path;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info, warn};

use crate::azure::{self, AzurePricingClient};
use crate::config::Config;

const SERVICE_KINDS: [ServiceKind; 4] = [
    ServiceKind::Vm,
    ServiceKind::AppService,
    ServiceKind::Functions,
    ServiceKind::Containers,
];

/// Result of a collection run
#[derive(Debug, Clone, Serialize)]
pub struct CollectionResult {
    pub regions_collected: usize,
    pub services_refreshed: usize,
    pub errors: usize,
    pub duration_ms: u64,
    pub timestamp: DateTime<Utc>,
}

/// Status of the collector and its upstream
#[derive(Debug, Clone, Serialize)]
pub struct CollectorStatus {
    pub api_url: String,
    pub api_healthy: bool,
    pub regions: Vec<String>,
    pub output_path: String,
    pub table_last_updated: Option<DateTime<Utc>>,
}

/// Main price collector service
pub struct PriceCollector {
    client: AzurePricingClient,
    config: Config,
}

impl PriceCollector {
    pub fn new(config: Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        let client = AzurePricingClient::new(http, config.api_url.clone());
        Ok(Self { client, config })
    }

    /// Run a one-time collection
    pub async fn collect(&self, regions: Option<&[String]>) -> Result<CollectionResult> {
        let start = std::time::Instant::now();

        let regions: Vec<String> = regions
            .map(|r| r.to_vec())
            .unwrap_or_else(|| self.config.regions.clone());

        let mut table = load_previous(&self.config.output_path);
        let mut services_refreshed = 0;
        let mut errors = 0;

        for region in &regions {
            info!(region = region.as_str(), "Refreshing region");

            for kind in SERVICE_KINDS {
                let service_name = azure::azure_service_name(kind);
                match self.client.fetch_service_prices(service_name, region).await {
                    Ok(items) => {
                        info!(
                            service = service_name,
                            region = region.as_str(),
                            count = items.len(),
                            "Fetched meters"
                        );
                        apply_items(&mut table, kind, region, &items);
                        services_refreshed += 1;
                    }
                    Err(e) => {
                        error!(
                            service = service_name,
                            region = region.as_str(),
                            error = %e,
                            "Failed to fetch meters, keeping previous prices"
                        );
                        errors += 1;
                    }
                }
            }
        }

        table.last_updated = Utc::now();
        write_table(&self.config.output_path, &table)?;

        let duration = start.elapsed();
        info!(
            path = %self.config.output_path.display(),
            regions = regions.len(),
            errors = errors,
            "Pricing table republished"
        );

        let status = if errors == 0 { "ok" } else { "partial" };
        observability::counter!("pricing_collection_runs_total", "status" => status).increment(1);
        observability::counter!("pricing_collection_errors_total").increment(errors as u64);
        observability::histogram!("pricing_collection_duration_seconds")
            .record(duration.as_secs_f64());

        Ok(CollectionResult {
            regions_collected: regions.len(),
            services_refreshed,
            errors,
            duration_ms: duration.as_millis() as u64,
            timestamp: table.last_updated,
        })
    }

    /// Run as a scheduled service
    pub async fn run_scheduled(&self, cron_expr: &str) -> Result<()> {
        info!(cron = cron_expr, "Starting scheduled price collection");

        let sched = JobScheduler::new().await?;
        let config = self.config.clone();

        let job = Job::new_async(cron_expr, move |_uuid, _l| {
            let config = config.clone();

            Box::pin(async move {
                info!("Running scheduled price collection");

                let run = async {
                    let collector = PriceCollector::new(config)?;
                    collector.collect(None).await
                };
                match run.await {
                    Ok(result) => {
                        info!(
                            regions = result.regions_collected,
                            errors = result.errors,
                            "Scheduled collection complete"
                        );
                    }
                    Err(e) => {
                        error!(error = %e, "Scheduled collection failed");
                    }
                }
            })
        })?;

        sched.add(job).await?;
        sched.start().await?;

        // Keep running until interrupted
        info!("Scheduler started, waiting for jobs...");
        loop {
            tokio::time::sleep(tokio::time::Duration::from_secs(60)).await;
        }
    }

    /// Get collector status
    pub async fn status(&self) -> Result<CollectorStatus> {
        let api_healthy = self.client.health_check().await.unwrap_or(false);
        let table_last_updated = self
            .config
            .output_path
            .exists()
            .then(|| load_previous(&self.config.output_path).last_updated);

        Ok(CollectorStatus {
            api_url: self.config.api_url.clone(),
            api_healthy,
            regions: self.config.regions.clone(),
            output_path: self.config.output_path.display().to_string(),
            table_last_updated,
        })
    }
}

/// Fold one service's meters into the table for a region. Regions newly
/// added to the config start from the bundled default-region template.
fn apply_items(
    table: &mut PricingTable,
    kind: ServiceKind,
    region: &str,
    items: &[azure::AzurePriceItem],
) {
    match kind {
        ServiceKind::Vm => {
            let previous = table
                .virtual_machines
                .get(region)
                .cloned()
                .unwrap_or_else(|| bundled_template(&table::bundled().virtual_machines));
            table
                .virtual_machines
                .insert(region.to_string(), azure::extract_vm_pricing(items, &previous));
        }
        ServiceKind::AppService => {
            let previous = table
                .app_service
                .get(region)
                .cloned()
                .unwrap_or_else(|| bundled_template(&table::bundled().app_service));
            table.app_service.insert(
                region.to_string(),
                azure::extract_app_service_pricing(items, &previous),
            );
        }
        ServiceKind::Functions => {
            let previous = table
                .functions
                .get(region)
                .cloned()
                .unwrap_or_else(|| bundled_template(&table::bundled().functions));
            table.functions.insert(
                region.to_string(),
                azure::extract_functions_pricing(items, &previous),
            );
        }
        ServiceKind::Containers => {
            let previous = table
                .container_instances
                .get(region)
                .cloned()
                .unwrap_or_else(|| bundled_template(&table::bundled().container_instances));
            table.container_instances.insert(
                region.to_string(),
                azure::extract_container_pricing(items, &previous),
            );
        }
    }
}

fn bundled_template<V: Clone>(map: &std::collections::HashMap<String, V>) -> V {
    map.get(table::DEFAULT_REGION)
        .expect("bundled table covers the default region")
        .clone()
}

/// Previous table: the current output file if readable, bundled otherwise
fn load_previous(path: &Path) -> PricingTable {
    match std::fs::read(path) {
        Ok(bytes) => match PricingTable::from_json(&bytes) {
            Ok(table) => table,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Existing table unreadable, starting from bundled");
                table::bundled().clone()
            }
        },
        Err(_) => table::bundled().clone(),
    }
}

fn write_table(path: &Path, table: &PricingTable) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .wrap_err_with(|| format!("creating {}", parent.display()))?;
    }
    let mut json = serde_json::to_vec_pretty(table)?;
    json.push(b'\n');
    std::fs::write(path, json).wrap_err_with(|| format!("writing {}", path.display()))
}
