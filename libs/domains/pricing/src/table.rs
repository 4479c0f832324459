//! Pricing table model
//!
//! Mirrors the shape of the static table republished by the pricing
//! collector (`data/fallback-pricing.json`): per service category, a map of
//! region code to nested price lookups. All prices are USD.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{PricingError, PricingResult};

/// Region used when a requested region has no entry for a service
pub const DEFAULT_REGION: &str = "eastus";

static BUNDLED_TABLE: Lazy<PricingTable> = Lazy::new(|| {
    serde_json::from_str(include_str!("../data/fallback-pricing.json"))
        .expect("bundled pricing table is valid JSON")
});

/// The pricing table bundled into the binary, used when no fresher data is
/// available.
pub fn bundled() -> &'static PricingTable {
    &BUNDLED_TABLE
}

/// Hourly price for one VM size
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VmSizePrice {
    /// Base price, USD per hour (Linux)
    pub price: f64,
    /// Surcharge added on top of the base price for Windows, USD per hour
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub windows_premium: Option<f64>,
}

/// Managed disk price
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoragePrice {
    /// USD per GB per month
    pub price: f64,
}

/// VM pricing for one region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VmPricing {
    pub sizes: HashMap<String, VmSizePrice>,
    pub storage: HashMap<String, StoragePrice>,
}

/// Flat monthly price for one App Service plan size
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstancePrice {
    /// USD per month
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppServiceTier {
    pub sizes: HashMap<String, InstancePrice>,
}

/// App Service pricing for one region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppServicePricing {
    pub tiers: HashMap<String, AppServiceTier>,
}

/// Per-plan Functions pricing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionPlanPricing {
    /// USD per execution beyond the free grant
    #[serde(default)]
    pub execution_price: f64,
    /// USD per GB-second beyond the free grant
    #[serde(default)]
    pub gb_second_price: f64,
    /// Flat instance charge, USD per month
    #[serde(default)]
    pub instance_price: f64,
}

/// Functions pricing for one region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionsPricing {
    pub plans: HashMap<String, FunctionPlanPricing>,
}

/// Container Instances pricing for one region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerPricing {
    /// USD per vCPU-second
    pub cpu_price: f64,
    /// USD per GB-second
    pub memory_price: f64,
}

/// Full pricing table, all regions and service categories
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingTable {
    pub last_updated: DateTime<Utc>,
    pub virtual_machines: HashMap<String, VmPricing>,
    pub app_service: HashMap<String, AppServicePricing>,
    pub functions: HashMap<String, FunctionsPricing>,
    pub container_instances: HashMap<String, ContainerPricing>,
}

/// The per-region slice of the table consumed by the cost calculator
#[derive(Debug, Clone, Copy)]
pub struct RegionPricing<'a> {
    pub virtual_machines: &'a VmPricing,
    pub app_service: &'a AppServicePricing,
    pub functions: &'a FunctionsPricing,
    pub container_instances: &'a ContainerPricing,
}

impl PricingTable {
    /// Parse a table from JSON bytes.
    pub fn from_json(bytes: &[u8]) -> PricingResult<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Assemble the pricing slice for a region.
    ///
    /// A region missing from a service's map resolves to [`DEFAULT_REGION`],
    /// so a partial table still yields an estimate. Only a table that lacks
    /// the default region as well is rejected.
    pub fn region(&self, region: &str) -> PricingResult<RegionPricing<'_>> {
        Ok(RegionPricing {
            virtual_machines: lookup_or_default(&self.virtual_machines, region, DEFAULT_REGION)
                .ok_or_else(|| missing_region("virtualMachines", region))?,
            app_service: lookup_or_default(&self.app_service, region, DEFAULT_REGION)
                .ok_or_else(|| missing_region("appService", region))?,
            functions: lookup_or_default(&self.functions, region, DEFAULT_REGION)
                .ok_or_else(|| missing_region("functions", region))?,
            container_instances: lookup_or_default(
                &self.container_instances,
                region,
                DEFAULT_REGION,
            )
            .ok_or_else(|| missing_region("containerInstances", region))?,
        })
    }

    /// Region codes present for every service category
    pub fn regions(&self) -> Vec<&str> {
        let mut regions: Vec<&str> = self
            .virtual_machines
            .keys()
            .filter(|r| {
                self.app_service.contains_key(*r)
                    && self.functions.contains_key(*r)
                    && self.container_instances.contains_key(*r)
            })
            .map(String::as_str)
            .collect();
        regions.sort_unstable();
        regions
    }
}

fn missing_region(service: &str, region: &str) -> PricingError {
    PricingError::NotFound(format!(
        "{service} pricing for region '{region}' (and no '{DEFAULT_REGION}' fallback)"
    ))
}

/// Look up `key`, falling back to `default_key` when absent.
///
/// The single fallback helper shared by every cost strategy, so unknown
/// sizes, tiers, plans and storage kinds all resolve the same way.
pub fn lookup_or_default<'a, V>(
    map: &'a HashMap<String, V>,
    key: &str,
    default_key: &str,
) -> Option<&'a V> {
    map.get(key).or_else(|| map.get(default_key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_table_parses() {
        let table = bundled();
        assert!(table.virtual_machines.contains_key(DEFAULT_REGION));
        assert!(table.app_service.contains_key(DEFAULT_REGION));
        assert!(table.functions.contains_key(DEFAULT_REGION));
        assert!(table.container_instances.contains_key(DEFAULT_REGION));
    }

    #[test]
    fn test_bundled_prices_are_non_negative() {
        let table = bundled();
        for pricing in table.virtual_machines.values() {
            for size in pricing.sizes.values() {
                assert!(size.price >= 0.0);
                assert!(size.windows_premium.unwrap_or(0.0) >= 0.0);
            }
            for storage in pricing.storage.values() {
                assert!(storage.price >= 0.0);
            }
        }
        for pricing in table.functions.values() {
            for plan in pricing.plans.values() {
                assert!(plan.execution_price >= 0.0);
                assert!(plan.gb_second_price >= 0.0);
                assert!(plan.instance_price >= 0.0);
            }
        }
        for pricing in table.container_instances.values() {
            assert!(pricing.cpu_price >= 0.0);
            assert!(pricing.memory_price >= 0.0);
        }
    }

    #[test]
    fn test_region_slice_for_known_region() {
        let table = bundled();
        let slice = table.region("westeurope").unwrap();
        let d2s = &slice.virtual_machines.sizes["Standard_D2s_v3"];
        assert_eq!(d2s.price, 0.114);
    }

    #[test]
    fn test_unknown_region_falls_back_to_eastus() {
        let table = bundled();
        let slice = table.region("australiaeast").unwrap();
        let d2s = &slice.virtual_machines.sizes["Standard_D2s_v3"];
        assert_eq!(d2s.price, 0.096);
    }

    #[test]
    fn test_region_fails_without_default_fallback() {
        let mut table = bundled().clone();
        table.container_instances.clear();
        let err = table.region("eastus").unwrap_err();
        assert!(err.to_string().contains("containerInstances"));
    }

    #[test]
    fn test_lookup_or_default() {
        let mut map = HashMap::new();
        map.insert("s1".to_string(), 1);
        map.insert("s2".to_string(), 2);
        assert_eq!(lookup_or_default(&map, "s2", "s1"), Some(&2));
        assert_eq!(lookup_or_default(&map, "s9", "s1"), Some(&1));
        assert_eq!(lookup_or_default(&map, "s9", "s8"), None);
    }

    #[test]
    fn test_regions_lists_complete_regions_sorted() {
        let table = bundled();
        let regions = table.regions();
        assert_eq!(
            regions,
            vec![
                "centralus",
                "eastus",
                "southeastasia",
                "westeurope",
                "westus2"
            ]
        );
    }

    #[test]
    fn test_table_round_trips_through_json() {
        let table = bundled();
        let json = serde_json::to_vec(table).unwrap();
        let reparsed = PricingTable::from_json(&json).unwrap();
        assert_eq!(*table, reparsed);
    }
}
