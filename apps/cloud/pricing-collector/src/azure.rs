//! Azure Retail Prices client and table extraction
//!
//! Fetches retail price meters per service and region, then folds the
//! meters we track into the static table shape. Meters the response does
//! not cover keep their previous value, so a thin or failed response never
//! punches holes in the table.
//!
//! https://learn.microsoft.com/en-us/rest/api/cost-management/retail-prices/azure-retail-prices

use domain_pricing::table::{
    AppServicePricing, AppServiceTier, ContainerPricing, FunctionsPricing, InstancePrice,
    StoragePrice, VmPricing, VmSizePrice,
};
use domain_pricing::ServiceKind;
use serde::Deserialize;
use std::collections::HashMap;
use thiserror::Error;
use tracing::debug;

/// Error type for pricing API operations
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {0}")]
    Api(String),
}

pub type ProviderResult<T> = Result<T, ProviderError>;

/// Months in the table are priced at 730 hours when converting hourly meters
const HOURS_PER_MONTH: f64 = 730.0;
const SECONDS_PER_HOUR: f64 = 3600.0;

#[derive(Debug, Deserialize)]
pub struct AzurePriceResponse {
    #[serde(rename = "Items")]
    pub items: Vec<AzurePriceItem>,
    #[serde(rename = "NextPageLink")]
    pub next_page_link: Option<String>,
}

/// One retail price meter, reduced to the fields the extraction reads
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AzurePriceItem {
    pub retail_price: f64,
    pub meter_name: String,
    pub product_name: String,
    pub sku_name: String,
    pub unit_of_measure: String,
    #[serde(rename = "type")]
    pub price_type: String,
    #[serde(default)]
    pub arm_sku_name: Option<String>,
}

/// `serviceName` filter value for each table section
pub fn azure_service_name(kind: ServiceKind) -> &'static str {
    match kind {
        ServiceKind::Vm => "Virtual Machines",
        ServiceKind::AppService => "App Service",
        ServiceKind::Functions => "Azure Functions",
        ServiceKind::Containers => "Container Instances",
    }
}

/// Thin client over the Retail Prices API
pub struct AzurePricingClient {
    client: reqwest::Client,
    api_url: String,
}

impl AzurePricingClient {
    pub fn new(client: reqwest::Client, api_url: String) -> Self {
        Self { client, api_url }
    }

    /// Fetch all meters for one service in one region
    pub async fn fetch_service_prices(
        &self,
        service_name: &str,
        region: &str,
    ) -> ProviderResult<Vec<AzurePriceItem>> {
        let filter = format!(
            "serviceName eq '{service_name}' and armRegionName eq '{region}' and priceType eq 'Consumption'"
        );
        self.fetch_with_filter(&filter).await
    }

    async fn fetch_with_filter(&self, filter: &str) -> ProviderResult<Vec<AzurePriceItem>> {
        let url = format!("{}?$filter={}", self.api_url, urlencoding::encode(filter));

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(ProviderError::Api(format!(
                "pricing API returned status {}",
                response.status()
            )));
        }

        let data: AzurePriceResponse = response.json().await?;
        if data.next_page_link.is_some() {
            // The tracked meters fit comfortably in the first page
            debug!(filter = filter, "additional result pages ignored");
        }

        Ok(data.items)
    }

    /// Verify API connectivity
    pub async fn health_check(&self) -> ProviderResult<bool> {
        let url = format!("{}?$top=1", self.api_url);
        let response = self.client.get(&url).send().await?;
        Ok(response.status().is_success())
    }
}

/// Fold VM meters into the table shape. Every size and storage kind of the
/// previous table stays present; matched meters overwrite the price.
pub fn extract_vm_pricing(items: &[AzurePriceItem], previous: &VmPricing) -> VmPricing {
    let usable: Vec<&AzurePriceItem> = items
        .iter()
        .filter(|i| {
            i.price_type == "Consumption"
                && !i.product_name.contains("Spot")
                && !i.product_name.contains("Low Priority")
        })
        .collect();

    let mut sizes = HashMap::new();
    for (size_name, prev) in &previous.sizes {
        let linux = find_vm_price(&usable, size_name, false);
        let windows = find_vm_price(&usable, size_name, true);

        let price = linux.unwrap_or(prev.price);
        // The table stores the Windows surcharge, not the absolute price
        let windows_premium = match (linux, windows) {
            (Some(l), Some(w)) if w > l => Some(w - l),
            _ => prev.windows_premium,
        };

        sizes.insert(
            size_name.clone(),
            VmSizePrice {
                price,
                windows_premium,
            },
        );
    }

    let mut storage = HashMap::new();
    for (kind, prev) in &previous.storage {
        let price = find_storage_price(items, kind).unwrap_or(prev.price);
        storage.insert(kind.clone(), StoragePrice { price });
    }

    VmPricing { sizes, storage }
}

fn find_vm_price(items: &[&AzurePriceItem], size_name: &str, windows: bool) -> Option<f64> {
    items
        .iter()
        .find(|i| {
            i.arm_sku_name.as_deref() == Some(size_name)
                && i.product_name.contains("Windows") == windows
        })
        .map(|i| i.retail_price)
}

fn find_storage_price(items: &[AzurePriceItem], kind: &str) -> Option<f64> {
    let product_fragment = match kind {
        "standard-hdd" => "Standard HDD",
        "standard-ssd" => "Standard SSD",
        "premium-ssd" => "Premium SSD",
        _ => return None,
    };

    items
        .iter()
        .find(|i| i.product_name.contains(product_fragment) && i.meter_name.contains("Disk"))
        .map(|i| i.retail_price)
}

/// Fold App Service meters into the table shape. Plan sizes surface as
/// `skuName` ("S1", "B2", ...); hourly meters are converted to the table's
/// flat monthly figures.
pub fn extract_app_service_pricing(
    items: &[AzurePriceItem],
    previous: &AppServicePricing,
) -> AppServicePricing {
    let mut tiers = HashMap::new();
    for (tier_name, tier) in &previous.tiers {
        let mut sizes = HashMap::new();
        for (size_name, prev) in &tier.sizes {
            let matched = items
                .iter()
                .find(|i| i.sku_name.eq_ignore_ascii_case(size_name));

            let price = matched
                .and_then(|i| monthly_price(i.retail_price, &i.unit_of_measure))
                .unwrap_or(prev.price);

            sizes.insert(size_name.clone(), InstancePrice { price });
        }
        tiers.insert(tier_name.clone(), AppServiceTier { sizes });
    }

    AppServicePricing { tiers }
}

fn monthly_price(retail_price: f64, unit_of_measure: &str) -> Option<f64> {
    if unit_of_measure.contains("Month") {
        Some(retail_price)
    } else if unit_of_measure.contains("Hour") {
        Some(retail_price * HOURS_PER_MONTH)
    } else {
        None
    }
}

/// Functions consumption meters are quoted in bulk units (per 10 executions,
/// per 50,000 GB-seconds) that the table does not track; the previous plan
/// prices are carried forward unchanged.
pub fn extract_functions_pricing(
    items: &[AzurePriceItem],
    previous: &FunctionsPricing,
) -> FunctionsPricing {
    if !items.is_empty() {
        debug!(count = items.len(), "functions meters carried forward");
    }
    previous.clone()
}

/// Fold Container Instances meters into per-second prices
pub fn extract_container_pricing(
    items: &[AzurePriceItem],
    previous: &ContainerPricing,
) -> ContainerPricing {
    let cpu_price = items
        .iter()
        .find(|i| i.meter_name.contains("vCPU Duration"))
        .and_then(per_second_price)
        .unwrap_or(previous.cpu_price);

    let memory_price = items
        .iter()
        .find(|i| i.meter_name.contains("Memory Duration"))
        .and_then(per_second_price)
        .unwrap_or(previous.memory_price);

    ContainerPricing {
        cpu_price,
        memory_price,
    }
}

fn per_second_price(item: &AzurePriceItem) -> Option<f64> {
    let unit = item.unit_of_measure.as_str();
    if unit.contains("Second") {
        Some(item.retail_price)
    } else if unit.contains("Hour") {
        Some(item.retail_price / SECONDS_PER_HOUR)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain_pricing::table;

    fn item(
        meter_name: &str,
        product_name: &str,
        sku_name: &str,
        arm_sku_name: Option<&str>,
        unit_of_measure: &str,
        retail_price: f64,
    ) -> AzurePriceItem {
        AzurePriceItem {
            retail_price,
            meter_name: meter_name.to_string(),
            product_name: product_name.to_string(),
            sku_name: sku_name.to_string(),
            unit_of_measure: unit_of_measure.to_string(),
            price_type: "Consumption".to_string(),
            arm_sku_name: arm_sku_name.map(str::to_string),
        }
    }

    fn eastus_vm() -> VmPricing {
        table::bundled().virtual_machines["eastus"].clone()
    }

    #[test]
    fn test_vm_extraction_updates_linux_price_and_premium() {
        let items = vec![
            item(
                "D2s v3",
                "Virtual Machines Dsv3 Series",
                "D2s v3",
                Some("Standard_D2s_v3"),
                "1 Hour",
                0.101,
            ),
            item(
                "D2s v3",
                "Virtual Machines Dsv3 Series Windows",
                "D2s v3",
                Some("Standard_D2s_v3"),
                "1 Hour",
                0.193,
            ),
        ];

        let pricing = extract_vm_pricing(&items, &eastus_vm());
        let d2s = &pricing.sizes["Standard_D2s_v3"];
        assert_eq!(d2s.price, 0.101);
        assert!((d2s.windows_premium.unwrap() - 0.092).abs() < 1e-12);
    }

    #[test]
    fn test_vm_extraction_skips_spot_meters() {
        let items = vec![item(
            "D2s v3 Spot",
            "Virtual Machines Dsv3 Series Spot",
            "D2s v3 Spot",
            Some("Standard_D2s_v3"),
            "1 Hour",
            0.011,
        )];

        let pricing = extract_vm_pricing(&items, &eastus_vm());
        // Spot meter ignored; previous price carried forward
        assert_eq!(pricing.sizes["Standard_D2s_v3"].price, 0.096);
    }

    #[test]
    fn test_vm_extraction_carries_previous_when_no_match() {
        let previous = eastus_vm();
        let pricing = extract_vm_pricing(&[], &previous);
        assert_eq!(pricing, previous);
    }

    #[test]
    fn test_storage_extraction_matches_disk_meters() {
        let items = vec![item(
            "E10 Disks",
            "Standard SSD Managed Disks",
            "E10",
            None,
            "1/Month",
            0.082,
        )];

        let pricing = extract_vm_pricing(&items, &eastus_vm());
        assert_eq!(pricing.storage["standard-ssd"].price, 0.082);
        assert_eq!(pricing.storage["standard-hdd"].price, 0.05);
    }

    #[test]
    fn test_app_service_hourly_meter_converts_to_monthly() {
        let previous = table::bundled().app_service["eastus"].clone();
        let items = vec![item(
            "S1 App",
            "Standard Plan",
            "S1",
            None,
            "1 Hour",
            0.10,
        )];

        let pricing = extract_app_service_pricing(&items, &previous);
        assert_eq!(pricing.tiers["standard"].sizes["s1"].price, 73.0);
        // Unmatched sizes keep their previous price
        assert_eq!(pricing.tiers["basic"].sizes["b1"].price, 54.75);
    }

    #[test]
    fn test_functions_pricing_carries_forward() {
        let previous = table::bundled().functions["eastus"].clone();
        let items = vec![item(
            "Total Executions",
            "Functions",
            "Standard",
            None,
            "10",
            0.000002,
        )];

        let pricing = extract_functions_pricing(&items, &previous);
        assert_eq!(pricing, previous);
    }

    #[test]
    fn test_container_extraction_converts_hourly_to_per_second() {
        let previous = table::bundled().container_instances["eastus"].clone();
        let items = vec![
            item(
                "vCPU Duration",
                "Container Instances",
                "Standard",
                None,
                "1 Hour",
                0.0774,
            ),
            item(
                "Memory Duration",
                "Container Instances",
                "Standard",
                None,
                "1 Second",
                0.0000030,
            ),
        ];

        let pricing = extract_container_pricing(&items, &previous);
        assert!((pricing.cpu_price - 0.0774 / 3600.0).abs() < 1e-12);
        assert_eq!(pricing.memory_price, 0.0000030);
    }

    #[test]
    fn test_container_extraction_ignores_unknown_units() {
        let previous = table::bundled().container_instances["eastus"].clone();
        let items = vec![item(
            "vCPU Duration",
            "Container Instances",
            "Standard",
            None,
            "100 Units",
            42.0,
        )];

        let pricing = extract_container_pricing(&items, &previous);
        assert_eq!(pricing.cpu_price, previous.cpu_price);
    }

    #[test]
    fn test_azure_service_names() {
        assert_eq!(azure_service_name(ServiceKind::Vm), "Virtual Machines");
        assert_eq!(azure_service_name(ServiceKind::AppService), "App Service");
        assert_eq!(azure_service_name(ServiceKind::Functions), "Azure Functions");
        assert_eq!(
            azure_service_name(ServiceKind::Containers),
            "Container Instances"
        );
    }
}
