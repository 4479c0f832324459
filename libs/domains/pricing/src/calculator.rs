//! Cost calculation engine
//!
//! Pure, stateless mapping from a service configuration plus a per-region
//! pricing slice to a [`CostEstimate`]. Dispatches on the service kind to one
//! of four strategies. No I/O, no shared state; concurrent invocations are
//! trivially safe.
//!
//! Unknown sizes, tiers, plans and storage kinds silently resolve to a
//! documented default through [`lookup_or_default`], so a stale or partial
//! table never blocks an estimate. Only an unknown *service kind* is an
//! error.

use std::str::FromStr;

use crate::error::{PricingError, PricingResult};
use crate::models::{
    AppServiceConfig, ContainerConfig, CostEstimate, CostLine, FunctionsConfig, OperatingSystem,
    ServiceConfig, ServiceKind, VmConfig,
};
use crate::table::{
    lookup_or_default, AppServicePricing, ContainerPricing, FunctionsPricing, RegionPricing,
    VmPricing,
};

/// Fallback VM size: the smallest general-purpose size
pub const DEFAULT_VM_SIZE: &str = "Standard_D2s_v3";
/// Fallback managed disk kind
pub const DEFAULT_STORAGE_TYPE: &str = "standard-hdd";
/// Fallback App Service tier and size within it
pub const DEFAULT_APP_TIER: &str = "standard";
pub const DEFAULT_APP_SIZE: &str = "s1";
/// Fallback Functions hosting plan
pub const DEFAULT_FUNCTION_PLAN: &str = "consumption";

/// Free grant: executions per month before per-execution billing starts
const FREE_EXECUTIONS_PER_MONTH: f64 = 1_000_000.0;
/// Free grant: GB-seconds per month before per-GB-second billing starts
const FREE_GB_SECONDS_PER_MONTH: f64 = 400_000.0;

const DAYS_PER_MONTH: f64 = 30.0;
const SECONDS_PER_HOUR: f64 = 3600.0;

/// Estimate the cost of a service configuration against a region's pricing.
///
/// `service_kind` is one of `vm`, `appService`, `functions`, `containers`;
/// anything else fails with [`PricingError::UnsupportedServiceKind`]. The
/// configuration variant must match the requested kind.
pub fn estimate_cost(
    service_kind: &str,
    config: &ServiceConfig,
    pricing: &RegionPricing<'_>,
) -> PricingResult<CostEstimate> {
    let kind = ServiceKind::from_str(service_kind)
        .map_err(|_| PricingError::UnsupportedServiceKind(service_kind.to_string()))?;

    match (kind, config) {
        (ServiceKind::Vm, ServiceConfig::Vm(c)) => vm_cost(c, pricing.virtual_machines),
        (ServiceKind::AppService, ServiceConfig::AppService(c)) => {
            app_service_cost(c, pricing.app_service)
        }
        (ServiceKind::Functions, ServiceConfig::Functions(c)) => {
            functions_cost(c, pricing.functions)
        }
        (ServiceKind::Containers, ServiceConfig::Containers(c)) => {
            container_cost(c, pricing.container_instances)
        }
        (kind, _) => Err(PricingError::InvalidInput(format!(
            "configuration does not match service kind '{kind}'"
        ))),
    }
}

/// Virtual Machines: per-hour compute (with optional Windows surcharge)
/// scaled by instances and usage hours, plus per-GB-month storage.
fn vm_cost(config: &VmConfig, pricing: &VmPricing) -> PricingResult<CostEstimate> {
    let size = lookup_or_default(&pricing.sizes, &config.size, DEFAULT_VM_SIZE)
        .ok_or_else(|| PricingError::NotFound(format!("VM size '{}'", config.size)))?;

    let mut instance_hourly = size.price;
    if config.os == OperatingSystem::Windows {
        if let Some(premium) = size.windows_premium {
            instance_hourly += premium;
        }
    }

    let compute_hourly = instance_hourly * f64::from(config.instances);
    let hours_per_month = config.hours_per_day * DAYS_PER_MONTH;
    let compute_monthly = compute_hourly * hours_per_month;

    let storage = lookup_or_default(&pricing.storage, &config.storage_type, DEFAULT_STORAGE_TYPE)
        .ok_or_else(|| PricingError::NotFound(format!("storage type '{}'", config.storage_type)))?;
    let storage_monthly = storage.price * config.storage_size_gb;

    let breakdown = vec![
        CostLine::new(
            format!("{} ({}) × {}", config.size, config.os, config.instances),
            compute_monthly,
        ),
        CostLine::new(
            format!(
                "{} Storage ({} GB)",
                config.storage_type, config.storage_size_gb
            ),
            storage_monthly,
        ),
    ];

    Ok(CostEstimate::from_monthly(
        compute_monthly + storage_monthly,
        breakdown,
    ))
}

/// App Service: flat monthly price per plan size, scaled by instances.
fn app_service_cost(
    config: &AppServiceConfig,
    pricing: &AppServicePricing,
) -> PricingResult<CostEstimate> {
    let tier = lookup_or_default(&pricing.tiers, &config.tier, DEFAULT_APP_TIER)
        .ok_or_else(|| PricingError::NotFound(format!("App Service tier '{}'", config.tier)))?;
    let size = lookup_or_default(&tier.sizes, &config.size, DEFAULT_APP_SIZE)
        .ok_or_else(|| PricingError::NotFound(format!("App Service size '{}'", config.size)))?;

    let monthly = size.price * f64::from(config.instances);

    let breakdown = vec![CostLine::new(
        format!(
            "{} Tier - {} × {}",
            config.tier.to_uppercase(),
            config.size.to_uppercase(),
            config.instances
        ),
        monthly,
    )];

    Ok(CostEstimate::from_monthly(monthly, breakdown))
}

/// Functions: consumption bills executions and GB-seconds past the free
/// grants; premium and dedicated plans bill a flat monthly instance price.
///
/// The plan name is resolved once up front (unknown names resolve to the
/// consumption plan) and the resolved name drives both the pricing lookup
/// and the branch selection, so the two can never diverge.
fn functions_cost(
    config: &FunctionsConfig,
    pricing: &FunctionsPricing,
) -> PricingResult<CostEstimate> {
    let (plan_name, plan) = pricing
        .plans
        .get_key_value(&config.plan)
        .or_else(|| pricing.plans.get_key_value(DEFAULT_FUNCTION_PLAN))
        .map(|(name, plan)| (name.as_str(), plan))
        .ok_or_else(|| PricingError::NotFound(format!("Functions plan '{}'", config.plan)))?;

    let mut execution_cost = 0.0;
    let mut memory_cost = 0.0;
    let mut instance_cost = 0.0;

    if plan_name == DEFAULT_FUNCTION_PLAN {
        let executions = config.executions_per_month as f64;
        let billable_executions = (executions - FREE_EXECUTIONS_PER_MONTH).max(0.0);
        execution_cost = billable_executions * plan.execution_price;

        // GB-seconds accrue over the full execution count; the free grant is
        // applied as a separate deduction afterwards.
        let gb_seconds = executions * (config.execution_time_ms / 1000.0) * config.memory_gb;
        let billable_gb_seconds = (gb_seconds - FREE_GB_SECONDS_PER_MONTH).max(0.0);
        memory_cost = billable_gb_seconds * plan.gb_second_price;
    } else {
        instance_cost = plan.instance_price;
    }

    let mut breakdown = Vec::new();
    if execution_cost > 0.0 {
        breakdown.push(CostLine::new(
            format!(
                "Executions ({} per month)",
                group_thousands(config.executions_per_month)
            ),
            execution_cost,
        ));
    }
    if memory_cost > 0.0 {
        breakdown.push(CostLine::new(
            format!("Memory consumption ({} GB)", config.memory_gb),
            memory_cost,
        ));
    }
    if instance_cost > 0.0 {
        breakdown.push(CostLine::new(
            format!("{plan_name} plan instances"),
            instance_cost,
        ));
    }

    Ok(CostEstimate::from_monthly(
        execution_cost + memory_cost + instance_cost,
        breakdown,
    ))
}

/// Container Instances: per-second vCPU and memory prices converted to an
/// hourly rate, then scaled by the configured hours/day and days/month.
///
/// This strategy deliberately keeps the original asymmetry: daily cost comes
/// from the configured hours per day and yearly from 365 actual days, not
/// the fixed 30 × 24 convention the other strategies use.
fn container_cost(
    config: &ContainerConfig,
    pricing: &ContainerPricing,
) -> PricingResult<CostEstimate> {
    let cpu_hourly = config.vcpus * pricing.cpu_price * SECONDS_PER_HOUR;
    let memory_hourly = config.memory_gb * pricing.memory_price * SECONDS_PER_HOUR;
    let hourly = cpu_hourly + memory_hourly;

    let hours_per_month = config.hours_per_day * config.days_per_month;
    let daily = hourly * config.hours_per_day;
    let monthly = hourly * hours_per_month;
    let yearly = daily * 365.0;

    let breakdown = vec![
        CostLine::new(
            format!("CPU ({} vCPU)", config.vcpus),
            cpu_hourly * hours_per_month,
        ),
        CostLine::new(
            format!("Memory ({} GB)", config.memory_gb),
            memory_hourly * hours_per_month,
        ),
    ];

    Ok(CostEstimate {
        hourly,
        daily,
        monthly,
        yearly,
        breakdown,
    })
}

/// Group an integer with thousands separators, e.g. 2000000 → "2,000,000"
fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}
