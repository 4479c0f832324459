use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use validator::Validate;

/// Billable service category enumeration
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, Hash,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum ServiceKind {
    Vm,
    /// Accepts the generic `appHosting` spelling as an alias
    #[strum(to_string = "appService", serialize = "appHosting")]
    AppService,
    Functions,
    Containers,
}

/// Guest operating system for VM billing
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, Default, Hash,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum OperatingSystem {
    #[default]
    Linux,
    Windows,
}

/// Virtual Machine configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct VmConfig {
    /// Region code (e.g. "eastus")
    pub region: String,
    /// VM size identifier (e.g. "Standard_D2s_v3")
    pub size: String,
    pub os: OperatingSystem,
    pub instances: u32,
    /// Usage hours per day
    #[validate(range(min = 0.0, max = 24.0))]
    pub hours_per_day: f64,
    /// Managed disk kind (e.g. "standard-ssd")
    pub storage_type: String,
    #[validate(range(min = 0.0))]
    pub storage_size_gb: f64,
}

/// App Service plan configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AppServiceConfig {
    pub region: String,
    /// Tier name (e.g. "standard")
    pub tier: String,
    /// Size identifier within the tier (e.g. "s1")
    pub size: String,
    pub instances: u32,
}

/// Azure Functions configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct FunctionsConfig {
    pub region: String,
    /// Hosting plan name ("consumption", "premium", "dedicated")
    pub plan: String,
    pub executions_per_month: u64,
    /// Memory allocated per execution, in GB
    #[validate(range(min = 0.0))]
    pub memory_gb: f64,
    /// Average execution duration, in milliseconds
    #[validate(range(min = 0.0))]
    pub execution_time_ms: f64,
}

/// Container Instances configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ContainerConfig {
    pub region: String,
    #[validate(range(min = 0.0))]
    pub vcpus: f64,
    #[validate(range(min = 0.0))]
    pub memory_gb: f64,
    #[validate(range(min = 0.0, max = 24.0))]
    pub hours_per_day: f64,
    #[validate(range(min = 0.0, max = 31.0))]
    pub days_per_month: f64,
}

/// Per-kind configuration supplied by the caller.
///
/// Numeric fields are expected to be finite and non-negative; range/type
/// validation is the caller's responsibility (the `Validate` derives on the
/// per-service structs are the tool for that). Zero-usage configurations are
/// valid and produce zero-cost estimates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "service", rename_all = "camelCase")]
pub enum ServiceConfig {
    Vm(VmConfig),
    AppService(AppServiceConfig),
    Functions(FunctionsConfig),
    Containers(ContainerConfig),
}

impl ServiceConfig {
    /// Region the configuration was built for
    pub fn region(&self) -> &str {
        match self {
            ServiceConfig::Vm(c) => &c.region,
            ServiceConfig::AppService(c) => &c.region,
            ServiceConfig::Functions(c) => &c.region,
            ServiceConfig::Containers(c) => &c.region,
        }
    }
}

/// One named monthly sub-cost contributing to the total
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostLine {
    pub name: String,
    pub monthly_cost: f64,
}

impl CostLine {
    pub fn new(name: impl Into<String>, monthly_cost: f64) -> Self {
        Self {
            name: name.into(),
            monthly_cost,
        }
    }
}

/// Cost estimate across the four billing periods, with a per-resource
/// monthly breakdown. Owned by the caller; the engine holds no state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostEstimate {
    pub hourly: f64,
    pub daily: f64,
    pub monthly: f64,
    pub yearly: f64,
    pub breakdown: Vec<CostLine>,
}

impl CostEstimate {
    /// Derive the other periods from a monthly total using the fixed
    /// 30-day / 24-hour month convention.
    pub fn from_monthly(monthly: f64, breakdown: Vec<CostLine>) -> Self {
        Self {
            hourly: monthly / (30.0 * 24.0),
            daily: monthly / 30.0,
            monthly,
            yearly: monthly * 12.0,
            breakdown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_service_kind_round_trip() {
        assert_eq!(ServiceKind::from_str("vm").unwrap(), ServiceKind::Vm);
        assert_eq!(
            ServiceKind::from_str("appService").unwrap(),
            ServiceKind::AppService
        );
        assert_eq!(
            ServiceKind::from_str("functions").unwrap(),
            ServiceKind::Functions
        );
        assert_eq!(
            ServiceKind::from_str("containers").unwrap(),
            ServiceKind::Containers
        );
        assert_eq!(ServiceKind::Vm.to_string(), "vm");
        assert_eq!(ServiceKind::AppService.to_string(), "appService");
    }

    #[test]
    fn test_service_kind_accepts_app_hosting_alias() {
        assert_eq!(
            ServiceKind::from_str("appHosting").unwrap(),
            ServiceKind::AppService
        );
    }

    #[test]
    fn test_service_kind_rejects_unknown() {
        assert!(ServiceKind::from_str("storage").is_err());
    }

    #[test]
    fn test_operating_system_display() {
        assert_eq!(OperatingSystem::Linux.to_string(), "linux");
        assert_eq!(OperatingSystem::Windows.to_string(), "windows");
    }

    #[test]
    fn test_from_monthly_fixed_convention() {
        let estimate = CostEstimate::from_monthly(720.0, vec![]);
        assert_eq!(estimate.hourly, 1.0);
        assert_eq!(estimate.daily, 24.0);
        assert_eq!(estimate.yearly, 8640.0);
        assert_eq!(estimate.hourly * 24.0, estimate.daily);
        assert_eq!(estimate.daily * 30.0, estimate.monthly);
        assert_eq!(estimate.monthly * 12.0, estimate.yearly);
    }

    #[test]
    fn test_vm_config_validation_bounds() {
        let config = VmConfig {
            region: "eastus".to_string(),
            size: "Standard_D2s_v3".to_string(),
            os: OperatingSystem::Linux,
            instances: 1,
            hours_per_day: 25.0,
            storage_type: "standard-hdd".to_string(),
            storage_size_gb: 128.0,
        };
        assert!(validator::Validate::validate(&config).is_err());
    }
}
