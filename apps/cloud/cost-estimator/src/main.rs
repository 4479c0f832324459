//! Cost Estimator CLI
//!
//! Builds a service configuration from flags, loads a pricing table (from a
//! configured endpoint, falling back to the bundled one), runs the cost
//! calculator and prints the estimate.

use clap::{Parser, Subcommand, ValueEnum};
use core_config::Environment;
use core_config::tracing::{init_tracing, install_color_eyre};
use domain_pricing::{
    AppServiceConfig, ContainerConfig, FunctionsConfig, LoaderConfig, OperatingSystem,
    PricingLoader, PricingSource, ServiceConfig, ServiceKind, VmConfig,
};
use eyre::Result;

mod render;

#[derive(Parser)]
#[command(name = "cost-estimator")]
#[command(about = "Estimate Azure service costs from the pricing table")]
struct Cli {
    /// Region to price against
    #[arg(long, global = true, default_value = "eastus")]
    region: String,

    /// URL serving a current pricing table (bundled table used when omitted
    /// or unreachable)
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

fn parse_os(raw: &str) -> Result<OperatingSystem, String> {
    raw.parse()
        .map_err(|_| format!("invalid operating system '{raw}', expected linux or windows"))
}

#[derive(Subcommand)]
enum Commands {
    /// Virtual Machines
    Vm {
        /// VM size identifier
        #[arg(long, default_value = "Standard_D2s_v3")]
        size: String,

        /// Guest operating system (linux or windows)
        #[arg(long, default_value_t = OperatingSystem::Linux, value_parser = parse_os)]
        os: OperatingSystem,

        #[arg(long, default_value_t = 1)]
        instances: u32,

        /// Usage hours per day
        #[arg(long, default_value_t = 24.0)]
        hours: f64,

        /// Managed disk kind
        #[arg(long, default_value = "standard-hdd")]
        storage_type: String,

        /// Disk size in GB
        #[arg(long, default_value_t = 100.0)]
        storage_size: f64,
    },

    /// App Service plans
    AppService {
        #[arg(long, default_value = "standard")]
        tier: String,

        /// Size identifier within the tier
        #[arg(long, default_value = "s1")]
        size: String,

        #[arg(long, default_value_t = 1)]
        instances: u32,
    },

    /// Azure Functions
    Functions {
        /// Hosting plan (consumption, premium, dedicated)
        #[arg(long, default_value = "consumption")]
        plan: String,

        /// Executions per month
        #[arg(long, default_value_t = 1_000_000)]
        executions: u64,

        /// Memory per execution, in GB
        #[arg(long, default_value_t = 0.5)]
        memory: f64,

        /// Average execution duration, in milliseconds
        #[arg(long, default_value_t = 500.0)]
        execution_time: f64,
    },

    /// Container Instances
    Containers {
        #[arg(long, default_value_t = 1.0)]
        cpu: f64,

        /// Memory in GB
        #[arg(long, default_value_t = 1.0)]
        memory: f64,

        /// Usage hours per day
        #[arg(long, default_value_t = 24.0)]
        hours: f64,

        /// Usage days per month
        #[arg(long, default_value_t = 30.0)]
        days: f64,
    },
}

impl Commands {
    /// The service kind and configuration this invocation describes
    fn service_config(&self, region: &str) -> (ServiceKind, ServiceConfig) {
        match self {
            Commands::Vm {
                size,
                os,
                instances,
                hours,
                storage_type,
                storage_size,
            } => (
                ServiceKind::Vm,
                ServiceConfig::Vm(VmConfig {
                    region: region.to_string(),
                    size: size.clone(),
                    os: *os,
                    instances: *instances,
                    hours_per_day: *hours,
                    storage_type: storage_type.clone(),
                    storage_size_gb: *storage_size,
                }),
            ),
            Commands::AppService {
                tier,
                size,
                instances,
            } => (
                ServiceKind::AppService,
                ServiceConfig::AppService(AppServiceConfig {
                    region: region.to_string(),
                    tier: tier.clone(),
                    size: size.clone(),
                    instances: *instances,
                }),
            ),
            Commands::Functions {
                plan,
                executions,
                memory,
                execution_time,
            } => (
                ServiceKind::Functions,
                ServiceConfig::Functions(FunctionsConfig {
                    region: region.to_string(),
                    plan: plan.clone(),
                    executions_per_month: *executions,
                    memory_gb: *memory,
                    execution_time_ms: *execution_time,
                }),
            ),
            Commands::Containers {
                cpu,
                memory,
                hours,
                days,
            } => (
                ServiceKind::Containers,
                ServiceConfig::Containers(ContainerConfig {
                    region: region.to_string(),
                    vcpus: *cpu,
                    memory_gb: *memory,
                    hours_per_day: *hours,
                    days_per_month: *days,
                }),
            ),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    install_color_eyre();

    let environment = Environment::from_env();
    init_tracing(&environment);

    let cli = Cli::parse();
    let (kind, config) = cli.command.service_config(&cli.region);

    let loader = PricingLoader::new(LoaderConfig {
        endpoint: cli.endpoint.clone(),
        ..LoaderConfig::default()
    });
    let table = loader.load().await;
    let pricing = table.region(&cli.region)?;

    let kind = kind.to_string();
    let estimate = domain_pricing::estimate_cost(&kind, &config, &pricing)?;

    match cli.format {
        OutputFormat::Table => print!("{}", render::render_table(&kind, &cli.region, &estimate)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&estimate)?),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_vm_subcommand_builds_vm_config() {
        let cli = Cli::parse_from([
            "cost-estimator",
            "--region",
            "westeurope",
            "vm",
            "--os",
            "windows",
            "--storage-type",
            "premium-ssd",
        ]);
        let (kind, config) = cli.command.service_config(&cli.region);

        assert_eq!(kind, ServiceKind::Vm);
        match config {
            ServiceConfig::Vm(vm) => {
                assert_eq!(vm.region, "westeurope");
                assert_eq!(vm.os, OperatingSystem::Windows);
                assert_eq!(vm.storage_type, "premium-ssd");
                assert_eq!(vm.instances, 1);
            }
            other => panic!("expected VM config, got {other:?}"),
        }
    }

    #[test]
    fn test_functions_subcommand_defaults() {
        let cli = Cli::parse_from(["cost-estimator", "functions"]);
        let (kind, config) = cli.command.service_config(&cli.region);

        assert_eq!(kind, ServiceKind::Functions);
        match config {
            ServiceConfig::Functions(f) => {
                assert_eq!(f.plan, "consumption");
                assert_eq!(f.executions_per_month, 1_000_000);
            }
            other => panic!("expected Functions config, got {other:?}"),
        }
    }
}
