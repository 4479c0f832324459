//! Pricing Domain
//!
//! Cost estimation for four Azure service categories (Virtual Machines,
//! App Service, Functions, Container Instances) from a per-region pricing
//! table.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │ Calculator  │  ← Pure cost strategies, one per service kind
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │    Table    │  ← Pricing table model + bundled fallback data
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Loader    │  ← Remote fetch with bundled fallback
//! └─────────────┘
//! ```
//!
//! The calculator is stateless and does no I/O: callers assemble a
//! [`ServiceConfig`], pick a [`RegionPricing`] slice off a [`PricingTable`],
//! and get a [`CostEstimate`] back.

pub mod calculator;
pub mod error;
pub mod loader;
pub mod models;
pub mod table;

// Re-export commonly used types
pub use calculator::{
    estimate_cost, DEFAULT_APP_SIZE, DEFAULT_APP_TIER, DEFAULT_FUNCTION_PLAN, DEFAULT_STORAGE_TYPE,
    DEFAULT_VM_SIZE,
};
pub use error::{PricingError, PricingResult};
pub use loader::{LoaderConfig, PricingLoader, PricingSource};
pub use models::{
    AppServiceConfig, ContainerConfig, CostEstimate, CostLine, FunctionsConfig, OperatingSystem,
    ServiceConfig, ServiceKind, VmConfig,
};
pub use table::{PricingTable, RegionPricing, DEFAULT_REGION};
