//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → BudgetConfig (validated, immutable)
//!     → cloned into aggregator, controller, executor
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use schema::BudgetConfig;
pub use schema::{
    ApiConfig, ClientConfig, ErrorRateThresholds, LatencyThresholds, ObservabilityConfig,
    StoreConfig,
};
