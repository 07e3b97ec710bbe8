//! Latency-aware retry budget library.
//!
//! Decides, per downstream service, whether a retry is allowed, deferred or
//! denied, based on a rolling view of the service's latency and error rate.

pub mod aggregator;
pub mod analysis;
pub mod api;
pub mod budget;
pub mod clock;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod scheduler;
pub mod store;

pub use config::schema::BudgetConfig;
pub use error::{BudgetError, BudgetResult};
pub use lifecycle::{Components, Shutdown};
