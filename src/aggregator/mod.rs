//! Metrics aggregation subsystem.
//!
//! # Data Flow
//! ```text
//! caller outcome (service, latency, success)
//!     → aggregator.rs (load snapshot, update, save)
//!     → service_metrics.rs (counters + bounded latency samples)
//!     → MetricsRepository (metrics:<service>)
//! ```
//!
//! # Design Decisions
//! - The aggregator is the only writer of ServiceMetrics
//! - Sample buffer is a bounded FIFO, never shared by reference
//! - Store errors propagate unchanged

#[allow(clippy::module_inception)]
pub mod aggregator;
pub mod service_metrics;

pub use aggregator::MetricsAggregator;
pub use service_metrics::{LatencySamples, ServiceMetrics, SAMPLE_CAPACITY};
