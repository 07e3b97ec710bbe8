//! Latency analysis subsystem.
//!
//! # Data Flow
//! ```text
//! ServiceMetrics.latencies
//!     → percentile.rs (p50/p95/p99, mean, stddev)
//!     → latency.rs (LatencyStats snapshot)
//!     → health.rs (latency factor, error factor, budget, health status)
//! ```
//!
//! # Design Decisions
//! - Everything here is pure and synchronous
//! - Empty or zero input degrades to defaults, never to an error

pub mod health;
pub mod latency;
pub mod percentile;

pub use health::{Assessment, HealthCalculator};
pub use latency::{analyze, LatencyStats};
