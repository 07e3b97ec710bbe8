//! Latency-aware retry budget service.
//!
//! # Architecture Overview
//!
//! ```text
//!   caller outcome ──▶ MetricsAggregator ──▶ metrics:<svc> ─┐
//!                                                            │   KeyValueStore
//!   retry check ─────▶ EnforcementAgent ──▶ BudgetController ┼─▶ (TTL 300s)
//!                          │                    │            │
//!                          │                    ▼            │
//!                          │        LatencyStats + factors   │
//!                          │                    │            │
//!                          ▼                    ▼            │
//!                 ALLOW / DEFER / DENY    budget:<svc> ──────┘
//!
//!   BudgetRefresher (every update_interval_secs) ──▶ update_all_budgets
//!   StoreJanitor (every purge_interval_secs) ──▶ purge expired entries
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use retry_budget::clock::SystemClock;
use retry_budget::config::loader::load_config;
use retry_budget::observability::{logging, metrics};
use retry_budget::scheduler::StoreJanitor;
use retry_budget::store::InMemoryStore;
use retry_budget::{api, BudgetConfig, Components, Shutdown};

#[derive(Parser)]
#[command(name = "retry-budget")]
#[command(about = "Adaptive retry budget service", long_about = None)]
struct Args {
    /// Path to a TOML configuration file. Defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => BudgetConfig::default(),
    };

    logging::init_logging(&config.observability);
    tracing::info!("retry-budget v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        base_budget = config.base_budget,
        update_interval_secs = config.update_interval_secs,
        healthy_p95_ms = config.latency_thresholds.healthy_p95_ms,
        degraded_p95_ms = config.latency_thresholds.degraded_p95_ms,
        critical_p99_ms = config.latency_thresholds.critical_p99_ms,
        critical_error_percent = config.error_rate_thresholds.critical_percent,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let clock = Arc::new(SystemClock);
    let store = InMemoryStore::with_clock(clock.clone());
    let components = Components::build(config.clone(), Arc::new(store.clone()), clock);

    let shutdown = Shutdown::new();

    let refresher = components.refresher();
    let refresher_shutdown = shutdown.subscribe();
    let refresher_task = tokio::spawn(async move {
        refresher.run(refresher_shutdown).await;
    });

    let janitor = StoreJanitor::new(store, config.store.purge_interval());
    let janitor_task = tokio::spawn(janitor.run(shutdown.subscribe()));

    let listener = TcpListener::bind(&config.api.bind_address).await?;
    let server_task = tokio::spawn(api::serve(
        components.app_state(),
        listener,
        shutdown.subscribe(),
    ));

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown signal received");
    shutdown.trigger();

    if let Err(e) = refresher_task.await {
        tracing::error!(error = %e, "Budget refresher task failed");
    }
    if let Err(e) = janitor_task.await {
        tracing::error!(error = %e, "Store janitor task failed");
    }
    server_task.await??;

    tracing::info!("Shutdown complete");
    Ok(())
}
