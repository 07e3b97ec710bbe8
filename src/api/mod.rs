//! Inspection HTTP API over the budget surface.
//!
//! # Routes
//! ```text
//! GET    /api/budget/{service}            current (cached) budget
//! POST   /api/budget/calculate/{service}  forced recalculation
//! GET    /api/budget/check/{service}      ALLOW / DEFER / DENY
//! POST   /api/budget/consume/{service}    spend one unit
//! POST   /api/budget/update-all           refresh every known service
//! GET    /api/metrics/{service}           metrics snapshot
//! POST   /api/metrics/record              record an outcome (JSON body)
//! POST   /api/metrics/retry/{service}     count a retry
//! GET    /api/metrics/latency/{service}   latency statistics
//! DELETE /api/metrics/{service}           reset metrics
//! GET    /api/logs                        recent request logs, every service
//! DELETE /api/logs                        clear every request log
//! GET    /api/logs/{service}              recent request log
//! ```

pub mod error;
pub mod handlers;

use std::net::SocketAddr;

use axum::{
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;

use crate::aggregator::MetricsAggregator;
use crate::budget::{BudgetController, EnforcementAgent};
use crate::resilience::RequestLogBook;
use self::handlers::*;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub aggregator: MetricsAggregator,
    pub controller: BudgetController,
    pub agent: EnforcementAgent,
    pub logs: RequestLogBook,
}

/// Build the API router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/budget/update-all", post(update_all))
        .route("/api/budget/calculate/{service}", post(calculate_budget))
        .route("/api/budget/check/{service}", get(check_retry))
        .route("/api/budget/consume/{service}", post(consume_budget))
        .route("/api/budget/{service}", get(get_budget))
        .route("/api/metrics/record", post(record_request))
        .route("/api/metrics/retry/{service}", post(record_retry))
        .route("/api/metrics/latency/{service}", get(get_latency))
        .route("/api/metrics/{service}", get(get_metrics).delete(reset_metrics))
        .route("/api/logs", get(get_all_logs).delete(clear_logs))
        .route("/api/logs/{service}", get(get_logs))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Serve the API until the shutdown signal fires.
pub async fn serve(
    state: AppState,
    listener: TcpListener,
    mut shutdown: broadcast::Receiver<()>,
) -> Result<(), std::io::Error> {
    let addr: SocketAddr = listener.local_addr()?;
    tracing::info!(address = %addr, "API server starting");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move {
            let _ = shutdown.recv().await;
        })
        .await?;

    tracing::info!("API server stopped");
    Ok(())
}
