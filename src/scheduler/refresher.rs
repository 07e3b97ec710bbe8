//! Periodic budget refresh.
//!
//! # Responsibilities
//! - Recalculate every known service's budget on a fixed interval
//! - Keep budgets warm independent of read traffic

use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time;

use crate::budget::{BudgetController, RefreshReport};
use crate::error::BudgetResult;
use crate::observability::metrics;

pub struct BudgetRefresher {
    controller: BudgetController,
    interval: Duration,
}

impl BudgetRefresher {
    pub fn new(controller: BudgetController, interval: Duration) -> Self {
        Self {
            controller,
            interval,
        }
    }

    /// Run until a shutdown signal arrives. A failed cycle never ends the loop.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(
            interval_secs = self.interval.as_secs(),
            "Budget refresher starting"
        );

        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = self.refresh_once().await {
                        tracing::debug!(error = %e, "Refresh cycle failed, retrying next tick");
                    }
                }
                _ = shutdown.recv() => {
                    tracing::info!("Budget refresher received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }

    /// One refresh cycle, logged and counted.
    pub async fn refresh_once(&self) -> BudgetResult<RefreshReport> {
        tracing::info!("Starting scheduled budget update");

        match self.controller.update_all_budgets().await {
            Ok(report) => {
                metrics::record_refresh(report.is_success());
                if report.is_success() {
                    tracing::info!(
                        refreshed = report.refreshed.len(),
                        "Budget update completed successfully"
                    );
                } else {
                    tracing::warn!(
                        refreshed = report.refreshed.len(),
                        failed = report.failed.len(),
                        "Budget update completed with failures"
                    );
                }
                Ok(report)
            }
            Err(e) => {
                metrics::record_refresh(false);
                tracing::error!(error = %e, "Error during budget update");
                Err(e)
            }
        }
    }
}
