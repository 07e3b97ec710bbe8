use std::collections::HashMap;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::aggregator::ServiceMetrics;
use crate::analysis::{analyze, LatencyStats};
use crate::api::error::ApiError;
use crate::api::AppState;
use crate::budget::{decision_description, HealthStatus, RetryBudget, RetryDecision};
use crate::error::validate_service_name;
use crate::resilience::RequestLog;

type ApiResult<T> = Result<Json<T>, ApiError>;

#[derive(Serialize)]
pub struct RetryCheck {
    pub service_name: String,
    pub decision: RetryDecision,
    pub description: &'static str,
    pub allowed: bool,
    pub remaining_budget: u32,
    pub health_status: HealthStatus,
}

#[derive(Serialize)]
pub struct UpdateAllSummary {
    pub refreshed: Vec<String>,
    pub failed: Vec<FailedRefresh>,
}

#[derive(Serialize)]
pub struct FailedRefresh {
    pub service_name: String,
    pub error: String,
}

#[derive(Debug, Deserialize)]
pub struct RecordRequest {
    pub service_name: String,
    pub latency_ms: u64,
    pub success: bool,
}

pub async fn get_budget(
    State(state): State<AppState>,
    Path(service): Path<String>,
) -> ApiResult<RetryBudget> {
    validate_service_name(&service)?;
    Ok(Json(state.controller.get_budget(&service).await?))
}

pub async fn calculate_budget(
    State(state): State<AppState>,
    Path(service): Path<String>,
) -> ApiResult<RetryBudget> {
    validate_service_name(&service)?;
    Ok(Json(state.controller.calculate_budget(&service).await?))
}

pub async fn check_retry(
    State(state): State<AppState>,
    Path(service): Path<String>,
) -> ApiResult<RetryCheck> {
    validate_service_name(&service)?;
    let (decision, budget) = state.agent.check(&service).await?;
    Ok(Json(RetryCheck {
        service_name: service,
        decision,
        description: decision_description(decision),
        allowed: decision == RetryDecision::Allow,
        remaining_budget: budget.remaining_budget,
        health_status: budget.health_status,
    }))
}

pub async fn consume_budget(
    State(state): State<AppState>,
    Path(service): Path<String>,
) -> ApiResult<RetryBudget> {
    validate_service_name(&service)?;
    Ok(Json(state.agent.consume_budget(&service).await?))
}

pub async fn update_all(State(state): State<AppState>) -> ApiResult<UpdateAllSummary> {
    let report = state.controller.update_all_budgets().await?;
    Ok(Json(UpdateAllSummary {
        refreshed: report.refreshed,
        failed: report
            .failed
            .into_iter()
            .map(|(service_name, e)| FailedRefresh {
                service_name,
                error: e.to_string(),
            })
            .collect(),
    }))
}

pub async fn get_metrics(
    State(state): State<AppState>,
    Path(service): Path<String>,
) -> ApiResult<ServiceMetrics> {
    validate_service_name(&service)?;
    Ok(Json(state.aggregator.get_metrics(&service).await?))
}

pub async fn record_request(
    State(state): State<AppState>,
    Json(body): Json<RecordRequest>,
) -> ApiResult<ServiceMetrics> {
    validate_service_name(&body.service_name)?;
    Ok(Json(
        state
            .aggregator
            .record_request(&body.service_name, body.latency_ms, body.success)
            .await?,
    ))
}

pub async fn record_retry(
    State(state): State<AppState>,
    Path(service): Path<String>,
) -> ApiResult<ServiceMetrics> {
    validate_service_name(&service)?;
    Ok(Json(state.aggregator.record_retry(&service).await?))
}

pub async fn get_latency(
    State(state): State<AppState>,
    Path(service): Path<String>,
) -> ApiResult<LatencyStats> {
    validate_service_name(&service)?;
    let metrics = state.aggregator.get_metrics(&service).await?;
    Ok(Json(analyze(&metrics)))
}

pub async fn reset_metrics(
    State(state): State<AppState>,
    Path(service): Path<String>,
) -> ApiResult<ServiceMetrics> {
    validate_service_name(&service)?;
    Ok(Json(state.aggregator.reset_metrics(&service).await?))
}

pub async fn get_logs(
    State(state): State<AppState>,
    Path(service): Path<String>,
) -> ApiResult<Vec<RequestLog>> {
    validate_service_name(&service)?;
    Ok(Json(state.logs.recent(&service)))
}

pub async fn get_all_logs(
    State(state): State<AppState>,
) -> Json<HashMap<String, Vec<RequestLog>>> {
    Json(state.logs.all())
}

pub async fn clear_logs(State(state): State<AppState>) -> StatusCode {
    state.logs.clear();
    tracing::info!("Request logs cleared");
    StatusCode::NO_CONTENT
}
