//! Mapping of budget errors onto HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::error::BudgetError;

/// Wrapper so handlers can return `Result<_, ApiError>` and use `?`.
#[derive(Debug)]
pub struct ApiError(pub BudgetError);

impl From<BudgetError> for ApiError {
    fn from(err: BudgetError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = self.0.to_string();
        match self.0 {
            BudgetError::BudgetExceeded { service, remaining } => (
                StatusCode::TOO_MANY_REQUESTS,
                Json(json!({
                    "error": "Retry Budget Exceeded",
                    "message": message,
                    "service_name": service,
                    "remaining_budget": remaining,
                })),
            )
                .into_response(),
            BudgetError::InvalidService(_) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "Invalid Service", "message": message })),
            )
                .into_response(),
            BudgetError::StoreUnavailable(_) => {
                tracing::error!(error = %message, "Store unavailable");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    Json(json!({ "error": "Store Unavailable", "message": message })),
                )
                    .into_response()
            }
            BudgetError::Serialization(_) => {
                tracing::error!(error = %message, "Corrupt record in store");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Internal Server Error", "message": message })),
                )
                    .into_response()
            }
        }
    }
}
