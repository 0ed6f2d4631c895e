//! API Error Handling
//!
//! Error bodies use the same `message` key as successful responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use skiff_core::dto::deploy::DeployResponse;

/// API error type
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    /// The pipeline ran and failed at some stage
    DeploymentFailed(DeployResponse),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({ "message": msg })),
            )
                .into_response(),
            ApiError::DeploymentFailed(response) => {
                tracing::error!(
                    "Deployment {} failed: {}",
                    response.deployment_id,
                    response.message
                );
                (StatusCode::INTERNAL_SERVER_ERROR, Json(response)).into_response()
            }
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
