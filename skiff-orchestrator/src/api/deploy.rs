//! Deployment API Handler

use axum::{Json, extract::State, extract::rejection::JsonRejection};
use skiff_core::domain::deployment::DeployRequest;
use skiff_core::dto::deploy::{CreateDeploy, DeployResponse};

use crate::api::error::{ApiError, ApiResult};
use crate::state::AppState;

/// POST /deploy
/// Run the pipeline for `repoUrl` and report the outcome
///
/// Requests that arrive while a deployment is running wait for it to finish.
pub async fn deploy(
    State(state): State<AppState>,
    payload: Result<Json<CreateDeploy>, JsonRejection>,
) -> ApiResult<Json<DeployResponse>> {
    let Json(req) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let _guard = match state.deploy_lock.try_lock() {
        Ok(guard) => guard,
        Err(_) => {
            tracing::info!(
                "Deployment in progress, queueing request for {}",
                req.repo_url
            );
            state.deploy_lock.lock().await
        }
    };

    let request = DeployRequest::new(req.repo_url);
    tracing::info!("Deploying {} ({})", request.repository_url, request.id);

    let outcome = state.deployments.run_deployment(&request).await;
    let response = DeployResponse::from_outcome(&request, &outcome, chrono::Utc::now());

    if outcome.is_success() {
        Ok(Json(response))
    } else {
        Err(ApiError::DeploymentFailed(response))
    }
}
