//! Deployment DTOs

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::deployment::{DeployOutcome, DeployRequest};
use crate::domain::stage::Stage;

/// Request body for `POST /deploy`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDeploy {
    #[serde(rename = "repoUrl")]
    pub repo_url: String,
}

/// Response body for `POST /deploy`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployResponse {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<Stage>,
    pub deployment_id: Uuid,
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub finished_at: chrono::DateTime<chrono::Utc>,
}

impl DeployResponse {
    /// Builds the response for a finished run
    pub fn from_outcome(
        request: &DeployRequest,
        outcome: &DeployOutcome,
        finished_at: chrono::DateTime<chrono::Utc>,
    ) -> Self {
        Self {
            message: outcome.message().to_string(),
            stage: outcome.stage(),
            deployment_id: request.id,
            started_at: request.requested_at,
            finished_at,
        }
    }

    pub fn is_success(&self) -> bool {
        self.stage.is_none()
    }
}
