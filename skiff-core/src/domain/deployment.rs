//! Deployment domain types

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::stage::Stage;

/// Message reported for a run that finished every stage
pub const SUCCESS_MESSAGE: &str = "Deployment successful!";

/// One request to deploy a repository
///
/// Created per trigger and dropped when the pipeline finishes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployRequest {
    pub id: Uuid,
    pub repository_url: String,
    pub requested_at: chrono::DateTime<chrono::Utc>,
}

impl DeployRequest {
    pub fn new(repository_url: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            repository_url: repository_url.into(),
            requested_at: chrono::Utc::now(),
        }
    }
}

/// Result of a deployment run
///
/// Exactly one of these is produced per run. A failure carries the stage
/// of the first fatal error and its message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum DeployOutcome {
    Success,
    Failure { stage: Stage, message: String },
}

impl DeployOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, DeployOutcome::Success)
    }

    /// Failing stage, if any
    pub fn stage(&self) -> Option<Stage> {
        match self {
            DeployOutcome::Success => None,
            DeployOutcome::Failure { stage, .. } => Some(*stage),
        }
    }

    /// User-visible message
    pub fn message(&self) -> &str {
        match self {
            DeployOutcome::Success => SUCCESS_MESSAGE,
            DeployOutcome::Failure { message, .. } => message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_outcome() {
        let outcome = DeployOutcome::Success;
        assert!(outcome.is_success());
        assert_eq!(outcome.stage(), None);
        assert_eq!(outcome.message(), SUCCESS_MESSAGE);
    }

    #[test]
    fn test_failure_outcome_serialization() {
        let outcome = DeployOutcome::Failure {
            stage: Stage::Fetch,
            message: "Failed to clone repository: repository not found".to_string(),
        };

        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "failure");
        assert_eq!(json["stage"], "fetch");
        assert_eq!(
            json["message"],
            "Failed to clone repository: repository not found"
        );
    }

    #[test]
    fn test_requests_get_distinct_ids() {
        let a = DeployRequest::new("https://example.com/ok.git");
        let b = DeployRequest::new("https://example.com/ok.git");
        assert_ne!(a.id, b.id);
        assert_eq!(a.repository_url, "https://example.com/ok.git");
    }
}
