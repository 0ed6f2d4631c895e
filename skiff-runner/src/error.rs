//! Error types for the deployment pipeline
//!
//! One variant per pipeline stage. The `Display` output of each variant is
//! the message returned to whoever triggered the deployment.

use skiff_core::domain::deployment::DeployOutcome;
use skiff_core::domain::stage::Stage;
use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, DeployError>;

/// Fatal error in one pipeline stage
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeployError {
    /// Cloning the repository failed
    #[error("Failed to clone repository: {0}")]
    Fetch(String),

    /// Building the image failed
    #[error("Failed to build Docker image: {0}")]
    Build(String),

    /// Tagging the image with its registry name failed
    #[error("Failed to tag Docker image: {0}")]
    Tag(String),

    /// Pushing the image to the registry failed
    #[error("Failed to push Docker image: {0}")]
    Publish(String),

    /// Replacing the container on the remote host failed
    #[error("Failed to deploy on remote host: {0}")]
    Remote(#[from] RemoteError),
}

/// Fatal error in the remote deployer
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    /// Opening or authenticating the session failed
    #[error("SSH connection failed: {0}")]
    Connect(String),

    /// A remote command failed
    #[error("Command failed: {command}\nError: {stderr}")]
    Command {
        stage: Stage,
        command: String,
        stderr: String,
    },
}

impl RemoteError {
    pub fn stage(&self) -> Stage {
        match self {
            RemoteError::Connect(_) => Stage::Connect,
            RemoteError::Command { stage, .. } => *stage,
        }
    }
}

impl DeployError {
    /// Stage that produced the error
    pub fn stage(&self) -> Stage {
        match self {
            DeployError::Fetch(_) => Stage::Fetch,
            DeployError::Build(_) => Stage::Build,
            DeployError::Tag(_) => Stage::Tag,
            DeployError::Publish(_) => Stage::Publish,
            DeployError::Remote(err) => err.stage(),
        }
    }

    /// Converts the error into the failure reported to the caller
    pub fn into_outcome(self) -> DeployOutcome {
        DeployOutcome::Failure {
            stage: self.stage(),
            message: self.to_string(),
        }
    }
}
