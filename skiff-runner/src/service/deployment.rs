//! Deployment service
//!
//! Runs one deployment end to end:
//! fetch -> build -> tag -> publish -> remote deploy.
//!
//! Steps run strictly in order and the first failure ends the run. Callers
//! must serialize runs: the workspace and the remote container name are
//! shared by every run.

use async_trait::async_trait;
use skiff_core::domain::deployment::{DeployOutcome, DeployRequest};
use std::sync::Arc;
use tracing::{Instrument, error, info, info_span};

use crate::config::Config;
use crate::error::{DeployError, RemoteError, Result};
use crate::process::{CommandRunner, TokioCommandRunner};
use crate::remote::{RemoteDeployer, RemoteTransport, SshTransport, deployment_plan};
use crate::service::local::LocalPipeline;

/// Service trait for running deployments
#[async_trait]
pub trait DeploymentService: Send + Sync {
    /// Runs the full pipeline for `request`
    ///
    /// Never fails: every error becomes a [`DeployOutcome::Failure`].
    async fn run_deployment(&self, request: &DeployRequest) -> DeployOutcome;
}

/// Standard implementation of DeploymentService
pub struct StandardDeploymentService {
    config: Arc<Config>,
    local: LocalPipeline,
    remote: RemoteDeployer,
}

impl StandardDeploymentService {
    pub fn new(
        config: Arc<Config>,
        runner: Arc<dyn CommandRunner>,
        transport: Arc<dyn RemoteTransport>,
    ) -> Self {
        Self {
            local: LocalPipeline::new(config.clone(), runner),
            remote: RemoteDeployer::new(transport),
            config,
        }
    }

    /// Service wired to real processes and SSH
    pub fn with_defaults(config: Arc<Config>) -> Self {
        Self::new(
            config,
            Arc::new(TokioCommandRunner::new()),
            Arc::new(SshTransport::new()),
        )
    }

    async fn execute(&self, repository_url: &str) -> Result<()> {
        let workspace = self.local.fetch_source(repository_url).await?;
        let local_name = self.local.build_image(&workspace).await?;

        let image = self
            .config
            .image()
            .map_err(|e| DeployError::Tag(e.to_string()))?;
        self.local.tag_image(&local_name, &image.remote).await?;
        self.local.publish_image(&image.remote).await?;

        let target = self
            .config
            .remote_target()
            .map_err(|e| RemoteError::Connect(e.to_string()))?;
        let plan = deployment_plan(
            &self.config.docker_bin,
            &self.config.container_name,
            &image.remote,
            self.config.host_port,
            self.config.container_port,
        );
        self.remote.deploy(&target, &plan).await?;

        Ok(())
    }
}

#[async_trait]
impl DeploymentService for StandardDeploymentService {
    async fn run_deployment(&self, request: &DeployRequest) -> DeployOutcome {
        let span = info_span!(
            "deployment",
            id = %request.id,
            repository = %request.repository_url
        );

        async {
            info!("Starting deployment");

            match self.execute(&request.repository_url).await {
                Ok(()) => {
                    info!("Deployment successful");
                    DeployOutcome::Success
                }
                Err(e) => {
                    error!("Deployment failed at stage '{}': {}", e.stage(), e);
                    e.into_outcome()
                }
            }
        }
        .instrument(span)
        .await
    }
}
