//! Local pipeline: fetch, build, tag, publish
//!
//! Turns a repository URL into an image the deployment host can pull.
//! Each step runs to completion before the next; the first non-zero exit
//! stops the pipeline. Nothing is rolled back: a failed push leaves the
//! workspace and the built image in place.

use skiff_core::domain::command::CommandOutput;
use std::sync::Arc;
use tracing::{error, info};

use crate::config::Config;
use crate::error::{DeployError, Result};
use crate::process::{CommandRunner, Invocation};
use crate::workspace::Workspace;

pub struct LocalPipeline {
    config: Arc<Config>,
    runner: Arc<dyn CommandRunner>,
}

impl LocalPipeline {
    pub fn new(config: Arc<Config>, runner: Arc<dyn CommandRunner>) -> Self {
        Self { config, runner }
    }

    /// Clones the repository into a freshly emptied workspace
    ///
    /// The URL is passed to git as-is, after `--` so it is never read as an option.
    pub async fn fetch_source(&self, repository_url: &str) -> Result<Workspace> {
        let workspace = Workspace::new(&self.config.workspace_dir);

        workspace
            .reset()
            .await
            .map_err(|e| DeployError::Fetch(format!("{:#}", e)))?;

        info!("Cloning the repository {}", repository_url);
        let clone = Invocation::new(
            &self.config.git_bin,
            [
                "clone".to_string(),
                "--".to_string(),
                repository_url.to_string(),
                workspace.path().to_string_lossy().to_string(),
            ],
        );
        self.run_step(&clone, DeployError::Fetch).await?;

        Ok(workspace)
    }

    /// Builds the image from the Dockerfile at the workspace root
    ///
    /// Returns the local tagged name, e.g. `myapp:latest`.
    pub async fn build_image(&self, workspace: &Workspace) -> Result<String> {
        let local_name = self.config.local_image();

        info!("Building Docker image {}", local_name);
        let build = Invocation::new(
            &self.config.docker_bin,
            ["build", "-t", local_name.as_str(), "."],
        )
        .current_dir(workspace.path());
        self.run_step(&build, DeployError::Build).await?;

        Ok(local_name)
    }

    /// Adds the registry name as a second reference to the built image
    pub async fn tag_image(&self, local_name: &str, remote_name: &str) -> Result<()> {
        info!("Tagging Docker image: {} -> {}", local_name, remote_name);
        let tag = Invocation::new(&self.config.docker_bin, ["tag", local_name, remote_name]);
        self.run_step(&tag, DeployError::Tag).await?;
        Ok(())
    }

    /// Pushes the tagged image to the registry
    pub async fn publish_image(&self, remote_name: &str) -> Result<()> {
        info!("Pushing Docker image to registry: {}", remote_name);
        let push = Invocation::new(&self.config.docker_bin, ["push", remote_name]);
        let output = self.run_step(&push, DeployError::Publish).await?;
        info!("Push successful: {}", output.stdout.trim());
        Ok(())
    }

    /// Runs one tool invocation, mapping failure to the step's error
    async fn run_step(
        &self,
        invocation: &Invocation,
        stage_error: fn(String) -> DeployError,
    ) -> Result<CommandOutput> {
        let output = self
            .runner
            .run(invocation)
            .await
            .map_err(|e| stage_error(format!("{:#}", e)))?;

        if !output.success() {
            let err = stage_error(output.error_text());
            error!(
                "'{}' exited with status {}: {}",
                output.command, output.exit_status, err
            );
            return Err(err);
        }

        Ok(output)
    }
}
