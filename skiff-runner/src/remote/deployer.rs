//! Remote deployment protocol
//!
//! Connect, run the plan in order, disconnect. The session is closed exactly
//! once on every path out of [`RemoteDeployer::deploy`] after a successful
//! connect.

use std::sync::Arc;
use tracing::{error, info, warn};

use super::{RemoteCommand, RemoteSession, RemoteTransport};
use crate::config::RemoteTarget;
use crate::error::RemoteError;

/// Drives a [`RemoteTransport`] through one deployment
pub struct RemoteDeployer {
    transport: Arc<dyn RemoteTransport>,
}

impl RemoteDeployer {
    pub fn new(transport: Arc<dyn RemoteTransport>) -> Self {
        Self { transport }
    }

    /// Replaces the running container on `target` by executing `plan`
    pub async fn deploy(
        &self,
        target: &RemoteTarget,
        plan: &[RemoteCommand],
    ) -> Result<(), RemoteError> {
        info!("Connecting to remote host: {}", target.host);

        let mut session = self
            .transport
            .connect(target)
            .await
            .map_err(|e| RemoteError::Connect(format!("{:#}", e)))?;

        let result = execute_plan(session.as_mut(), plan).await;

        if let Err(e) = session.close().await {
            warn!("Failed to close session with {}: {:#}", target.host, e);
        }

        if result.is_ok() {
            info!("Deployment completed on {}", target.host);
        }

        result
    }
}

async fn execute_plan(
    session: &mut dyn RemoteSession,
    plan: &[RemoteCommand],
) -> Result<(), RemoteError> {
    for command in plan {
        let line = command.render();
        info!("Executing [{}]: {}", command.stage, line);

        let output = session
            .exec(&line)
            .await
            .map_err(|e| RemoteError::Command {
                stage: command.stage,
                command: line.clone(),
                stderr: format!("{:#}", e),
            })?;

        if !output.stdout.trim().is_empty() {
            info!("Output: {}", output.stdout.trim());
        }

        if !output.success() {
            if command.tolerate_failure {
                info!(
                    "'{}' exited with status {}, nothing to {}",
                    line, output.exit_status, command.stage
                );
                continue;
            }

            error!(
                "'{}' exited with status {}: {}",
                line,
                output.exit_status,
                output.stderr.trim()
            );
            return Err(RemoteError::Command {
                stage: command.stage,
                command: line,
                stderr: output.error_text(),
            });
        }

        if !output.stderr.trim().is_empty() {
            warn!("Warning: {}", output.stderr.trim());
        }
    }

    Ok(())
}
