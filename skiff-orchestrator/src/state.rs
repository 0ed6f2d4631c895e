//! Shared handler state

use skiff_runner::DeploymentService;
use std::sync::Arc;
use tokio::sync::Mutex;

/// State shared by all handlers
///
/// `deploy_lock` serializes deployments: every run reuses the same
/// workspace directory and the same remote container name.
#[derive(Clone)]
pub struct AppState {
    pub deployments: Arc<dyn DeploymentService>,
    pub deploy_lock: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(deployments: Arc<dyn DeploymentService>) -> Self {
        Self {
            deployments,
            deploy_lock: Arc::new(Mutex::new(())),
        }
    }
}
