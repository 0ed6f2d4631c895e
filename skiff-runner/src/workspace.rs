//! Local workspace handling
//!
//! The workspace is the directory the repository is cloned into. It is
//! owned by one run at a time and recreated from scratch every run, so a
//! build never sees source left behind by a previous deployment.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::info;

/// Directory holding the fetched source tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    path: PathBuf,
}

impl Workspace {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Removes any existing workspace recursively
    ///
    /// Leaves the path absent so the clone can create it. The parent
    /// directory is created if needed.
    pub async fn reset(&self) -> Result<()> {
        if tokio::fs::try_exists(&self.path).await.unwrap_or(false) {
            info!("Removing existing workspace {}", self.path.display());
            tokio::fs::remove_dir_all(&self.path)
                .await
                .with_context(|| format!("Failed to remove {}", self.path.display()))?;
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_reset_removes_dirty_workspace() {
        let dir = tempfile::tempdir().unwrap();
        let workspace = Workspace::new(dir.path().join("app"));

        std::fs::create_dir_all(workspace.path().join("src")).unwrap();
        std::fs::write(workspace.path().join("src").join("stale.txt"), "old").unwrap();

        workspace.reset().await.unwrap();
        assert!(!workspace.path().exists());
    }

    #[tokio::test]
    async fn test_reset_without_workspace_creates_parent() {
        let dir = tempfile::tempdir().unwrap();
        let workspace = Workspace::new(dir.path().join("nested").join("app"));

        workspace.reset().await.unwrap();
        assert!(!workspace.path().exists());
        assert!(dir.path().join("nested").is_dir());
    }

    #[tokio::test]
    async fn test_reset_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let workspace = Workspace::new(dir.path().join("app"));

        workspace.reset().await.unwrap();
        workspace.reset().await.unwrap();
        assert!(!workspace.path().exists());
    }
}
