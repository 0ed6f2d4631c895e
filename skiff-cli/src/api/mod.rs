//! API client module
//!
//! HTTP client for communicating with the Skiff orchestrator API.

use anyhow::{Context, Result};
use reqwest::{Client, StatusCode};
use skiff_core::dto::deploy::{CreateDeploy, DeployResponse};

/// HTTP client for the Skiff orchestrator API
pub struct ApiClient {
    base_url: String,
    client: Client,
}

impl ApiClient {
    /// Create a new API client
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the orchestrator API
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    /// Trigger a deployment
    ///
    /// Blocks until the orchestrator has finished the run. A failed
    /// deployment is returned as a `DeployResponse` with a stage, not as `Err`.
    pub async fn deploy(&self, repo_url: &str) -> Result<DeployResponse> {
        let url = format!("{}/deploy", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&CreateDeploy {
                repo_url: repo_url.to_string(),
            })
            .send()
            .await
            .context("Failed to send deploy request")?;

        let status = response.status();
        if status == StatusCode::OK || status == StatusCode::INTERNAL_SERVER_ERROR {
            return response
                .json()
                .await
                .context("Failed to parse response JSON");
        }

        let error_text = response.text().await.unwrap_or_default();
        anyhow::bail!("Request failed with status {}: {}", status, error_text);
    }

    /// Check orchestrator health
    pub async fn health(&self) -> Result<()> {
        let url = format!("{}/health", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("Failed to send health request")?;

        if !response.status().is_success() {
            anyhow::bail!("Orchestrator unhealthy: status {}", response.status());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let client = ApiClient::new("http://localhost:5000/");
        assert_eq!(client.base_url, "http://localhost:5000");
    }
}
