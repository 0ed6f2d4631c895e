//! Configuration module
//!
//! Handles CLI configuration. Pipeline settings for `skiff run` are read
//! from the environment by the runner itself.

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// URL of the orchestrator service
    pub orchestrator_url: String,
}
