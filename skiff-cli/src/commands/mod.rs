//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod deploy;

use anyhow::Result;
use clap::Subcommand;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Trigger a deployment on the orchestrator
    Deploy {
        /// Repository to clone, build and deploy
        repo_url: String,
    },
    /// Run the deployment pipeline in this process
    ///
    /// Reads the same environment variables as the orchestrator.
    Run {
        /// Repository to clone, build and deploy
        repo_url: String,
    },
    /// Check that the orchestrator is reachable
    Health,
}

/// Route a command to its handler
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Deploy { repo_url } => deploy::deploy_remote(config, &repo_url).await,
        Commands::Run { repo_url } => deploy::run_local(&repo_url).await,
        Commands::Health => deploy::check_health(config).await,
    }
}
