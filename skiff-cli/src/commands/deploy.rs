//! Deployment command handlers

use anyhow::{Context, Result};
use colored::*;
use skiff_core::domain::deployment::{DeployOutcome, DeployRequest};
use skiff_core::dto::deploy::DeployResponse;
use skiff_runner::{Config as RunnerConfig, DeploymentService, StandardDeploymentService};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api::ApiClient;
use crate::config::Config;

/// Trigger a deployment through the orchestrator
pub async fn deploy_remote(config: &Config, repo_url: &str) -> Result<()> {
    let client = ApiClient::new(&config.orchestrator_url);

    println!("{} {}", "Deploying".bold(), repo_url.cyan());
    let response = client.deploy(repo_url).await?;

    print_response(&response);
    finish(response.is_success())
}

/// Run the pipeline in this process
pub async fn run_local(repo_url: &str) -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "skiff_runner=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let runner_config = RunnerConfig::from_env().context("Failed to load configuration")?;
    runner_config.validate()?;

    let service = StandardDeploymentService::with_defaults(Arc::new(runner_config));
    let request = DeployRequest::new(repo_url);

    println!("{} {}", "Deploying".bold(), repo_url.cyan());
    let outcome = service.run_deployment(&request).await;

    let response = DeployResponse::from_outcome(&request, &outcome, chrono::Utc::now());
    print_response(&response);
    finish(matches!(outcome, DeployOutcome::Success))
}

/// Check orchestrator health
pub async fn check_health(config: &Config) -> Result<()> {
    let client = ApiClient::new(&config.orchestrator_url);
    client.health().await?;
    println!("{} {}", "Healthy:".green().bold(), config.orchestrator_url);
    Ok(())
}

fn print_response(response: &DeployResponse) {
    let elapsed = response.finished_at - response.started_at;

    match response.stage {
        None => println!("{}", response.message.green().bold()),
        Some(stage) => {
            println!(
                "{} {}",
                format!("Failed at stage '{}':", stage).red().bold(),
                response.message
            );
        }
    }
    println!(
        "  {} {}",
        "Deployment:".dimmed(),
        response.deployment_id.to_string().dimmed()
    );
    println!(
        "  {} {}s",
        "Duration:".dimmed(),
        elapsed.num_seconds().to_string().dimmed()
    );
}

fn finish(success: bool) -> Result<()> {
    if success {
        Ok(())
    } else {
        anyhow::bail!("deployment failed")
    }
}
