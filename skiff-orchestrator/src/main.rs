use anyhow::Context;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use skiff_runner::{Config, StandardDeploymentService};

pub mod api;
pub mod state;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "skiff_orchestrator=info,skiff_runner=info,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Skiff Orchestrator...");

    // Required values are checked by the stage that needs them
    let config = Config::from_env().context("Failed to load configuration")?;
    config.validate()?;

    tracing::info!(
        "Workspace: {}, image: {}:{}, container: {}, host key policy: {}",
        config.workspace_dir.display(),
        config.image_name,
        config.image_tag,
        config.container_name,
        config.host_key_policy
    );

    let service = StandardDeploymentService::with_defaults(Arc::new(config));
    let app = api::create_router(state::AppState::new(Arc::new(service)));

    // Get bind address
    let addr = std::env::var("SKIFF_BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:5000".to_string());

    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    axum::serve(listener, app)
        .await
        .context("Failed to start server")?;

    Ok(())
}
