//! Skiff Runner
//!
//! Single-shot deployment pipeline: given a repository URL, build a
//! container image, publish it to the registry and replace the container
//! running on the deployment host.
//!
//! Architecture:
//! - Configuration: registry coordinates and remote credentials, loaded once
//! - Process: `CommandRunner` port for git/docker invocations
//! - Remote: `RemoteTransport` port, SSH implementation and the deploy protocol
//! - Services: local pipeline steps and the end-to-end `DeploymentService`

pub mod config;
pub mod error;
pub mod process;
pub mod remote;
pub mod service;
pub mod workspace;

#[cfg(test)]
mod test_support;

pub use config::Config;
pub use error::{DeployError, RemoteError};
pub use service::{DeploymentService, StandardDeploymentService};
