//! Service layer
//!
//! The deployment pipeline. `LocalPipeline` covers the steps that run on
//! this machine, `DeploymentService` sequences them with the remote deployer
//! and turns the first error into a stage-tagged outcome.
//!
//! All services are trait-based or take their collaborators as trait
//! objects to enable testing and dependency injection.

mod deployment;
mod local;

pub use deployment::{DeploymentService, StandardDeploymentService};
pub use local::LocalPipeline;
