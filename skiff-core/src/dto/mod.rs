//! Data Transfer Objects for the deployment trigger
//!
//! Bodies exchanged between the CLI and the orchestrator's HTTP API.

pub mod deploy;
