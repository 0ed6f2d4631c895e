//! Core domain types
//!
//! These types describe a single deployment run. They are shared between
//! the runner (which produces them) and the orchestrator/CLI (which report them).
//! Nothing here is persisted.

pub mod command;
pub mod deployment;
pub mod image;
pub mod stage;
