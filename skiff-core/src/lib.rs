//! Skiff Core
//!
//! Core types shared by the Skiff deployment services.
//!
//! This crate contains:
//! - Domain types: stages, outcomes, image references and command results
//! - DTOs: request/response bodies for the deployment trigger

pub mod domain;
pub mod dto;
