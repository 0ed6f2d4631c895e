//! Remote deployer
//!
//! Replaces whatever runs on the deployment host with a fresh container of
//! the newly published image, over a single SSH session.
//!
//! - `command`: the fixed remote command plan
//! - `deployer`: connect, execute the plan, close
//! - `ssh`: russh-backed transport
//!
//! The transport is trait-based so the deployer can be tested without a host.

mod command;
mod deployer;
mod ssh;

pub use command::{RemoteCommand, deployment_plan};
pub use deployer::RemoteDeployer;
pub use ssh::SshTransport;

use anyhow::Result;
use async_trait::async_trait;
use skiff_core::domain::command::CommandOutput;
use std::fmt;
use std::str::FromStr;

use crate::config::RemoteTarget;

/// Policy for server host keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostKeyPolicy {
    /// Only hosts already present in known_hosts are accepted
    Strict,
    /// Unknown hosts are added to known_hosts, changed keys are rejected
    AcceptNew,
    /// Every key is accepted without checking
    AcceptAny,
}

impl FromStr for HostKeyPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(HostKeyPolicy::Strict),
            "accept-new" => Ok(HostKeyPolicy::AcceptNew),
            "accept-any" => Ok(HostKeyPolicy::AcceptAny),
            other => Err(format!("unknown host key policy '{}'", other)),
        }
    }
}

impl fmt::Display for HostKeyPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            HostKeyPolicy::Strict => "strict",
            HostKeyPolicy::AcceptNew => "accept-new",
            HostKeyPolicy::AcceptAny => "accept-any",
        })
    }
}

/// Opens authenticated sessions to a deployment host
#[async_trait]
pub trait RemoteTransport: Send + Sync {
    async fn connect(&self, target: &RemoteTarget) -> Result<Box<dyn RemoteSession>>;
}

/// An open session on the deployment host
///
/// `close` consumes the session, so it can be called at most once.
#[async_trait]
pub trait RemoteSession: Send {
    /// Executes one command to completion
    ///
    /// A non-zero exit is reported through `exit_status`; `Err` means the
    /// transport itself failed.
    async fn exec(&mut self, command: &str) -> Result<CommandOutput>;

    async fn close(self: Box<Self>) -> Result<()>;
}
