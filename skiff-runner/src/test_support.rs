//! Test doubles for the command runner and remote transport

use anyhow::Result;
use async_trait::async_trait;
use skiff_core::domain::command::CommandOutput;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::config::{Config, RemoteTarget};
use crate::process::{CommandRunner, Invocation};
use crate::remote::{HostKeyPolicy, RemoteSession, RemoteTransport};

/// Scripted response for one command
#[derive(Debug, Clone)]
pub enum Scripted {
    Exit { status: i32, stderr: String },
    Unavailable(String),
}

pub fn exit_ok() -> Scripted {
    exit_status(0, "")
}

pub fn exit_status(status: i32, stderr: &str) -> Scripted {
    Scripted::Exit {
        status,
        stderr: stderr.to_string(),
    }
}

pub fn remote_ok() -> Scripted {
    exit_ok()
}

pub fn remote_status(status: i32, stderr: &str) -> Scripted {
    exit_status(status, stderr)
}

fn into_output(command: String, scripted: Scripted) -> Result<CommandOutput> {
    match scripted {
        Scripted::Exit { status, stderr } => Ok(CommandOutput {
            command,
            exit_status: status,
            stdout: String::new(),
            stderr,
        }),
        Scripted::Unavailable(msg) => Err(anyhow::anyhow!(msg)),
    }
}

/// Records invocations and replays scripted results in call order
///
/// Calls beyond the script succeed with empty output.
pub struct FakeRunner {
    responses: Mutex<VecDeque<Scripted>>,
    calls: Mutex<Vec<Invocation>>,
    watched: Option<PathBuf>,
    watched_existed: Mutex<Vec<bool>>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::with_responses(Vec::new())
    }

    pub fn with_responses(responses: Vec<Scripted>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            calls: Mutex::new(Vec::new()),
            watched: None,
            watched_existed: Mutex::new(Vec::new()),
        }
    }

    /// Records whether `path` exists at the moment of each call
    pub fn watching(mut self, path: PathBuf) -> Self {
        self.watched = Some(path);
        self
    }

    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Subcommand (first argument) of every call, e.g. `["clone", "build"]`
    pub fn subcommands(&self) -> Vec<String> {
        self.calls()
            .iter()
            .map(|c| c.args.first().cloned().unwrap_or_default())
            .collect()
    }

    pub fn watched_existed(&self) -> Vec<bool> {
        self.watched_existed.lock().unwrap().clone()
    }
}

#[async_trait]
impl CommandRunner for FakeRunner {
    async fn run(&self, invocation: &Invocation) -> Result<CommandOutput> {
        self.calls.lock().unwrap().push(invocation.clone());
        if let Some(path) = &self.watched {
            self.watched_existed.lock().unwrap().push(path.exists());
        }

        let scripted = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(exit_ok);
        into_output(invocation.display(), scripted)
    }
}

#[derive(Default)]
struct TransportState {
    connect_error: Option<String>,
    connect_count: usize,
    responses: VecDeque<Scripted>,
    executed: Vec<String>,
    close_count: usize,
}

/// In-memory transport whose sessions share one recorded state
pub struct FakeTransport {
    state: Arc<Mutex<TransportState>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::with_responses(Vec::new())
    }

    pub fn with_responses(responses: Vec<Scripted>) -> Self {
        Self {
            state: Arc::new(Mutex::new(TransportState {
                responses: responses.into(),
                ..Default::default()
            })),
        }
    }

    pub fn failing_connect(message: &str) -> Self {
        let transport = Self::new();
        transport.state.lock().unwrap().connect_error = Some(message.to_string());
        transport
    }

    /// Succeeds for every command except the one at `index`, which fails in transport
    pub fn failing_exec_at(index: usize, message: &str) -> Self {
        let mut responses = vec![remote_ok(); index];
        responses.push(Scripted::Unavailable(message.to_string()));
        Self::with_responses(responses)
    }

    pub fn executed(&self) -> Vec<String> {
        self.state.lock().unwrap().executed.clone()
    }

    pub fn connect_count(&self) -> usize {
        self.state.lock().unwrap().connect_count
    }

    pub fn close_count(&self) -> usize {
        self.state.lock().unwrap().close_count
    }
}

#[async_trait]
impl RemoteTransport for FakeTransport {
    async fn connect(&self, _target: &RemoteTarget) -> Result<Box<dyn RemoteSession>> {
        let mut state = self.state.lock().unwrap();
        state.connect_count += 1;
        if let Some(message) = &state.connect_error {
            return Err(anyhow::anyhow!(message.clone()));
        }
        Ok(Box::new(FakeSession {
            state: self.state.clone(),
        }))
    }
}

struct FakeSession {
    state: Arc<Mutex<TransportState>>,
}

#[async_trait]
impl RemoteSession for FakeSession {
    async fn exec(&mut self, command: &str) -> Result<CommandOutput> {
        let mut state = self.state.lock().unwrap();
        state.executed.push(command.to_string());
        let scripted = state.responses.pop_front().unwrap_or_else(remote_ok);
        into_output(command.to_string(), scripted)
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.state.lock().unwrap().close_count += 1;
        Ok(())
    }
}

pub fn remote_target() -> RemoteTarget {
    RemoteTarget {
        host: "203.0.113.10".to_string(),
        port: 22,
        username: "ec2-user".to_string(),
        private_key_path: PathBuf::from("/keys/deploy.pem"),
        host_key_policy: HostKeyPolicy::AcceptNew,
        known_hosts: PathBuf::from("/keys/known_hosts"),
    }
}

/// Fully populated configuration with the workspace at `workspace_dir`
pub fn full_config(workspace_dir: PathBuf) -> Config {
    Config {
        registry_account_id: Some("123456789012".to_string()),
        registry_region: Some("us-east-1".to_string()),
        registry_repo_name: Some("myapp-repo".to_string()),
        remote_host: Some("203.0.113.10".to_string()),
        remote_username: Some("ec2-user".to_string()),
        remote_private_key_path: Some("C:\\keys\\deploy.pem".to_string()),
        workspace_dir,
        ..Config::default()
    }
}
