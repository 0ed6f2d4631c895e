//! SSH transport
//!
//! Public-key authenticated sessions built on russh. Every command gets its
//! own exec channel; stdout, stderr (extended data stream 1) and the exit
//! status are collected until the channel closes.

use anyhow::{Context, Result};
use async_trait::async_trait;
use russh::client::{self, Handle};
use russh::{ChannelMsg, Disconnect};
use russh_keys::key::PublicKey;
use skiff_core::domain::command::CommandOutput;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::{HostKeyPolicy, RemoteSession, RemoteTransport};
use crate::config::RemoteTarget;

/// Exit status recorded when the server never reports one
const MISSING_EXIT_STATUS: i32 = -1;

/// russh-backed [`RemoteTransport`]
#[derive(Clone)]
pub struct SshTransport {
    config: Arc<client::Config>,
}

impl SshTransport {
    pub fn new() -> Self {
        Self {
            config: Arc::new(client::Config::default()),
        }
    }
}

impl Default for SshTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RemoteTransport for SshTransport {
    async fn connect(&self, target: &RemoteTarget) -> Result<Box<dyn RemoteSession>> {
        info!(
            "Connecting to {}@{}:{} (host key policy: {})",
            target.username, target.host, target.port, target.host_key_policy
        );
        debug!("Using private key: {}", target.private_key_path.display());

        let key_pair = russh_keys::load_secret_key(&target.private_key_path, None)
            .with_context(|| {
                format!(
                    "failed to load private key {}",
                    target.private_key_path.display()
                )
            })?;

        let handler = HostKeyVerifier {
            host: target.host.clone(),
            port: target.port,
            policy: target.host_key_policy,
            known_hosts: target.known_hosts.clone(),
        };

        let mut handle = client::connect(
            self.config.clone(),
            (target.host.as_str(), target.port),
            handler,
        )
        .await?;

        let authenticated = handle
            .authenticate_publickey(target.username.clone(), Arc::new(key_pair))
            .await?;

        if !authenticated {
            anyhow::bail!(
                "public key authentication rejected for user '{}'",
                target.username
            );
        }

        info!("SSH connection successful");
        Ok(Box::new(SshSession { handle }))
    }
}

/// Applies the configured [`HostKeyPolicy`] during the handshake
struct HostKeyVerifier {
    host: String,
    port: u16,
    policy: HostKeyPolicy,
    known_hosts: PathBuf,
}

impl HostKeyVerifier {
    /// Decides whether `key` is acceptable for this host
    ///
    /// A key that differs from the recorded one is an error under both
    /// `strict` and `accept-new`.
    fn verify(&self, key: &PublicKey) -> Result<bool> {
        if self.policy == HostKeyPolicy::AcceptAny {
            warn!(
                "Accepting host key {} for {} without verification",
                key.fingerprint(),
                self.host
            );
            return Ok(true);
        }

        let known =
            russh_keys::check_known_hosts_path(&self.host, self.port, key, &self.known_hosts)?;
        if known {
            return Ok(true);
        }

        if self.policy == HostKeyPolicy::Strict {
            warn!(
                "Host {} is not in {}, rejecting",
                self.host,
                self.known_hosts.display()
            );
            return Ok(false);
        }

        info!(
            "Learning host key {} for {} into {}",
            key.fingerprint(),
            self.host,
            self.known_hosts.display()
        );
        russh_keys::learn_known_hosts_path(&self.host, self.port, key, &self.known_hosts)?;
        Ok(true)
    }
}

#[async_trait]
impl client::Handler for HostKeyVerifier {
    type Error = anyhow::Error;

    async fn check_server_key(
        &mut self,
        server_public_key: &PublicKey,
    ) -> std::result::Result<bool, Self::Error> {
        self.verify(server_public_key)
    }
}

struct SshSession {
    handle: Handle<HostKeyVerifier>,
}

#[async_trait]
impl RemoteSession for SshSession {
    async fn exec(&mut self, command: &str) -> Result<CommandOutput> {
        let mut channel = self
            .handle
            .channel_open_session()
            .await
            .context("failed to open session channel")?;

        channel
            .exec(true, command)
            .await
            .with_context(|| format!("failed to send exec request for '{}'", command))?;

        let mut stdout = Vec::new();
        let mut stderr = Vec::new();
        let mut exit_status = None;

        while let Some(msg) = channel.wait().await {
            match msg {
                ChannelMsg::Data { ref data } => stdout.extend_from_slice(data),
                ChannelMsg::ExtendedData { ref data, ext } if ext == 1 => {
                    stderr.extend_from_slice(data)
                }
                ChannelMsg::ExitStatus { exit_status: code } => {
                    exit_status = Some(code as i32);
                }
                _ => {}
            }
        }

        Ok(CommandOutput {
            command: command.to_string(),
            exit_status: exit_status.unwrap_or(MISSING_EXIT_STATUS),
            stdout: String::from_utf8_lossy(&stdout).to_string(),
            stderr: String::from_utf8_lossy(&stderr).to_string(),
        })
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.handle
            .disconnect(Disconnect::ByApplication, "", "English")
            .await
            .context("failed to disconnect")?;
        debug!("SSH session closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use russh_keys::key::KeyPair;
    use std::path::Path;

    const HOST: &str = "203.0.113.10";

    fn public_key() -> PublicKey {
        KeyPair::generate_ed25519()
            .unwrap()
            .clone_public_key()
            .unwrap()
    }

    fn verifier(policy: HostKeyPolicy, known_hosts: &Path) -> HostKeyVerifier {
        HostKeyVerifier {
            host: HOST.to_string(),
            port: 22,
            policy,
            known_hosts: known_hosts.to_path_buf(),
        }
    }

    #[test]
    fn test_strict_rejects_unknown_host() {
        let dir = tempfile::tempdir().unwrap();
        let known_hosts = dir.path().join("known_hosts");

        let accepted = verifier(HostKeyPolicy::Strict, &known_hosts)
            .verify(&public_key())
            .unwrap();

        assert!(!accepted);
        assert!(!known_hosts.exists());
    }

    #[test]
    fn test_strict_accepts_recorded_key() {
        let dir = tempfile::tempdir().unwrap();
        let known_hosts = dir.path().join("known_hosts");
        let key = public_key();
        russh_keys::learn_known_hosts_path(HOST, 22, &key, &known_hosts).unwrap();

        assert!(verifier(HostKeyPolicy::Strict, &known_hosts).verify(&key).unwrap());
    }

    #[test]
    fn test_accept_new_learns_unknown_host() {
        let dir = tempfile::tempdir().unwrap();
        let known_hosts = dir.path().join("ssh").join("known_hosts");
        let key = public_key();

        assert!(verifier(HostKeyPolicy::AcceptNew, &known_hosts).verify(&key).unwrap());
        assert!(russh_keys::check_known_hosts_path(HOST, 22, &key, &known_hosts).unwrap());

        // second connection sees the learned key
        assert!(verifier(HostKeyPolicy::AcceptNew, &known_hosts).verify(&key).unwrap());
    }

    #[test]
    fn test_accept_new_rejects_changed_key() {
        let dir = tempfile::tempdir().unwrap();
        let known_hosts = dir.path().join("known_hosts");
        russh_keys::learn_known_hosts_path(HOST, 22, &public_key(), &known_hosts).unwrap();

        let err = verifier(HostKeyPolicy::AcceptNew, &known_hosts)
            .verify(&public_key())
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<russh_keys::Error>(),
            Some(russh_keys::Error::KeyChanged { .. })
        ));
    }

    #[test]
    fn test_strict_rejects_changed_key() {
        let dir = tempfile::tempdir().unwrap();
        let known_hosts = dir.path().join("known_hosts");
        russh_keys::learn_known_hosts_path(HOST, 22, &public_key(), &known_hosts).unwrap();

        assert!(
            verifier(HostKeyPolicy::Strict, &known_hosts)
                .verify(&public_key())
                .is_err()
        );
    }

    #[test]
    fn test_accept_any_accepts_without_recording() {
        let dir = tempfile::tempdir().unwrap();
        let known_hosts = dir.path().join("known_hosts");
        russh_keys::learn_known_hosts_path(HOST, 22, &public_key(), &known_hosts).unwrap();
        let before = std::fs::read_to_string(&known_hosts).unwrap();

        let policy = verifier(HostKeyPolicy::AcceptAny, &known_hosts);
        assert!(policy.verify(&public_key()).unwrap());
        assert!(policy.verify(&public_key()).unwrap());

        assert_eq!(std::fs::read_to_string(&known_hosts).unwrap(), before);
    }
}
