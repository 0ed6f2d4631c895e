//! Runner configuration
//!
//! Registry coordinates, remote host credentials and the small set of
//! names and ports the pipeline uses. Built once at process start and
//! shared by reference; the pipeline never reads the environment itself.

use std::path::PathBuf;
use std::str::FromStr;

use skiff_core::domain::image::{ImageReference, RegistryCoordinates};

use crate::remote::HostKeyPolicy;

pub const ENV_ACCOUNT_ID: &str = "AWS_ACCOUNT_ID";
pub const ENV_REGION: &str = "AWS_REGION";
pub const ENV_REPO_NAME: &str = "ECR_REPO_NAME";
pub const ENV_REMOTE_HOST: &str = "EC2_HOST";
pub const ENV_REMOTE_USERNAME: &str = "EC2_USERNAME";
pub const ENV_REMOTE_PRIVATE_KEY: &str = "EC2_PRIVATE_KEY";
pub const ENV_KNOWN_HOSTS: &str = "SKIFF_KNOWN_HOSTS";

/// A required configuration value was not set
///
/// Raised lazily by the step that first needs the value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("missing configuration: {0}")]
pub struct MissingConfig(pub &'static str);

/// Connection settings for the deployment host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteTarget {
    pub host: String,
    pub port: u16,
    pub username: String,
    /// Private key location with separators normalized to `/`
    pub private_key_path: PathBuf,
    pub host_key_policy: HostKeyPolicy,
    /// known_hosts file consulted and updated by the host key policy
    pub known_hosts: PathBuf,
}

/// Runner configuration
///
/// Required values are kept as `Option` and are not validated at load
/// time; see [`Config::registry`] and [`Config::remote_target`].
#[derive(Debug, Clone)]
pub struct Config {
    pub registry_account_id: Option<String>,
    pub registry_region: Option<String>,
    pub registry_repo_name: Option<String>,
    pub remote_host: Option<String>,
    pub remote_username: Option<String>,
    pub remote_private_key_path: Option<String>,

    /// SSH port on the deployment host
    pub remote_port: u16,

    /// What to do with server keys not in known_hosts
    pub host_key_policy: HostKeyPolicy,

    /// known_hosts override, `~/.ssh/known_hosts` when unset
    pub known_hosts_path: Option<PathBuf>,

    /// Local directory the repository is cloned into
    pub workspace_dir: PathBuf,

    /// Local build name of the image
    pub image_name: String,

    /// Tag used for both the local and the registry name
    pub image_tag: String,

    /// Name of the container on the remote host, reused across deployments
    pub container_name: String,

    pub container_port: u16,
    pub host_port: u16,

    pub git_bin: String,
    pub docker_bin: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            registry_account_id: None,
            registry_region: None,
            registry_repo_name: None,
            remote_host: None,
            remote_username: None,
            remote_private_key_path: None,
            remote_port: 22,
            host_key_policy: HostKeyPolicy::AcceptNew,
            known_hosts_path: None,
            workspace_dir: PathBuf::from("app"),
            image_name: "myapp".to_string(),
            image_tag: "latest".to_string(),
            container_name: "myapp-container".to_string(),
            container_port: 8000,
            host_port: 8000,
            git_bin: "git".to_string(),
            docker_bin: "docker".to_string(),
        }
    }
}

impl Config {
    /// Creates configuration from environment variables
    ///
    /// Required at point of use:
    /// - AWS_ACCOUNT_ID, AWS_REGION, ECR_REPO_NAME
    /// - EC2_HOST, EC2_USERNAME, EC2_PRIVATE_KEY
    ///
    /// Optional:
    /// - EC2_SSH_PORT (default: 22)
    /// - SKIFF_HOST_KEY_POLICY (strict | accept-new | accept-any, default: accept-new)
    /// - SKIFF_KNOWN_HOSTS (default: ~/.ssh/known_hosts)
    /// - SKIFF_WORKSPACE_DIR (default: app)
    /// - SKIFF_IMAGE_NAME (default: myapp)
    /// - SKIFF_IMAGE_TAG (default: latest)
    /// - SKIFF_CONTAINER_NAME (default: myapp-container)
    /// - SKIFF_CONTAINER_PORT, SKIFF_HOST_PORT (default: 8000)
    /// - SKIFF_GIT_BIN (default: git), SKIFF_DOCKER_BIN (default: docker)
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Creates configuration from an arbitrary key lookup
    ///
    /// Empty values are treated as unset. Only malformed optional values
    /// (a port that is not a number, an unknown policy) are rejected here.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let remote_port = parse_or(get("EC2_SSH_PORT"), "EC2_SSH_PORT", defaults.remote_port)?;
        let container_port = parse_or(
            get("SKIFF_CONTAINER_PORT"),
            "SKIFF_CONTAINER_PORT",
            defaults.container_port,
        )?;
        let host_port = parse_or(get("SKIFF_HOST_PORT"), "SKIFF_HOST_PORT", defaults.host_port)?;
        let host_key_policy = parse_or(
            get("SKIFF_HOST_KEY_POLICY"),
            "SKIFF_HOST_KEY_POLICY",
            defaults.host_key_policy,
        )?;

        Ok(Self {
            registry_account_id: get(ENV_ACCOUNT_ID),
            registry_region: get(ENV_REGION),
            registry_repo_name: get(ENV_REPO_NAME),
            remote_host: get(ENV_REMOTE_HOST),
            remote_username: get(ENV_REMOTE_USERNAME),
            remote_private_key_path: get(ENV_REMOTE_PRIVATE_KEY),
            remote_port,
            host_key_policy,
            known_hosts_path: get(ENV_KNOWN_HOSTS).map(PathBuf::from),
            workspace_dir: get("SKIFF_WORKSPACE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.workspace_dir),
            image_name: get("SKIFF_IMAGE_NAME").unwrap_or(defaults.image_name),
            image_tag: get("SKIFF_IMAGE_TAG").unwrap_or(defaults.image_tag),
            container_name: get("SKIFF_CONTAINER_NAME").unwrap_or(defaults.container_name),
            container_port,
            host_port,
            git_bin: get("SKIFF_GIT_BIN").unwrap_or(defaults.git_bin),
            docker_bin: get("SKIFF_DOCKER_BIN").unwrap_or(defaults.docker_bin),
        })
    }

    /// Validates the tunables
    ///
    /// Required registry and remote values are deliberately left alone.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.workspace_dir.as_os_str().is_empty() {
            anyhow::bail!("workspace_dir cannot be empty");
        }

        if self.image_name.is_empty() || self.image_tag.is_empty() {
            anyhow::bail!("image name and tag cannot be empty");
        }

        if self.container_name.is_empty() {
            anyhow::bail!("container_name cannot be empty");
        }

        if self.remote_port == 0 || self.container_port == 0 || self.host_port == 0 {
            anyhow::bail!("ports must be greater than 0");
        }

        Ok(())
    }

    /// Registry coordinates, failing on the first unset value
    pub fn registry(&self) -> Result<RegistryCoordinates, MissingConfig> {
        Ok(RegistryCoordinates {
            account_id: required(&self.registry_account_id, ENV_ACCOUNT_ID)?,
            region: required(&self.registry_region, ENV_REGION)?,
            repository: required(&self.registry_repo_name, ENV_REPO_NAME)?,
        })
    }

    /// Local tagged name of the built image, e.g. `myapp:latest`
    pub fn local_image(&self) -> String {
        format!("{}:{}", self.image_name, self.image_tag)
    }

    /// Registry name of the image for this deployment
    pub fn image(&self) -> Result<ImageReference, MissingConfig> {
        Ok(ImageReference::new(&self.registry()?, &self.image_tag))
    }

    /// Remote host settings, failing on the first unset value
    pub fn remote_target(&self) -> Result<RemoteTarget, MissingConfig> {
        let key_path = required(&self.remote_private_key_path, ENV_REMOTE_PRIVATE_KEY)?;
        let known_hosts = self
            .known_hosts_path
            .clone()
            .or_else(default_known_hosts)
            .ok_or(MissingConfig(ENV_KNOWN_HOSTS))?;

        Ok(RemoteTarget {
            host: required(&self.remote_host, ENV_REMOTE_HOST)?,
            port: self.remote_port,
            username: required(&self.remote_username, ENV_REMOTE_USERNAME)?,
            private_key_path: normalize_key_path(&key_path),
            host_key_policy: self.host_key_policy,
            known_hosts,
        })
    }
}

/// Converts `\` separators to `/` so Windows-style key paths work everywhere
pub fn normalize_key_path(path: &str) -> PathBuf {
    PathBuf::from(path.replace('\\', "/"))
}

fn default_known_hosts() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".ssh").join("known_hosts"))
}

fn required(value: &Option<String>, key: &'static str) -> Result<String, MissingConfig> {
    value.clone().ok_or(MissingConfig(key))
}

fn parse_or<T: FromStr>(value: Option<String>, key: &str, default: T) -> anyhow::Result<T> {
    match value {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| anyhow::anyhow!("invalid value for {}: '{}'", key, raw)),
        None => Ok(default),
    }
}
