//! Image reference types
//!
//! A built image moves through three names: the local build name
//! (`myapp`), the local tagged name (`myapp:latest`) and the fully
//! qualified registry name (`<account>.dkr.ecr.<region>.amazonaws.com/<repo>:latest`).
//! Only the registry name is modelled here; the local names are plain
//! configuration.

use serde::{Deserialize, Serialize};

/// Registry coordinates the remote image name is derived from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryCoordinates {
    pub account_id: String,
    pub region: String,
    pub repository: String,
}

impl RegistryCoordinates {
    /// Registry host, e.g. `123456789012.dkr.ecr.us-east-1.amazonaws.com`
    pub fn host(&self) -> String {
        format!("{}.dkr.ecr.{}.amazonaws.com", self.account_id, self.region)
    }
}

/// Registry name of the image built by one deployment run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageReference {
    /// Fully qualified registry name including the tag
    pub remote: String,
}

impl ImageReference {
    /// Builds the reference from static configuration
    ///
    /// The remote name is never user supplied.
    pub fn new(registry: &RegistryCoordinates, tag: &str) -> Self {
        Self {
            remote: format!("{}/{}:{}", registry.host(), registry.repository, tag),
        }
    }
}
