//! Pipeline stage labels

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies where in the pipeline a failure occurred
///
/// The first four stages run locally, the rest run over the remote session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Fetch,
    Build,
    Tag,
    Publish,
    Connect,
    Stop,
    Remove,
    Pull,
    Run,
}

impl Stage {
    /// All stages in execution order
    pub const ALL: [Stage; 9] = [
        Stage::Fetch,
        Stage::Build,
        Stage::Tag,
        Stage::Publish,
        Stage::Connect,
        Stage::Stop,
        Stage::Remove,
        Stage::Pull,
        Stage::Run,
    ];

    /// Lowercase label used in logs and API responses
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Fetch => "fetch",
            Stage::Build => "build",
            Stage::Tag => "tag",
            Stage::Publish => "publish",
            Stage::Connect => "connect",
            Stage::Stop => "stop",
            Stage::Remove => "remove",
            Stage::Pull => "pull",
            Stage::Run => "run",
        }
    }

    /// Whether the stage executes on the remote host
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            Stage::Connect | Stage::Stop | Stage::Remove | Stage::Pull | Stage::Run
        )
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
