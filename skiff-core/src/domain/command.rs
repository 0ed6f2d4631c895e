//! External command results

use serde::{Deserialize, Serialize};

/// Placeholder used when a failed command left no diagnostic text
pub const UNKNOWN_ERROR: &str = "Unknown error";

/// Captured result of one external command
///
/// Produced for every local tool invocation and every remote command.
/// Only kept long enough to log it or build an error message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandOutput {
    /// Human-readable command line, for logs and error messages
    pub command: String,
    pub exit_status: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_status == 0
    }

    /// Error text for a failed command
    ///
    /// Returns the trimmed stderr, or [`UNKNOWN_ERROR`] when the command
    /// wrote nothing to stderr.
    pub fn error_text(&self) -> String {
        let trimmed = self.stderr.trim();
        if trimmed.is_empty() {
            UNKNOWN_ERROR.to_string()
        } else {
            trimmed.to_string()
        }
    }
}
