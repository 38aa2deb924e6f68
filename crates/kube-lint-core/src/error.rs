//! Error taxonomy shared by every kube-lint crate.

use crate::context::GateError;

/// Errors produced while invoking collaborators or interpreting their output.
#[derive(Debug, thiserror::Error)]
pub enum KubeLintError {
    #[error("{tool} not found{}", .install.map(|url| format!(". Install: {url}")).unwrap_or_default())]
    ToolNotFound {
        tool: String,
        /// Where to get the tool, when worth telling the user.
        install: Option<&'static str>,
    },

    #[error("Timeout running {command} after {timeout_secs}s")]
    Timeout { command: String, timeout_secs: u64 },

    #[error("{message}")]
    NonZeroExit {
        command: String,
        exit_code: i32,
        message: String,
    },

    #[error("Failed to parse {what}: {message}")]
    Parse { what: String, message: String },

    #[error("{0}")]
    Precondition(String),

    #[error(transparent)]
    Gate(#[from] GateError),
}

impl KubeLintError {
    /// Build a parse failure for the named collaborator output.
    pub fn parse(what: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self::Parse {
            what: what.into(),
            message: err.to_string(),
        }
    }

    /// Rename the tool in a `ToolNotFound` and attach an install hint.
    /// Other errors pass through unchanged.
    pub fn describe_missing(self, tool: &str, install: Option<&'static str>) -> Self {
        match self {
            Self::ToolNotFound { .. } => Self::ToolNotFound {
                tool: tool.to_string(),
                install,
            },
            other => other,
        }
    }
}

/// Result type for kube-lint operations.
pub type Result<T> = std::result::Result<T, KubeLintError>;
