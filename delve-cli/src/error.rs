//! Error types for the CLI.

use delve::{CollectorError, LlmError};

use crate::config::ConfigError;

/// Errors surfaced by CLI commands.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Library error.
    #[error(transparent)]
    Delve(#[from] delve::Error),

    /// Configuration error.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// JSON output error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A command ran but did not succeed.
    #[error("{0}")]
    Failed(String),
}

impl CliError {
    /// Create a failure with a message.
    #[must_use]
    pub fn failed(msg: impl Into<String>) -> Self {
        Self::Failed(msg.into())
    }
}

impl From<LlmError> for CliError {
    fn from(err: LlmError) -> Self {
        Self::Delve(err.into())
    }
}

impl From<CollectorError> for CliError {
    fn from(err: CollectorError) -> Self {
        Self::Delve(err.into())
    }
}

/// Result type for CLI commands.
pub type Result<T> = std::result::Result<T, CliError>;
