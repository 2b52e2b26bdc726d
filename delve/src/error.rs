//! Unified error types for delve.
//!
//! This module provides the error hierarchy covering:
//! - Model backend errors ([`LlmError`])
//! - Tracing/evaluation collector errors ([`CollectorError`])
//! - Research pipeline failures, tagged with the [`Stage`] that failed

use std::fmt;

use crate::eval::ScoringResult;

/// Result type alias for delve operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for delve.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Model backend error outside of a research pipeline.
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    /// A research pipeline stage failed; later stages were not run.
    #[error("{stage} stage failed: {source}")]
    Stage {
        /// The stage that failed.
        stage: Stage,
        /// The underlying backend error.
        #[source]
        source: LlmError,
    },

    /// Collector error surfaced to a caller that asked for results.
    #[error("Collector error: {0}")]
    Collector(#[from] CollectorError),

    /// One or more scoring results did not meet their threshold.
    #[error("Evaluation assertion failed: {} of {total} results unsuccessful", failures.len())]
    AssertionFailed {
        /// The unsuccessful results.
        failures: Vec<ScoringResult>,
        /// Total number of results evaluated.
        total: usize,
    },
}

impl Error {
    /// Create a stage error.
    #[must_use]
    pub const fn stage(stage: Stage, source: LlmError) -> Self {
        Self::Stage { stage, source }
    }

    /// Returns the failed pipeline stage, if this is a stage error.
    #[must_use]
    pub const fn failed_stage(&self) -> Option<Stage> {
        match self {
            Self::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

/// Research pipeline stages that can fail. Web search never does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Summarization of search results.
    Summarize,
    /// Final report generation.
    Report,
}

impl Stage {
    /// Returns the stage name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Summarize => "summarize",
            Self::Report => "report",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error type for model backend operations.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct LlmError {
    /// The error kind.
    pub kind: LlmErrorKind,
    /// The provider name (e.g., "openai", "mock").
    pub provider: Option<String>,
    /// Additional error message.
    pub message: String,
    /// Optional error code from the provider.
    pub code: Option<String>,
}

/// Categories of backend errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum LlmErrorKind {
    /// Authentication or authorization failure.
    Auth,
    /// Rate limit exceeded.
    RateLimited,
    /// Invalid request parameters.
    InvalidRequest,
    /// Response format error.
    ResponseFormat,
    /// Network or connection error.
    Network,
    /// HTTP status error.
    HttpStatus,
    /// Provider-specific error.
    Provider,
    /// Internal error.
    Internal,
}

impl LlmError {
    const fn with_kind(kind: LlmErrorKind, message: String) -> Self {
        Self {
            kind,
            provider: None,
            message,
            code: None,
        }
    }

    /// Create an authentication error.
    #[must_use]
    pub fn auth(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            provider: Some(provider.into()),
            ..Self::with_kind(LlmErrorKind::Auth, message.into())
        }
    }

    /// Create a rate limit error.
    #[must_use]
    pub fn rate_limited(provider: impl Into<String>) -> Self {
        Self {
            provider: Some(provider.into()),
            ..Self::with_kind(
                LlmErrorKind::RateLimited,
                "Rate limit exceeded. Please retry after some time.".into(),
            )
        }
    }

    /// Create an invalid request error.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::with_kind(LlmErrorKind::InvalidRequest, message.into())
    }

    /// Create a response format error.
    #[must_use]
    pub fn response_format(expected: impl Into<String>, got: impl Into<String>) -> Self {
        Self::with_kind(
            LlmErrorKind::ResponseFormat,
            format!("Expected {}, got {}", expected.into(), got.into()),
        )
    }

    /// Create a network error.
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::with_kind(LlmErrorKind::Network, message.into())
    }

    /// Create an HTTP status error.
    #[must_use]
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        Self {
            code: Some(status.to_string()),
            ..Self::with_kind(
                LlmErrorKind::HttpStatus,
                format!("HTTP {status}: {}", body.into()),
            )
        }
    }

    /// Create a provider-specific error.
    #[must_use]
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            provider: Some(provider.into()),
            ..Self::with_kind(LlmErrorKind::Provider, message.into())
        }
    }

    /// Create a provider error with an error code.
    #[must_use]
    pub fn provider_code(
        provider: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            provider: Some(provider.into()),
            code: Some(code.into()),
            ..Self::with_kind(LlmErrorKind::Provider, message.into())
        }
    }

    /// Create an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::with_kind(LlmErrorKind::Internal, message.into())
    }
}

impl fmt::Display for LlmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(provider) = &self.provider {
            write!(f, "[{provider}] ")?;
        }
        write!(f, "{}", self.message)?;
        if let Some(code) = &self.code {
            write!(f, " (code: {code})")?;
        }
        Ok(())
    }
}

impl std::error::Error for LlmError {}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::network("Request timed out")
        } else if err.is_connect() {
            Self::network(format!("Connection failed: {err}"))
        } else if err.is_decode() {
            Self::response_format("valid response body", err.to_string())
        } else {
            Self::network(err.to_string())
        }
    }
}

/// Error type for the tracing/evaluation collector.
///
/// Span reporting and asynchronous evaluation never return these to the
/// caller; they are logged and dropped.
#[derive(Debug, Clone, thiserror::Error)]
#[non_exhaustive]
pub enum CollectorError {
    /// Network or connection error.
    #[error("Network error: {0}")]
    Network(String),

    /// Non-success HTTP status from the collector.
    #[error("HTTP {status}: {body}")]
    HttpStatus {
        /// HTTP status code.
        status: u16,
        /// Response body.
        body: String,
    },

    /// Missing or rejected credentials.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Payload could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// No Tokio runtime was available to run the background worker.
    #[error("No Tokio runtime available for background evaluation")]
    NoRuntime,

    /// The background evaluation queue has shut down.
    #[error("Evaluation queue closed")]
    QueueClosed,

    /// Operation not supported by this collector.
    #[error("Not supported by this collector: {0}")]
    NotSupported(String),
}

impl CollectorError {
    /// Create a not supported error.
    #[must_use]
    pub fn not_supported(operation: impl Into<String>) -> Self {
        Self::NotSupported(operation.into())
    }
}

impl From<reqwest::Error> for CollectorError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Serialization(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for CollectorError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    mod error {
        use super::*;

        #[test]
        fn stage_error_names_stage() {
            let err = Error::stage(Stage::Summarize, LlmError::network("timeout"));
            assert_eq!(err.failed_stage(), Some(Stage::Summarize));
            let s = err.to_string();
            assert!(s.starts_with("summarize stage failed"));
            assert!(s.contains("timeout"));
        }

        #[test]
        fn stage_error_exposes_source() {
            let err = Error::stage(Stage::Report, LlmError::rate_limited("openai"));
            let source = std::error::Error::source(&err).unwrap();
            assert!(source.to_string().contains("Rate limit"));
        }

        #[test]
        fn from_llm_error_has_no_stage() {
            let err: Error = LlmError::internal("bug").into();
            assert!(matches!(err, Error::Llm(_)));
            assert_eq!(err.failed_stage(), None);
        }

        #[test]
        fn from_collector_error() {
            let err: Error = CollectorError::QueueClosed.into();
            assert!(matches!(err, Error::Collector(_)));
        }

        #[test]
        fn assertion_failed_counts() {
            let err = Error::AssertionFailed {
                failures: Vec::new(),
                total: 4,
            };
            assert!(err.to_string().contains("0 of 4"));
        }
    }

    mod stage {
        use super::*;

        #[test]
        fn display_is_lowercase() {
            assert_eq!(Stage::Summarize.to_string(), "summarize");
            assert_eq!(Stage::Report.to_string(), "report");
        }
    }

    mod llm_error {
        use super::*;

        #[test]
        fn auth_creates_error() {
            let err = LlmError::auth("openai", "Invalid API key");
            assert_eq!(err.kind, LlmErrorKind::Auth);
            assert_eq!(err.provider.as_deref(), Some("openai"));
            assert!(err.message.contains("Invalid API key"));
            assert!(err.code.is_none());
        }

        #[test]
        fn rate_limited_creates_error() {
            let err = LlmError::rate_limited("openai");
            assert_eq!(err.kind, LlmErrorKind::RateLimited);
            assert!(err.message.contains("Rate limit"));
        }

        #[test]
        fn http_status_sets_code() {
            let err = LlmError::http_status(503, "Service Unavailable");
            assert_eq!(err.kind, LlmErrorKind::HttpStatus);
            assert_eq!(err.code.as_deref(), Some("503"));
            assert!(err.to_string().contains("(code: 503)"));
        }

        #[test]
        fn provider_code_creates_error() {
            let err = LlmError::provider_code("openai", "model_not_found", "gpt-5 not available");
            assert_eq!(err.kind, LlmErrorKind::Provider);
            assert_eq!(err.code.as_deref(), Some("model_not_found"));
        }

        #[test]
        fn display_without_provider() {
            let s = LlmError::network("timeout").to_string();
            assert!(!s.contains('['));
            assert_eq!(s, "timeout");
        }
    }

    mod collector_error {
        use super::*;

        #[test]
        fn display_variants() {
            assert!(
                CollectorError::HttpStatus {
                    status: 500,
                    body: "boom".into()
                }
                .to_string()
                .contains("500")
            );
            assert!(CollectorError::NoRuntime.to_string().contains("runtime"));
            assert!(
                CollectorError::not_supported("run_evaluation")
                    .to_string()
                    .contains("run_evaluation")
            );
        }

        #[test]
        fn from_serde_json_error() {
            let json_err = serde_json::from_str::<i32>("nope").unwrap_err();
            let err: CollectorError = json_err.into();
            assert!(matches!(err, CollectorError::Serialization(_)));
        }
    }
}
