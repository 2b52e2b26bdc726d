//! Collector that writes spans and evaluation requests to `tracing`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::CollectorError;
use crate::eval::EvaluationRequest;
use crate::observe::SpanRecord;

use super::Collector;

/// Log verbosity level for collector events.
///
/// Maps directly to `tracing` levels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace-level logging (most verbose).
    Trace,
    /// Debug-level logging.
    Debug,
    /// Info-level logging (default).
    #[default]
    Info,
    /// Warn-level logging.
    Warn,
}

/// Emit a log event at the specified level using `tracing` macros.
macro_rules! log_at_level {
    ($level:expr, $($arg:tt)*) => {
        match $level {
            LogLevel::Trace => tracing::trace!($($arg)*),
            LogLevel::Debug => tracing::debug!($($arg)*),
            LogLevel::Info  => tracing::info!($($arg)*),
            LogLevel::Warn  => tracing::warn!($($arg)*),
        }
    };
}

/// A [`Collector`] that logs instead of sending anything.
///
/// Used when no collector credentials are configured so that spans stay
/// visible in the local log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingCollector {
    level: LogLevel,
}

impl LoggingCollector {
    /// Create a logging collector at INFO level.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a logging collector with a custom log level.
    #[must_use]
    pub const fn with_level(level: LogLevel) -> Self {
        Self { level }
    }

    /// The level events are emitted at.
    #[must_use]
    pub const fn level(&self) -> LogLevel {
        self.level
    }
}

#[async_trait]
impl Collector for LoggingCollector {
    fn name(&self) -> &'static str {
        "logging"
    }

    async fn record_span(&self, span: &SpanRecord) -> Result<(), CollectorError> {
        match &span.error {
            Some(error) => log_at_level!(self.level,
                project = %span.project_name,
                span = %span.name,
                kind = %span.kind,
                duration_ms = span.duration_ms,
                error = %error,
                "Span failed"
            ),
            None => log_at_level!(self.level,
                project = %span.project_name,
                span = %span.name,
                kind = %span.kind,
                duration_ms = span.duration_ms,
                "Span completed"
            ),
        }
        Ok(())
    }

    async fn submit_evaluation(&self, request: &EvaluationRequest) -> Result<(), CollectorError> {
        let scorers: Vec<String> = request
            .scorers
            .iter()
            .map(|s| format!("{}>={}", s.kind, s.threshold))
            .collect();
        log_at_level!(self.level,
            project = %request.project_name,
            examples = request.examples.len(),
            scorers = %scorers.join(","),
            model = %request.model,
            "Evaluation requested"
        );
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::eval::{EvaluationExample, ScorerConfig};

    #[tokio::test]
    async fn accepts_spans_and_submissions() {
        let collector = LoggingCollector::with_level(LogLevel::Debug);
        let request = EvaluationRequest::new(
            "p",
            vec![EvaluationExample::new("q", "a")],
            vec![ScorerConfig::answer_relevancy(0.7)],
            "gpt-4",
        );
        collector.submit_evaluation(&request).await.unwrap();
    }

    #[test]
    fn level_names_are_lowercase() {
        let level: LogLevel = serde_json::from_str("\"debug\"").unwrap();
        assert_eq!(level, LogLevel::Debug);
        assert_eq!(serde_json::to_string(&LogLevel::Warn).unwrap(), "\"warn\"");
        assert_eq!(LoggingCollector::new().level(), LogLevel::Info);
    }

    #[tokio::test]
    async fn cannot_run_evaluations() {
        let request = EvaluationRequest::new("p", Vec::new(), Vec::new(), "gpt-4");
        let err = LoggingCollector::new()
            .run_evaluation(&request)
            .await
            .unwrap_err();
        assert!(matches!(err, CollectorError::NotSupported(_)));
    }
}
