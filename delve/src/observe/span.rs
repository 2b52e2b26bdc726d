//! Span records reported to the collector.

use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// What kind of operation a span covers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpanKind {
    /// A tool invocation.
    Tool,
    /// A plain function, such as the pipeline entry point.
    Function,
    /// A call to the model backend.
    Llm,
    /// Any other caller-chosen kind.
    #[serde(untagged)]
    Custom(String),
}

impl SpanKind {
    /// Create a custom span kind.
    #[must_use]
    pub fn custom(kind: impl Into<String>) -> Self {
        Self::Custom(kind.into())
    }

    /// The kind's name as reported to the collector.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Tool => "tool",
            Self::Function => "function",
            Self::Llm => "llm",
            Self::Custom(kind) => kind,
        }
    }
}

impl fmt::Display for SpanKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for SpanKind {
    fn from(kind: &str) -> Self {
        match kind {
            "tool" => Self::Tool,
            "function" => Self::Function,
            "llm" => Self::Llm,
            other => Self::Custom(other.to_owned()),
        }
    }
}

/// One completed, instrumented operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpanRecord {
    /// Unique span id.
    pub span_id: Uuid,
    /// Project the span belongs to.
    pub project_name: String,
    /// Operation name.
    pub name: String,
    /// Operation kind.
    pub kind: SpanKind,
    /// Serialized arguments.
    pub inputs: Value,
    /// Serialized return value; `null` on error.
    pub output: Value,
    /// Display form of the error, if the operation failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Wall-clock start, milliseconds since the Unix epoch.
    pub started_at_ms: u64,
    /// Elapsed time in milliseconds.
    pub duration_ms: u64,
}

impl SpanRecord {
    /// Whether the operation returned an error.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Elapsed time as a [`Duration`].
    #[must_use]
    pub const fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }
}

/// Milliseconds since the Unix epoch.
pub(crate) fn timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(millis)
        .unwrap_or_default()
}

/// Saturating conversion of a duration to whole milliseconds.
pub(crate) fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn kind_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&SpanKind::Tool).unwrap(), "\"tool\"");
        assert_eq!(serde_json::to_string(&SpanKind::Llm).unwrap(), "\"llm\"");
        assert_eq!(
            serde_json::to_string(&SpanKind::custom("async_tool")).unwrap(),
            "\"async_tool\""
        );
    }

    #[test]
    fn kind_from_str() {
        assert_eq!(SpanKind::from("function"), SpanKind::Function);
        assert_eq!(
            SpanKind::from("error_prone"),
            SpanKind::Custom("error_prone".into())
        );
        assert_eq!(SpanKind::custom("x").to_string(), "x");
    }

    #[test]
    fn record_skips_absent_error() {
        let record = SpanRecord {
            span_id: Uuid::new_v4(),
            project_name: "p".into(),
            name: "web_search".into(),
            kind: SpanKind::Tool,
            inputs: serde_json::json!({"query": "q"}),
            output: Value::Null,
            error: None,
            started_at_ms: timestamp_ms(),
            duration_ms: 3,
        };
        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("error").is_none());
        assert_eq!(json["kind"], "tool");
        assert!(!record.is_error());
        assert_eq!(record.duration(), Duration::from_millis(3));
    }

    #[test]
    fn millis_saturates() {
        assert_eq!(millis(Duration::from_millis(42)), 42);
        assert_eq!(millis(Duration::MAX), u64::MAX);
    }
}
