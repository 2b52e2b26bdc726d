//! HTTP client for the remote collector service.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::CollectorError;
use crate::eval::{EvaluationRequest, ScoringResult};
use crate::observe::SpanRecord;

use super::Collector;

/// Configuration for [`HttpCollector`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpCollectorConfig {
    /// Bearer token.
    pub api_key: String,
    /// Service base URL.
    pub base_url: String,
    /// Optional organization ID, sent as `X-Organization-Id`.
    pub organization_id: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: Option<u64>,
}

impl HttpCollectorConfig {
    /// Default collector base URL.
    pub const DEFAULT_BASE_URL: &'static str = "http://localhost:8080/api";
    /// Default request timeout in seconds.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// Creates a new configuration with the given API key.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: Self::DEFAULT_BASE_URL.to_owned(),
            organization_id: None,
            timeout_secs: Some(Self::DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Sets the base URL.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the organization ID.
    #[must_use]
    pub fn with_organization_id(mut self, org: impl Into<String>) -> Self {
        self.organization_id = Some(org.into());
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }
}

#[derive(Debug, Deserialize)]
struct RunEvaluationResponse {
    results: Vec<ScoringResult>,
}

/// Collector backed by the remote collector service.
///
/// Endpoints, all `POST` with JSON bodies:
/// - `{base}/traces/spans` - one [`SpanRecord`]
/// - `{base}/evaluations/queue` - one [`EvaluationRequest`], scored later
/// - `{base}/evaluations/run` - one [`EvaluationRequest`], answered with `{"results": [...]}`
#[derive(Debug, Clone)]
pub struct HttpCollector {
    config: Arc<HttpCollectorConfig>,
    client: Client,
}

impl HttpCollector {
    /// Create a collector client.
    ///
    /// # Errors
    ///
    /// Returns [`CollectorError::Auth`] for an empty API key, or a network
    /// error if the HTTP client cannot be built.
    pub fn new(config: HttpCollectorConfig) -> Result<Self, CollectorError> {
        if config.api_key.is_empty() {
            return Err(CollectorError::Auth("API key is required".into()));
        }

        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(timeout));
        }
        let client = builder
            .build()
            .map_err(|e| CollectorError::Network(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            config: Arc::new(config),
            client,
        })
    }

    /// Get the base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.config.base_url.trim_end_matches('/'))
    }

    async fn post<B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<reqwest::Response, CollectorError> {
        let mut req = self
            .client
            .post(self.url(path))
            .bearer_auth(&self.config.api_key)
            .json(body);

        if let Some(org) = &self.config.organization_id {
            req = req.header("X-Organization-Id", org);
        }

        let response = req.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(match status.as_u16() {
            401 | 403 => CollectorError::Auth(body),
            code => CollectorError::HttpStatus { status: code, body },
        })
    }
}

#[async_trait]
impl Collector for HttpCollector {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn record_span(&self, span: &SpanRecord) -> Result<(), CollectorError> {
        debug!(span = %span.name, kind = %span.kind, "Reporting span");
        self.post("traces/spans", span).await?;
        Ok(())
    }

    async fn submit_evaluation(&self, request: &EvaluationRequest) -> Result<(), CollectorError> {
        debug!(
            project = %request.project_name,
            examples = request.examples.len(),
            scorers = request.scorers.len(),
            "Queueing evaluation"
        );
        self.post("evaluations/queue", request).await?;
        Ok(())
    }

    async fn run_evaluation(
        &self,
        request: &EvaluationRequest,
    ) -> Result<Vec<ScoringResult>, CollectorError> {
        debug!(
            project = %request.project_name,
            examples = request.examples.len(),
            scorers = request.scorers.len(),
            "Running evaluation"
        );
        let response = self.post("evaluations/run", request).await?;
        let text = response.text().await?;
        let parsed: RunEvaluationResponse = serde_json::from_str(&text)?;
        Ok(parsed.results)
    }
}
