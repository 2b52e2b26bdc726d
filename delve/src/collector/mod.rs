//! Clients for the tracing and evaluation collector.
//!
//! The [`Collector`] trait is the seam between instrumentation and wherever
//! spans and evaluation requests end up:
//!
//! - [`HttpCollector`] - the remote collector service
//! - [`InMemoryCollector`] - keeps everything in memory for tests and inspection
//! - [`LoggingCollector`] - emits `tracing` events, for running without credentials

mod http;
mod logging;
mod memory;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::CollectorError;
use crate::eval::{EvaluationRequest, ScoringResult};
use crate::observe::SpanRecord;

pub use http::{HttpCollector, HttpCollectorConfig};
pub use logging::{LogLevel, LoggingCollector};
pub use memory::InMemoryCollector;

/// Destination for spans and evaluation requests.
#[async_trait]
pub trait Collector: Send + Sync {
    /// Short name used in log output.
    fn name(&self) -> &'static str;

    /// Record one completed span.
    async fn record_span(&self, span: &SpanRecord) -> Result<(), CollectorError>;

    /// Queue an evaluation on the collector side without waiting for results.
    async fn submit_evaluation(&self, request: &EvaluationRequest) -> Result<(), CollectorError>;

    /// Score a request and return the results.
    ///
    /// Collectors that cannot score return [`CollectorError::NotSupported`].
    async fn run_evaluation(
        &self,
        request: &EvaluationRequest,
    ) -> Result<Vec<ScoringResult>, CollectorError> {
        let _ = request;
        Err(CollectorError::not_supported("run_evaluation"))
    }
}

#[async_trait]
impl<C: Collector + ?Sized> Collector for Arc<C> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    async fn record_span(&self, span: &SpanRecord) -> Result<(), CollectorError> {
        (**self).record_span(span).await
    }

    async fn submit_evaluation(&self, request: &EvaluationRequest) -> Result<(), CollectorError> {
        (**self).submit_evaluation(request).await
    }

    async fn run_evaluation(
        &self,
        request: &EvaluationRequest,
    ) -> Result<Vec<ScoringResult>, CollectorError> {
        (**self).run_evaluation(request).await
    }
}

/// Type alias for an Arc-wrapped `Collector`.
pub type SharedCollector = Arc<dyn Collector>;
