//! In-memory collector.

use std::sync::RwLock;

use async_trait::async_trait;

use crate::error::CollectorError;
use crate::eval::{EvaluationRequest, ScoringResult};
use crate::observe::SpanRecord;

use super::Collector;

/// Collector that keeps spans and evaluation requests in memory.
///
/// `run_evaluation` gives every (example, scorer) pair the configured score
/// (1.0 by default). A collector built with [`InMemoryCollector::failing`]
/// rejects every call, which is handy for checking that instrumentation
/// failures stay isolated.
#[derive(Debug)]
pub struct InMemoryCollector {
    spans: RwLock<Vec<SpanRecord>>,
    evaluations: RwLock<Vec<EvaluationRequest>>,
    score: f64,
    fail: bool,
}

impl Default for InMemoryCollector {
    fn default() -> Self {
        Self {
            spans: RwLock::new(Vec::new()),
            evaluations: RwLock::new(Vec::new()),
            score: 1.0,
            fail: false,
        }
    }
}

impl InMemoryCollector {
    /// Create an empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a collector whose every call fails with a network error.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Set the score returned by `run_evaluation`.
    #[must_use]
    pub const fn with_score(mut self, score: f64) -> Self {
        self.score = score;
        self
    }

    /// Recorded spans, in completion order.
    #[must_use]
    pub fn spans(&self) -> Vec<SpanRecord> {
        self.spans.read().map(|s| s.clone()).unwrap_or_default()
    }

    /// Names of recorded spans, in completion order.
    #[must_use]
    pub fn span_names(&self) -> Vec<String> {
        self.spans
            .read()
            .map(|s| s.iter().map(|span| span.name.clone()).collect())
            .unwrap_or_default()
    }

    /// Submitted evaluation requests, in submission order.
    #[must_use]
    pub fn evaluations(&self) -> Vec<EvaluationRequest> {
        self.evaluations
            .read()
            .map(|e| e.clone())
            .unwrap_or_default()
    }

    fn check(&self) -> Result<(), CollectorError> {
        if self.fail {
            return Err(CollectorError::Network("simulated collector failure".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl Collector for InMemoryCollector {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn record_span(&self, span: &SpanRecord) -> Result<(), CollectorError> {
        self.check()?;
        if let Ok(mut spans) = self.spans.write() {
            spans.push(span.clone());
        }
        Ok(())
    }

    async fn submit_evaluation(&self, request: &EvaluationRequest) -> Result<(), CollectorError> {
        self.check()?;
        if let Ok(mut evaluations) = self.evaluations.write() {
            evaluations.push(request.clone());
        }
        Ok(())
    }

    async fn run_evaluation(
        &self,
        request: &EvaluationRequest,
    ) -> Result<Vec<ScoringResult>, CollectorError> {
        self.check()?;
        let results = (0..request.examples.len())
            .flat_map(|index| {
                request.scorers.iter().map(move |scorer| {
                    ScoringResult::scored(index, scorer.kind.as_str(), scorer.threshold, self.score)
                })
            })
            .collect();
        Ok(results)
    }
}
