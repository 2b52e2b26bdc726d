//! Synchronous evaluation client.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::collector::SharedCollector;
use crate::error::{Error, Result};

use super::{EvaluationExample, EvaluationRequest, EvaluationResults, ScorerConfig, ScoringResult};

/// A scorer computed locally instead of by the collector.
///
/// # Example
///
/// ```rust,ignore
/// struct Length;
///
/// #[async_trait]
/// impl CustomScorer for Length {
///     fn name(&self) -> &str { "length" }
///     fn threshold(&self) -> f64 { 0.5 }
///
///     async fn score(&self, example: &EvaluationExample) -> Result<f64> {
///         Ok((example.actual_output.len() as f64 / 100.0).min(1.0))
///     }
/// }
/// ```
#[async_trait]
pub trait CustomScorer: Send + Sync {
    /// Name reported in [`ScoringResult::scorer`].
    fn name(&self) -> &str;

    /// Minimum passing score.
    fn threshold(&self) -> f64;

    /// Score one example.
    async fn score(&self, example: &EvaluationExample) -> Result<f64>;
}

/// Runs evaluations and returns their results.
///
/// Built-in scorers run on the collector; [`CustomScorer`]s run locally and
/// their results are appended after the collector's.
#[derive(Clone)]
pub struct EvaluationClient {
    project_name: String,
    collector: SharedCollector,
    custom_scorers: Vec<Arc<dyn CustomScorer>>,
}

impl EvaluationClient {
    /// Create a client filing results under `project_name`.
    #[must_use]
    pub fn new(project_name: impl Into<String>, collector: SharedCollector) -> Self {
        Self {
            project_name: project_name.into(),
            collector,
            custom_scorers: Vec::new(),
        }
    }

    /// Add a locally computed scorer.
    #[must_use]
    pub fn with_custom_scorer(mut self, scorer: impl CustomScorer + 'static) -> Self {
        self.custom_scorers.push(Arc::new(scorer));
        self
    }

    /// The project results are filed under.
    #[must_use]
    pub fn project_name(&self) -> &str {
        &self.project_name
    }

    /// Score `examples` with `scorers` and the custom scorers.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Collector`] when the collector cannot run the
    /// evaluation. Custom scorer errors are recorded on their result instead.
    pub async fn run_evaluation(
        &self,
        examples: Vec<EvaluationExample>,
        scorers: Vec<ScorerConfig>,
        model: &str,
    ) -> Result<EvaluationResults> {
        let request = EvaluationRequest::new(&self.project_name, examples, scorers, model);

        let mut results = if request.scorers.is_empty() || request.examples.is_empty() {
            Vec::new()
        } else {
            self.collector.run_evaluation(&request).await?
        };

        for scorer in &self.custom_scorers {
            for (index, example) in request.examples.iter().enumerate() {
                let result = match scorer.score(example).await {
                    Ok(score) => {
                        ScoringResult::scored(index, scorer.name(), scorer.threshold(), score)
                    }
                    Err(e) => ScoringResult::failed(
                        index,
                        scorer.name(),
                        scorer.threshold(),
                        e.to_string(),
                    ),
                };
                results.push(result);
            }
        }

        let results = EvaluationResults::new(results);
        info!(
            project = %self.project_name,
            examples = request.examples.len(),
            results = results.len(),
            failures = results.failures().len(),
            "Evaluation finished"
        );
        Ok(results)
    }

    /// Like [`run_evaluation`](Self::run_evaluation), but fails unless every
    /// result succeeded.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AssertionFailed`] carrying the unsuccessful results,
    /// or any error from `run_evaluation`.
    pub async fn assert_test(
        &self,
        examples: Vec<EvaluationExample>,
        scorers: Vec<ScorerConfig>,
        model: &str,
    ) -> Result<EvaluationResults> {
        let results = self.run_evaluation(examples, scorers, model).await?;
        if results.all_passed() {
            debug!(results = results.len(), "Assertion passed");
            return Ok(results);
        }

        let total = results.len();
        let failures = results.into_iter().filter(|r| !r.success).collect();
        Err(Error::AssertionFailed { failures, total })
    }
}

impl fmt::Debug for EvaluationClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EvaluationClient")
            .field("project_name", &self.project_name)
            .field("collector", &self.collector.name())
            .field("custom_scorers", &self.custom_scorers.len())
            .finish()
    }
}
