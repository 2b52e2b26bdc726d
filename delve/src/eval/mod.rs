//! Evaluation data types, the background evaluation queue and the
//! synchronous evaluation client.
//!
//! An [`EvaluationRequest`] bundles examples with the scorers that should
//! grade them. Requests are either handed to the [`AsyncEvaluator`] queue
//! (fire-and-forget, results land on the collector's dashboard) or run
//! through [`EvaluationClient`] when the caller wants the
//! [`ScoringResult`]s back.

mod client;
mod queue;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use client::{CustomScorer, EvaluationClient};
pub use queue::AsyncEvaluator;

/// One (input, output) pair to be scored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationExample {
    /// The prompt or question.
    pub input: String,
    /// What the system produced.
    pub actual_output: String,
    /// Reference answer, when one exists.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_output: Option<String>,
    /// Context the output should be grounded in.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub retrieval_context: Vec<String>,
}

impl EvaluationExample {
    /// Create an example from an input and the produced output.
    #[must_use]
    pub fn new(input: impl Into<String>, actual_output: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            actual_output: actual_output.into(),
            ..Self::default()
        }
    }

    /// Set the expected output.
    #[must_use]
    pub fn with_expected_output(mut self, expected: impl Into<String>) -> Self {
        self.expected_output = Some(expected.into());
        self
    }

    /// Replace the retrieval context.
    #[must_use]
    pub fn with_retrieval_context<I, S>(mut self, context: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.retrieval_context = context.into_iter().map(Into::into).collect();
        self
    }
}

/// Built-in scorers offered by the evaluation service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScorerKind {
    /// How well the output addresses the input.
    AnswerRelevancy,
    /// Whether the output is supported by the retrieval context.
    Faithfulness,
    /// Agreement with the expected output.
    AnswerCorrectness,
    /// Whether the output follows the instructions in the input.
    InstructionAdherence,
}

impl ScorerKind {
    /// Threshold used when none is given.
    pub const DEFAULT_THRESHOLD: f64 = 0.5;

    /// Every built-in scorer.
    pub const ALL: [Self; 4] = [
        Self::AnswerCorrectness,
        Self::AnswerRelevancy,
        Self::Faithfulness,
        Self::InstructionAdherence,
    ];

    /// Wire name of the scorer.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::AnswerRelevancy => "answer_relevancy",
            Self::Faithfulness => "faithfulness",
            Self::AnswerCorrectness => "answer_correctness",
            Self::InstructionAdherence => "instruction_adherence",
        }
    }
}

impl fmt::Display for ScorerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown scorer name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown scorer: {0}")]
pub struct ParseScorerKindError(String);

impl FromStr for ScorerKind {
    type Err = ParseScorerKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| ParseScorerKindError(s.to_owned()))
    }
}

/// A scorer together with the minimum score that counts as a pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScorerConfig {
    /// Which scorer to run.
    pub kind: ScorerKind,
    /// Minimum passing score in `[0, 1]`.
    pub threshold: f64,
}

impl ScorerConfig {
    /// Create a scorer config.
    #[must_use]
    pub const fn new(kind: ScorerKind, threshold: f64) -> Self {
        Self { kind, threshold }
    }

    /// Answer relevancy with the given threshold.
    #[must_use]
    pub const fn answer_relevancy(threshold: f64) -> Self {
        Self::new(ScorerKind::AnswerRelevancy, threshold)
    }

    /// Faithfulness with the given threshold.
    #[must_use]
    pub const fn faithfulness(threshold: f64) -> Self {
        Self::new(ScorerKind::Faithfulness, threshold)
    }

    /// Answer correctness with the given threshold.
    #[must_use]
    pub const fn answer_correctness(threshold: f64) -> Self {
        Self::new(ScorerKind::AnswerCorrectness, threshold)
    }

    /// Instruction adherence with the given threshold.
    #[must_use]
    pub const fn instruction_adherence(threshold: f64) -> Self {
        Self::new(ScorerKind::InstructionAdherence, threshold)
    }
}

impl From<ScorerKind> for ScorerConfig {
    fn from(kind: ScorerKind) -> Self {
        Self::new(kind, ScorerKind::DEFAULT_THRESHOLD)
    }
}

/// A batch of examples to score, as sent to the collector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRequest {
    /// Project the results are filed under.
    pub project_name: String,
    /// Examples to score.
    pub examples: Vec<EvaluationExample>,
    /// Scorers to apply to every example.
    pub scorers: Vec<ScorerConfig>,
    /// Judge model used by the scorers.
    pub model: String,
}

impl EvaluationRequest {
    /// Create a request.
    #[must_use]
    pub fn new(
        project_name: impl Into<String>,
        examples: Vec<EvaluationExample>,
        scorers: Vec<ScorerConfig>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            project_name: project_name.into(),
            examples,
            scorers,
            model: model.into(),
        }
    }
}

/// Outcome of one scorer on one example.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringResult {
    /// Index of the example in the request.
    pub example_index: usize,
    /// Scorer name (a [`ScorerKind`] wire name or a custom scorer's name).
    pub scorer: String,
    /// Threshold the score was compared against.
    pub threshold: f64,
    /// The score, absent when scoring failed.
    #[serde(default)]
    pub score: Option<f64>,
    /// Whether the score met the threshold.
    pub success: bool,
    /// Judge's explanation, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Why scoring failed, if it did.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ScoringResult {
    /// Build a result from a score; `success` is `score >= threshold`.
    #[must_use]
    pub fn scored(
        example_index: usize,
        scorer: impl Into<String>,
        threshold: f64,
        score: f64,
    ) -> Self {
        Self {
            example_index,
            scorer: scorer.into(),
            threshold,
            score: Some(score),
            success: score >= threshold,
            reason: None,
            error: None,
        }
    }

    /// Build an unsuccessful result for a scorer that could not run.
    #[must_use]
    pub fn failed(
        example_index: usize,
        scorer: impl Into<String>,
        threshold: f64,
        error: impl Into<String>,
    ) -> Self {
        Self {
            example_index,
            scorer: scorer.into(),
            threshold,
            score: None,
            success: false,
            reason: None,
            error: Some(error.into()),
        }
    }

    /// Attach the judge's explanation.
    #[must_use]
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

impl fmt::Display for ScoringResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mark = if self.success { "PASS" } else { "FAIL" };
        write!(f, "[{mark}] #{} {}: ", self.example_index, self.scorer)?;
        match (self.score, &self.error) {
            (Some(score), _) => write!(f, "{score:.2} (threshold {:.2})", self.threshold)?,
            (None, Some(err)) => write!(f, "error: {err}")?,
            (None, None) => f.write_str("no score")?,
        }
        if let Some(reason) = &self.reason {
            write!(f, " - {reason}")?;
        }
        Ok(())
    }
}

/// All results of one evaluation run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResults {
    /// Results in the order they were produced.
    pub results: Vec<ScoringResult>,
}

impl EvaluationResults {
    /// Wrap a list of results.
    #[must_use]
    pub const fn new(results: Vec<ScoringResult>) -> Self {
        Self { results }
    }

    /// Whether every result succeeded. Vacuously true when empty.
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.results.iter().all(|r| r.success)
    }

    /// The unsuccessful results.
    #[must_use]
    pub fn failures(&self) -> Vec<&ScoringResult> {
        self.results.iter().filter(|r| !r.success).collect()
    }

    /// Results produced by the named scorer.
    pub fn by_scorer<'a>(&'a self, scorer: &'a str) -> impl Iterator<Item = &'a ScoringResult> {
        self.results.iter().filter(move |r| r.scorer == scorer)
    }

    /// Mean score of the named scorer across examples that produced one.
    #[must_use]
    pub fn mean_score(&self, scorer: &str) -> Option<f64> {
        let scores: Vec<f64> = self.by_scorer(scorer).filter_map(|r| r.score).collect();
        if scores.is_empty() {
            return None;
        }
        Some(scores.iter().sum::<f64>() / scores.len() as f64)
    }

    /// Number of results.
    #[must_use]
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Whether there are no results.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

impl IntoIterator for EvaluationResults {
    type Item = ScoringResult;
    type IntoIter = std::vec::IntoIter<ScoringResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.into_iter()
    }
}
