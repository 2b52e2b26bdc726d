//! End-to-end smoke checks run by `delve check`.

use std::convert::Infallible;
use std::fmt;
use std::time::Duration;

use delve::eval::{EvaluationClient, EvaluationExample, ScorerConfig};
use delve::observe::{SpanKind, Tracer};
use delve::research::{Depth, ResearchAgent};

/// Outcome of one smoke check.
#[derive(Debug)]
pub struct Check {
    /// Human-readable check name.
    pub name: &'static str,
    /// Detail on success, reason on failure.
    pub outcome: Result<String, String>,
}

impl Check {
    /// Whether the check passed.
    #[must_use]
    pub const fn passed(&self) -> bool {
        self.outcome.is_ok()
    }
}

impl fmt::Display for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            Ok(detail) => write!(f, "✅ {}: {detail}", self.name),
            Err(reason) => write!(f, "❌ {}: {reason}", self.name),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Intentional test error")]
struct IntentionalError;

/// Run every check in order. A failing check never stops the others.
pub async fn run_checks(
    agent: &ResearchAgent,
    client: &EvaluationClient,
    judge_model: &str,
) -> Vec<Check> {
    vec![
        Check {
            name: "Research agent",
            outcome: research_agent(agent).await,
        },
        Check {
            name: "Async tracing",
            outcome: async_tracing(agent.tracer()).await,
        },
        Check {
            name: "Error passthrough",
            outcome: error_passthrough(agent.tracer()).await,
        },
        Check {
            name: "Basic evaluation",
            outcome: basic_evaluation(client, judge_model).await,
        },
        Check {
            name: "Unit test assertion",
            outcome: assertion(client, judge_model).await,
        },
    ]
}

async fn research_agent(agent: &ResearchAgent) -> Result<String, String> {
    let report = agent
        .research_topic("AI safety", Depth::Basic)
        .await
        .map_err(|e| e.to_string())?;
    if report.topic.is_empty() || report.research_report.is_empty() {
        return Err("agent returned an empty report".into());
    }
    Ok(format!("completed research on: {}", report.topic))
}

async fn async_tracing(tracer: &Tracer) -> Result<String, String> {
    let op = tracer.observe_fn(
        "async_operation",
        SpanKind::custom("async_tool"),
        |(): ()| async {
            tokio::time::sleep(Duration::from_millis(100)).await;
            Ok::<_, Infallible>("async result")
        },
    );
    match op(()).await {
        Ok("async result") => Ok("traced async operation returned its value".into()),
        Ok(other) => Err(format!("unexpected result: {other}")),
        Err(never) => match never {},
    }
}

async fn error_passthrough(tracer: &Tracer) -> Result<String, String> {
    let failing = tracer.observe_fn(
        "failing_function",
        SpanKind::custom("error_prone"),
        |(): ()| async { Err::<(), _>(IntentionalError) },
    );
    match failing(()).await {
        Err(e) if e.to_string() == "Intentional test error" => {
            Ok("error was propagated unchanged".into())
        }
        Err(e) => Err(format!("unexpected error: {e}")),
        Ok(()) => Err("error should have been raised".into()),
    }
}

async fn basic_evaluation(client: &EvaluationClient, model: &str) -> Result<String, String> {
    let example = EvaluationExample::new("What is AI?", "AI is artificial intelligence")
        .with_expected_output("Artificial intelligence");
    let results = client
        .run_evaluation(vec![example], vec![ScorerConfig::answer_relevancy(0.5)], model)
        .await
        .map_err(|e| e.to_string())?;
    Ok(format!("{} result(s) returned", results.len()))
}

async fn assertion(client: &EvaluationClient, model: &str) -> Result<String, String> {
    let example = EvaluationExample::new("What is 2+2?", "2+2 equals 4").with_expected_output("4");
    client
        .assert_test(
            vec![example],
            vec![ScorerConfig::answer_correctness(0.3)],
            model,
        )
        .await
        .map(|_| "assertion passed".to_owned())
        .map_err(|e| e.to_string())
}
