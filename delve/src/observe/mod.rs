//! Span tracing and online evaluation.
//!
//! A [`Tracer`] reports every instrumented operation to a
//! [`Collector`](crate::collector::Collector) as a [`SpanRecord`] and owns the
//! background [`AsyncEvaluator`] used by [`Tracer::async_evaluate`].
//!
//! Instrumentation is composition:
//!
//! - [`Tracer::observe`] wraps a [`Tool`](crate::tool::Tool) in [`Observed`]
//! - [`Tracer::wrap`] wraps a [`ChatProvider`](crate::chat::ChatProvider) in [`TracedProvider`]
//! - [`Tracer::observe_fn`] turns an async function into an instrumented one
//! - [`Tracer::observe_call`] instruments a single future
//!
//! None of these change the wrapped operation's result, and collector
//! failures are logged, never returned.
//!
//! # Example
//!
//! ```rust,ignore
//! use delve::prelude::*;
//!
//! let tracer = Tracer::new("research_assistant_agent", Arc::new(LoggingCollector::new()))?;
//! let search = tracer.observe(WebSearchTool::new());
//! let results = search.call(WebSearchArgs::new("AI safety")).await?;
//! ```

mod observed;
mod provider;
mod span;

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use futures::future::BoxFuture;
use serde::Serialize;
use serde_json::Value;
use tracing::{Instrument, warn};
use uuid::Uuid;

use crate::collector::SharedCollector;
use crate::error::Result;
use crate::eval::{AsyncEvaluator, EvaluationExample, EvaluationRequest, ScorerConfig};

pub use observed::Observed;
pub use provider::TracedProvider;
pub use span::{SpanKind, SpanRecord};

use span::{millis, timestamp_ms};

struct TracerInner {
    project_name: String,
    collector: SharedCollector,
    evaluator: AsyncEvaluator,
}

/// Reports spans and queues evaluations for one project.
///
/// Cheap to clone; clones share the collector and the evaluation queue.
#[derive(Clone)]
pub struct Tracer {
    inner: Arc<TracerInner>,
}

impl Tracer {
    /// Create a tracer and spawn its evaluation worker.
    ///
    /// # Errors
    ///
    /// Returns [`CollectorError::NoRuntime`](crate::error::CollectorError::NoRuntime)
    /// when called outside a Tokio runtime.
    pub fn new(project_name: impl Into<String>, collector: SharedCollector) -> Result<Self> {
        let evaluator = AsyncEvaluator::spawn(Arc::clone(&collector))?;
        Ok(Self {
            inner: Arc::new(TracerInner {
                project_name: project_name.into(),
                collector,
                evaluator,
            }),
        })
    }

    /// Project spans and evaluations are filed under.
    #[must_use]
    pub fn project_name(&self) -> &str {
        &self.inner.project_name
    }

    /// The collector spans are sent to.
    #[must_use]
    pub fn collector(&self) -> &SharedCollector {
        &self.inner.collector
    }

    /// Run `fut` as a span named `name`, returning its result unchanged.
    ///
    /// The `Ok` value is serialized as the span output; an `Err` is recorded
    /// through its `Display` form.
    pub async fn observe_call<F, T, E>(
        &self,
        name: &str,
        kind: SpanKind,
        inputs: Value,
        fut: F,
    ) -> std::result::Result<T, E>
    where
        F: Future<Output = std::result::Result<T, E>>,
        T: Serialize,
        E: fmt::Display,
    {
        self.observe_call_with(name, kind, inputs, fut, to_json)
            .await
    }

    /// Like [`observe_call`](Self::observe_call) with a custom rendering of
    /// the span output.
    pub async fn observe_call_with<F, T, E, R>(
        &self,
        name: &str,
        kind: SpanKind,
        inputs: Value,
        fut: F,
        render: R,
    ) -> std::result::Result<T, E>
    where
        F: Future<Output = std::result::Result<T, E>>,
        E: fmt::Display,
        R: FnOnce(&T) -> Value,
    {
        let span = tracing::info_span!(
            "observe",
            project = %self.inner.project_name,
            span_name = name,
            kind = %kind,
        );
        let started_at_ms = timestamp_ms();
        let start = Instant::now();

        let result = fut.instrument(span).await;

        let duration_ms = millis(start.elapsed());
        let (output, error) = match &result {
            Ok(value) => (render(value), None),
            Err(e) => (Value::Null, Some(e.to_string())),
        };

        self.report(SpanRecord {
            span_id: Uuid::new_v4(),
            project_name: self.inner.project_name.clone(),
            name: name.to_owned(),
            kind,
            inputs,
            output,
            error,
            started_at_ms,
            duration_ms,
        })
        .await;

        result
    }

    /// Wrap a tool so every call is recorded as a `tool` span.
    #[must_use]
    pub fn observe<T>(&self, tool: T) -> Observed<T> {
        Observed::new(tool, self.clone())
    }

    /// Wrap a chat backend so every call is recorded as an `llm` span.
    #[must_use]
    pub fn wrap<P>(&self, provider: P) -> TracedProvider<P> {
        TracedProvider::new(provider, self.clone())
    }

    /// Turn an async function into an instrumented function with the same
    /// argument and result types.
    ///
    /// Arguments are serialized as span inputs before the call.
    /// Functions taking several arguments take them as a tuple.
    ///
    /// ```rust,ignore
    /// let op = tracer.observe_fn("async_operation", SpanKind::custom("async_tool"), |(): ()| async {
    ///     tokio::time::sleep(Duration::from_millis(100)).await;
    ///     Ok::<_, Infallible>("async result")
    /// });
    /// assert_eq!(op(()).await?, "async result");
    /// ```
    pub fn observe_fn<A, T, E, F, Fut>(
        &self,
        name: impl Into<String>,
        kind: SpanKind,
        f: F,
    ) -> impl Fn(A) -> BoxFuture<'static, std::result::Result<T, E>> + Send + Sync + 'static
    where
        A: Serialize,
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = std::result::Result<T, E>> + Send + 'static,
        T: Serialize + Send + 'static,
        E: fmt::Display + Send + 'static,
    {
        let tracer = self.clone();
        let name: Arc<str> = name.into().into();

        move |args: A| {
            let inputs = to_json(&args);
            let fut = f(args);
            let tracer = tracer.clone();
            let name = Arc::clone(&name);
            let kind = kind.clone();
            Box::pin(async move { tracer.observe_call(&name, kind, inputs, fut).await })
        }
    }

    /// Queue `example` for scoring without waiting for the outcome.
    ///
    /// Never blocks and never fails; submission errors are logged by the
    /// evaluation worker.
    pub fn async_evaluate(
        &self,
        example: EvaluationExample,
        scorers: Vec<ScorerConfig>,
        model: impl Into<String>,
    ) {
        self.inner.evaluator.enqueue(EvaluationRequest::new(
            &self.inner.project_name,
            vec![example],
            scorers,
            model,
        ));
    }

    /// Wait until every evaluation queued so far has reached the collector.
    pub async fn flush(&self) {
        self.inner.evaluator.flush().await;
    }

    async fn report(&self, span: SpanRecord) {
        if let Err(e) = self.inner.collector.record_span(&span).await {
            warn!(
                collector = self.inner.collector.name(),
                span = %span.name,
                error = %e,
                "Failed to record span"
            );
        }
    }
}

impl fmt::Debug for Tracer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tracer")
            .field("project_name", &self.inner.project_name)
            .field("collector", &self.inner.collector.name())
            .finish_non_exhaustive()
    }
}

pub(super) fn to_json<T: Serialize + ?Sized>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}
