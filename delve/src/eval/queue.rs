//! Fire-and-forget evaluation queue.

use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use crate::collector::SharedCollector;
use crate::error::CollectorError;

use super::EvaluationRequest;

enum Job {
    Evaluate(EvaluationRequest),
    Flush(oneshot::Sender<()>),
}

/// Hands evaluation requests to the collector from a background task.
///
/// Enqueueing never blocks and never fails into the caller. One worker task,
/// spawned on the ambient Tokio runtime, submits requests in FIFO order and
/// logs any collector error. The worker exits once every handle is dropped.
#[derive(Debug, Clone)]
pub struct AsyncEvaluator {
    tx: mpsc::UnboundedSender<Job>,
}

impl AsyncEvaluator {
    /// Spawn the background worker on the current Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`CollectorError::NoRuntime`] when called outside a runtime.
    pub fn spawn(collector: SharedCollector) -> Result<Self, CollectorError> {
        let handle = Handle::try_current().map_err(|_| CollectorError::NoRuntime)?;
        let (tx, rx) = mpsc::unbounded_channel();
        handle.spawn(run_worker(collector, rx));
        Ok(Self { tx })
    }

    /// Queue a request. A closed queue is logged and otherwise ignored.
    pub fn enqueue(&self, request: EvaluationRequest) {
        if let Err(e) = self.try_enqueue(request) {
            warn!(error = %e, "Dropping evaluation request");
        }
    }

    /// Queue a request, reporting a closed queue.
    ///
    /// # Errors
    ///
    /// Returns [`CollectorError::QueueClosed`] if the worker has stopped.
    pub fn try_enqueue(&self, request: EvaluationRequest) -> Result<(), CollectorError> {
        self.tx
            .send(Job::Evaluate(request))
            .map_err(|_| CollectorError::QueueClosed)
    }

    /// Wait until every request queued before this call has been handed to
    /// the collector.
    pub async fn flush(&self) {
        let (done, wait) = oneshot::channel();
        if self.tx.send(Job::Flush(done)).is_ok() {
            let _ = wait.await;
        }
    }
}

async fn run_worker(collector: SharedCollector, mut rx: mpsc::UnboundedReceiver<Job>) {
    while let Some(job) = rx.recv().await {
        match job {
            Job::Evaluate(request) => match collector.submit_evaluation(&request).await {
                Ok(()) => debug!(
                    collector = collector.name(),
                    project = %request.project_name,
                    examples = request.examples.len(),
                    "Evaluation submitted"
                ),
                Err(e) => warn!(
                    collector = collector.name(),
                    project = %request.project_name,
                    error = %e,
                    "Evaluation submission failed"
                ),
            },
            Job::Flush(done) => {
                let _ = done.send(());
            }
        }
    }
    debug!("Evaluation worker stopped");
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::collector::InMemoryCollector;
    use crate::eval::{EvaluationExample, ScorerConfig};

    fn request(input: &str) -> EvaluationRequest {
        EvaluationRequest::new(
            "queue_test",
            vec![EvaluationExample::new(input, "out")],
            vec![ScorerConfig::answer_relevancy(0.7)],
            "gpt-4",
        )
    }

    #[test]
    fn spawn_outside_runtime_fails() {
        let err = AsyncEvaluator::spawn(Arc::new(InMemoryCollector::new())).unwrap_err();
        assert!(matches!(err, CollectorError::NoRuntime));
    }

    #[tokio::test]
    async fn flush_waits_for_submissions_in_order() {
        let collector = Arc::new(InMemoryCollector::new());
        let evaluator = AsyncEvaluator::spawn(collector.clone()).unwrap();

        for input in ["a", "b", "c"] {
            evaluator.enqueue(request(input));
        }
        evaluator.flush().await;

        let inputs: Vec<String> = collector
            .evaluations()
            .into_iter()
            .map(|r| r.examples[0].input.clone())
            .collect();
        assert_eq!(inputs, ["a", "b", "c"]);
    }

    #[tokio::test]
    async fn collector_failure_is_swallowed() {
        let evaluator = AsyncEvaluator::spawn(Arc::new(InMemoryCollector::failing())).unwrap();
        evaluator.enqueue(request("x"));
        evaluator.flush().await;
        assert!(evaluator.try_enqueue(request("y")).is_ok());
    }
}
