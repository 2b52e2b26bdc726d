//! Mock backend for testing.
//!
//! [`MockProvider`] either cycles through predefined responses or computes
//! each response from the request, and records every request it receives.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::chat::{ChatProvider, ChatRequest, ChatResponse};
use crate::error::LlmError;

type Responder = dyn Fn(&ChatRequest) -> Result<String, LlmError> + Send + Sync;

enum Script {
    Cycle {
        responses: Vec<String>,
        index: AtomicUsize,
    },
    Respond(Box<Responder>),
}

/// A scripted backend for tests and offline runs.
///
/// # Example
///
/// ```rust,ignore
/// use delve::llms::MockProvider;
///
/// let model = MockProvider::new(vec!["Hello!".to_string(), "Goodbye!".to_string()]);
/// // First call returns "Hello!", second returns "Goodbye!", third returns "Hello!" again...
/// ```
pub struct MockProvider {
    model_id: String,
    script: Script,
    requests: Mutex<Vec<ChatRequest>>,
}

impl MockProvider {
    /// Create a mock that cycles through predefined responses.
    #[must_use]
    pub fn new(responses: Vec<String>) -> Self {
        Self::with_script(Script::Cycle {
            responses,
            index: AtomicUsize::new(0),
        })
    }

    /// Create a mock that computes each response from the request.
    #[must_use]
    pub fn from_fn<F>(respond: F) -> Self
    where
        F: Fn(&ChatRequest) -> Result<String, LlmError> + Send + Sync + 'static,
    {
        Self::with_script(Script::Respond(Box::new(respond)))
    }

    fn with_script(script: Script) -> Self {
        Self {
            model_id: "mock-model".to_owned(),
            script,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Set a custom model ID.
    #[must_use]
    pub fn with_model_id(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = model_id.into();
        self
    }

    /// Returns a copy of every request received so far, in order.
    #[must_use]
    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    /// Returns the number of requests received so far.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or_default()
    }
}

impl fmt::Debug for MockProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockProvider")
            .field("model_id", &self.model_id)
            .field("calls", &self.call_count())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl ChatProvider for MockProvider {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, LlmError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }

        let text = match &self.script {
            Script::Cycle { responses, index } => {
                let i = index.fetch_add(1, Ordering::SeqCst);
                responses
                    .get(i % responses.len().max(1))
                    .cloned()
                    .unwrap_or_else(|| "No response".to_owned())
            }
            Script::Respond(respond) => respond(request)?,
        };

        Ok(ChatResponse::from_text(text).with_model(self.model_id.clone()))
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }

    fn default_model(&self) -> &str {
        &self.model_id
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_cycles_responses() {
        let model = MockProvider::new(vec!["first".to_owned(), "second".to_owned()]);
        let req = ChatRequest::new("m").user("x");

        assert_eq!(model.chat(&req).await.unwrap().text(), Some("first"));
        assert_eq!(model.chat(&req).await.unwrap().text(), Some("second"));
        assert_eq!(model.chat(&req).await.unwrap().text(), Some("first"));
        assert_eq!(model.call_count(), 3);
    }

    #[tokio::test]
    async fn test_mock_empty_script() {
        let model = MockProvider::new(Vec::new());
        let resp = model.chat(&ChatRequest::new("m")).await.unwrap();
        assert_eq!(resp.text(), Some("No response"));
    }

    #[tokio::test]
    async fn test_mock_from_fn_sees_request() {
        let model = MockProvider::from_fn(|req| {
            Ok(format!("echo:{}", req.last_user_message().unwrap_or_default()))
        });
        let resp = model.chat(&ChatRequest::new("m").user("ping")).await.unwrap();
        assert_eq!(resp.text(), Some("echo:ping"));
        assert_eq!(model.requests()[0].last_user_message(), Some("ping"));
    }

    #[tokio::test]
    async fn test_mock_from_fn_error_is_recorded() {
        let model = MockProvider::from_fn(|_| Err(LlmError::network("down")));
        let err = model.chat(&ChatRequest::new("m")).await.unwrap_err();
        assert!(err.to_string().contains("down"));
        assert_eq!(model.call_count(), 1);
    }

    #[test]
    fn test_mock_custom_id() {
        let model = MockProvider::new(vec!["test".to_owned()]).with_model_id("custom-mock");
        assert_eq!(model.default_model(), "custom-mock");
    }
}
