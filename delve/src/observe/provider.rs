//! Chat backend decorator that records a span per call.

use std::fmt;

use async_trait::async_trait;
use serde_json::json;

use crate::chat::{ChatProvider, ChatRequest, ChatResponse};
use crate::error::LlmError;

use super::{SpanKind, Tracer};

/// A [`ChatProvider`] wrapped so that each chat call is reported as an `llm`
/// span.
///
/// Span inputs are `{model, messages}`; the output is
/// `{text, model, usage}`.
pub struct TracedProvider<P> {
    inner: P,
    tracer: Tracer,
}

impl<P> TracedProvider<P> {
    pub(super) const fn new(inner: P, tracer: Tracer) -> Self {
        Self { inner, tracer }
    }

    /// The wrapped provider.
    #[must_use]
    pub const fn inner(&self) -> &P {
        &self.inner
    }
}

impl<P: ChatProvider> fmt::Debug for TracedProvider<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TracedProvider")
            .field("provider", &self.inner.provider_name())
            .field("tracer", &self.tracer)
            .finish()
    }
}

#[async_trait]
impl<P: ChatProvider> ChatProvider for TracedProvider<P> {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, LlmError> {
        let model = if request.model.is_empty() {
            self.inner.default_model()
        } else {
            request.model.as_str()
        };
        let inputs = json!({ "model": model, "messages": request.messages });
        let name = format!("{}.chat", self.inner.provider_name());

        self.tracer
            .observe_call_with(
                &name,
                SpanKind::Llm,
                inputs,
                self.inner.chat(request),
                |response: &ChatResponse| {
                    json!({
                        "text": response.message.content,
                        "model": response.model,
                        "usage": response.usage,
                    })
                },
            )
            .await
    }

    fn provider_name(&self) -> &'static str {
        self.inner.provider_name()
    }

    fn default_model(&self) -> &str {
        self.inner.default_model()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::collector::InMemoryCollector;
    use crate::llms::MockProvider;
    use crate::usage::Usage;

    #[tokio::test]
    async fn records_llm_span() {
        let collector = Arc::new(InMemoryCollector::new());
        let tracer = Tracer::new("t", collector.clone()).unwrap();
        let provider = tracer.wrap(MockProvider::new(vec!["Hello".to_owned()]));

        let resp = provider
            .chat(&ChatRequest::new("").system("sys").user("hi"))
            .await
            .unwrap();
        assert_eq!(resp.text(), Some("Hello"));

        let span = &collector.spans()[0];
        assert_eq!(span.name, "mock.chat");
        assert_eq!(span.kind, SpanKind::Llm);
        assert_eq!(span.inputs["model"], "mock-model");
        assert_eq!(span.inputs["messages"][1]["content"], "hi");
        assert_eq!(span.output["text"], "Hello");
        assert_eq!(span.output["model"], "mock-model");
    }

    #[tokio::test]
    async fn usage_is_recorded() {
        struct WithUsage;

        #[async_trait]
        impl ChatProvider for WithUsage {
            async fn chat(&self, _request: &ChatRequest) -> Result<ChatResponse, LlmError> {
                Ok(ChatResponse::from_text("ok").with_usage(Usage::new(3, 2)))
            }

            fn provider_name(&self) -> &'static str {
                "usage"
            }

            fn default_model(&self) -> &str {
                "m"
            }
        }

        let collector = Arc::new(InMemoryCollector::new());
        let tracer = Tracer::new("t", collector.clone()).unwrap();
        tracer
            .wrap(WithUsage)
            .chat(&ChatRequest::new("m").user("x"))
            .await
            .unwrap();

        assert_eq!(collector.spans()[0].output["usage"]["total_tokens"], 5);
    }

    #[tokio::test]
    async fn backend_error_passes_through() {
        let collector = Arc::new(InMemoryCollector::new());
        let tracer = Tracer::new("t", collector.clone()).unwrap();
        let provider = tracer.wrap(MockProvider::from_fn(|_| Err(LlmError::network("down"))));

        let err = provider.chat(&ChatRequest::new("m")).await.unwrap_err();
        assert_eq!(err.message, "down");
        assert_eq!(collector.spans()[0].error.as_deref(), Some("down"));
    }
}
