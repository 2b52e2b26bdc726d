//! Backend-powered summarization.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::chat::{ChatProviderExt, SharedChatProvider};
use crate::error::LlmError;
use crate::tool::Tool;

const SYSTEM_PROMPT: &str =
    "You are a precise summarization assistant. Provide concise, accurate summaries.";

/// Summarizes content with a single chat call.
#[derive(Clone)]
pub struct SummarizeTool {
    provider: SharedChatProvider,
    model: String,
}

/// Arguments for summarization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummarizeArgs {
    /// The content to summarize.
    pub content: String,
}

impl SummarizeArgs {
    /// Create summarize arguments.
    #[must_use]
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

impl SummarizeTool {
    /// Create a summarizer using `model` on `provider`.
    #[must_use]
    pub fn new(provider: SharedChatProvider, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }

    /// The model used for summarization.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Summarize `content`, returning the backend's text verbatim.
    ///
    /// # Errors
    ///
    /// Propagates the backend error.
    pub async fn summarize(&self, content: &str) -> Result<String, LlmError> {
        let prompt = format!("Summarize the following content:\n\n{content}");
        self.provider
            .complete_with_system(&self.model, SYSTEM_PROMPT, &prompt)
            .await
    }
}

impl fmt::Debug for SummarizeTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SummarizeTool")
            .field("provider", &self.provider.provider_name())
            .field("model", &self.model)
            .finish()
    }
}

#[async_trait]
impl Tool for SummarizeTool {
    const NAME: &'static str = "summarize";
    type Args = SummarizeArgs;
    type Output = String;
    type Error = LlmError;

    async fn call(&self, args: Self::Args) -> Result<Self::Output, Self::Error> {
        self.summarize(&args.content).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::error::LlmErrorKind;
    use crate::llms::MockProvider;

    #[tokio::test]
    async fn sends_fixed_prompts() {
        let mock = Arc::new(MockProvider::new(vec!["short".to_owned()]));
        let tool = SummarizeTool::new(mock.clone(), "gpt-4");

        let out = tool.summarize("long text").await.unwrap();
        assert_eq!(out, "short");

        let req = &mock.requests()[0];
        assert_eq!(req.model, "gpt-4");
        assert_eq!(req.system_prompt(), Some(SYSTEM_PROMPT));
        assert_eq!(
            req.last_user_message(),
            Some("Summarize the following content:\n\nlong text")
        );
    }

    #[tokio::test]
    async fn empty_content_still_calls_backend() {
        let mock = Arc::new(MockProvider::new(vec!["nothing".to_owned()]));
        let tool = SummarizeTool::new(mock.clone(), "gpt-4");
        assert_eq!(tool.summarize("").await.unwrap(), "nothing");
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn empty_completion_passes_through() {
        let mock = Arc::new(MockProvider::from_fn(|_| Ok(String::new())));
        let out = SummarizeTool::new(mock, "gpt-4").summarize("x").await.unwrap();
        assert_eq!(out, "");
    }

    #[tokio::test]
    async fn backend_error_propagates() {
        let mock = Arc::new(MockProvider::from_fn(|_| {
            Err(LlmError::rate_limited("mock"))
        }));
        let err = SummarizeTool::new(mock, "gpt-4")
            .call(SummarizeArgs::new("x"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, LlmErrorKind::RateLimited);
    }
}
