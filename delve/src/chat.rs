//! Chat types and the backend trait.
//!
//! This module provides:
//! - [`ChatRequest`]: Request parameters for chat completions
//! - [`ChatResponse`]: Response from chat completions
//! - [`ChatProvider`]: Core trait for model backends
//!
//! # Example
//!
//! ```rust,ignore
//! use delve::prelude::*;
//!
//! let request = ChatRequest::new("gpt-4")
//!     .system("You are helpful.")
//!     .user("Hello!");
//!
//! let response = provider.chat(&request).await?;
//! println!("{}", response.text().unwrap_or_default());
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::LlmError;
use crate::message::{Message, Role};
use crate::usage::Usage;

/// A chat completion request to the backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Model identifier (e.g., "gpt-4"). Empty means the provider default.
    #[serde(default)]
    pub model: String,

    /// Conversation messages, in order.
    #[serde(default)]
    pub messages: Vec<Message>,
}

impl ChatRequest {
    /// Creates a request for the given model.
    #[must_use]
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Self::default()
        }
    }

    /// Appends a system message.
    #[must_use]
    pub fn system(mut self, content: impl Into<String>) -> Self {
        self.messages.push(Message::system(content));
        self
    }

    /// Appends a user message.
    #[must_use]
    pub fn user(mut self, content: impl Into<String>) -> Self {
        self.messages.push(Message::user(content));
        self
    }

    /// Returns the content of the first system message, if any.
    #[must_use]
    pub fn system_prompt(&self) -> Option<&str> {
        self.messages
            .iter()
            .find(|m| m.role == Role::System)
            .map(|m| m.content.as_str())
    }

    /// Returns the content of the last user message, if any.
    #[must_use]
    pub fn last_user_message(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
    }
}

/// A chat completion response from the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    /// The generated message.
    pub message: Message,

    /// Token usage statistics.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,

    /// Model identifier used for this response.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Unique completion ID.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl ChatResponse {
    /// Creates a response from text content.
    #[must_use]
    pub fn from_text(content: impl Into<String>) -> Self {
        Self {
            message: Message::assistant(content),
            usage: None,
            model: None,
            id: None,
        }
    }

    /// Sets usage statistics.
    #[must_use]
    pub const fn with_usage(mut self, usage: Usage) -> Self {
        self.usage = Some(usage);
        self
    }

    /// Sets the model identifier.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Returns the text content, or `None` when the backend sent none.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        Some(self.message.content.as_str()).filter(|t| !t.is_empty())
    }

    /// Consumes the response, returning the text content as sent. An empty
    /// completion yields an empty string.
    #[must_use]
    pub fn into_text(self) -> String {
        self.message.content
    }
}

/// Trait for backends that support chat completions.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Send a chat completion request and receive a complete response.
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, LlmError>;

    /// Get the name of this provider.
    ///
    /// Used for error messages and logging.
    fn provider_name(&self) -> &'static str;

    /// Get the default model for this provider.
    fn default_model(&self) -> &str;
}

#[async_trait]
impl<P: ChatProvider + ?Sized> ChatProvider for Arc<P> {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, LlmError> {
        (**self).chat(request).await
    }

    fn provider_name(&self) -> &'static str {
        (**self).provider_name()
    }

    fn default_model(&self) -> &str {
        (**self).default_model()
    }
}

/// Extension trait for `ChatProvider` with convenience methods.
#[async_trait]
pub trait ChatProviderExt: ChatProvider {
    /// Send a system prompt and a user prompt, returning the response text.
    async fn complete_with_system(
        &self,
        model: &str,
        system: &str,
        prompt: &str,
    ) -> Result<String, LlmError> {
        let request = ChatRequest::new(model).system(system).user(prompt);
        Ok(self.chat(&request).await?.into_text())
    }
}

impl<T: ChatProvider + ?Sized> ChatProviderExt for T {}

/// Type alias for an Arc-wrapped `ChatProvider`.
pub type SharedChatProvider = Arc<dyn ChatProvider>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    mod chat_request {
        use super::*;

        #[test]
        fn new_creates_with_model() {
            let req = ChatRequest::new("gpt-4");
            assert_eq!(req.model, "gpt-4");
            assert!(req.messages.is_empty());
        }

        #[test]
        fn builder_appends_in_order() {
            let req = ChatRequest::new("gpt-4").system("sys").user("hi");
            assert_eq!(req.messages.len(), 2);
            assert_eq!(req.messages[0].role, Role::System);
            assert_eq!(req.messages[1].role, Role::User);
            assert_eq!(req.system_prompt(), Some("sys"));
            assert_eq!(req.last_user_message(), Some("hi"));
        }

        #[test]
        fn serde_defaults_missing_fields() {
            let req: ChatRequest = serde_json::from_str(r#"{"model": "gpt-4"}"#).unwrap();
            assert_eq!(req, ChatRequest::new("gpt-4"));
        }
    }

    mod chat_response {
        use super::*;

        #[test]
        fn from_text_is_assistant() {
            let resp = ChatResponse::from_text("Hello");
            assert_eq!(resp.message.role, Role::Assistant);
            assert_eq!(resp.text(), Some("Hello"));
        }

        #[test]
        fn empty_text_is_none() {
            assert!(ChatResponse::from_text("").text().is_none());
        }

        #[test]
        fn into_text_passes_empty_through() {
            assert_eq!(ChatResponse::from_text("").into_text(), "");
            assert_eq!(ChatResponse::from_text(" x ").into_text(), " x ");
        }

        #[test]
        fn builder_chain() {
            let resp = ChatResponse::from_text("Hi")
                .with_model("gpt-4")
                .with_usage(Usage::new(5, 10));
            assert_eq!(resp.model.as_deref(), Some("gpt-4"));
            assert_eq!(resp.usage.unwrap().total_tokens, 15);
        }
    }
}
