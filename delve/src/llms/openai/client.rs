//! OpenAI API client implementation.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::chat::{ChatProvider, ChatRequest, ChatResponse};
use crate::error::LlmError;

use super::config::OpenAIConfig;
use super::types::{CompletionBody, CompletionReply, ErrorEnvelope, WireMessage};

/// OpenAI API client.
#[derive(Debug, Clone)]
pub struct OpenAI {
    config: Arc<OpenAIConfig>,
    client: Client,
}

impl OpenAI {
    /// Create a new OpenAI client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an auth error for an empty API key, or an internal error if
    /// the HTTP client cannot be built.
    pub fn new(config: OpenAIConfig) -> Result<Self, LlmError> {
        if config.api_key.is_empty() {
            return Err(LlmError::auth("openai", "API key is required"));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LlmError::internal(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            config: Arc::new(config),
            client,
        })
    }

    /// Get the base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Get the default model.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Build a JSON POST request with auth headers.
    fn build_request(&self, url: &str) -> reqwest::RequestBuilder {
        let mut req = self
            .client
            .post(url)
            .bearer_auth(&self.config.api_key);

        if let Some(org) = &self.config.organization {
            req = req.header("OpenAI-Organization", org);
        }

        req
    }

    /// Build the request body, falling back to the configured model.
    pub(crate) fn build_body<'a>(&'a self, request: &'a ChatRequest) -> CompletionBody<'a> {
        let model = if request.model.is_empty() {
            self.config.model.as_str()
        } else {
            request.model.as_str()
        };

        CompletionBody {
            model,
            messages: request
                .messages
                .iter()
                .map(|m| WireMessage {
                    role: m.role.as_str(),
                    content: &m.content,
                })
                .collect(),
        }
    }

    /// Parse an error response from OpenAI.
    pub(crate) fn parse_error(status: u16, body: &str) -> LlmError {
        if let Ok(error_response) = serde_json::from_str::<ErrorEnvelope>(body) {
            let error = error_response.error;
            let code = error
                .code
                .or(error.kind)
                .unwrap_or_else(|| status.to_string());

            return match status {
                401 | 403 => LlmError::auth("openai", error.message),
                429 => LlmError::rate_limited("openai"),
                400 | 404 | 422 => LlmError::invalid_request(error.message),
                _ => LlmError::provider_code("openai", code, error.message),
            };
        }

        LlmError::http_status(status, body.to_owned())
    }

    /// Parse the response into a `ChatResponse`.
    pub(crate) fn parse_response(response: CompletionReply) -> Result<ChatResponse, LlmError> {
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::response_format("at least one choice", "empty choices"))?;

        let text = match (choice.message.content, choice.message.refusal) {
            (Some(content), _) => content,
            (None, Some(refusal)) => {
                return Err(LlmError::provider("openai", format!("Model refused: {refusal}")));
            }
            (None, None) => String::new(),
        };

        let mut chat = ChatResponse::from_text(text);
        chat.usage = response.usage;
        chat.model = response.model;
        chat.id = response.id;
        Ok(chat)
    }
}

#[async_trait]
impl ChatProvider for OpenAI {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, LlmError> {
        let url = self.config.completions_url();
        let body = self.build_body(request);

        debug!(model = %body.model, messages = body.messages.len(), "Sending request to OpenAI API");

        let response = self.build_request(&url).json(&body).send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(Self::parse_error(status.as_u16(), &error_text));
        }

        let response_text = response.text().await?;
        let parsed: CompletionReply = serde_json::from_str(&response_text).map_err(|e| {
            LlmError::response_format(
                "valid OpenAI response",
                format!("parse error: {e}, response: {response_text}"),
            )
        })?;

        Self::parse_response(parsed)
    }

    fn provider_name(&self) -> &'static str {
        "openai"
    }

    fn default_model(&self) -> &str {
        self.model()
    }
}
