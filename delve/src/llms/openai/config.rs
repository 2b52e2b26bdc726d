//! Connection settings for an OpenAI-compatible endpoint.
//!
//! The library does not read the environment; the `delve` CLI layers its
//! config file and `OPENAI_*` variables on top of these defaults.

use std::time::Duration;

/// Where and how the [`OpenAI`](super::OpenAI) client connects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenAIConfig {
    /// Bearer token.
    pub api_key: String,
    /// API root, without the `/chat/completions` suffix.
    pub base_url: String,
    /// Model used when a request leaves its model empty.
    pub model: String,
    /// Sent as `OpenAI-Organization` when set.
    pub organization: Option<String>,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl OpenAIConfig {
    /// Public OpenAI endpoint.
    pub const DEFAULT_BASE_URL: &'static str = "https://api.openai.com/v1";
    /// Model the research agent uses unless told otherwise.
    pub const DEFAULT_MODEL: &'static str = "gpt-4";
    /// Default per-request timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

    /// Settings for the public endpoint with the given key.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: Self::DEFAULT_BASE_URL.to_owned(),
            model: Self::DEFAULT_MODEL.to_owned(),
            organization: None,
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    /// Point at a compatible server (a local gateway, a proxy, a test mock).
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Default model for requests that leave theirs empty.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Organization header value.
    #[must_use]
    pub fn with_organization(mut self, org: impl Into<String>) -> Self {
        self.organization = Some(org.into());
        self
    }

    /// Per-request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// `{base_url}/chat/completions`, tolerating a trailing slash on the base.
    pub(crate) fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_endpoint_defaults() {
        let config = OpenAIConfig::new("sk-test");
        assert_eq!(config.model, "gpt-4");
        assert_eq!(config.timeout, Duration::from_secs(120));
        assert_eq!(
            config.completions_url(),
            "https://api.openai.com/v1/chat/completions"
        );
    }

    #[test]
    fn compatible_server_overrides() {
        let config = OpenAIConfig::new("key")
            .with_base_url("http://localhost:8000/v1/")
            .with_model("llama3")
            .with_organization("org-1")
            .with_timeout(Duration::from_secs(5));

        assert_eq!(
            config.completions_url(),
            "http://localhost:8000/v1/chat/completions"
        );
        assert_eq!(config.model, "llama3");
        assert_eq!(config.organization.as_deref(), Some("org-1"));
        assert_eq!(config.timeout, Duration::from_secs(5));
    }
}
