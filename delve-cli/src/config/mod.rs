//! Configuration management for the delve CLI.
//!
//! Settings are layered, later sources winning:
//! 1. Default values
//! 2. Config file (`~/.delve/config.toml`)
//! 3. Environment variables (including a `.env` file)
//! 4. Command-line flags

mod schema;

pub use schema::{BackendConfig, CollectorConfig, DelveConfig};

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use delve::collector::{HttpCollector, HttpCollectorConfig, LoggingCollector, SharedCollector};
use delve::eval::ScorerConfig;
use delve::llms::OpenAIConfig;
use tracing::{debug, info, warn};

/// Error type for configuration operations.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
    /// TOML serialization error.
    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
    /// Missing required field.
    #[error("missing required config: {0}")]
    MissingField(String),
    /// Invalid value.
    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Get the default config directory path.
#[must_use]
pub fn default_config_dir() -> PathBuf {
    dirs_next::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".delve")
}

/// Get the default config file path.
#[must_use]
pub fn config_path() -> PathBuf {
    default_config_dir().join("config.toml")
}

/// Load configuration from a specific path, falling back to defaults when
/// the file does not exist, then overlay environment variables.
pub async fn load_config_from(path: &Path) -> ConfigResult<DelveConfig> {
    let mut config = if path.exists() {
        let content = tokio::fs::read_to_string(path).await?;
        let config: DelveConfig = toml::from_str(&content)?;
        debug!(path = %path.display(), "loaded config file");
        config
    } else {
        info!(path = %path.display(), "config file not found, using defaults");
        DelveConfig::default()
    };

    config.apply_env();
    Ok(config)
}

impl DelveConfig {
    /// Overlay values from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_with(|key| std::env::var(key).ok());
    }

    /// Overlay values from `lookup`, which maps variable names to values.
    pub fn apply_env_with(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = non_empty("OPENAI_API_KEY") {
            self.backend.api_key = Some(key);
        }
        if let Some(url) = non_empty("OPENAI_BASE_URL") {
            self.backend.base_url = Some(url);
        }
        if let Some(model) = non_empty("OPENAI_MODEL") {
            self.backend.model = model;
        }
        if let Some(org) = non_empty("OPENAI_ORGANIZATION") {
            self.backend.organization = Some(org);
        }
        if let Some(key) = non_empty("DELVE_COLLECTOR_API_KEY") {
            self.collector.api_key = Some(key);
        }
        if let Some(url) = non_empty("DELVE_COLLECTOR_URL") {
            self.collector.url = Some(url);
        }
        if let Some(org) = non_empty("DELVE_COLLECTOR_ORG_ID") {
            self.collector.organization_id = Some(org);
        }
    }

    /// Scorers applied to every research report.
    #[must_use]
    pub fn report_scorers(&self) -> Vec<ScorerConfig> {
        vec![
            ScorerConfig::answer_relevancy(self.evaluation.relevancy_threshold),
            ScorerConfig::faithfulness(self.evaluation.faithfulness_threshold),
        ]
    }

    /// Render the configuration as TOML with secrets masked.
    pub fn to_masked_toml(&self) -> ConfigResult<String> {
        let mut masked = self.clone();
        mask(&mut masked.backend.api_key);
        mask(&mut masked.collector.api_key);
        Ok(toml::to_string_pretty(&masked)?)
    }
}

fn mask(secret: &mut Option<String>) {
    if let Some(value) = secret.as_mut() {
        let visible: String = value.chars().take(4).collect();
        *value = format!("{visible}****");
    }
}

impl BackendConfig {
    /// Build the OpenAI client configuration.
    pub fn to_openai_config(&self) -> ConfigResult<OpenAIConfig> {
        let api_key = self.api_key.clone().ok_or_else(|| {
            ConfigError::MissingField("backend.api_key (or OPENAI_API_KEY)".into())
        })?;

        let mut config = OpenAIConfig::new(api_key)
            .with_model(&self.model)
            .with_timeout(Duration::from_secs(self.timeout_secs));
        if let Some(url) = &self.base_url {
            config = config.with_base_url(url);
        }
        if let Some(org) = &self.organization {
            config = config.with_organization(org);
        }
        Ok(config)
    }
}

impl CollectorConfig {
    /// Build the HTTP collector config, if credentials are present.
    #[must_use]
    pub fn to_http_config(&self) -> Option<HttpCollectorConfig> {
        let api_key = self.api_key.clone()?;
        let mut config = HttpCollectorConfig::new(api_key).with_timeout(self.timeout_secs);
        if let Some(url) = &self.url {
            config = config.with_base_url(url);
        }
        if let Some(org) = &self.organization_id {
            config = config.with_organization_id(org);
        }
        Some(config)
    }

    /// Build the collector: the HTTP service when credentials are present,
    /// otherwise a collector that only logs.
    pub fn build(&self) -> ConfigResult<SharedCollector> {
        match self.to_http_config() {
            Some(config) => {
                let collector = HttpCollector::new(config)
                    .map_err(|e| ConfigError::InvalidValue(format!("collector: {e}")))?;
                info!(url = collector.base_url(), "Reporting to collector service");
                Ok(Arc::new(collector))
            }
            None => {
                warn!("No collector credentials configured, spans will only be logged");
                Ok(Arc::new(LoggingCollector::with_level(self.log_level)))
            }
        }
    }
}
