//! Configuration schema definitions.

use delve::collector::LogLevel;
use delve::research::Depth;
use serde::{Deserialize, Serialize};

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DelveConfig {
    /// Model backend configuration.
    #[serde(default)]
    pub backend: BackendConfig,

    /// Collector configuration.
    #[serde(default)]
    pub collector: CollectorConfig,

    /// Research pipeline configuration.
    #[serde(default)]
    pub research: ResearchConfig,

    /// Evaluation configuration.
    #[serde(default)]
    pub evaluation: EvaluationConfig,
}

/// OpenAI-compatible backend config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BackendConfig {
    /// API key.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Base URL override.
    #[serde(default)]
    pub base_url: Option<String>,
    /// Model for tools and report generation.
    #[serde(default = "default_model")]
    pub model: String,
    /// Organization ID.
    #[serde(default)]
    pub organization: Option<String>,
    /// Request timeout in seconds.
    #[serde(default = "default_backend_timeout")]
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: None,
            model: default_model(),
            organization: None,
            timeout_secs: default_backend_timeout(),
        }
    }
}

/// Collector service config. Without an API key spans are only logged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CollectorConfig {
    /// API key.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Base URL override.
    #[serde(default)]
    pub url: Option<String>,
    /// Organization ID.
    #[serde(default)]
    pub organization_id: Option<String>,
    /// Request timeout in seconds.
    #[serde(default = "default_collector_timeout")]
    pub timeout_secs: u64,
    /// Level spans are logged at when no API key is set.
    #[serde(default)]
    pub log_level: LogLevel,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            url: None,
            organization_id: None,
            timeout_secs: default_collector_timeout(),
            log_level: LogLevel::default(),
        }
    }
}

/// Research pipeline config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResearchConfig {
    /// Project name spans are filed under.
    #[serde(default = "default_research_project")]
    pub project_name: String,
    /// Depth used when `--depth` is not given.
    #[serde(default)]
    pub depth: Depth,
    /// Topics researched by `delve batch` when none are given.
    #[serde(default = "default_topics")]
    pub topics: Vec<String>,
}

impl Default for ResearchConfig {
    fn default() -> Self {
        Self {
            project_name: default_research_project(),
            depth: Depth::default(),
            topics: default_topics(),
        }
    }
}

/// Evaluation config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EvaluationConfig {
    /// Project name evaluation results are filed under.
    #[serde(default = "default_evaluation_project")]
    pub project_name: String,
    /// Judge model.
    #[serde(default = "default_model")]
    pub model: String,
    /// Answer relevancy threshold for online evaluation of reports.
    #[serde(default = "default_relevancy_threshold")]
    pub relevancy_threshold: f64,
    /// Faithfulness threshold for online evaluation of reports.
    #[serde(default = "default_faithfulness_threshold")]
    pub faithfulness_threshold: f64,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            project_name: default_evaluation_project(),
            model: default_model(),
            relevancy_threshold: default_relevancy_threshold(),
            faithfulness_threshold: default_faithfulness_threshold(),
        }
    }
}

fn default_model() -> String {
    "gpt-4".to_owned()
}

const fn default_backend_timeout() -> u64 {
    120
}

const fn default_collector_timeout() -> u64 {
    30
}

fn default_research_project() -> String {
    "research_assistant_agent".to_owned()
}

fn default_evaluation_project() -> String {
    "evaluation_suite".to_owned()
}

fn default_topics() -> Vec<String> {
    vec![
        "artificial intelligence ethics".to_owned(),
        "climate change mitigation strategies".to_owned(),
        "quantum computing applications".to_owned(),
    ]
}

const fn default_relevancy_threshold() -> f64 {
    0.7
}

const fn default_faithfulness_threshold() -> f64 {
    0.8
}
