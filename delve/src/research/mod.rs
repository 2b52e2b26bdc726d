//! The research pipeline.
//!
//! [`ResearchAgent::research_topic`] runs a fixed sequence: web search, then a
//! summary of the search results, then a report generated from both. Each
//! stage consumes the previous stage's output, every stage is traced, and the
//! finished report is queued for online evaluation before it is returned.

mod prompts;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::chat::{ChatProviderExt, SharedChatProvider};
use crate::error::{Error, LlmError, Result, Stage};
use crate::eval::{EvaluationExample, ScorerConfig};
use crate::observe::{Observed, SpanKind, Tracer};
use crate::tool::Tool;
use crate::tools::{
    FactCheck, FactCheckArgs, FactCheckTool, SearchResult, SummarizeArgs, SummarizeTool,
    WebSearchArgs, WebSearchTool,
};

/// How deep a research report should go.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Depth {
    /// A short overview.
    #[default]
    Basic,
    /// A detailed report.
    Comprehensive,
}

impl Depth {
    /// Returns the depth name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Comprehensive => "comprehensive",
        }
    }
}

impl fmt::Display for Depth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown depth.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid depth '{0}', expected 'basic' or 'comprehensive'")]
pub struct ParseDepthError(String);

impl FromStr for Depth {
    type Err = ParseDepthError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "basic" => Ok(Self::Basic),
            "comprehensive" => Ok(Self::Comprehensive),
            _ => Err(ParseDepthError(s.to_owned())),
        }
    }
}

/// The result of one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResearchReport {
    /// The topic, exactly as given.
    pub topic: String,
    /// Output of the search stage.
    pub search_results: SearchResult,
    /// Output of the summarize stage.
    pub summary: String,
    /// The generated report, verbatim.
    pub research_report: String,
    /// Requested depth.
    pub depth: Depth,
}

/// Research assistant that chains search, summarization and report
/// generation.
///
/// Backend calls go through a traced provider, so each one shows up as an
/// `llm` span nested under the tool or pipeline span that made it.
///
/// # Example
///
/// ```rust,ignore
/// let tracer = Tracer::new("research_assistant_agent", collector)?;
/// let agent = ResearchAgent::new(tracer, Arc::new(OpenAI::new(OpenAIConfig::new(api_key))?));
/// let report = agent.research_topic("AI safety", Depth::Basic).await?;
/// ```
pub struct ResearchAgent {
    tracer: Tracer,
    provider: SharedChatProvider,
    search: Observed<WebSearchTool>,
    summarizer: Observed<SummarizeTool>,
    fact_checker: Observed<FactCheckTool>,
    model: String,
    evaluation_model: String,
    scorers: Vec<ScorerConfig>,
}

impl ResearchAgent {
    /// Default model for tools and report generation.
    pub const DEFAULT_MODEL: &'static str = "gpt-4";

    /// Create an agent that traces through `tracer` and calls `provider`.
    #[must_use]
    pub fn new(tracer: Tracer, provider: SharedChatProvider) -> Self {
        let provider: SharedChatProvider = Arc::new(tracer.wrap(provider));
        let model = Self::DEFAULT_MODEL.to_owned();
        Self {
            search: tracer.observe(WebSearchTool::new()),
            summarizer: tracer.observe(SummarizeTool::new(Arc::clone(&provider), &model)),
            fact_checker: tracer.observe(FactCheckTool::new(Arc::clone(&provider), &model)),
            evaluation_model: Self::DEFAULT_MODEL.to_owned(),
            scorers: Self::default_scorers(),
            tracer,
            provider,
            model,
        }
    }

    /// Scorers applied to every report: answer relevancy (0.7) and
    /// faithfulness (0.8).
    #[must_use]
    pub fn default_scorers() -> Vec<ScorerConfig> {
        vec![
            ScorerConfig::answer_relevancy(0.7),
            ScorerConfig::faithfulness(0.8),
        ]
    }

    /// Use `model` for the tools and report generation.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self.summarizer = self
            .tracer
            .observe(SummarizeTool::new(Arc::clone(&self.provider), &self.model));
        self.fact_checker = self
            .tracer
            .observe(FactCheckTool::new(Arc::clone(&self.provider), &self.model));
        self
    }

    /// Use `model` as the judge for online evaluation.
    #[must_use]
    pub fn with_evaluation_model(mut self, model: impl Into<String>) -> Self {
        self.evaluation_model = model.into();
        self
    }

    /// Replace the scorers applied to every report.
    #[must_use]
    pub fn with_scorers(mut self, scorers: Vec<ScorerConfig>) -> Self {
        self.scorers = scorers;
        self
    }

    /// The model used for the tools and report generation.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// The tracer spans are reported through.
    #[must_use]
    pub const fn tracer(&self) -> &Tracer {
        &self.tracer
    }

    /// Run the traced web search tool.
    pub async fn web_search(&self, query: &str) -> SearchResult {
        self.search
            .call(WebSearchArgs::new(query))
            .await
            .unwrap_or_else(|never| match never {})
    }

    /// Run the traced summarize tool.
    ///
    /// # Errors
    ///
    /// Propagates the backend error.
    pub async fn summarize(&self, content: &str) -> std::result::Result<String, LlmError> {
        self.summarizer.call(SummarizeArgs::new(content)).await
    }

    /// Run the traced fact check tool.
    ///
    /// # Errors
    ///
    /// Propagates the backend error.
    pub async fn fact_check(
        &self,
        claim: &str,
        context: &str,
    ) -> std::result::Result<FactCheck, LlmError> {
        self.fact_checker
            .call(FactCheckArgs::new(claim, context))
            .await
    }

    /// Research `topic` at the default depth.
    ///
    /// # Errors
    ///
    /// See [`research_topic`](Self::research_topic).
    pub async fn research_topic_default(&self, topic: &str) -> Result<ResearchReport> {
        self.research_topic(topic, Depth::default()).await
    }

    /// Research `topic` and return the assembled report.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Stage`] naming the stage whose backend call failed.
    /// No later stage runs and no partial report is returned.
    pub async fn research_topic(&self, topic: &str, depth: Depth) -> Result<ResearchReport> {
        let inputs = json!({ "topic": topic, "depth": depth });
        self.tracer
            .observe_call(
                "research_topic",
                SpanKind::Function,
                inputs,
                self.run_pipeline(topic, depth),
            )
            .await
    }

    async fn run_pipeline(&self, topic: &str, depth: Depth) -> Result<ResearchReport> {
        info!(topic, %depth, "Starting research");

        let search_results = self.web_search(topic).await;

        let content = format!("Topic: {topic}\nResults: {}", search_results.results_json());
        let summary = self
            .summarize(&content)
            .await
            .map_err(|e| Error::stage(Stage::Summarize, e))?;

        let search_json = search_results.to_json();
        let prompt = prompts::research_prompt(topic, &search_json, &summary, depth);
        let research_report = self
            .provider
            .complete_with_system(&self.model, prompts::RESEARCH_SYSTEM_PROMPT, &prompt)
            .await
            .map_err(|e| Error::stage(Stage::Report, e))?;

        let example = EvaluationExample::new(topic, &research_report)
            .with_retrieval_context([search_json, summary.clone()]);
        self.tracer
            .async_evaluate(example, self.scorers.clone(), &self.evaluation_model);

        info!(topic, report_len = research_report.len(), "Research complete");

        Ok(ResearchReport {
            topic: topic.to_owned(),
            search_results,
            summary,
            research_report,
            depth,
        })
    }
}

impl fmt::Debug for ResearchAgent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResearchAgent")
            .field("tracer", &self.tracer)
            .field("provider", &self.provider.provider_name())
            .field("model", &self.model)
            .field("evaluation_model", &self.evaluation_model)
            .field("scorers", &self.scorers)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::collector::InMemoryCollector;
    use crate::llms::MockProvider;

    mod depth {
        use super::*;

        #[test]
        fn default_is_basic() {
            assert_eq!(Depth::default(), Depth::Basic);
        }

        #[test]
        fn parse_is_case_insensitive() {
            assert_eq!("Comprehensive".parse::<Depth>().unwrap(), Depth::Comprehensive);
            assert_eq!(" basic ".parse::<Depth>().unwrap(), Depth::Basic);
            assert!("deep".parse::<Depth>().is_err());
        }

        #[test]
        fn serde_lowercase() {
            assert_eq!(
                serde_json::to_string(&Depth::Comprehensive).unwrap(),
                "\"comprehensive\""
            );
            assert_eq!(
                serde_json::from_str::<Depth>("\"basic\"").unwrap(),
                Depth::Basic
            );
        }
    }

    mod agent {
        use super::*;

        fn agent(responses: &[&str]) -> (ResearchAgent, Arc<InMemoryCollector>, Arc<MockProvider>) {
            let collector = Arc::new(InMemoryCollector::new());
            let tracer = Tracer::new("research_assistant_agent", collector.clone()).unwrap();
            let mock = Arc::new(MockProvider::new(
                responses.iter().map(|s| (*s).to_owned()).collect(),
            ));
            (ResearchAgent::new(tracer, mock.clone()), collector, mock)
        }

        #[tokio::test]
        async fn report_keeps_topic_and_depth() {
            let (agent, _, mock) = agent(&["summary", "report"]);
            let report = agent
                .research_topic("AI safety", Depth::Comprehensive)
                .await
                .unwrap();

            assert_eq!(report.topic, "AI safety");
            assert_eq!(report.depth, Depth::Comprehensive);
            assert_eq!(report.summary, "summary");
            assert_eq!(report.research_report, "report");
            assert_eq!(report.search_results.query, "AI safety");
            assert_eq!(mock.call_count(), 2);
        }

        #[tokio::test]
        async fn default_depth_is_basic() {
            let (agent, _, _) = agent(&["s", "r"]);
            let report = agent.research_topic_default("x").await.unwrap();
            assert_eq!(report.depth, Depth::Basic);
        }

        #[tokio::test]
        async fn custom_model_reaches_every_call() {
            let (agent, _, mock) = agent(&["s", "r"]);
            let agent = agent.with_model("gpt-4o-mini");
            agent.research_topic("x", Depth::Basic).await.unwrap();
            assert!(mock.requests().iter().all(|r| r.model == "gpt-4o-mini"));
        }

        #[tokio::test]
        async fn report_is_queued_for_evaluation() {
            let (agent, collector, _) = agent(&["the summary", "the report"]);
            let agent = agent.with_evaluation_model("judge");
            agent.research_topic("AI safety", Depth::Basic).await.unwrap();
            agent.tracer().flush().await;

            let evaluations = collector.evaluations();
            assert_eq!(evaluations.len(), 1);
            let request = &evaluations[0];
            assert_eq!(request.model, "judge");
            assert_eq!(request.scorers, ResearchAgent::default_scorers());
            let example = &request.examples[0];
            assert_eq!(example.input, "AI safety");
            assert_eq!(example.actual_output, "the report");
            assert!(example.expected_output.is_none());
            assert_eq!(example.retrieval_context.len(), 2);
            assert!(example.retrieval_context[0].contains("Research on AI safety"));
            assert_eq!(example.retrieval_context[1], "the summary");
        }

        #[tokio::test]
        async fn fact_check_is_traced() {
            let (agent, collector, _) = agent(&["VERIFIED"]);
            let check = agent.fact_check("claim", "ctx").await.unwrap();
            assert_eq!(check.verification, "VERIFIED");
            assert_eq!(collector.span_names(), ["mock.chat", "fact_check"]);
        }
    }
}
