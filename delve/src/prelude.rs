//! Prelude module for convenient imports.
//!
//! This module re-exports commonly used types and traits for easy access.
//!
//! # Usage
//!
//! ```rust,ignore
//! use delve::prelude::*;
//! ```

pub use crate::chat::{
    ChatProvider, ChatProviderExt, ChatRequest, ChatResponse, SharedChatProvider,
};
pub use crate::collector::{
    Collector, HttpCollector, HttpCollectorConfig, InMemoryCollector, LogLevel, LoggingCollector,
    SharedCollector,
};
pub use crate::error::{CollectorError, Error, LlmError, LlmErrorKind, Result, Stage};
pub use crate::eval::{
    AsyncEvaluator, CustomScorer, EvaluationClient, EvaluationExample, EvaluationRequest,
    EvaluationResults, ScorerConfig, ScorerKind, ScoringResult,
};
pub use crate::llms::{MockProvider, OpenAI, OpenAIConfig};
pub use crate::message::{Message, Role};
pub use crate::observe::{Observed, SpanKind, SpanRecord, TracedProvider, Tracer};
pub use crate::research::{Depth, ResearchAgent, ResearchReport};
pub use crate::tool::Tool;
pub use crate::tools::{
    FactCheck, FactCheckArgs, FactCheckTool, SearchHit, SearchResult, SummarizeArgs,
    SummarizeTool, WebSearchArgs, WebSearchTool,
};
pub use crate::usage::Usage;
