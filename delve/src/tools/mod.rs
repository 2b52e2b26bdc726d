//! Research tools.
//!
//! - [`WebSearchTool`] - deterministic simulated search
//! - [`SummarizeTool`] - backend-powered summarization
//! - [`FactCheckTool`] - backend-powered claim verification

mod fact_check;
mod summarize;
mod web_search;

pub use fact_check::{FactCheck, FactCheckArgs, FactCheckTool};
pub use summarize::{SummarizeArgs, SummarizeTool};
pub use web_search::{SearchHit, SearchResult, WebSearchArgs, WebSearchTool};
