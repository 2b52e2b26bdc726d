//! Simulated web search.

use std::convert::Infallible;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::tool::Tool;

/// Simulated web search tool.
///
/// Produces one synthetic hit embedding the query. A real search API can be
/// dropped in behind the same [`Tool`] signature.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebSearchTool;

/// Arguments for web search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebSearchArgs {
    /// The search query to perform.
    pub query: String,
}

impl WebSearchArgs {
    /// Create search arguments.
    #[must_use]
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
        }
    }
}

/// A single search hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Title of the hit.
    pub title: String,
    /// Description/snippet of the hit.
    pub snippet: String,
    /// URL of the hit.
    pub url: String,
}

/// Search results for one query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// The query that produced these results.
    pub query: String,
    /// Hits, in rank order.
    pub results: Vec<SearchHit>,
}

impl SearchResult {
    /// The hits rendered as a JSON array.
    #[must_use]
    pub fn results_json(&self) -> String {
        serde_json::to_string(&self.results).unwrap_or_default()
    }

    /// The whole result rendered as a JSON object.
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

impl WebSearchTool {
    /// Create a new web search tool.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Run the simulated search.
    #[must_use]
    pub fn search(&self, query: &str) -> SearchResult {
        SearchResult {
            query: query.to_owned(),
            results: vec![SearchHit {
                title: format!("Research on {query}"),
                snippet: format!(
                    "Comprehensive information about {query} including key findings and methodologies."
                ),
                url: format!("https://example.com/research/{}", query.replace(' ', "-")),
            }],
        }
    }
}

#[async_trait]
impl Tool for WebSearchTool {
    const NAME: &'static str = "web_search";
    type Args = WebSearchArgs;
    type Output = SearchResult;
    type Error = Infallible;

    async fn call(&self, args: Self::Args) -> Result<Self::Output, Self::Error> {
        Ok(self.search(&args.query))
    }
}
