//! Prompts used by the research pipeline.

use super::Depth;

pub(super) const RESEARCH_SYSTEM_PROMPT: &str =
    "You are an expert research assistant. Provide thorough, well-structured research reports.";

/// Build the report-generation prompt.
pub(super) fn research_prompt(
    topic: &str,
    search_results: &str,
    summary: &str,
    depth: Depth,
) -> String {
    format!(
        "Research Topic: {topic}
Search Results: {search_results}
Summary: {summary}
Depth: {depth}

Provide a comprehensive research report including:
1. Key findings
2. Important insights
3. Potential implications
4. Areas for further research"
    )
}
