//! OpenAI API client implementation.
//!
//! Only non-streaming chat completions are used by the research pipeline.

mod client;
mod config;
mod types;

pub use client::OpenAI;
pub use config::OpenAIConfig;
