//! Model backend implementations.
//!
//! # Available Backends
//!
//! - [`openai`] - OpenAI Chat Completions API (and compatible servers)
//! - [`mock`] - Scripted in-process backend for tests and offline runs

pub mod mock;
pub mod openai;

pub use mock::MockProvider;
pub use openai::{OpenAI, OpenAIConfig};
