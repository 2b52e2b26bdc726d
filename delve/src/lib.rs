//! Delve - an instrumented research agent with online evaluation
//!
//! This crate provides a research pipeline (search, summarize, report) on top
//! of an OpenAI-compatible chat backend, an observability layer that reports
//! every tool and model call to a collector as a span, and a client for the
//! collector's evaluation service.

pub mod chat;
pub mod collector;
pub mod error;
pub mod eval;
pub mod llms;
pub mod message;
pub mod observe;
pub mod prelude;
pub mod research;
pub mod tool;
pub mod tools;
pub mod usage;

pub use error::{CollectorError, Error, LlmError, Result};
