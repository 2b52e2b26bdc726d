//! Tool trait for the research pipeline.
//!
//! Each tool represents one capability the pipeline invokes: a simulated
//! web search, a summarization call, or a fact check. Tools are typed: their
//! arguments and outputs are serde types so the observability layer can
//! record them as span inputs and outputs without knowing the tool.

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// A typed, asynchronous tool.
///
/// # Example
///
/// ```rust,ignore
/// struct Echo;
///
/// #[async_trait]
/// impl Tool for Echo {
///     const NAME: &'static str = "echo";
///     type Args = String;
///     type Output = String;
///     type Error = std::convert::Infallible;
///
///     async fn call(&self, args: String) -> Result<String, Self::Error> {
///         Ok(args)
///     }
/// }
/// ```
#[async_trait]
pub trait Tool: Send + Sync {
    /// Static name of the tool.
    const NAME: &'static str;

    /// Arguments type for the tool.
    type Args: Serialize + DeserializeOwned + Send + Sync;

    /// Output type of the tool.
    type Output: Serialize + Send;

    /// Error type for tool execution.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Get the name of the tool.
    fn name(&self) -> &'static str {
        Self::NAME
    }

    /// Execute the tool with the given arguments.
    async fn call(&self, args: Self::Args) -> Result<Self::Output, Self::Error>;
}
