//! Backend-powered fact checking.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::chat::{ChatProviderExt, SharedChatProvider};
use crate::error::LlmError;
use crate::tool::Tool;

const SYSTEM_PROMPT: &str = "You are a fact-checking assistant. Verify claims against context and respond with 'VERIFIED', 'UNVERIFIED', or 'CONTRADICTED' plus explanation.";

/// Verifies a claim against supporting context.
#[derive(Clone)]
pub struct FactCheckTool {
    provider: SharedChatProvider,
    model: String,
}

/// Arguments for a fact check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactCheckArgs {
    /// The claim to verify.
    pub claim: String,
    /// Context the claim is checked against.
    pub context: String,
}

impl FactCheckArgs {
    /// Create fact check arguments.
    #[must_use]
    pub fn new(claim: impl Into<String>, context: impl Into<String>) -> Self {
        Self {
            claim: claim.into(),
            context: context.into(),
        }
    }
}

/// Outcome of a fact check.
///
/// `verification` holds the backend's raw answer. It usually starts with
/// `VERIFIED`, `UNVERIFIED` or `CONTRADICTED` but is not parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactCheck {
    /// The claim that was checked.
    pub claim: String,
    /// Raw verification text from the backend.
    pub verification: String,
    /// The context supplied with the claim.
    pub context_used: String,
}

impl FactCheckTool {
    /// Create a fact checker using `model` on `provider`.
    #[must_use]
    pub fn new(provider: SharedChatProvider, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }

    /// Check `claim` against `context`.
    ///
    /// # Errors
    ///
    /// Propagates the backend error.
    pub async fn fact_check(&self, claim: &str, context: &str) -> Result<FactCheck, LlmError> {
        let prompt = format!("Claim: {claim}\nContext: {context}\nVerification:");
        let verification = self
            .provider
            .complete_with_system(&self.model, SYSTEM_PROMPT, &prompt)
            .await?;

        Ok(FactCheck {
            claim: claim.to_owned(),
            verification,
            context_used: context.to_owned(),
        })
    }
}

impl fmt::Debug for FactCheckTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FactCheckTool")
            .field("provider", &self.provider.provider_name())
            .field("model", &self.model)
            .finish()
    }
}

#[async_trait]
impl Tool for FactCheckTool {
    const NAME: &'static str = "fact_check";
    type Args = FactCheckArgs;
    type Output = FactCheck;
    type Error = LlmError;

    async fn call(&self, args: Self::Args) -> Result<Self::Output, Self::Error> {
        self.fact_check(&args.claim, &args.context).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::llms::MockProvider;

    #[tokio::test]
    async fn keeps_raw_verification() {
        let mock = Arc::new(MockProvider::new(vec![
            "VERIFIED: the context says so".to_owned(),
        ]));
        let tool = FactCheckTool::new(mock.clone(), "gpt-4");

        let check = tool
            .fact_check("Water boils at 100C", "At sea level water boils at 100C")
            .await
            .unwrap();

        assert_eq!(check.claim, "Water boils at 100C");
        assert_eq!(check.verification, "VERIFIED: the context says so");
        assert_eq!(check.context_used, "At sea level water boils at 100C");

        let req = &mock.requests()[0];
        assert_eq!(req.system_prompt(), Some(SYSTEM_PROMPT));
        assert_eq!(
            req.last_user_message(),
            Some("Claim: Water boils at 100C\nContext: At sea level water boils at 100C\nVerification:")
        );
    }

    #[tokio::test]
    async fn unexpected_answer_is_not_rejected() {
        let mock = Arc::new(MockProvider::new(vec!["maybe?".to_owned()]));
        let check = FactCheckTool::new(mock, "gpt-4")
            .call(FactCheckArgs::new("c", "ctx"))
            .await
            .unwrap();
        assert_eq!(check.verification, "maybe?");
    }

    #[tokio::test]
    async fn backend_error_propagates() {
        let mock = Arc::new(MockProvider::from_fn(|_| Err(LlmError::network("down"))));
        assert!(
            FactCheckTool::new(mock, "gpt-4")
                .fact_check("c", "ctx")
                .await
                .is_err()
        );
    }
}
