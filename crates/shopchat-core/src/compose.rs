//! Product-aware prompt composition.
//!
//! [`ContextComposer`] answers a question about one product: it looks the
//! product up, folds its fields into a fixed prompt template with
//! [`compose_prompt`] and submits the result to the model.

use std::fmt;

#[cfg(feature = "config")]
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::{CompletionService, Error, ProductLookup, ProductRecord, Result};

/// Tracing target for prompt composition.
pub const TRACING_TARGET: &str = "shopchat_core::compose";

/// Builds the prompt submitted to the model for a product question.
///
/// The record is rendered with its [`Display`](fmt::Display) form, so an
/// empty record is rendered as `{}`.
///
/// ```
/// use serde_json::json;
/// use shopchat_core::{ProductRecord, compose_prompt};
///
/// let record = ProductRecord::new().with_field("color", json!("blue"));
/// assert_eq!(
///     compose_prompt("What color?", &record),
///     "User asked: What color?\nProduct info: {'color': 'blue'}\nRespond accordingly:",
/// );
/// ```
pub fn compose_prompt(prompt: &str, record: &ProductRecord) -> String {
    format!("User asked: {prompt}\nProduct info: {record}\nRespond accordingly:")
}

/// What to do when the requested product does not exist.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(ValueEnum))]
#[serde(rename_all = "kebab-case")]
pub enum MissingProductPolicy {
    /// Compose the prompt with an empty record and ask the model anyway.
    #[default]
    PassThrough,
    /// Fail with a not-found error without calling the model.
    Reject,
}

impl fmt::Display for MissingProductPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PassThrough => f.write_str("pass-through"),
            Self::Reject => f.write_str("reject"),
        }
    }
}

/// Answers product questions by combining a lookup and a completion service.
#[derive(Debug, Clone)]
pub struct ContextComposer {
    lookup: ProductLookup,
    completion: CompletionService,
    policy: MissingProductPolicy,
}

impl ContextComposer {
    /// Creates a composer with the [`MissingProductPolicy::PassThrough`] policy.
    pub fn new(lookup: ProductLookup, completion: CompletionService) -> Self {
        Self {
            lookup,
            completion,
            policy: MissingProductPolicy::default(),
        }
    }

    /// Sets the policy applied when a product does not exist.
    pub fn with_policy(mut self, policy: MissingProductPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Returns the policy applied when a product does not exist.
    pub fn policy(&self) -> MissingProductPolicy {
        self.policy
    }

    /// Returns the product lookup.
    pub fn lookup(&self) -> &ProductLookup {
        &self.lookup
    }

    /// Looks up `product_id`, composes the prompt and returns the model's reply.
    ///
    /// # Errors
    ///
    /// Fails when the lookup or the model call fails, and with
    /// [`ErrorKind::NotFound`](crate::ErrorKind::NotFound) when the product
    /// does not exist and the policy is [`MissingProductPolicy::Reject`].
    pub async fn chat_with_product(&self, prompt: &str, product_id: &str) -> Result<String> {
        let record = match self.lookup.find(product_id).await? {
            Some(record) => record,
            None if self.policy == MissingProductPolicy::Reject => {
                return Err(
                    Error::not_found().with_message(format!("product '{product_id}' does not exist"))
                );
            }
            None => ProductRecord::default(),
        };

        let composed = compose_prompt(prompt, &record);

        tracing::debug!(
            target: TRACING_TARGET,
            product_id,
            fields = record.len(),
            prompt_len = composed.len(),
            "Composed product prompt"
        );

        self.completion.complete(&composed).await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{ErrorKind, MemoryStore, MockProvider};

    fn composer(store: MemoryStore, provider: &MockProvider) -> ContextComposer {
        ContextComposer::new(ProductLookup::new(store), provider.clone().into_service())
    }

    #[tokio::test]
    async fn submits_composed_prompt() -> anyhow::Result<()> {
        let store = MemoryStore::new().with_document(
            "products",
            "shirt-1",
            json!({"name": "Shirt", "color": "blue"}),
        );
        let provider = MockProvider::with_reply("It is blue.");

        let reply = composer(store, &provider)
            .chat_with_product("What color?", "shirt-1")
            .await?;

        assert_eq!(reply, "It is blue.");
        assert_eq!(
            provider.prompts(),
            vec![
                "User asked: What color?\nProduct info: {'name': 'Shirt', 'color': 'blue'}\nRespond accordingly:"
                    .to_owned()
            ]
        );
        Ok(())
    }

    #[tokio::test]
    async fn missing_product_passes_empty_record() -> anyhow::Result<()> {
        let provider = MockProvider::default();

        composer(MemoryStore::new(), &provider)
            .chat_with_product("Is it in stock?", "nope")
            .await?;

        assert_eq!(
            provider.prompts(),
            vec!["User asked: Is it in stock?\nProduct info: {}\nRespond accordingly:".to_owned()]
        );
        Ok(())
    }

    #[tokio::test]
    async fn missing_product_rejected_without_model_call() {
        let provider = MockProvider::default();
        let composer =
            composer(MemoryStore::new(), &provider).with_policy(MissingProductPolicy::Reject);

        let error = composer
            .chat_with_product("Is it in stock?", "nope")
            .await
            .unwrap_err();

        assert_eq!(error.kind, ErrorKind::NotFound);
        assert!(provider.prompts().is_empty());
    }

    #[tokio::test]
    async fn lookup_failure_skips_model() {
        let provider = MockProvider::default();

        let error = composer(MemoryStore::unavailable(), &provider)
            .chat_with_product("What color?", "shirt-1")
            .await
            .unwrap_err();

        assert_eq!(error.kind, ErrorKind::NetworkError);
        assert!(provider.prompts().is_empty());
    }

    #[test]
    fn policy_uses_kebab_case() -> anyhow::Result<()> {
        assert_eq!(
            serde_json::to_value(MissingProductPolicy::PassThrough)?,
            json!("pass-through")
        );
        assert_eq!(MissingProductPolicy::Reject.to_string(), "reject");
        assert_eq!(MissingProductPolicy::default(), MissingProductPolicy::PassThrough);
        Ok(())
    }
}
