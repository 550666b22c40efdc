//! Mock completion provider for testing.
//!
//! This module is only available when the `test-utils` feature is enabled:
//!
//! ```toml
//! [dev-dependencies]
//! shopchat-core = { version = "...", features = ["test-utils"] }
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use shopchat_core::{CompletionService, MockConfig, MockProvider};
//!
//! // Echo every prompt back
//! let service = MockConfig::default().into_service();
//!
//! // Or always answer with the same reply
//! let service = CompletionService::from_provider(MockProvider::with_reply("hi there"));
//! ```

use std::sync::{Arc, Mutex};

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};

use super::{CompletionProvider, CompletionService, Result, ServiceHealth};
use crate::{Error, ErrorKind};

/// Configuration for the mock provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct MockConfig {
    /// Fixed reply returned for every prompt. When unset, prompts are echoed.
    #[cfg_attr(feature = "config", arg(long = "mock-reply", env = "MOCK_REPLY"))]
    #[serde(default)]
    pub reply: Option<String>,
}

impl MockConfig {
    /// Convert this configuration into a completion service.
    pub fn into_service(self) -> CompletionService {
        MockProvider::new(self).into_service()
    }
}

/// Mock provider that answers without a network call.
///
/// Every prompt it receives is recorded and can be inspected with
/// [`MockProvider::prompts`]. Clones share the recording.
#[derive(Clone, Debug, Default)]
pub struct MockProvider {
    config: Arc<MockConfig>,
    failure: Option<(ErrorKind, Option<String>)>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl MockProvider {
    /// Creates a new mock provider with the given configuration.
    pub fn new(config: MockConfig) -> Self {
        Self {
            config: Arc::new(config),
            ..Default::default()
        }
    }

    /// Creates a mock provider that always returns `reply`.
    pub fn with_reply(reply: impl Into<String>) -> Self {
        Self::new(MockConfig {
            reply: Some(reply.into()),
        })
    }

    /// Creates a mock provider that fails every call with an error like `error`.
    pub fn failing(error: Error) -> Self {
        Self {
            failure: Some((error.kind, error.message)),
            ..Default::default()
        }
    }

    /// Returns every prompt received so far, oldest first.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Convert this provider into a completion service.
    pub fn into_service(self) -> CompletionService {
        CompletionService::from_provider(self)
    }
}

#[async_trait::async_trait]
impl CompletionProvider for MockProvider {
    async fn complete(&self, prompt: &str) -> Result<String> {
        self.prompts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(prompt.to_owned());

        if let Some((kind, message)) = &self.failure {
            let error = Error::new(*kind);
            return Err(match message {
                Some(message) => error.with_message(message.clone()),
                None => error,
            });
        }

        Ok(match &self.config.reply {
            Some(reply) => reply.clone(),
            None => format!("Echo: {prompt}"),
        })
    }

    async fn health_check(&self) -> Result<ServiceHealth> {
        Ok(match &self.failure {
            Some((kind, _)) => ServiceHealth::unhealthy(kind.as_str()),
            None => ServiceHealth::healthy(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn echoes_without_configured_reply() -> anyhow::Result<()> {
        let provider = MockProvider::default();
        assert_eq!(provider.complete("ping").await?, "Echo: ping");
        Ok(())
    }

    #[tokio::test]
    async fn failing_provider_is_unhealthy() -> anyhow::Result<()> {
        let provider = MockProvider::failing(Error::timeout());
        assert!(provider.complete("ping").await.is_err());
        assert!(!provider.health_check().await?.is_healthy());
        assert_eq!(provider.prompts().len(), 1);
        Ok(())
    }
}
