//! Completion service with observability.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use super::{CompletionProvider, Result, ServiceHealth, TRACING_TARGET};

/// Completion service shared across request handlers.
///
/// Wraps any [`CompletionProvider`] and adds structured logging for every call.
/// Cloning is cheap: clones share the same provider.
#[derive(Clone)]
pub struct CompletionService {
    provider: Arc<dyn CompletionProvider>,
}

impl fmt::Debug for CompletionService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionService").finish_non_exhaustive()
    }
}

impl CompletionService {
    /// Create a new completion service from a provider.
    pub fn from_provider<P>(provider: P) -> Self
    where
        P: CompletionProvider + 'static,
    {
        Self {
            provider: Arc::new(provider),
        }
    }

    /// Submits `prompt` to the model and returns its reply.
    pub async fn complete(&self, prompt: &str) -> Result<String> {
        let started_at = Instant::now();

        tracing::debug!(
            target: TRACING_TARGET,
            prompt_len = prompt.len(),
            "Processing completion request"
        );

        let result = self.provider.complete(prompt).await;
        let elapsed = started_at.elapsed();

        match &result {
            Ok(reply) => {
                tracing::debug!(
                    target: TRACING_TARGET,
                    reply_len = reply.len(),
                    elapsed_ms = elapsed.as_millis(),
                    "Completion successful"
                );
            }
            Err(error) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %error,
                    elapsed_ms = elapsed.as_millis(),
                    "Completion failed"
                );
            }
        }

        result
    }

    /// Performs a health check on the underlying provider.
    pub async fn health_check(&self) -> Result<ServiceHealth> {
        let started_at = Instant::now();
        let health = self.provider.health_check().await?;

        tracing::debug!(
            target: TRACING_TARGET,
            status = ?health.status,
            elapsed_ms = started_at.elapsed().as_millis(),
            "Completion health check finished"
        );

        Ok(health)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MockProvider;
    use crate::{Error, ErrorKind};

    #[tokio::test]
    async fn forwards_prompt_and_reply() -> anyhow::Result<()> {
        let provider = MockProvider::with_reply("hi there");
        let service = CompletionService::from_provider(provider.clone());

        let reply = service.complete("hello").await?;

        assert_eq!(reply, "hi there");
        assert_eq!(provider.prompts(), vec!["hello".to_owned()]);
        Ok(())
    }

    #[tokio::test]
    async fn propagates_provider_errors() {
        let provider = MockProvider::failing(Error::network_error().with_message("down"));
        let service = CompletionService::from_provider(provider);

        let error = service.complete("hello").await.unwrap_err();
        assert_eq!(error.kind, ErrorKind::NetworkError);
    }

    #[tokio::test]
    async fn health_check_reports_provider_status() -> anyhow::Result<()> {
        let service = CompletionService::from_provider(MockProvider::default());
        let health = service.health_check().await?;
        assert!(health.is_healthy());
        Ok(())
    }
}
