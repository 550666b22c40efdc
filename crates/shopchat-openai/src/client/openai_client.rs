//! OpenAI-compatible chat completion client.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use reqwest::Client;
use shopchat_core::{CompletionProvider, CompletionService, ServiceHealth};
use url::Url;

use super::OpenAiConfig;
use super::completion::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage, ErrorBody};
use crate::TRACING_TARGET_CLIENT;
use crate::error::{Error, Result};

struct OpenAiClientInner {
    http: Client,
    config: OpenAiConfig,
    completions_url: Url,
    models_url: Url,
}

/// Client for OpenAI-compatible chat completion endpoints.
///
/// Each prompt is sent as a single user message; the reply is the content of
/// the first returned choice. Cloning is cheap.
#[derive(Clone)]
pub struct OpenAiClient {
    inner: Arc<OpenAiClientInner>,
}

impl fmt::Debug for OpenAiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiClient")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

impl OpenAiClient {
    /// Creates a new client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the HTTP client
    /// cannot be created.
    pub fn new(config: OpenAiConfig) -> Result<Self> {
        let completions_url = config.completions_url()?;
        let models_url = config.models_url()?;

        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(&config.user_agent)
            .build()?;

        tracing::info!(
            target: TRACING_TARGET_CLIENT,
            url = %completions_url,
            model = %config.model,
            "Completion client created"
        );

        let inner = OpenAiClientInner {
            http,
            config,
            completions_url,
            models_url,
        };

        Ok(Self {
            inner: Arc::new(inner),
        })
    }

    /// Gets the client configuration.
    pub fn config(&self) -> &OpenAiConfig {
        &self.inner.config
    }

    /// Converts this client into a [`CompletionService`] for dependency injection.
    pub fn into_service(self) -> CompletionService {
        CompletionService::from_provider(self)
    }

    /// Sends `prompt` as a single user message and returns the reply text.
    pub async fn chat(&self, prompt: &str) -> Result<String> {
        let started_at = Instant::now();
        let config = &self.inner.config;

        let body = ChatCompletionRequest {
            model: &config.model,
            messages: vec![ChatMessage::user(prompt)],
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        };

        let mut request = self
            .inner
            .http
            .post(self.inner.completions_url.clone())
            .json(&body);
        if let Some(api_key) = &config.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request.send().await.inspect_err(|e| {
            tracing::warn!(
                target: TRACING_TARGET_CLIENT,
                error = %e,
                timeout = e.is_timeout(),
                elapsed_ms = started_at.elapsed().as_millis(),
                "Completion request failed"
            );
        })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&text)
                .map(|b| b.error.message)
                .unwrap_or(text);

            tracing::warn!(
                target: TRACING_TARGET_CLIENT,
                status = status.as_u16(),
                message = %message,
                "Completion endpoint returned an error"
            );

            return Err(Error::Api {
                status: status.as_u16(),
                message,
            });
        }

        let completion: ChatCompletionResponse = response.json().await?;

        if let Some(usage) = completion.usage {
            tracing::debug!(
                target: TRACING_TARGET_CLIENT,
                model = completion.model.as_deref().unwrap_or(&config.model),
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                finish_reason = completion.choices.first().and_then(|c| c.finish_reason.as_deref()),
                elapsed_ms = started_at.elapsed().as_millis(),
                "Completion received"
            );
        }

        completion.into_content().ok_or(Error::EmptyResponse)
    }

    /// Lists the endpoint's models, which spends no tokens.
    async fn check_models(&self) -> ServiceHealth {
        let started_at = Instant::now();

        let mut request = self.inner.http.get(self.inner.models_url.clone());
        if let Some(api_key) = &self.inner.config.api_key {
            request = request.bearer_auth(api_key);
        }

        let health = match request.send().await {
            Ok(response) if response.status().is_success() => ServiceHealth::healthy(),
            Ok(response) => {
                ServiceHealth::unhealthy(format!("model endpoint answered {}", response.status()))
            }
            Err(e) => ServiceHealth::unhealthy(format!("model endpoint unreachable: {e}")),
        };

        if !health.is_healthy() {
            tracing::warn!(
                target: TRACING_TARGET_CLIENT,
                reason = health.message.as_deref(),
                "Model health check failed"
            );
        }

        health.with_response_time(started_at.elapsed())
    }
}

#[async_trait::async_trait]
impl CompletionProvider for OpenAiClient {
    async fn complete(&self, prompt: &str) -> shopchat_core::Result<String> {
        Ok(self.chat(prompt).await?)
    }

    async fn health_check(&self) -> shopchat_core::Result<ServiceHealth> {
        Ok(self.check_models().await)
    }
}
