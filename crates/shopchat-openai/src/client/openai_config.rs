//! OpenAI-compatible client configuration.

use std::fmt;
use std::time::Duration;

use derive_builder::Builder;
use url::Url;

use crate::error::{Error, Result};

/// Configuration for the OpenAI-compatible client.
#[derive(Clone, Builder)]
#[builder(
    name = "OpenAiBuilder",
    pattern = "owned",
    setter(into, strip_option, prefix = "with"),
    build_fn(validate = "Self::validate_config")
)]
pub struct OpenAiConfig {
    /// Base URL of the API, without the `/chat/completions` suffix.
    #[builder(default = "OpenAiConfig::DEFAULT_BASE_URL.to_owned()")]
    pub base_url: String,
    /// Bearer token. Local OpenAI-compatible servers often need none.
    #[builder(default)]
    pub api_key: Option<String>,
    /// Model name sent with every request.
    #[builder(default = "OpenAiConfig::DEFAULT_MODEL.to_owned()")]
    pub model: String,
    /// Sampling temperature. The endpoint default applies when unset.
    #[builder(default)]
    pub temperature: Option<f32>,
    /// Upper bound on generated tokens.
    #[builder(default)]
    pub max_tokens: Option<u32>,
    /// Request timeout duration
    #[builder(default = "Duration::from_secs(30)")]
    pub timeout: Duration,
    /// Connection timeout duration
    #[builder(default = "Duration::from_secs(10)")]
    pub connect_timeout: Duration,
    /// User agent string for requests
    #[builder(default = "OpenAiConfig::default_user_agent()")]
    pub user_agent: String,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            base_url: Self::DEFAULT_BASE_URL.to_owned(),
            api_key: None,
            model: Self::DEFAULT_MODEL.to_owned(),
            temperature: None,
            max_tokens: None,
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            user_agent: Self::default_user_agent(),
        }
    }
}

impl fmt::Debug for OpenAiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("timeout", &self.timeout)
            .field("connect_timeout", &self.connect_timeout)
            .finish_non_exhaustive()
    }
}

impl OpenAiConfig {
    /// Public OpenAI endpoint.
    pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
    /// Model used when none is configured.
    pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

    /// Create a new configuration builder
    pub fn builder() -> OpenAiBuilder {
        OpenAiBuilder::default()
    }

    fn default_user_agent() -> String {
        format!("shopchat-openai/{}", env!("CARGO_PKG_VERSION"))
    }

    /// Resolves the chat completions endpoint.
    pub fn completions_url(&self) -> Result<Url> {
        self.endpoint_url(&["chat", "completions"])
    }

    /// Resolves the model listing endpoint, used for health checks.
    pub fn models_url(&self) -> Result<Url> {
        self.endpoint_url(&["models"])
    }

    fn endpoint_url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| Error::invalid_config(format!("Invalid base URL '{}': {e}", self.base_url)))?;

        url.path_segments_mut()
            .map_err(|_| Error::invalid_config("base URL cannot be a base"))?
            .pop_if_empty()
            .extend(segments);

        Ok(url)
    }
}

impl OpenAiBuilder {
    fn validate_config(&self) -> std::result::Result<(), String> {
        if let Some(timeout) = &self.timeout
            && timeout.is_zero()
        {
            return Err("Timeout must be greater than 0".to_string());
        }

        if let Some(connect_timeout) = &self.connect_timeout
            && connect_timeout.is_zero()
        {
            return Err("Connect timeout must be greater than 0".to_string());
        }

        if let Some(model) = &self.model
            && model.trim().is_empty()
        {
            return Err("Model must not be empty".to_string());
        }

        if let Some(Some(temperature)) = &self.temperature
            && !(0.0..=2.0).contains(temperature)
        {
            return Err("Temperature must be between 0 and 2".to_string());
        }

        if let Some(base_url) = &self.base_url
            && let Err(e) = Url::parse(base_url)
        {
            return Err(format!("Invalid base URL '{base_url}': {e}"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = OpenAiConfig::default();

        assert_eq!(config.base_url, "https://api.openai.com/v1");
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
        assert!(config.api_key.is_none());
    }

    #[test]
    fn completions_url_appends_path() -> anyhow::Result<()> {
        let config = OpenAiConfig::builder()
            .with_base_url("http://localhost:11434/v1/")
            .build()?;
        assert_eq!(
            config.completions_url()?.as_str(),
            "http://localhost:11434/v1/chat/completions"
        );
        Ok(())
    }

    #[test]
    fn models_url_appends_path() -> anyhow::Result<()> {
        let config = OpenAiConfig::builder()
            .with_base_url("https://api.openai.com/v1")
            .build()?;
        assert_eq!(config.models_url()?.as_str(), "https://api.openai.com/v1/models");
        Ok(())
    }

    #[test]
    fn debug_redacts_api_key() -> anyhow::Result<()> {
        let config = OpenAiConfig::builder().with_api_key("sk-secret").build()?;
        assert!(!format!("{config:?}").contains("sk-secret"));
        Ok(())
    }

    #[test]
    fn validation_rejects_bad_values() {
        assert!(OpenAiConfig::builder().with_timeout(Duration::ZERO).build().is_err());
        assert!(OpenAiConfig::builder().with_model("").build().is_err());
        assert!(OpenAiConfig::builder().with_temperature(3.5_f32).build().is_err());
        assert!(OpenAiConfig::builder().with_base_url("nope").build().is_err());
    }
}
