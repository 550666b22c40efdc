use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};
use shopchat_core::{MissingProductPolicy, ProductLookup};
use shopchat_firestore::{FirestoreClient, FirestoreConfig, FirestoreCredentials};
use shopchat_openai::{OpenAiClient, OpenAiConfig};

use crate::{Error, Result};

/// Tracing target for service configuration.
const TRACING_TARGET: &str = "shopchat_server::service::config";

/// Default values for configuration options.
mod defaults {
    use std::path::PathBuf;

    /// Default path of the service account credential file.
    pub fn firestore_credentials() -> PathBuf {
        "service_account.json".into()
    }

    /// Default collection holding product documents.
    pub const PRODUCT_COLLECTION: &str = shopchat_core::product::DEFAULT_COLLECTION;

    /// Default timeout in seconds for calls to Firestore and the model.
    pub const UPSTREAM_TIMEOUT_SECS: u64 = 30;
}

/// App [`state`] configuration.
///
/// [`state`]: crate::service::ServiceState
#[derive(Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "config does nothing unless you use it"]
pub struct ServiceConfig {
    /// Path of the Firestore service account credential file.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "FIRESTORE_CREDENTIALS", default_value = "service_account.json")
    )]
    pub firestore_credentials: PathBuf,

    /// Firestore project id, defaults to the project of the service account.
    #[cfg_attr(feature = "config", arg(long, env = "FIRESTORE_PROJECT_ID"))]
    pub firestore_project_id: Option<String>,

    /// Firestore database id.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "FIRESTORE_DATABASE", default_value = "(default)")
    )]
    pub firestore_database: String,

    /// `host:port` of a Firestore emulator; no credentials are used with it.
    #[cfg_attr(feature = "config", arg(long, env = "FIRESTORE_EMULATOR_HOST"))]
    pub firestore_emulator_host: Option<String>,

    /// Collection holding product documents.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "PRODUCT_COLLECTION", default_value = "products")
    )]
    pub product_collection: String,

    /// What product chat does when the product does not exist.
    #[cfg_attr(
        feature = "config",
        arg(
            long,
            env = "MISSING_PRODUCT_POLICY",
            value_enum,
            default_value_t = MissingProductPolicy::PassThrough
        )
    )]
    #[serde(default)]
    pub missing_product_policy: MissingProductPolicy,

    /// Base URL of the OpenAI-compatible API.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "OPENAI_BASE_URL", default_value = "https://api.openai.com/v1")
    )]
    pub openai_base_url: String,

    /// API key sent as a bearer token to the model endpoint.
    #[cfg_attr(feature = "config", arg(long, env = "OPENAI_API_KEY"))]
    pub openai_api_key: Option<String>,

    /// Model name used for completions.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "OPENAI_MODEL", default_value = "gpt-4o-mini")
    )]
    pub openai_model: String,

    /// Timeout in seconds for every call to Firestore and the model.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "UPSTREAM_TIMEOUT", default_value = "30")
    )]
    pub upstream_timeout: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            firestore_credentials: defaults::firestore_credentials(),
            firestore_project_id: None,
            firestore_database: FirestoreConfig::DEFAULT_DATABASE.to_owned(),
            firestore_emulator_host: None,
            product_collection: defaults::PRODUCT_COLLECTION.to_owned(),
            missing_product_policy: MissingProductPolicy::default(),
            openai_base_url: OpenAiConfig::DEFAULT_BASE_URL.to_owned(),
            openai_api_key: None,
            openai_model: OpenAiConfig::DEFAULT_MODEL.to_owned(),
            upstream_timeout: defaults::UPSTREAM_TIMEOUT_SECS,
        }
    }
}

impl fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("firestore_credentials", &self.firestore_credentials)
            .field("firestore_project_id", &self.firestore_project_id)
            .field("firestore_database", &self.firestore_database)
            .field("firestore_emulator_host", &self.firestore_emulator_host)
            .field("product_collection", &self.product_collection)
            .field("missing_product_policy", &self.missing_product_policy)
            .field("openai_base_url", &self.openai_base_url)
            .field(
                "openai_api_key",
                &self.openai_api_key.as_ref().map(|_| "<redacted>"),
            )
            .field("openai_model", &self.openai_model)
            .field("upstream_timeout", &self.upstream_timeout)
            .finish()
    }
}

impl ServiceConfig {
    /// Returns the upstream timeout as a Duration.
    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout)
    }

    /// Validates values that the clients would otherwise reject later.
    pub fn validate(&self) -> Result<()> {
        if self.product_collection.trim().is_empty() {
            return Err(Error::config("Product collection cannot be empty"));
        }

        if self.firestore_database.trim().is_empty() {
            return Err(Error::config("Firestore database cannot be empty"));
        }

        if self.upstream_timeout == 0 {
            return Err(Error::config(
                "Upstream timeout must be at least 1 second",
            ));
        }

        if !self.openai_base_url.starts_with("http://")
            && !self.openai_base_url.starts_with("https://")
        {
            return Err(Error::config(
                "OpenAI base URL must start with 'http://' or 'https://'",
            ));
        }

        Ok(())
    }

    /// Reads the credentials and creates the Firestore client.
    ///
    /// With an emulator host configured no credential file is read.
    pub async fn connect_firestore(&self) -> Result<FirestoreClient> {
        let mut builder = FirestoreConfig::builder()
            .with_database(self.firestore_database.clone())
            .with_timeout(self.upstream_timeout());

        if let Some(project_id) = &self.firestore_project_id {
            builder = builder.with_project_id(project_id.clone());
        }

        if let Some(emulator_host) = &self.firestore_emulator_host {
            builder = builder.with_emulator_host(emulator_host.clone());
        }

        let config = builder.build().map_err(|e| {
            Error::config(format!("Invalid Firestore configuration: {e}"))
        })?;

        let credentials = if config.is_emulator() {
            tracing::info!(
                target: TRACING_TARGET,
                emulator_host = ?config.emulator_host,
                "Using Firestore emulator without credentials"
            );
            FirestoreCredentials::none()
        } else {
            FirestoreCredentials::from_file(&self.firestore_credentials).await?
        };

        Ok(FirestoreClient::new(config, credentials)?)
    }

    /// Creates the product lookup over the configured collection.
    pub async fn connect_products(&self) -> Result<ProductLookup> {
        let client = self.connect_firestore().await?;
        Ok(ProductLookup::new(client).with_collection(self.product_collection.clone()))
    }

    /// Creates the OpenAI-compatible model client.
    pub fn connect_openai(&self) -> Result<OpenAiClient> {
        let mut builder = OpenAiConfig::builder()
            .with_base_url(self.openai_base_url.clone())
            .with_model(self.openai_model.clone())
            .with_timeout(self.upstream_timeout());

        if let Some(api_key) = &self.openai_api_key {
            builder = builder.with_api_key(api_key.clone());
        }

        let config = builder
            .build()
            .map_err(|e| Error::config(format!("Invalid OpenAI configuration: {e}")))?;

        Ok(OpenAiClient::new(config)?)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::ErrorKind;

    #[test]
    fn default_config_is_valid() -> anyhow::Result<()> {
        let config = ServiceConfig::default();
        config.validate()?;

        assert_eq!(config.product_collection, "products");
        assert_eq!(config.firestore_credentials, PathBuf::from("service_account.json"));
        assert_eq!(config.upstream_timeout(), Duration::from_secs(30));
        Ok(())
    }

    #[test]
    fn rejects_invalid_values() {
        let empty_collection = ServiceConfig {
            product_collection: " ".to_owned(),
            ..Default::default()
        };
        assert!(empty_collection.validate().is_err());

        let zero_timeout = ServiceConfig {
            upstream_timeout: 0,
            ..Default::default()
        };
        assert!(zero_timeout.validate().is_err());

        let bad_url = ServiceConfig {
            openai_base_url: "api.openai.com".to_owned(),
            ..Default::default()
        };
        assert!(bad_url.validate().is_err());
    }

    #[test]
    fn debug_redacts_api_key() {
        let config = ServiceConfig {
            openai_api_key: Some("sk-secret".to_owned()),
            ..Default::default()
        };

        let debug = format!("{config:?}");
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[tokio::test]
    async fn missing_credentials_file_fails() {
        let config = ServiceConfig {
            firestore_credentials: "/nonexistent/service_account.json".into(),
            ..Default::default()
        };

        let error = config.connect_firestore().await.unwrap_err();
        assert_eq!(error.kind(), ErrorKind::FileSystem);
    }

    #[tokio::test]
    async fn malformed_credentials_file_fails() -> anyhow::Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        file.write_all(b"{\"type\": \"service_account\"")?;

        let config = ServiceConfig {
            firestore_credentials: file.path().to_path_buf(),
            ..Default::default()
        };

        assert!(config.connect_firestore().await.is_err());
        Ok(())
    }

    #[tokio::test]
    async fn emulator_needs_no_credentials() -> anyhow::Result<()> {
        let config = ServiceConfig {
            firestore_credentials: "/nonexistent/service_account.json".into(),
            firestore_project_id: Some("shop".to_owned()),
            firestore_emulator_host: Some("127.0.0.1:8080".to_owned()),
            ..Default::default()
        };

        let lookup = config.connect_products().await?;
        assert_eq!(lookup.collection(), "products");
        Ok(())
    }

    #[test]
    fn openai_client_uses_configured_model() -> anyhow::Result<()> {
        let config = ServiceConfig {
            openai_model: "gpt-4o".to_owned(),
            openai_api_key: Some("sk-test".to_owned()),
            ..Default::default()
        };

        let client = config.connect_openai()?;
        assert_eq!(client.config().model, "gpt-4o");
        assert_eq!(client.config().timeout, Duration::from_secs(30));
        Ok(())
    }
}
