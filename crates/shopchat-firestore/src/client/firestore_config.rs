//! Firestore client configuration.

use std::time::Duration;

use derive_builder::Builder;
use url::Url;

use crate::error::{Error, Result};

/// Configuration for the Firestore client.
#[derive(Debug, Clone, Builder)]
#[builder(
    name = "FirestoreBuilder",
    pattern = "owned",
    setter(into, strip_option, prefix = "with"),
    build_fn(validate = "Self::validate_config")
)]
pub struct FirestoreConfig {
    /// Base URL of the Firestore REST API.
    #[builder(default = "FirestoreConfig::DEFAULT_ENDPOINT.to_owned()")]
    pub endpoint: String,
    /// Project id. Falls back to the service account's project when unset.
    #[builder(default)]
    pub project_id: Option<String>,
    /// Database id within the project.
    #[builder(default = "FirestoreConfig::DEFAULT_DATABASE.to_owned()")]
    pub database: String,
    /// `host:port` of a Firestore emulator. Overrides `endpoint` and disables
    /// authentication.
    #[builder(default)]
    pub emulator_host: Option<String>,
    /// Request timeout duration
    #[builder(default = "Duration::from_secs(30)")]
    pub timeout: Duration,
    /// Connection timeout duration
    #[builder(default = "Duration::from_secs(10)")]
    pub connect_timeout: Duration,
    /// User agent string for requests
    #[builder(default = "FirestoreConfig::default_user_agent()")]
    pub user_agent: String,
}

impl Default for FirestoreConfig {
    fn default() -> Self {
        Self {
            endpoint: Self::DEFAULT_ENDPOINT.to_owned(),
            project_id: None,
            database: Self::DEFAULT_DATABASE.to_owned(),
            emulator_host: None,
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            user_agent: Self::default_user_agent(),
        }
    }
}

impl FirestoreConfig {
    /// Public Firestore REST endpoint.
    pub const DEFAULT_ENDPOINT: &str = "https://firestore.googleapis.com";
    /// Database every project gets by default.
    pub const DEFAULT_DATABASE: &str = "(default)";

    /// Create a new configuration builder
    pub fn builder() -> FirestoreBuilder {
        FirestoreBuilder::default()
    }

    fn default_user_agent() -> String {
        format!("shopchat-firestore/{}", env!("CARGO_PKG_VERSION"))
    }

    /// Returns true if requests go to an emulator.
    pub fn is_emulator(&self) -> bool {
        self.emulator_host.is_some()
    }

    /// Resolves the base URL requests are sent to.
    pub fn base_url(&self) -> Result<Url> {
        let raw = match &self.emulator_host {
            Some(host) => format!("http://{host}"),
            None => self.endpoint.clone(),
        };

        Url::parse(&raw).map_err(|e| Error::invalid_config(format!("Invalid endpoint '{raw}': {e}")))
    }
}

impl FirestoreBuilder {
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

        if let Some(database) = &self.database
            && database.trim().is_empty()
        {
            return Err("Database must not be empty".to_string());
        }

        if let Some(endpoint) = &self.endpoint
            && let Err(e) = Url::parse(endpoint)
        {
            return Err(format!("Invalid endpoint '{endpoint}': {e}"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = FirestoreConfig::default();

        assert_eq!(config.endpoint, "https://firestore.googleapis.com");
        assert_eq!(config.database, "(default)");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
        assert!(config.project_id.is_none());
        assert!(!config.is_emulator());
    }

    #[test]
    fn builder_matches_defaults() -> anyhow::Result<()> {
        let config = FirestoreConfig::builder()
            .with_project_id("shop")
            .with_timeout(Duration::from_secs(5))
            .build()?;

        assert_eq!(config.project_id.as_deref(), Some("shop"));
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.database, FirestoreConfig::DEFAULT_DATABASE);
        Ok(())
    }

    #[test]
    fn emulator_host_overrides_endpoint() -> anyhow::Result<()> {
        let config = FirestoreConfig::builder()
            .with_emulator_host("localhost:8080")
            .build()?;

        assert!(config.is_emulator());
        assert_eq!(config.base_url()?.as_str(), "http://localhost:8080/");
        Ok(())
    }

    #[test]
    fn validation_rejects_bad_values() {
        assert!(
            FirestoreConfig::builder()
                .with_timeout(Duration::ZERO)
                .build()
                .is_err()
        );
        assert!(FirestoreConfig::builder().with_database(" ").build().is_err());
        assert!(
            FirestoreConfig::builder()
                .with_endpoint("not a url")
                .build()
                .is_err()
        );
    }
}
