//! Service-account credentials for Firestore.

use std::fmt;
use std::path::Path;

use serde::Deserialize;

use crate::TRACING_TARGET_AUTH;
use crate::error::{Error, Result};

/// A Google service-account key, as downloaded from the Cloud console.
#[derive(Clone, Deserialize)]
pub struct ServiceAccount {
    /// Key type, `service_account` for keys this client can use.
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    /// Project the account belongs to.
    #[serde(default)]
    pub project_id: Option<String>,
    /// Id of the private key, sent as the assertion's `kid`.
    #[serde(default)]
    pub private_key_id: Option<String>,
    /// PEM-encoded RSA private key.
    pub private_key: String,
    /// Account email, the assertion's issuer.
    pub client_email: String,
    /// OAuth 2.0 token endpoint.
    #[serde(default = "ServiceAccount::default_token_uri")]
    pub token_uri: String,
}

impl ServiceAccount {
    const KIND: &str = "service_account";

    fn default_token_uri() -> String {
        "https://oauth2.googleapis.com/token".to_owned()
    }
}

impl fmt::Debug for ServiceAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccount")
            .field("project_id", &self.project_id)
            .field("client_email", &self.client_email)
            .field("token_uri", &self.token_uri)
            .finish_non_exhaustive()
    }
}

/// Credentials used to authenticate Firestore requests.
#[derive(Debug, Clone, Default)]
pub enum FirestoreCredentials {
    /// Service-account key exchanged for OAuth 2.0 access tokens.
    ServiceAccount(Box<ServiceAccount>),
    /// No authentication (emulator only)
    #[default]
    None,
}

impl FirestoreCredentials {
    /// Create service-account credentials
    pub fn service_account(account: ServiceAccount) -> Self {
        Self::ServiceAccount(Box::new(account))
    }

    /// Create credentials with no authentication
    pub fn none() -> Self {
        Self::None
    }

    /// Parses a service-account key from its JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        let account: ServiceAccount = serde_json::from_str(json)?;

        if let Some(kind) = &account.kind
            && kind != ServiceAccount::KIND
        {
            return Err(Error::invalid_credentials(format!(
                "expected a '{}' key, found '{kind}'",
                ServiceAccount::KIND
            )));
        }

        if account.client_email.trim().is_empty() {
            return Err(Error::invalid_credentials("client_email is empty"));
        }

        if account.private_key.trim().is_empty() {
            return Err(Error::invalid_credentials("private_key is empty"));
        }

        Ok(Self::service_account(account))
    }

    /// Reads a service-account key file.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or is not a service-account key.
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        tracing::debug!(
            target: TRACING_TARGET_AUTH,
            path = %path.display(),
            "Loading service account credentials"
        );

        let json = tokio::fs::read_to_string(path).await.map_err(|source| {
            tracing::error!(
                target: TRACING_TARGET_AUTH,
                path = %path.display(),
                error = %source,
                "Failed to read credentials file"
            );
            Error::Io {
                path: path.to_owned(),
                source,
            }
        })?;

        let credentials = Self::from_json(&json)?;

        if let Self::ServiceAccount(account) = &credentials {
            tracing::info!(
                target: TRACING_TARGET_AUTH,
                client_email = %account.client_email,
                project_id = account.project_id.as_deref().unwrap_or_default(),
                "Service account credentials loaded"
            );
        }

        Ok(credentials)
    }

    /// Returns the service account, if any.
    pub fn as_service_account(&self) -> Option<&ServiceAccount> {
        match self {
            Self::ServiceAccount(account) => Some(&**account),
            Self::None => None,
        }
    }
}
