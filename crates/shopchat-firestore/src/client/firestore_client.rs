//! Firestore REST client.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use shopchat_core::{ProductRecord, ProductStore, ServiceHealth};
use url::Url;

use super::token::TokenSource;
use super::{FirestoreConfig, FirestoreCredentials};
use crate::TRACING_TARGET_CLIENT;
use crate::document::Document;
use crate::error::{Error, Result};

/// Error body returned by Google APIs.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    message: String,
}

struct FirestoreClientInner {
    http: Client,
    config: FirestoreConfig,
    base_url: Url,
    project_id: String,
    tokens: Option<TokenSource>,
}

/// Firestore client that reads single documents.
///
/// Created once at startup and shared: cloning is cheap and clones share the
/// HTTP connection pool and the current access token.
#[derive(Clone)]
pub struct FirestoreClient {
    inner: Arc<FirestoreClientInner>,
}

impl fmt::Debug for FirestoreClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FirestoreClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("project_id", &self.inner.project_id)
            .field("database", &self.inner.config.database)
            .field("authenticated", &self.inner.tokens.is_some())
            .finish_non_exhaustive()
    }
}

impl FirestoreClient {
    /// Creates a new Firestore client.
    ///
    /// # Errors
    ///
    /// Fails when no project id can be determined, when credentials are
    /// missing outside emulator mode, or when the private key is invalid.
    pub fn new(config: FirestoreConfig, credentials: FirestoreCredentials) -> Result<Self> {
        let base_url = config.base_url()?;

        let account = credentials.as_service_account();
        let project_id = config
            .project_id
            .clone()
            .or_else(|| account.and_then(|a| a.project_id.clone()))
            .ok_or_else(|| {
                Error::invalid_config("project id is not configured and not in the credentials")
            })?;

        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(&config.user_agent)
            .build()?;

        let tokens = match (config.is_emulator(), credentials) {
            (true, _) => None,
            (false, FirestoreCredentials::ServiceAccount(account)) => {
                Some(TokenSource::new(http.clone(), *account)?)
            }
            (false, FirestoreCredentials::None) => {
                return Err(Error::invalid_config(
                    "service account credentials are required unless an emulator is used",
                ));
            }
        };

        tracing::info!(
            target: TRACING_TARGET_CLIENT,
            base_url = %base_url,
            project_id = %project_id,
            database = %config.database,
            emulator = config.is_emulator(),
            "Firestore client created"
        );

        let inner = FirestoreClientInner {
            http,
            config,
            base_url,
            project_id,
            tokens,
        };

        Ok(Self {
            inner: Arc::new(inner),
        })
    }

    /// Gets the client configuration.
    pub fn config(&self) -> &FirestoreConfig {
        &self.inner.config
    }

    /// Returns the project documents are read from.
    pub fn project_id(&self) -> &str {
        &self.inner.project_id
    }

    fn document_url(&self, collection: &str, document_id: &str) -> Result<Url> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::invalid_config("endpoint cannot be a base URL"))?
            .pop_if_empty()
            .extend([
                "v1",
                "projects",
                &self.inner.project_id,
                "databases",
                &self.inner.config.database,
                "documents",
                collection,
                document_id,
            ]);
        Ok(url)
    }

    /// Fetches one document, returning `None` when it does not exist.
    pub async fn get_document(
        &self,
        collection: &str,
        document_id: &str,
    ) -> Result<Option<ProductRecord>> {
        let started_at = Instant::now();
        let url = self.document_url(collection, document_id)?;

        let mut request = self.inner.http.get(url);
        if let Some(tokens) = &self.inner.tokens {
            request = request.bearer_auth(tokens.access_token().await?);
        }

        let response = request.send().await.inspect_err(|e| {
            tracing::warn!(
                target: TRACING_TARGET_CLIENT,
                collection,
                document_id,
                error = %e,
                timeout = e.is_timeout(),
                elapsed_ms = started_at.elapsed().as_millis(),
                "Firestore request failed"
            );
        })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            tracing::debug!(
                target: TRACING_TARGET_CLIENT,
                collection,
                document_id,
                elapsed_ms = started_at.elapsed().as_millis(),
                "Document does not exist"
            );
            return Ok(None);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&body)
                .map(|b| b.error.message)
                .unwrap_or(body);

            tracing::warn!(
                target: TRACING_TARGET_CLIENT,
                collection,
                document_id,
                status = status.as_u16(),
                message = %message,
                "Firestore rejected the request"
            );

            let status = status.as_u16();
            return Err(match status {
                401 | 403 => Error::Unauthorized { status, message },
                _ => Error::Status { status, message },
            });
        }

        let document: Document = response.json().await?;

        tracing::debug!(
            target: TRACING_TARGET_CLIENT,
            document = %document.name,
            fields = document.fields.len(),
            elapsed_ms = started_at.elapsed().as_millis(),
            "Document fetched"
        );

        document.into_record().map(Some)
    }
}

#[async_trait::async_trait]
impl ProductStore for FirestoreClient {
    async fn fetch(
        &self,
        collection: &str,
        document_id: &str,
    ) -> shopchat_core::Result<Option<ProductRecord>> {
        Ok(self.get_document(collection, document_id).await?)
    }

    async fn health_check(&self) -> shopchat_core::Result<ServiceHealth> {
        let started_at = Instant::now();

        let health = match &self.inner.tokens {
            None => ServiceHealth::healthy(),
            Some(tokens) => match tokens.access_token().await {
                Ok(_) => ServiceHealth::healthy(),
                Err(e) => ServiceHealth::unhealthy(e.to_string()),
            },
        };

        Ok(health.with_response_time(started_at.elapsed()))
    }
}
