//! OAuth 2.0 access tokens for service accounts.
//!
//! A signed RS256 assertion is exchanged at the account's token endpoint
//! (the JWT bearer grant). The resulting token is held until shortly before
//! it expires and then exchanged again.

use std::fmt;
use std::time::{Duration, Instant};

use jiff::Timestamp;
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use super::ServiceAccount;
use crate::TRACING_TARGET_AUTH;
use crate::error::{Error, Result};

/// OAuth scope granting read/write access to Firestore.
const DATASTORE_SCOPE: &str = "https://www.googleapis.com/auth/datastore";

/// Grant type of the assertion exchange.
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Lifetime requested for each assertion, the maximum Google accepts.
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// Tokens closer than this to expiry are exchanged again.
const REFRESH_MARGIN: Duration = Duration::from_secs(60);

/// Claims of the signed assertion.
#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

/// Successful token endpoint response.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

#[derive(Clone)]
struct AccessToken {
    value: String,
    expires_at: Instant,
}

impl AccessToken {
    fn is_fresh(&self) -> bool {
        Instant::now() + REFRESH_MARGIN < self.expires_at
    }
}

/// Produces access tokens for one service account.
pub(crate) struct TokenSource {
    http: Client,
    account: ServiceAccount,
    key: EncodingKey,
    current: RwLock<Option<AccessToken>>,
}

impl fmt::Debug for TokenSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenSource")
            .field("account", &self.account)
            .finish_non_exhaustive()
    }
}

impl TokenSource {
    /// Creates a token source, parsing the account's private key.
    pub fn new(http: Client, account: ServiceAccount) -> Result<Self> {
        let key = EncodingKey::from_rsa_pem(account.private_key.as_bytes()).map_err(|e| {
            tracing::error!(
                target: TRACING_TARGET_AUTH,
                client_email = %account.client_email,
                error = %e,
                "Failed to parse service account private key"
            );
            Error::invalid_credentials(format!("private_key is not a valid RSA PEM key: {e}"))
        })?;

        Ok(Self {
            http,
            account,
            key,
            current: RwLock::new(None),
        })
    }

    /// Returns a valid access token, exchanging a new assertion when needed.
    pub async fn access_token(&self) -> Result<String> {
        if let Some(token) = self.current.read().await.as_ref()
            && token.is_fresh()
        {
            return Ok(token.value.clone());
        }

        let mut current = self.current.write().await;

        // Another task may have refreshed while this one waited for the lock.
        if let Some(token) = current.as_ref()
            && token.is_fresh()
        {
            return Ok(token.value.clone());
        }

        let token = self.exchange().await?;
        let value = token.value.clone();
        *current = Some(token);
        Ok(value)
    }

    fn sign_assertion(&self) -> Result<String> {
        let issued_at = Timestamp::now().as_second();
        let claims = AssertionClaims {
            iss: &self.account.client_email,
            scope: DATASTORE_SCOPE,
            aud: &self.account.token_uri,
            iat: issued_at,
            exp: issued_at + ASSERTION_LIFETIME_SECS,
        };

        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.account.private_key_id.clone();

        Ok(encode(&header, &claims, &self.key)?)
    }

    async fn exchange(&self) -> Result<AccessToken> {
        let started_at = Instant::now();
        let assertion = self.sign_assertion()?;

        let response = self
            .http
            .post(&self.account.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            tracing::error!(
                target: TRACING_TARGET_AUTH,
                status = status.as_u16(),
                client_email = %self.account.client_email,
                "Token exchange rejected"
            );
            return Err(Error::Unauthorized {
                status: status.as_u16(),
                message,
            });
        }

        let body: TokenResponse = response.json().await?;

        tracing::debug!(
            target: TRACING_TARGET_AUTH,
            expires_in = body.expires_in,
            elapsed_ms = started_at.elapsed().as_millis(),
            "Access token obtained"
        );

        Ok(AccessToken {
            value: body.access_token,
            expires_at: Instant::now() + Duration::from_secs(body.expires_in),
        })
    }
}

#[cfg(test)]
mod tests {
    use jsonwebtoken::{DecodingKey, Validation, decode, decode_header};

    use super::*;
    use crate::client::credentials::tests::{TEST_PUBLIC_KEY, test_account};

    #[test]
    fn rejects_invalid_private_key() {
        let mut account = test_account("http://localhost/token");
        account.private_key = "not a key".to_owned();

        let error = TokenSource::new(Client::new(), account).unwrap_err();
        assert!(matches!(error, Error::Credentials(_)));
    }

    #[test]
    fn assertion_is_rs256_with_key_id() -> anyhow::Result<()> {
        let source = TokenSource::new(Client::new(), test_account("http://localhost/token"))?;

        let assertion = source.sign_assertion()?;
        let header = decode_header(&assertion)?;

        assert_eq!(header.alg, Algorithm::RS256);
        assert_eq!(header.kid.as_deref(), Some("key-1"));

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&["http://localhost/token"]);
        let key = DecodingKey::from_rsa_pem(TEST_PUBLIC_KEY.as_bytes())?;
        let claims = decode::<serde_json::Value>(&assertion, &key, &validation)?.claims;

        assert_eq!(claims["iss"], "shopchat@shop.iam.gserviceaccount.com");
        assert_eq!(claims["scope"], DATASTORE_SCOPE);
        assert_eq!(
            claims["exp"].as_i64().unwrap_or_default() - claims["iat"].as_i64().unwrap_or_default(),
            ASSERTION_LIFETIME_SECS
        );
        Ok(())
    }

    #[test]
    fn token_freshness_respects_margin() {
        let stale = AccessToken {
            value: "t".to_owned(),
            expires_at: Instant::now() + Duration::from_secs(30),
        };
        let fresh = AccessToken {
            value: "t".to_owned(),
            expires_at: Instant::now() + Duration::from_secs(3600),
        };

        assert!(!stale.is_fresh());
        assert!(fresh.is_fresh());
    }
}
