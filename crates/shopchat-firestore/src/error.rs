//! Error types for shopchat-firestore.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for shopchat-firestore operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Error type for the shopchat-firestore library.
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Reqwest(#[from] reqwest::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Credential file could not be read.
    #[error("Failed to read credentials from '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Credential file is readable but unusable.
    #[error("Invalid credentials: {0}")]
    Credentials(String),

    /// The token assertion could not be signed.
    #[error("Signing error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    /// Configuration errors.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The token endpoint or Firestore rejected the credentials.
    #[error("Authentication failed ({status}): {message}")]
    Unauthorized { status: u16, message: String },

    /// Firestore answered with an unexpected status.
    #[error("Firestore error ({status}): {message}")]
    Status { status: u16, message: String },

    /// A document value used an unknown or malformed encoding.
    #[error("Decode error: {0}")]
    Decode(String),
}

impl Error {
    /// Create a configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a credentials error.
    pub fn invalid_credentials(message: impl Into<String>) -> Self {
        Self::Credentials(message.into())
    }

    /// Create a decode error.
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode(message.into())
    }
}

impl From<Error> for shopchat_core::Error {
    fn from(err: Error) -> Self {
        use shopchat_core::Error as CoreError;

        let message = err.to_string();
        let error = match &err {
            Error::Reqwest(e) if e.is_timeout() => CoreError::timeout(),
            Error::Reqwest(e) if e.is_decode() => CoreError::serialization(),
            Error::Reqwest(_) => CoreError::network_error(),
            Error::Serde(_) | Error::Decode(_) => CoreError::serialization(),
            Error::Io { .. } | Error::Credentials(_) | Error::Config(_) => {
                CoreError::configuration()
            }
            Error::Jwt(_) | Error::Unauthorized { .. } => CoreError::authentication(),
            Error::Status { .. } => CoreError::external_error(),
        };

        error.with_message(message).with_source(err)
    }
}

#[cfg(test)]
mod tests {
    use shopchat_core::ErrorKind;

    use super::*;

    #[test]
    fn maps_to_core_error_kinds() {
        let cases = [
            (Error::decode("bad"), ErrorKind::Serialization),
            (Error::invalid_config("bad"), ErrorKind::Configuration),
            (Error::invalid_credentials("bad"), ErrorKind::Configuration),
            (
                Error::Unauthorized {
                    status: 401,
                    message: "denied".into(),
                },
                ErrorKind::Authentication,
            ),
            (
                Error::Status {
                    status: 500,
                    message: "boom".into(),
                },
                ErrorKind::ExternalError,
            ),
        ];

        for (error, kind) in cases {
            let core: shopchat_core::Error = error.into();
            assert_eq!(core.kind, kind);
        }
    }

    #[test]
    fn core_error_keeps_message() {
        let core: shopchat_core::Error = Error::Status {
            status: 503,
            message: "unavailable".into(),
        }
        .into();
        assert_eq!(core.message(), Some("Firestore error (503): unavailable"));
    }
}
