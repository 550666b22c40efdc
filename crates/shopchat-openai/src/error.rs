//! Error types for shopchat-openai.

use thiserror::Error;

/// Result type alias for shopchat-openai operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Error type for the shopchat-openai library.
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Reqwest(#[from] reqwest::Error),

    /// Configuration errors.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The endpoint answered with a non-success status.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The endpoint answered without any reply text.
    #[error("Completion returned no content")]
    EmptyResponse,
}

impl Error {
    /// Create a configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
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
            Error::Config(_) => CoreError::configuration(),
            Error::Api {
                status: 401 | 403, ..
            } => CoreError::authentication(),
            Error::Api { .. } | Error::EmptyResponse => CoreError::external_error(),
        };

        error.with_message(message).with_source(err)
    }
}
