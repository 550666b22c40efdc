//! Common error type definitions.

use thiserror::Error;

/// Type alias for boxed dynamic errors that can be sent across threads.
///
/// Used as the source of a structured [`Error`], wrapping any error that
/// implements the standard `Error` trait.
pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// Type alias for Results with our custom Error type.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Categories of errors that can occur while talking to the model or the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Input validation failed.
    InvalidInput,
    /// Requested resource does not exist.
    NotFound,
    /// Credentials were rejected or could not be produced.
    Authentication,
    /// The remote service could not be reached.
    NetworkError,
    /// The remote service did not answer in time.
    Timeout,
    /// The remote service answered with an error.
    ExternalError,
    /// Configuration is missing or invalid.
    Configuration,
    /// Serialization/deserialization error.
    Serialization,
    /// Internal error.
    InternalError,
}

impl ErrorKind {
    /// Returns the error kind as a string for logging.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidInput => "invalid_input",
            Self::NotFound => "not_found",
            Self::Authentication => "authentication",
            Self::NetworkError => "network_error",
            Self::Timeout => "timeout",
            Self::ExternalError => "external_error",
            Self::Configuration => "configuration",
            Self::Serialization => "serialization",
            Self::InternalError => "internal_error",
        }
    }
}

/// A structured error type for shopchat operations.
#[derive(Debug, Error)]
#[error("{}{}", kind.as_str(), message.as_ref().map(|m| format!(": {m}")).unwrap_or_default())]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional error message.
    pub message: Option<String>,
    /// Optional source error.
    #[source]
    pub source: Option<BoxedError>,
}

impl Error {
    /// Creates a new error with the given kind.
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            source: None,
        }
    }

    /// Adds a message to this error.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Adds a source error to this error.
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Creates a new invalid input error.
    pub fn invalid_input() -> Self {
        Self::new(ErrorKind::InvalidInput)
    }

    /// Creates a new not found error.
    pub fn not_found() -> Self {
        Self::new(ErrorKind::NotFound)
    }

    /// Creates a new authentication error.
    pub fn authentication() -> Self {
        Self::new(ErrorKind::Authentication)
    }

    /// Creates a new network error.
    pub fn network_error() -> Self {
        Self::new(ErrorKind::NetworkError)
    }

    /// Creates a new timeout error.
    pub fn timeout() -> Self {
        Self::new(ErrorKind::Timeout)
    }

    /// Creates a new external error.
    pub fn external_error() -> Self {
        Self::new(ErrorKind::ExternalError)
    }

    /// Creates a new configuration error.
    pub fn configuration() -> Self {
        Self::new(ErrorKind::Configuration)
    }

    /// Creates a new serialization error.
    pub fn serialization() -> Self {
        Self::new(ErrorKind::Serialization)
    }

    /// Creates a new internal error.
    pub fn internal_error() -> Self {
        Self::new(ErrorKind::InternalError)
    }

    /// Returns the message, if any.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Returns true if the caller is at fault (4xx equivalent).
    pub fn is_client_error(&self) -> bool {
        matches!(self.kind, ErrorKind::InvalidInput | ErrorKind::NotFound)
    }

    /// Returns true if a dependency failed (5xx equivalent).
    pub fn is_server_error(&self) -> bool {
        !self.is_client_error()
    }

    /// Returns true if this is a timeout error.
    pub fn is_timeout_error(&self) -> bool {
        matches!(self.kind, ErrorKind::Timeout)
    }

    /// Returns true if this is a network error.
    pub fn is_network_error(&self) -> bool {
        matches!(self.kind, ErrorKind::NetworkError)
    }
}
