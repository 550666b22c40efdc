//! Conversion from `shopchat_core` errors to HTTP errors.

use super::http_error::{Error as HttpError, ErrorKind};

/// Tracing target for core error conversions.
const TRACING_TARGET: &str = "shopchat_server::handler::error";

impl From<shopchat_core::Error> for HttpError<'static> {
    fn from(error: shopchat_core::Error) -> Self {
        use shopchat_core::ErrorKind as CoreErrorKind;

        match error.kind {
            CoreErrorKind::InvalidInput | CoreErrorKind::NotFound => {
                tracing::debug!(
                    target: TRACING_TARGET,
                    error = %error,
                    "Request rejected"
                );
            }
            CoreErrorKind::NetworkError | CoreErrorKind::Timeout => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    error = %error,
                    error_kind = ?error.kind,
                    "Upstream request failed"
                );
            }
            CoreErrorKind::Configuration | CoreErrorKind::InternalError => {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %error,
                    error_kind = ?error.kind,
                    "Internal failure while serving request"
                );
            }
            _ => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    error = %error,
                    error_kind = ?error.kind,
                    "Upstream service returned an error"
                );
            }
        }

        let message = error.message.clone().unwrap_or_else(|| error.to_string());

        match error.kind {
            CoreErrorKind::InvalidInput => ErrorKind::BadRequest.with_message(message),

            CoreErrorKind::NotFound => ErrorKind::NotFound
                .with_message(message)
                .with_resource("product"),

            CoreErrorKind::Timeout => ErrorKind::GatewayTimeout
                .with_message("Upstream service did not answer in time")
                .with_context(message),

            CoreErrorKind::NetworkError
            | CoreErrorKind::ExternalError
            | CoreErrorKind::Authentication
            | CoreErrorKind::Serialization => ErrorKind::BadGateway
                .with_message("Upstream service failed")
                .with_context(message),

            CoreErrorKind::Configuration | CoreErrorKind::InternalError => {
                ErrorKind::InternalServerError.with_context(message)
            }
        }
    }
}
