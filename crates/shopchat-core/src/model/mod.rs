//! Language-model completion abstractions.
//!
//! The model is treated as an opaque capability: a prompt goes in, reply
//! text comes out. Providers implement [`CompletionProvider`]; callers hold a
//! [`CompletionService`], which wraps a provider and adds logging.
//!
//! # Example
//!
//! ```rust,ignore
//! use shopchat_core::{CompletionService, MockProvider};
//!
//! let service = CompletionService::from_provider(MockProvider::with_reply("hi there"));
//! let reply = service.complete("hello").await?;
//! assert_eq!(reply, "hi there");
//! ```

#[cfg(any(test, feature = "test-utils"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-utils")))]
mod mock;
mod service;

#[cfg(any(test, feature = "test-utils"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-utils")))]
pub use mock::{MockConfig, MockProvider};
pub use service::CompletionService;

pub use crate::{Result, ServiceHealth};

/// Tracing target for completion operations.
pub const TRACING_TARGET: &str = "shopchat_core::model";

/// A language model that turns a prompt into reply text.
#[async_trait::async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Submits `prompt` to the model and returns its reply.
    async fn complete(&self, prompt: &str) -> Result<String>;

    /// Performs a health check on the model endpoint.
    async fn health_check(&self) -> Result<ServiceHealth>;
}
