//! Application state and dependency injection.

mod config;

use shopchat_core::{CompletionService, ContextComposer, MissingProductPolicy, ProductLookup};

pub use crate::service::config::ServiceConfig;
// Re-export error types from crate root for convenience
pub use crate::{Error, Result};

/// Application state.
///
/// Used for the [`State`] extraction (dependency injection).
///
/// [`State`]: axum::extract::State
#[must_use = "state does nothing unless you use it"]
#[derive(Debug, Clone)]
pub struct ServiceState {
    // External services:
    pub products: ProductLookup,
    pub completion: CompletionService,

    // Internal services:
    pub composer: ContextComposer,
}

impl ServiceState {
    /// Creates the state from already connected services.
    pub fn new(
        products: ProductLookup,
        completion: CompletionService,
        policy: MissingProductPolicy,
    ) -> Self {
        let composer =
            ContextComposer::new(products.clone(), completion.clone()).with_policy(policy);

        Self {
            products,
            completion,
            composer,
        }
    }

    /// Initializes application state from configuration.
    ///
    /// Reads the Firestore credentials and creates the product lookup. The
    /// completion service is created by the caller so the binary can pick
    /// the provider.
    pub async fn from_config(
        service_config: &ServiceConfig,
        completion_service: CompletionService,
    ) -> Result<Self> {
        service_config.validate()?;

        let products = service_config.connect_products().await?;
        Ok(Self::new(
            products,
            completion_service,
            service_config.missing_product_policy,
        ))
    }
}

macro_rules! impl_di {
    ($($f:ident: $t:ty),+) => {$(
        impl axum::extract::FromRef<ServiceState> for $t {
            fn from_ref(state: &ServiceState) -> Self {
                state.$f.clone()
            }
        }
    )+};
}

// External services:
impl_di!(products: ProductLookup);
impl_di!(completion: CompletionService);

// Internal services:
impl_di!(composer: ContextComposer);

#[cfg(test)]
mod tests {
    use axum::extract::FromRef;
    use shopchat_core::{MemoryStore, MockProvider};

    use super::*;

    #[tokio::test]
    async fn composer_shares_services() -> anyhow::Result<()> {
        let store = MemoryStore::new().with_document(
            "products",
            "p1",
            serde_json::json!({"name": "Shirt"}),
        );
        let provider = MockProvider::with_reply("ok");
        let state = ServiceState::new(
            ProductLookup::new(store),
            provider.clone().into_service(),
            MissingProductPolicy::Reject,
        );

        let composer = ContextComposer::from_ref(&state);
        assert_eq!(composer.policy(), MissingProductPolicy::Reject);

        let reply = composer.chat_with_product("Hi", "p1").await?;
        assert_eq!(reply, "ok");
        assert_eq!(provider.prompts().len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn from_config_rejects_invalid_config() {
        let config = ServiceConfig {
            upstream_timeout: 0,
            ..Default::default()
        };

        let completion = MockProvider::default().into_service();
        assert!(ServiceState::from_config(&config, completion).await.is_err());
    }
}
