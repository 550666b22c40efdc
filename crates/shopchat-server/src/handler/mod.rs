//! All `axum::`[`Router`]s with related `axum::`[`Handler`]s.
//!
//! # Usage Example
//!
//! ```rust,no_run
//! use axum::Router;
//! use shopchat_core::{MemoryStore, MissingProductPolicy, MockProvider, ProductLookup};
//! use shopchat_server::handler::routes;
//! use shopchat_server::middleware::{OpenApiConfig, RouterOpenApiExt};
//! use shopchat_server::service::ServiceState;
//!
//! let state = ServiceState::new(
//!     ProductLookup::new(MemoryStore::new()),
//!     MockProvider::with_reply("hi there").into_service(),
//!     MissingProductPolicy::PassThrough,
//! );
//!
//! let app: Router = routes()
//!     .with_open_api(OpenApiConfig::default())
//!     .with_state(state);
//! ```
//!
//! [`Router`]: axum::routing::Router
//! [`Handler`]: axum::handler::Handler

mod chats;
mod error;
mod monitors;
mod request;
mod response;

use aide::axum::ApiRouter;
use axum::response::{IntoResponse, Response};

pub use crate::handler::error::{Error, ErrorKind, Result};
pub use crate::handler::request::{ChatRequest, ProductPathParams};
pub use crate::handler::response::{ChatResponse, DependencyStatus, ErrorResponse, MonitorStatus};
use crate::service::ServiceState;

#[inline]
async fn handler() -> Response {
    ErrorKind::NotFound.into_response()
}

/// Returns an [`ApiRouter`] with every route and the not-found fallback.
pub fn routes() -> ApiRouter<ServiceState> {
    ApiRouter::new()
        .merge(chats::routes())
        .merge(monitors::routes())
        .fallback(handler)
}

#[cfg(test)]
pub(crate) mod test {
    use axum::Router;
    use axum_test::TestServer;
    use shopchat_core::{MemoryStore, MissingProductPolicy, MockProvider, ProductLookup};

    use crate::handler::routes;
    use crate::middleware::{OpenApiConfig, RouterOpenApiExt};
    use crate::service::ServiceState;

    /// Builds a state over an in-memory store and a mock model.
    pub fn create_test_state(
        store: MemoryStore,
        provider: &MockProvider,
        policy: MissingProductPolicy,
    ) -> ServiceState {
        ServiceState::new(
            ProductLookup::new(store),
            provider.clone().into_service(),
            policy,
        )
    }

    /// Builds every route, including the OpenAPI document.
    pub fn create_test_router(state: ServiceState) -> Router {
        routes()
            .with_open_api(OpenApiConfig::default())
            .with_state(state)
    }

    /// Serves [`create_test_router`] through a test server.
    pub fn create_test_server(state: ServiceState) -> anyhow::Result<TestServer> {
        TestServer::new(create_test_router(state))
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() -> anyhow::Result<()> {
        let provider = MockProvider::default();
        let server = create_test_server(create_test_state(
            MemoryStore::new(),
            &provider,
            MissingProductPolicy::PassThrough,
        ))?;

        let response = server.get("/missing").await;
        response.assert_status_not_found();

        let body: serde_json::Value = response.json();
        assert_eq!(body["name"], "not_found");
        Ok(())
    }

    #[tokio::test]
    async fn openapi_document_lists_routes() -> anyhow::Result<()> {
        let provider = MockProvider::default();
        let server = create_test_server(create_test_state(
            MemoryStore::new(),
            &provider,
            MissingProductPolicy::PassThrough,
        ))?;

        let response = server.get("/api/openapi.json").await;
        response.assert_status_ok();

        let document: serde_json::Value = response.json();
        assert_eq!(document["info"]["title"], "Shopchat API");
        assert!(document["paths"]["/chat"]["post"].is_object());
        assert!(document["paths"]["/products/{productId}/chat"]["post"].is_object());
        assert!(document["paths"]["/health"]["get"].is_object());
        Ok(())
    }
}
