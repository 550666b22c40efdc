#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod config;
mod server;

use std::process;

use anyhow::Context;
use axum::Router;
use shopchat_server::handler::routes;
use shopchat_server::middleware::{
    RouterObservabilityExt, RouterOpenApiExt, RouterRecoveryExt, RouterSecurityExt,
};
use shopchat_server::service::ServiceState;

use crate::config::{Cli, MiddlewareConfig, create_completion_service};

// Tracing target constants
pub const TRACING_TARGET_SERVER_STARTUP: &str = "shopchat_cli::server::startup";
pub const TRACING_TARGET_SERVER_SHUTDOWN: &str = "shopchat_cli::server::shutdown";
pub const TRACING_TARGET_CONFIG: &str = "shopchat_cli::config";

#[tokio::main]
async fn main() {
    let Err(error) = run().await else {
        tracing::info!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            "Application terminated successfully"
        );
        process::exit(0);
    };

    if tracing::enabled!(tracing::Level::ERROR) {
        tracing::error!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            error = format!("{error:#}"),
            "Application terminated with error"
        );
    } else {
        eprintln!("Error: {error:#}");
    }

    process::exit(1);
}

/// Main application entry point.
async fn run() -> anyhow::Result<()> {
    let cli = Cli::init();
    Cli::init_tracing();

    cli.validate()?;
    cli.log();

    let completion =
        create_completion_service(&cli).context("failed to create completion service")?;
    let state = ServiceState::from_config(&cli.service, completion)
        .await
        .context("failed to create service state")?;
    let router = create_router(state, &cli.middleware);

    server::serve(router, cli.server).await?;

    Ok(())
}

/// Creates the router with all middleware layers applied.
///
/// Middleware is applied in reverse order (last added = outermost):
/// 1. Recovery (outermost) - catches panics and enforces timeouts
/// 2. Observability - request IDs and tracing spans
/// 3. Security - CORS, security headers, body limit, compression
/// 4. Routes (innermost) - actual request handlers
fn create_router(state: ServiceState, middleware: &MiddlewareConfig) -> Router {
    routes()
        .with_open_api(middleware.openapi.clone())
        .with_state(state)
        .with_security(&middleware.cors)
        .with_observability()
        .with_recovery(&middleware.recovery)
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::json;
    use shopchat_core::{MemoryStore, MissingProductPolicy, MockProvider, ProductLookup};
    use shopchat_server::middleware::{CorsConfig, OpenApiConfig, RecoveryConfig};

    use super::*;

    fn middleware() -> MiddlewareConfig {
        MiddlewareConfig {
            cors: CorsConfig::default(),
            openapi: OpenApiConfig::default(),
            recovery: RecoveryConfig::default(),
        }
    }

    fn server(provider: &MockProvider) -> anyhow::Result<TestServer> {
        let state = ServiceState::new(
            ProductLookup::new(MemoryStore::new()),
            provider.clone().into_service(),
            MissingProductPolicy::PassThrough,
        );

        TestServer::new(create_router(state, &middleware()))
    }

    #[tokio::test]
    async fn serves_chat_through_middleware() -> anyhow::Result<()> {
        let provider = MockProvider::with_reply("hi there");
        let server = server(&provider)?;

        let response = server.post("/chat").json(&json!({"prompt": "hello"})).await;
        response.assert_status_ok();
        response.assert_json(&json!({"response": "hi there"}));

        assert!(response.headers().contains_key("x-request-id"));
        assert_eq!(response.headers()["x-content-type-options"], "nosniff");
        Ok(())
    }

    #[tokio::test]
    async fn oversized_body_is_rejected() -> anyhow::Result<()> {
        let provider = MockProvider::with_reply("unused");
        let server = server(&provider)?;

        let prompt = "a".repeat(shopchat_server::middleware::MAX_BODY_SIZE + 1);
        let response = server.post("/chat").json(&json!({"prompt": prompt})).await;
        response.assert_status(StatusCode::BAD_REQUEST);

        assert!(provider.prompts().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn serves_openapi_document() -> anyhow::Result<()> {
        let provider = MockProvider::default();
        let server = server(&provider)?;

        server.get("/api/openapi.json").await.assert_status_ok();
        Ok(())
    }
}
