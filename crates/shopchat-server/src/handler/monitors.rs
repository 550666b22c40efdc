//! Health check of the server and its dependencies.

use aide::axum::ApiRouter;
use aide::transform::TransformOperation;
use axum::extract::State;
use axum::http::StatusCode;
use shopchat_core::{CompletionService, ProductLookup, ServiceHealth};

use crate::extract::Json;
use crate::handler::Result;
use crate::handler::response::{DependencyStatus, MonitorStatus};
use crate::service::ServiceState;

/// Tracing target for monitor operations.
const TRACING_TARGET: &str = "shopchat_server::handler::monitors";

/// Turns a failed check into an unhealthy report.
fn dependency_status(
    name: &str,
    health: shopchat_core::Result<ServiceHealth>,
) -> DependencyStatus {
    let health = health.unwrap_or_else(|error| ServiceHealth::unhealthy(error.to_string()));
    DependencyStatus::from_health(name, health)
}

/// Checks the product store and the model endpoint.
#[tracing::instrument(skip_all)]
async fn health_status(
    State(products): State<ProductLookup>,
    State(completion): State<CompletionService>,
) -> Result<(StatusCode, Json<MonitorStatus>)> {
    tracing::debug!(target: TRACING_TARGET, "Health status check requested");

    let (store_health, model_health) =
        futures::join!(products.health_check(), completion.health_check());

    let response = MonitorStatus::from_dependencies(vec![
        dependency_status("productStore", store_health),
        dependency_status("model", model_health),
    ]);

    let status_code = if response.is_healthy() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    tracing::info!(
        target: TRACING_TARGET,
        is_healthy = response.is_healthy(),
        status_code = status_code.as_u16(),
        "Health status response prepared"
    );

    Ok((status_code, Json(response)))
}

fn health_status_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Get system health status")
        .description("Checks the product store and the model endpoint.")
        .response_with::<200, Json<MonitorStatus>, _>(|res| res.description("System is healthy."))
        .response_with::<503, Json<MonitorStatus>, _>(|res| {
            res.description("A dependency is unhealthy.")
        })
}

/// Returns an [`ApiRouter`] with all health monitoring routes.
pub fn routes() -> ApiRouter<ServiceState> {
    use aide::axum::routing::*;

    ApiRouter::new()
        .api_route("/health", get_with(health_status, health_status_docs))
        .with_path_items(|item| item.tag("Monitors"))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use shopchat_core::{Error as CoreError, MemoryStore, MissingProductPolicy, MockProvider};

    use super::*;
    use crate::handler::test::{create_test_server, create_test_state};

    #[tokio::test]
    async fn healthy_dependencies() -> anyhow::Result<()> {
        let provider = MockProvider::default();
        let server = create_test_server(create_test_state(
            MemoryStore::new(),
            &provider,
            MissingProductPolicy::PassThrough,
        ))?;

        let response = server.get("/health").await;
        response.assert_status_ok();

        let status = response.json::<MonitorStatus>();
        assert!(status.is_healthy());
        assert_eq!(status.dependencies.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn unavailable_store_is_reported() -> anyhow::Result<()> {
        let provider = MockProvider::default();
        let server = create_test_server(create_test_state(
            MemoryStore::unavailable(),
            &provider,
            MissingProductPolicy::PassThrough,
        ))?;

        let response = server.get("/health").await;
        response.assert_status(StatusCode::SERVICE_UNAVAILABLE);

        let status = response.json::<MonitorStatus>();
        assert!(!status.is_healthy());

        let store = &status.dependencies[0];
        assert_eq!(store.name, "productStore");
        assert!(store.message.is_some());
        Ok(())
    }

    #[tokio::test]
    async fn failing_model_is_reported() -> anyhow::Result<()> {
        let provider = MockProvider::failing(CoreError::network_error());
        let server = create_test_server(create_test_state(
            MemoryStore::new(),
            &provider,
            MissingProductPolicy::PassThrough,
        ))?;

        let response = server.get("/health").await;
        response.assert_status(StatusCode::SERVICE_UNAVAILABLE);

        let status = response.json::<MonitorStatus>();
        assert_eq!(status.dependencies[1].name, "model");
        Ok(())
    }

    #[test]
    fn failed_check_becomes_unhealthy() {
        let status = dependency_status("model", Err(CoreError::timeout()));
        assert_eq!(status.status, shopchat_core::ServiceStatus::Unhealthy);
        assert!(status.message.is_some());
    }
}
