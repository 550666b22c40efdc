//! Chat handlers forwarding shopper prompts to the language model.
//!
//! `POST /chat` sends the prompt unchanged. `POST /products/{productId}/chat`
//! first loads the product document and submits the composed prompt.

use aide::axum::ApiRouter;
use aide::transform::TransformOperation;
use axum::extract::State;
use axum::http::StatusCode;
use shopchat_core::{CompletionService, ContextComposer};

use crate::extract::{Json, Path, ValidateJson};
use crate::handler::Result;
use crate::handler::request::{ChatRequest, ProductPathParams};
use crate::handler::response::{ChatResponse, ErrorResponse};
use crate::service::ServiceState;

/// Tracing target for chat operations.
const TRACING_TARGET: &str = "shopchat_server::handler::chat";

/// Forwards a prompt to the model.
#[tracing::instrument(skip_all)]
async fn chat(
    State(completion): State<CompletionService>,
    ValidateJson(request): ValidateJson<ChatRequest>,
) -> Result<(StatusCode, Json<ChatResponse>)> {
    tracing::debug!(
        target: TRACING_TARGET,
        prompt_len = request.prompt.len(),
        "Forwarding prompt"
    );

    let reply = completion.complete(&request.prompt).await?;

    tracing::info!(
        target: TRACING_TARGET,
        reply_len = reply.len(),
        "Chat answered"
    );

    Ok((StatusCode::OK, Json(ChatResponse::new(reply))))
}

fn chat_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Chat")
        .description("Forwards the prompt to the language model and returns its reply.")
        .response::<200, Json<ChatResponse>>()
        .response::<400, Json<ErrorResponse>>()
        .response::<502, Json<ErrorResponse>>()
        .response::<504, Json<ErrorResponse>>()
}

/// Answers a prompt about a single product.
#[tracing::instrument(skip_all, fields(product_id = %path_params.product_id))]
async fn chat_with_product(
    State(composer): State<ContextComposer>,
    Path(path_params): Path<ProductPathParams>,
    ValidateJson(request): ValidateJson<ChatRequest>,
) -> Result<(StatusCode, Json<ChatResponse>)> {
    tracing::debug!(
        target: TRACING_TARGET,
        policy = %composer.policy(),
        "Composing product prompt"
    );

    let reply = composer
        .chat_with_product(&request.prompt, &path_params.product_id)
        .await?;

    tracing::info!(
        target: TRACING_TARGET,
        reply_len = reply.len(),
        "Product chat answered"
    );

    Ok((StatusCode::OK, Json(ChatResponse::new(reply))))
}

fn chat_with_product_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Chat about a product")
        .description(
            "Loads the product document, prepends it to the prompt and returns the \
            model's reply. A missing product is either sent as an empty record or \
            rejected with 404, depending on the server configuration.",
        )
        .response::<200, Json<ChatResponse>>()
        .response::<400, Json<ErrorResponse>>()
        .response::<404, Json<ErrorResponse>>()
        .response::<502, Json<ErrorResponse>>()
        .response::<504, Json<ErrorResponse>>()
}

/// Returns an [`ApiRouter`] with all chat routes.
pub fn routes() -> ApiRouter<ServiceState> {
    use aide::axum::routing::*;

    ApiRouter::new()
        .api_route("/chat", post_with(chat, chat_docs))
        .api_route(
            "/products/{productId}/chat",
            post_with(chat_with_product, chat_with_product_docs),
        )
        .with_path_items(|item| item.tag("Chat"))
}

#[cfg(test)]
mod tests {
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use serde_json::{Value, json};
    use tower::ServiceExt;
    use shopchat_core::{Error as CoreError, MemoryStore, MissingProductPolicy, MockProvider};

    use crate::handler::test::{create_test_router, create_test_server, create_test_state};

    fn shirt_store() -> MemoryStore {
        MemoryStore::new().with_document(
            "products",
            "shirt-1",
            json!({"name": "Shirt", "color": "blue"}),
        )
    }

    #[tokio::test]
    async fn chat_returns_model_reply() -> anyhow::Result<()> {
        let provider = MockProvider::with_reply("hi there");
        let server = create_test_server(create_test_state(
            MemoryStore::new(),
            &provider,
            MissingProductPolicy::PassThrough,
        ))?;

        let response = server.post("/chat").json(&json!({"prompt": "hello"})).await;
        response.assert_status_ok();
        response.assert_json(&json!({"response": "hi there"}));

        assert_eq!(provider.prompts(), vec!["hello".to_owned()]);
        Ok(())
    }

    #[tokio::test]
    async fn chat_rejects_invalid_prompts() -> anyhow::Result<()> {
        let provider = MockProvider::with_reply("unused");
        let server = create_test_server(create_test_state(
            MemoryStore::new(),
            &provider,
            MissingProductPolicy::PassThrough,
        ))?;

        let bodies = [
            json!({}),
            json!({"prompt": 42}),
            json!({"prompt": null}),
            json!({"prompt": "   "}),
            json!({"prompt": ""}),
        ];

        for body in bodies {
            let response = server.post("/chat").json(&body).await;
            response.assert_status(StatusCode::BAD_REQUEST);

            let error: Value = response.json();
            assert_eq!(error["name"], "bad_request", "body: {body}");
        }

        assert!(provider.prompts().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn chat_rejects_malformed_body() -> anyhow::Result<()> {
        let provider = MockProvider::with_reply("unused");
        let server = create_test_server(create_test_state(
            MemoryStore::new(),
            &provider,
            MissingProductPolicy::PassThrough,
        ))?;

        let response = server
            .post("/chat")
            .bytes("{\"prompt\": ".into())
            .content_type("application/json")
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);

        let response = server.post("/chat").text("prompt=hello").await;
        response.assert_status(StatusCode::BAD_REQUEST);

        assert!(provider.prompts().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn chat_maps_model_failures() -> anyhow::Result<()> {
        let cases = [
            (CoreError::external_error(), StatusCode::BAD_GATEWAY),
            (CoreError::network_error(), StatusCode::BAD_GATEWAY),
            (CoreError::timeout(), StatusCode::GATEWAY_TIMEOUT),
            (CoreError::configuration(), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (error, status) in cases {
            let provider = MockProvider::failing(error);
            let server = create_test_server(create_test_state(
                MemoryStore::new(),
                &provider,
                MissingProductPolicy::PassThrough,
            ))?;

            let response = server.post("/chat").json(&json!({"prompt": "hello"})).await;
            response.assert_status(status);
        }

        Ok(())
    }

    #[tokio::test]
    async fn product_chat_submits_composed_prompt() -> anyhow::Result<()> {
        let provider = MockProvider::with_reply("It is blue.");
        let server = create_test_server(create_test_state(
            shirt_store(),
            &provider,
            MissingProductPolicy::PassThrough,
        ))?;

        let response = server
            .post("/products/shirt-1/chat")
            .json(&json!({"prompt": "What color?"}))
            .await;
        response.assert_status_ok();
        response.assert_json(&json!({"response": "It is blue."}));

        assert_eq!(
            provider.prompts(),
            vec![
                "User asked: What color?\nProduct info: {'name': 'Shirt', 'color': 'blue'}\nRespond accordingly:"
                    .to_owned()
            ]
        );
        Ok(())
    }

    #[tokio::test]
    async fn product_chat_passes_missing_product_through() -> anyhow::Result<()> {
        let provider = MockProvider::with_reply("No idea.");
        let server = create_test_server(create_test_state(
            shirt_store(),
            &provider,
            MissingProductPolicy::PassThrough,
        ))?;

        let response = server
            .post("/products/unknown/chat")
            .json(&json!({"prompt": "Is it in stock?"}))
            .await;
        response.assert_status_ok();

        assert_eq!(
            provider.prompts(),
            vec![
                "User asked: Is it in stock?\nProduct info: {}\nRespond accordingly:".to_owned()
            ]
        );
        Ok(())
    }

    #[tokio::test]
    async fn product_chat_rejects_missing_product() -> anyhow::Result<()> {
        let provider = MockProvider::with_reply("unused");
        let server = create_test_server(create_test_state(
            shirt_store(),
            &provider,
            MissingProductPolicy::Reject,
        ))?;

        let response = server
            .post("/products/unknown/chat")
            .json(&json!({"prompt": "Is it in stock?"}))
            .await;
        response.assert_status_not_found();

        let error: Value = response.json();
        assert_eq!(error["name"], "not_found");
        assert_eq!(error["resource"], "product");
        assert!(provider.prompts().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn product_chat_fails_when_store_is_unavailable() -> anyhow::Result<()> {
        let provider = MockProvider::with_reply("unused");
        let server = create_test_server(create_test_state(
            MemoryStore::unavailable(),
            &provider,
            MissingProductPolicy::PassThrough,
        ))?;

        let response = server
            .post("/products/shirt-1/chat")
            .json(&json!({"prompt": "What color?"}))
            .await;
        response.assert_status(StatusCode::BAD_GATEWAY);

        let error: Value = response.json();
        assert_eq!(error["name"], "bad_gateway");
        assert!(provider.prompts().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn product_chat_rejects_dot_ids() -> anyhow::Result<()> {
        let provider = MockProvider::with_reply("unused");
        let store = shirt_store().with_document("products", "..", json!({"name": "hidden"}));
        let state = create_test_state(store, &provider, MissingProductPolicy::PassThrough);

        // Sent as raw request targets, so the encoded dots reach the router.
        for target in ["/products/%2E/chat", "/products/%2E%2E/chat"] {
            let request = Request::post(target)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"prompt": "What is this?"}"#))?;
            let response = create_test_router(state.clone()).oneshot(request).await?;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "target: {target}");

            let body = to_bytes(response.into_body(), usize::MAX).await?;
            let error: Value = serde_json::from_slice(&body)?;
            assert_eq!(error["name"], "bad_request");
        }

        assert!(provider.prompts().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn product_chat_validates_prompt_before_lookup() -> anyhow::Result<()> {
        let provider = MockProvider::with_reply("unused");
        let server = create_test_server(create_test_state(
            MemoryStore::unavailable(),
            &provider,
            MissingProductPolicy::PassThrough,
        ))?;

        let response = server
            .post("/products/shirt-1/chat")
            .json(&json!({"prompt": " "}))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        Ok(())
    }
}
