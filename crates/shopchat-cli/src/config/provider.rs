//! Completion provider selection.

use anyhow::Context;
use shopchat_core::CompletionService;

use super::Cli;

/// Creates the completion service from CLI configuration.
///
/// With the `mock` feature the model is replaced by a fixed reply.
///
/// # Errors
///
/// Returns an error if the model client cannot be initialized.
#[cfg(not(feature = "mock"))]
pub fn create_completion_service(cli: &Cli) -> anyhow::Result<CompletionService> {
    let client = cli
        .service
        .connect_openai()
        .context("failed to create model client")?;
    Ok(client.into_service())
}

/// Creates the mock completion service.
#[cfg(feature = "mock")]
pub fn create_completion_service(cli: &Cli) -> anyhow::Result<CompletionService> {
    tracing::warn!(
        target: crate::TRACING_TARGET_CONFIG,
        reply = ?cli.mock.reply,
        "Using mock model, prompts are not sent to any endpoint"
    );
    Ok(cli.mock.clone().into_service())
}
