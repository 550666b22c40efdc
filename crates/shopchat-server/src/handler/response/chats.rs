//! Chat response types.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Reply of the model to a chat prompt.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ChatResponse {
    /// Text produced by the model, returned verbatim.
    pub response: String,
}

impl ChatResponse {
    /// Creates a new chat response.
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
        }
    }
}
