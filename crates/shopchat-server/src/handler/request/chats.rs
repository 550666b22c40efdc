//! Chat request types.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::validations::validate_not_blank;

/// Request payload for a chat prompt.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Validate)]
pub struct ChatRequest {
    /// Question or instruction forwarded to the model.
    #[validate(custom(function = "validate_not_blank"))]
    pub prompt: String,
}
