//! OpenAI-compatible client module.

mod completion;
mod openai_client;
mod openai_config;

pub use openai_client::OpenAiClient;
pub use openai_config::{OpenAiBuilder, OpenAiConfig};
