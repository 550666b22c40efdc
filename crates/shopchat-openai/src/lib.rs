#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Tracing target for client operations.
pub const TRACING_TARGET_CLIENT: &str = "shopchat_openai::client";

mod client;
mod error;

pub use crate::client::{OpenAiBuilder, OpenAiClient, OpenAiConfig};
pub use crate::error::{Error, Result};
