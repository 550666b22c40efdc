//! Request extractors with improved error handling and validation.
//!
//! Drop-in replacements for their `axum` counterparts whose rejections are
//! handler [`Error`]s, so malformed input is answered with the same JSON
//! error body as every other failure.
//!
//! - [`Json`] - JSON deserialization with descriptive rejections
//! - [`ValidateJson`] - JSON extraction followed by `validator` checks
//! - [`Path`] - Path parameter extraction with descriptive rejections
//!
//! [`Error`]: crate::handler::Error

mod reject;

pub use crate::extract::reject::{Json, Path, ValidateJson};
