#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Tracing target for client operations.
pub const TRACING_TARGET_CLIENT: &str = "shopchat_firestore::client";

/// Tracing target for authentication operations.
pub const TRACING_TARGET_AUTH: &str = "shopchat_firestore::auth";

mod client;
mod document;
mod error;

pub use crate::client::{
    FirestoreBuilder, FirestoreClient, FirestoreConfig, FirestoreCredentials, ServiceAccount,
};
pub use crate::document::decode_fields;
pub use crate::error::{Error, Result};
