//! Firestore client module.
//!
//! This module provides the client that reads product documents, its
//! configuration and the service-account credentials it authenticates with.

mod credentials;
mod firestore_client;
mod firestore_config;
mod token;

pub use credentials::{FirestoreCredentials, ServiceAccount};
pub use firestore_client::FirestoreClient;
pub use firestore_config::{FirestoreBuilder, FirestoreConfig};
