//! In-memory product store for testing.

use std::collections::HashMap;

use serde_json::Value;

use super::{ProductRecord, ProductStore};
use crate::{Error, Result, ServiceHealth};

/// Product store backed by a map of `(collection, id)` to record.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    documents: HashMap<(String, String), ProductRecord>,
    unavailable: bool,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store whose every fetch fails with a network error.
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    /// Adds a document. Non-object values are stored as an empty record.
    pub fn with_document(
        mut self,
        collection: impl Into<String>,
        document_id: impl Into<String>,
        fields: Value,
    ) -> Self {
        let record = ProductRecord::try_from(fields).unwrap_or_default();
        self.documents
            .insert((collection.into(), document_id.into()), record);
        self
    }
}

#[async_trait::async_trait]
impl ProductStore for MemoryStore {
    async fn fetch(&self, collection: &str, document_id: &str) -> Result<Option<ProductRecord>> {
        if self.unavailable {
            return Err(Error::network_error().with_message("document store is unavailable"));
        }

        let key = (collection.to_owned(), document_id.to_owned());
        Ok(self.documents.get(&key).cloned())
    }

    async fn health_check(&self) -> Result<ServiceHealth> {
        Ok(if self.unavailable {
            ServiceHealth::unhealthy("document store is unavailable")
        } else {
            ServiceHealth::healthy()
        })
    }
}
