//! Product lookup against a document store.
//!
//! [`ProductStore`] is the seam to the remote database: it fetches one
//! document by collection and id. [`ProductLookup`] binds a store to the
//! product collection and turns "document does not exist" into an empty
//! [`ProductRecord`].

#[cfg(any(test, feature = "test-utils"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-utils")))]
mod memory;
mod record;

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

#[cfg(any(test, feature = "test-utils"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-utils")))]
pub use memory::MemoryStore;
pub use record::ProductRecord;

use crate::{Error, Result, ServiceHealth};

/// Tracing target for product lookups.
pub const TRACING_TARGET: &str = "shopchat_core::product";

/// Default collection that holds product documents.
pub const DEFAULT_COLLECTION: &str = "products";

/// A document store addressed by collection name and document id.
#[async_trait::async_trait]
pub trait ProductStore: Send + Sync {
    /// Fetches a single document.
    ///
    /// Returns `Ok(None)` when the document does not exist.
    async fn fetch(&self, collection: &str, document_id: &str) -> Result<Option<ProductRecord>>;

    /// Performs a health check on the store.
    async fn health_check(&self) -> Result<ServiceHealth>;
}

/// Product lookup bound to one collection.
///
/// Cloning is cheap: clones share the same store.
#[derive(Clone)]
pub struct ProductLookup {
    store: Arc<dyn ProductStore>,
    collection: Cow<'static, str>,
}

impl fmt::Debug for ProductLookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProductLookup")
            .field("collection", &self.collection)
            .finish_non_exhaustive()
    }
}

impl ProductLookup {
    /// Creates a lookup over the [`DEFAULT_COLLECTION`].
    pub fn new<S>(store: S) -> Self
    where
        S: ProductStore + 'static,
    {
        Self::from_shared(Arc::new(store))
    }

    /// Creates a lookup over the [`DEFAULT_COLLECTION`] from a shared store.
    pub fn from_shared(store: Arc<dyn ProductStore>) -> Self {
        Self {
            store,
            collection: Cow::Borrowed(DEFAULT_COLLECTION),
        }
    }

    /// Uses `collection` instead of the default one.
    pub fn with_collection(mut self, collection: impl Into<Cow<'static, str>>) -> Self {
        self.collection = collection.into();
        self
    }

    /// Returns the collection this lookup reads from.
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Fetches a product, returning `None` when it does not exist.
    ///
    /// Blank ids and the reserved ids `.` and `..` are invalid input.
    pub async fn find(&self, product_id: &str) -> Result<Option<ProductRecord>> {
        if product_id.trim().is_empty() {
            return Err(Error::invalid_input().with_message("product id must not be empty"));
        }

        // Document paths would resolve these to the collection itself.
        if matches!(product_id, "." | "..") {
            return Err(Error::invalid_input()
                .with_message(format!("product id '{product_id}' is reserved")));
        }

        let record = self.store.fetch(&self.collection, product_id).await;

        match &record {
            Ok(Some(record)) => tracing::debug!(
                target: TRACING_TARGET,
                product_id,
                collection = %self.collection,
                fields = record.len(),
                "Product found"
            ),
            Ok(None) => tracing::debug!(
                target: TRACING_TARGET,
                product_id,
                collection = %self.collection,
                "Product not found"
            ),
            Err(error) => tracing::warn!(
                target: TRACING_TARGET,
                product_id,
                collection = %self.collection,
                error = %error,
                "Product lookup failed"
            ),
        }

        record
    }

    /// Fetches a product's fields, or an empty record when it does not exist.
    pub async fn get(&self, product_id: &str) -> Result<ProductRecord> {
        Ok(self.find(product_id).await?.unwrap_or_default())
    }

    /// Performs a health check on the underlying store.
    pub async fn health_check(&self) -> Result<ServiceHealth> {
        self.store.health_check().await
    }
}
