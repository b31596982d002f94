//! Document store trait.
//!
//! This module defines the [`DocumentStore`] trait, the engine's only view of
//! persistence. A store holds named collections of schemaless JSON documents
//! and evaluates [`Filter`]s against them.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::StorageResult;
use crate::query::Filter;

/// How much durability a write waits for.
///
/// The engine needs the store-assigned identifier back before it can
/// continue, so every write it issues is acknowledged. Stores must not
/// return from [`DocumentStore::save`] before the document is visible to
/// subsequent reads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[non_exhaustive]
pub enum WriteConcern {
    /// Wait for the store to confirm the write.
    #[default]
    Acknowledged,
}

/// A schemaless document store.
///
/// Documents are JSON objects. The `id` field is the document identifier;
/// a document saved without one is assigned a fresh identifier by the store,
/// and a document saved with one replaces the stored document with the same
/// identifier.
///
/// # Example
///
/// ```ignore
/// use docket_lifecycle::core::{DocumentStore, WriteConcern};
/// use docket_lifecycle::query::Filter;
///
/// async fn example<S: DocumentStore>(store: &S) -> StorageResult<()> {
///     let saved = store
///         .save("Widget", serde_json::json!({ "name": "gear" }), WriteConcern::Acknowledged)
///         .await?;
///     let id = saved["id"].as_str().unwrap();
///
///     let found = store.find_one("Widget", &Filter::by_id(id)).await?;
///     assert!(found.is_some());
///
///     store.delete("Widget", id).await?;
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Returns a human-readable name for this store.
    fn backend_name(&self) -> &'static str;

    /// Returns every document in `collection` matching `filter`, in store order.
    ///
    /// A missing collection yields an empty result.
    async fn find_all(&self, collection: &str, filter: &Filter) -> StorageResult<Vec<Value>>;

    /// Returns the first document matching `filter`.
    async fn find_one(&self, collection: &str, filter: &Filter) -> StorageResult<Option<Value>> {
        Ok(self.find_all(collection, filter).await?.into_iter().next())
    }

    /// Counts the documents matching `filter`.
    async fn count(&self, collection: &str, filter: &Filter) -> StorageResult<u64> {
        Ok(self.find_all(collection, filter).await?.len() as u64)
    }

    /// Inserts or replaces a document and returns it as stored.
    ///
    /// # Returns
    ///
    /// The stored document, including its identifier.
    async fn save(
        &self,
        collection: &str,
        document: Value,
        concern: WriteConcern,
    ) -> StorageResult<Value>;

    /// Removes the document with identifier `id`. Removing a missing document
    /// is not an error.
    async fn delete(&self, collection: &str, id: &str) -> StorageResult<()>;

    /// Removes every document matching `filter` and returns how many were removed.
    async fn delete_many(&self, collection: &str, filter: &Filter) -> StorageResult<u64>;

    /// Drops a whole collection.
    ///
    /// # Errors
    ///
    /// * `ResourceError::CollectionNotFound` - a store may report a missing
    ///   collection; the engine treats this as success
    async fn drop_collection(&self, collection: &str) -> StorageResult<()>;
}
