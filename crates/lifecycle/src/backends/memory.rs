//! In-memory document store.

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;
use uuid::Uuid;

use crate::core::{DocumentStore, WriteConcern};
use crate::error::{BackendError, StorageResult};
use crate::query::Filter;
use crate::types::fields;

/// A thread-safe, in-memory [`DocumentStore`].
///
/// Collections keep documents in insertion order; replacing a document keeps
/// its position. Identifiers are random UUIDs. Nothing is persisted.
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Vec<Value>>>,
    writes: AtomicU64,
    deletes: AtomicU64,
}

/// A snapshot of [`MemoryStore`] counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoryStoreStats {
    /// Documents written (inserts and replacements).
    pub writes: u64,
    /// Documents removed, by `delete` or `delete_many`.
    pub deletes: u64,
    /// Collections currently present.
    pub collections: usize,
    /// Documents currently stored across all collections.
    pub documents: usize,
}

impl Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current counters.
    pub fn stats(&self) -> MemoryStoreStats {
        let collections = self.collections.read();
        MemoryStoreStats {
            writes: self.writes.load(Ordering::Relaxed),
            deletes: self.deletes.load(Ordering::Relaxed),
            collections: collections.len(),
            documents: collections.values().map(Vec::len).sum(),
        }
    }

    /// Returns the number of documents in `collection`, including soft-deleted
    /// and version documents.
    pub fn document_count(&self, collection: &str) -> usize {
        self.collections
            .read()
            .get(collection)
            .map_or(0, Vec::len)
    }

    /// Returns a copy of every document in `collection`, unfiltered.
    pub fn documents(&self, collection: &str) -> Vec<Value> {
        self.collections
            .read()
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }

    /// Returns the names of the collections present, sorted.
    pub fn collection_names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.collections.read().keys().cloned().collect();
        names.sort();
        names
    }
}

fn document_id(document: &Value) -> Option<&str> {
    document
        .get(fields::ID)
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn find_all(&self, collection: &str, filter: &Filter) -> StorageResult<Vec<Value>> {
        let collections = self.collections.read();
        let Some(documents) = collections.get(collection) else {
            return Ok(Vec::new());
        };
        Ok(documents
            .iter()
            .filter(|document| filter.matches(document))
            .cloned()
            .collect())
    }

    async fn count(&self, collection: &str, filter: &Filter) -> StorageResult<u64> {
        let collections = self.collections.read();
        Ok(collections.get(collection).map_or(0, |documents| {
            documents
                .iter()
                .filter(|document| filter.matches(document))
                .count() as u64
        }))
    }

    async fn save(
        &self,
        collection: &str,
        mut document: Value,
        concern: WriteConcern,
    ) -> StorageResult<Value> {
        let Value::Object(map) = &mut document else {
            return Err(BackendError::QueryError {
                message: format!("documents in {} must be JSON objects", collection),
            }
            .into());
        };

        let id = match document_id_in(map) {
            Some(id) => id,
            None => {
                let id = Uuid::new_v4().to_string();
                map.insert(fields::ID.to_string(), Value::String(id.clone()));
                id
            }
        };

        {
            let mut collections = self.collections.write();
            let documents = collections.entry(collection.to_string()).or_default();
            match documents
                .iter_mut()
                .find(|existing| document_id(existing) == Some(id.as_str()))
            {
                Some(existing) => *existing = document.clone(),
                None => documents.push(document.clone()),
            }
        }
        self.writes.fetch_add(1, Ordering::Relaxed);

        tracing::trace!(collection, id = %id, concern = ?concern, "document written");
        Ok(document)
    }

    async fn delete(&self, collection: &str, id: &str) -> StorageResult<()> {
        let removed = {
            let mut collections = self.collections.write();
            match collections.get_mut(collection) {
                Some(documents) => {
                    let before = documents.len();
                    documents.retain(|document| document_id(document) != Some(id));
                    before - documents.len()
                }
                None => 0,
            }
        };
        self.deletes.fetch_add(removed as u64, Ordering::Relaxed);

        tracing::trace!(collection, id, removed, "document deleted");
        Ok(())
    }

    async fn delete_many(&self, collection: &str, filter: &Filter) -> StorageResult<u64> {
        let removed = {
            let mut collections = self.collections.write();
            match collections.get_mut(collection) {
                Some(documents) => {
                    let before = documents.len();
                    documents.retain(|document| !filter.matches(document));
                    (before - documents.len()) as u64
                }
                None => 0,
            }
        };
        self.deletes.fetch_add(removed, Ordering::Relaxed);

        tracing::trace!(collection, removed, filter = %filter, "documents deleted");
        Ok(removed)
    }

    async fn drop_collection(&self, collection: &str) -> StorageResult<()> {
        let dropped = self.collections.write().remove(collection).is_some();
        tracing::trace!(collection, dropped, "collection dropped");
        Ok(())
    }
}

fn document_id_in(map: &serde_json::Map<String, Value>) -> Option<String> {
    map.get(fields::ID)
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
}
