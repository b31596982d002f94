//! Test harness infrastructure for engine testing.
//!
//! [`TestContext`] wires a [`LifecycleEngine`] to a fresh [`MemoryStore`] and
//! captures every lifecycle event line. [`FailingStore`] wraps a memory store
//! and injects store failures on demand.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;

use docket_lifecycle::backends::MemoryStore;
use docket_lifecycle::core::{DocumentStore, WriteConcern};
use docket_lifecycle::engine::LifecycleEngine;
use docket_lifecycle::error::{BackendError, ResourceError, StorageResult};
use docket_lifecycle::query::Filter;
use docket_lifecycle::registry::Registry;

/// An engine over a memory store, with captured event lines.
pub struct TestContext {
    pub engine: LifecycleEngine,
    pub store: Arc<MemoryStore>,
    pub events: Arc<Mutex<Vec<String>>>,
}

impl TestContext {
    /// Creates a context with an unconfigured registry.
    pub fn new() -> Self {
        Self::with(|_| {})
    }

    /// Creates a context after letting `configure` set up the registry.
    pub fn with(configure: impl FnOnce(&mut Registry)) -> Self {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);

        let mut registry = Registry::new();
        registry.set_log_sink(move |line: &str| sink.lock().push(line.to_string()));
        configure(&mut registry);

        let store = Arc::new(MemoryStore::new());
        let engine = LifecycleEngine::new(registry, store.clone());
        Self {
            engine,
            store,
            events,
        }
    }

    /// Returns the captured event lines.
    pub fn events(&self) -> Vec<String> {
        self.events.lock().clone()
    }

    /// Returns the captured event lines starting with `prefix`.
    pub fn events_starting_with(&self, prefix: &str) -> Vec<String> {
        self.events
            .lock()
            .iter()
            .filter(|line| line.starts_with(prefix))
            .cloned()
            .collect()
    }

    /// Returns the number of documents written to the store so far.
    pub fn writes(&self) -> u64 {
        self.store.stats().writes
    }
}

/// A [`DocumentStore`] that fails on demand.
#[derive(Default)]
pub struct FailingStore {
    inner: MemoryStore,
    fail_reads: AtomicBool,
    fail_deletes: AtomicBool,
    strip_ids: AtomicBool,
    drop_not_found: AtomicBool,
    /// Number of writes allowed before writes start failing.
    write_budget: AtomicUsize,
    budgeted: AtomicBool,
}

impl FailingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails every write from now on.
    pub fn fail_writes(&self) {
        self.fail_writes_after(0);
    }

    /// Lets `writes` more writes through, then fails the rest.
    pub fn fail_writes_after(&self, writes: usize) {
        self.write_budget.store(writes, Ordering::SeqCst);
        self.budgeted.store(true, Ordering::SeqCst);
    }

    pub fn fail_reads(&self) {
        self.fail_reads.store(true, Ordering::SeqCst);
    }

    pub fn fail_deletes(&self) {
        self.fail_deletes.store(true, Ordering::SeqCst);
    }

    /// Acknowledges writes but returns documents without an identifier.
    pub fn strip_ids(&self) {
        self.strip_ids.store(true, Ordering::SeqCst);
    }

    /// Reports every dropped collection as missing.
    pub fn drop_not_found(&self) {
        self.drop_not_found.store(true, Ordering::SeqCst);
    }

    /// The wrapped store.
    pub fn inner(&self) -> &MemoryStore {
        &self.inner
    }

    fn unavailable(operation: &str) -> BackendError {
        BackendError::Unavailable {
            backend_name: "failing".to_string(),
            message: format!("injected {} failure", operation),
        }
    }

    fn take_write(&self) -> bool {
        if !self.budgeted.load(Ordering::SeqCst) {
            return true;
        }
        self.write_budget
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok()
    }
}

#[async_trait]
impl DocumentStore for FailingStore {
    fn backend_name(&self) -> &'static str {
        "failing"
    }

    async fn find_all(&self, collection: &str, filter: &Filter) -> StorageResult<Vec<Value>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(Self::unavailable("read").into());
        }
        self.inner.find_all(collection, filter).await
    }

    async fn save(
        &self,
        collection: &str,
        document: Value,
        concern: WriteConcern,
    ) -> StorageResult<Value> {
        if !self.take_write() {
            return Err(Self::unavailable("write").into());
        }
        let mut stored = self.inner.save(collection, document, concern).await?;
        if self.strip_ids.load(Ordering::SeqCst) {
            if let Value::Object(map) = &mut stored {
                map.remove("id");
            }
        }
        Ok(stored)
    }

    async fn delete(&self, collection: &str, id: &str) -> StorageResult<()> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(Self::unavailable("delete").into());
        }
        self.inner.delete(collection, id).await
    }

    async fn delete_many(&self, collection: &str, filter: &Filter) -> StorageResult<u64> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(Self::unavailable("delete").into());
        }
        self.inner.delete_many(collection, filter).await
    }

    async fn drop_collection(&self, collection: &str) -> StorageResult<()> {
        if self.drop_not_found.load(Ordering::SeqCst) {
            return Err(ResourceError::CollectionNotFound {
                collection: collection.to_string(),
            }
            .into());
        }
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(Self::unavailable("drop").into());
        }
        self.inner.drop_collection(collection).await
    }
}

/// Creates an engine over a [`FailingStore`], returning both.
pub fn failing_engine(configure: impl FnOnce(&mut Registry)) -> (LifecycleEngine, Arc<FailingStore>) {
    let mut registry = Registry::new();
    configure(&mut registry);
    let store = Arc::new(FailingStore::new());
    let engine = LifecycleEngine::new(registry, store.clone());
    (engine, store)
}
