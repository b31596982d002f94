//! Store routing by locator.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::core::DocumentStore;
use crate::error::{BackendError, StorageResult};

/// Maps store locators to document stores.
///
/// ```
/// use std::sync::Arc;
/// use docket_lifecycle::backends::MemoryStore;
/// use docket_lifecycle::core::StoreRouter;
///
/// let router = StoreRouter::new()
///     .with_store("default", Arc::new(MemoryStore::new()))
///     .with_store("archive", Arc::new(MemoryStore::new()));
/// assert!(router.resolve("archive").is_ok());
/// assert!(router.resolve("missing").is_err());
/// ```
#[derive(Clone, Default)]
pub struct StoreRouter {
    stores: BTreeMap<String, Arc<dyn DocumentStore>>,
}

impl StoreRouter {
    /// Creates an empty router.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a store under `locator`, replacing any previous one.
    pub fn with_store(mut self, locator: impl Into<String>, store: Arc<dyn DocumentStore>) -> Self {
        self.register(locator, store);
        self
    }

    /// Registers a store under `locator`, replacing any previous one.
    pub fn register(&mut self, locator: impl Into<String>, store: Arc<dyn DocumentStore>) {
        self.stores.insert(locator.into(), store);
    }

    /// Returns the store registered under `locator`.
    pub fn resolve(&self, locator: &str) -> StorageResult<&dyn DocumentStore> {
        self.stores
            .get(locator)
            .map(|store| store.as_ref())
            .ok_or_else(|| {
                BackendError::UnknownLocator {
                    locator: locator.to_string(),
                }
                .into()
            })
    }

    /// Returns the registered locators, in sorted order.
    pub fn locators(&self) -> impl Iterator<Item = &str> {
        self.stores.keys().map(String::as_str)
    }

    /// Returns the number of registered stores.
    pub fn len(&self) -> usize {
        self.stores.len()
    }

    /// Returns `true` if no store is registered.
    pub fn is_empty(&self) -> bool {
        self.stores.is_empty()
    }
}

impl fmt::Debug for StoreRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(
                self.stores
                    .iter()
                    .map(|(locator, store)| (locator, store.backend_name())),
            )
            .finish()
    }
}
