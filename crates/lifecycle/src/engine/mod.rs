//! The lifecycle engine.
//!
//! [`LifecycleEngine`] orchestrates every persistence operation for entity
//! types: it resolves the type's configuration from the [`Registry`], runs
//! hooks through the [`BehaviorDispatcher`](crate::behavior::BehaviorDispatcher),
//! builds filters with the [`QueryComposer`], and talks to the
//! [`DocumentStore`] the type is routed to.
//!
//! The engine holds no mutable state of its own. It can be shared freely
//! across tasks; concurrent saves of the same entity are last-writer-wins.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use docket_lifecycle::backends::MemoryStore;
//! use docket_lifecycle::engine::{LifecycleEngine, SaveOutcome};
//! use docket_lifecycle::registry::Registry;
//! # use docket_lifecycle::types::{Entity, EntityMetadata};
//! # use docket_lifecycle::validation::Validate;
//! # use serde::{Deserialize, Serialize};
//! # #[derive(Debug, Clone, Serialize, Deserialize)]
//! # struct Widget { #[serde(flatten)] meta: EntityMetadata, name: String }
//! # impl Validate for Widget {}
//! # impl Entity for Widget {
//! #     const TYPE_NAME: &'static str = "Widget";
//! #     fn metadata(&self) -> &EntityMetadata { &self.meta }
//! #     fn metadata_mut(&mut self) -> &mut EntityMetadata { &mut self.meta }
//! # }
//!
//! # tokio_test::block_on(async {
//! let mut registry = Registry::new();
//! registry.enable_versioning::<Widget>();
//! let engine = LifecycleEngine::new(registry, Arc::new(MemoryStore::new()));
//!
//! let mut widget = Widget { meta: EntityMetadata::new(), name: "gear".into() };
//! let outcome = engine.save(&mut widget).await.unwrap();
//! assert!(outcome.is_persisted());
//!
//! let versions = engine.get_versions(&widget).await.unwrap();
//! assert_eq!(versions.len(), 1);
//! # });
//! ```

mod delete;
mod save;

use std::sync::Arc;

use serde_json::Value;

use crate::config::EngineSettings;
use crate::core::{DocumentStore, StoreRouter};
use crate::error::StorageResult;
use crate::events::{LifecycleOperation, LogEvent};
use crate::query::{Filter, QueryComposer};
use crate::registry::Registry;
use crate::types::{fields, Entity, QueryOptions};

/// Why a save did not reach the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The entity is soft-deleted and soft delete is enabled for its type.
    Deleted,
    /// The entity is a version snapshot and versioning is enabled for its type.
    Version,
    /// A before-save hook returned `false`.
    Rejected,
    /// Validation failed; the errors are on the entity's metadata.
    Invalid,
}

/// The result of a [`LifecycleEngine::save`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The entity was written.
    Persisted {
        /// The entity's identifier.
        id: String,
        /// The identifier of the version snapshot, when versioning is enabled.
        version_id: Option<String>,
    },
    /// The save was skipped before any write.
    Skipped(SkipReason),
}

impl SaveOutcome {
    /// Returns `true` if the entity was written.
    pub fn is_persisted(&self) -> bool {
        matches!(self, SaveOutcome::Persisted { .. })
    }

    /// Returns the persisted identifier.
    pub fn id(&self) -> Option<&str> {
        match self {
            SaveOutcome::Persisted { id, .. } => Some(id),
            SaveOutcome::Skipped(_) => None,
        }
    }

    /// Returns the skip reason, if the save was skipped.
    pub fn skip_reason(&self) -> Option<SkipReason> {
        match self {
            SaveOutcome::Persisted { .. } => None,
            SaveOutcome::Skipped(reason) => Some(*reason),
        }
    }
}

/// The result of a [`LifecycleEngine::delete`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The entity was marked deleted and written back.
    SoftDeleted,
    /// The entity was removed, along with its versions when versioning is enabled.
    Removed {
        /// Version documents removed with it.
        versions_removed: u64,
    },
    /// A before-delete hook returned `false`.
    Rejected,
    /// Hard delete of an entity that was never persisted; nothing was removed.
    Transient,
}

impl DeleteOutcome {
    /// Returns `true` if the store was changed.
    pub fn is_deleted(&self) -> bool {
        matches!(
            self,
            DeleteOutcome::SoftDeleted | DeleteOutcome::Removed { .. }
        )
    }
}

/// Orchestrates save, delete and query operations for entity types.
#[derive(Debug, Clone)]
pub struct LifecycleEngine {
    registry: Arc<Registry>,
    stores: StoreRouter,
}

impl LifecycleEngine {
    /// Creates an engine with a single store registered under the
    /// registry's default locator.
    pub fn new(registry: Registry, store: Arc<dyn DocumentStore>) -> Self {
        let locator = registry.global().default_locator().to_string();
        Self::with_router(registry, StoreRouter::new().with_store(locator, store))
    }

    /// Creates an engine over a set of routed stores.
    pub fn with_router(registry: Registry, stores: StoreRouter) -> Self {
        tracing::debug!(
            stores = ?stores.locators().collect::<Vec<_>>(),
            default = registry.global().default_locator(),
            "lifecycle engine created"
        );
        Self {
            registry: Arc::new(registry),
            stores,
        }
    }

    /// Creates an engine from validated settings.
    ///
    /// `configure` registers the entity types before the registry is frozen.
    /// Invalid settings surface as [`StorageError::Config`](crate::error::StorageError::Config);
    /// a default locator with no store in `stores` is an
    /// [`BackendError::UnknownLocator`](crate::error::BackendError::UnknownLocator) error.
    pub fn from_settings(
        settings: &EngineSettings,
        stores: StoreRouter,
        configure: impl FnOnce(&mut Registry),
    ) -> StorageResult<Self> {
        let mut registry = Registry::from_settings(settings)?;
        configure(&mut registry);

        stores.resolve(registry.global().default_locator())?;
        Ok(Self::with_router(registry, stores))
    }

    /// Returns the registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Returns the store router.
    pub fn stores(&self) -> &StoreRouter {
        &self.stores
    }

    /// Returns the store entity type `T` is routed to.
    pub fn store_for<T: Entity>(&self) -> StorageResult<&dyn DocumentStore> {
        self.stores.resolve(self.registry.locator_for::<T>())
    }

    /// Composes the effective filter for a query of `T`.
    pub fn compose_filter<T: Entity>(&self, base: Option<Filter>, options: QueryOptions) -> Filter {
        let config = self.registry.resolve::<T>();
        QueryComposer::new(self.registry.global(), &*config).compose(base, options)
    }

    /// Returns every visible entity of type `T`.
    pub async fn all<T: Entity>(&self) -> StorageResult<Vec<T>> {
        self.all_with(QueryOptions::new()).await
    }

    /// Returns every entity of type `T` visible under `options`.
    pub async fn all_with<T: Entity>(&self, options: QueryOptions) -> StorageResult<Vec<T>> {
        self.query(None, options).await
    }

    /// Returns the visible entities of type `T` matching `filter`.
    pub async fn find<T: Entity>(&self, filter: Filter) -> StorageResult<Vec<T>> {
        self.find_with(filter, QueryOptions::new()).await
    }

    /// Returns the entities of type `T` matching `filter` under `options`.
    pub async fn find_with<T: Entity>(
        &self,
        filter: Filter,
        options: QueryOptions,
    ) -> StorageResult<Vec<T>> {
        self.query(Some(filter), options).await
    }

    /// Returns the first visible entity of type `T` matching `filter`.
    pub async fn find_one<T: Entity>(&self, filter: Filter) -> StorageResult<Option<T>> {
        let filter = self.compose_filter::<T>(Some(filter), QueryOptions::new());
        self.trace_query::<T>(&filter, None);
        let store = self.store_for::<T>()?;
        store
            .find_one(T::TYPE_NAME, &filter)
            .await?
            .map(decode)
            .transpose()
    }

    /// Counts the visible entities of type `T` matching `filter`.
    pub async fn count<T: Entity>(&self, filter: Option<Filter>) -> StorageResult<u64> {
        let filter = self.compose_filter::<T>(filter, QueryOptions::new());
        self.trace_query::<T>(&filter, None);
        self.store_for::<T>()?.count(T::TYPE_NAME, &filter).await
    }

    /// Returns the entity of type `T` with identifier `id`.
    ///
    /// Soft-deleted entities are returned; version snapshots are not. Query
    /// behaviours do not apply to point lookups.
    pub async fn get_by_id<T: Entity>(&self, id: &str) -> StorageResult<Option<T>> {
        self.get_by_id_with(id, QueryOptions::point_lookup()).await
    }

    /// Returns the entity of type `T` with identifier `id` under `options`.
    pub async fn get_by_id_with<T: Entity>(
        &self,
        id: &str,
        options: QueryOptions,
    ) -> StorageResult<Option<T>> {
        let config = self.registry.resolve::<T>();
        let filter = QueryComposer::new(self.registry.global(), &*config).compose_by_id(id, options);
        self.trace_query::<T>(&filter, Some(id));
        let store = self.store_for::<T>()?;
        store
            .find_one(T::TYPE_NAME, &filter)
            .await?
            .map(decode)
            .transpose()
    }

    /// Returns every version snapshot of `entity`, newest first.
    ///
    /// Versions are ordered by `dateUpdated` descending; snapshots with equal
    /// timestamps keep reverse insertion order. A transient entity has no
    /// versions.
    pub async fn get_versions<T: Entity>(&self, entity: &T) -> StorageResult<Vec<T>> {
        let Some(id) = entity.id().filter(|id| !id.is_empty()) else {
            return Ok(Vec::new());
        };

        let filter = Filter::eq(fields::VERSION_OF_ID, id).and(Filter::eq(fields::IS_VERSION, true));
        let options = QueryOptions::new().with_deleted().with_versions();
        let mut versions: Vec<T> = self.query(Some(filter), options).await?;

        versions.reverse();
        versions.sort_by(|a, b| {
            b.metadata()
                .date_updated()
                .cmp(&a.metadata().date_updated())
        });
        Ok(versions)
    }

    /// Drops the collection of entity type `T`, including soft-deleted and
    /// version documents. A missing collection is not an error.
    pub async fn drop_collection<T: Entity>(&self) -> StorageResult<()> {
        let store = self.store_for::<T>()?;
        match store.drop_collection(T::TYPE_NAME).await {
            Ok(()) => {}
            Err(err) if err.is_collection_not_found() => {
                tracing::debug!(entity_type = T::TYPE_NAME, "collection already absent");
            }
            Err(err) => return Err(err),
        }
        self.emit(LogEvent::new(LifecycleOperation::DropCollection, T::TYPE_NAME));
        Ok(())
    }

    async fn query<T: Entity>(
        &self,
        base: Option<Filter>,
        options: QueryOptions,
    ) -> StorageResult<Vec<T>> {
        let filter = self.compose_filter::<T>(base, options);
        self.trace_query::<T>(&filter, None);
        let store = self.store_for::<T>()?;
        store
            .find_all(T::TYPE_NAME, &filter)
            .await?
            .into_iter()
            .map(decode)
            .collect()
    }

    fn trace_query<T: Entity>(&self, filter: &Filter, id: Option<&str>) {
        if !self.registry.global().trace_queries() {
            return;
        }
        let mut event = LogEvent::new(LifecycleOperation::Query, T::TYPE_NAME).with_filter(filter);
        if let Some(id) = id {
            event = event.with_id(id);
        }
        self.emit(event);
    }

    /// Emits a lifecycle event to `tracing` and the configured sink.
    pub(crate) fn emit(&self, event: LogEvent) {
        match event.operation {
            LifecycleOperation::Query => tracing::debug!(
                operation = %event.operation,
                entity_type = event.entity_type,
                ids = ?event.ids,
                filter = event.filter.as_deref(),
                "{}",
                event
            ),
            _ => tracing::info!(
                operation = %event.operation,
                entity_type = event.entity_type,
                ids = ?event.ids,
                filter = event.filter.as_deref(),
                "{}",
                event
            ),
        }

        if let Some(sink) = self.registry.global().log_sink() {
            sink.log(&event.to_string());
        }
    }
}

fn decode<T: Entity>(document: Value) -> StorageResult<T> {
    Ok(serde_json::from_value(document)?)
}
