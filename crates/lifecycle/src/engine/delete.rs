//! Delete pipeline.

use chrono::Utc;

use super::save::write;
use super::{DeleteOutcome, LifecycleEngine};
use crate::behavior::{BehaviorDispatcher, HookPoint};
use crate::error::StorageResult;
use crate::events::{LifecycleOperation, LogEvent};
use crate::query::Filter;
use crate::types::{fields, Entity};

impl LifecycleEngine {
    /// Deletes `entity`.
    ///
    /// With soft delete enabled the entity is marked deleted and written
    /// back. Otherwise it is removed from the store, together with all its
    /// version snapshots when versioning is enabled.
    ///
    /// Unlike [`save`](Self::save), delete applies no entry guard: deleting an
    /// already soft-deleted entity re-stamps `dateDeleted`, and a transient
    /// entity still goes through the hooks. A transient entity under hard
    /// delete has nothing to remove and yields [`DeleteOutcome::Transient`].
    pub async fn delete<T: Entity>(&self, entity: &mut T) -> StorageResult<DeleteOutcome> {
        let config = self.registry.resolve::<T>();
        let dispatcher = BehaviorDispatcher::new(self.registry.global(), config.capabilities());
        if !dispatcher.run_before(HookPoint::BeforeDelete, config.before_delete_hooks(), entity) {
            tracing::debug!(
                entity_type = T::TYPE_NAME,
                id = entity.id(),
                "delete rejected by before-delete hook"
            );
            return Ok(DeleteOutcome::Rejected);
        }

        let store = self.store_for::<T>()?;
        let id = entity
            .id()
            .filter(|id| !id.is_empty())
            .map(str::to_string);
        let outcome = if config.soft_delete_enabled() {
            entity.metadata_mut().mark_deleted(Utc::now());
            let id = write(store, entity).await?;
            self.emit(LogEvent::new(LifecycleOperation::SoftDelete, T::TYPE_NAME).with_id(id));
            DeleteOutcome::SoftDeleted
        } else if let Some(id) = id {
            let mut versions_removed = 0;
            if config.versioning_enabled() {
                let versions = Filter::eq(fields::VERSION_OF_ID, id.as_str())
                    .and(Filter::eq(fields::IS_VERSION, true));
                versions_removed = store.delete_many(T::TYPE_NAME, &versions).await?;
                self.emit(
                    LogEvent::new(LifecycleOperation::Delete, T::TYPE_NAME).with_filter(&versions),
                );
            }
            store.delete(T::TYPE_NAME, &id).await?;
            self.emit(LogEvent::new(LifecycleOperation::Delete, T::TYPE_NAME).with_id(id));
            DeleteOutcome::Removed { versions_removed }
        } else {
            tracing::debug!(entity_type = T::TYPE_NAME, "nothing to remove: entity is transient");
            DeleteOutcome::Transient
        };

        dispatcher.run_after(HookPoint::AfterDelete, config.after_delete_hooks(), entity);
        Ok(outcome)
    }
}
