//! Save pipeline.

use chrono::Utc;
use serde_json::Value;

use super::{LifecycleEngine, SaveOutcome, SkipReason};
use crate::behavior::{BehaviorDispatcher, HookPoint};
use crate::core::{DocumentStore, WriteConcern};
use crate::error::{ResourceError, StorageResult};
use crate::events::{LifecycleOperation, LogEvent};
use crate::types::{fields, Entity};
use crate::validation;

impl LifecycleEngine {
    /// Saves `entity`, inserting it if transient and replacing it otherwise.
    ///
    /// The pipeline is:
    ///
    /// 1. skip soft-deleted entities (soft delete enabled)
    /// 2. skip version snapshots (versioning enabled)
    /// 3. run before-save hooks; any `false` skips the save
    /// 4. validate; errors are stored on the entity and skip the save
    /// 5. stamp `dateCreated`/`dateUpdated`, and `updatedBy` when auditing
    /// 6. write, copying the store-assigned identifier back
    /// 7. write a version snapshot (versioning enabled)
    /// 8. run after-save hooks
    ///
    /// Skips are reported through [`SaveOutcome::Skipped`]; only store
    /// failures are errors. A failed write leaves the timestamps stamped in
    /// step 5 on the entity.
    pub async fn save<T: Entity>(&self, entity: &mut T) -> StorageResult<SaveOutcome> {
        let config = self.registry.resolve::<T>();

        if config.soft_delete_enabled() && entity.metadata().is_deleted() {
            tracing::debug!(
                entity_type = T::TYPE_NAME,
                id = entity.id(),
                "save skipped: entity is deleted"
            );
            return Ok(SaveOutcome::Skipped(SkipReason::Deleted));
        }

        if config.versioning_enabled() && entity.metadata().is_version() {
            tracing::debug!(
                entity_type = T::TYPE_NAME,
                id = entity.id(),
                "save skipped: entity is a version"
            );
            return Ok(SaveOutcome::Skipped(SkipReason::Version));
        }

        let dispatcher = BehaviorDispatcher::new(self.registry.global(), config.capabilities());
        if !dispatcher.run_before(HookPoint::BeforeSave, config.before_save_hooks(), entity) {
            tracing::debug!(
                entity_type = T::TYPE_NAME,
                id = entity.id(),
                "save rejected by before-save hook"
            );
            return Ok(SaveOutcome::Skipped(SkipReason::Rejected));
        }

        let errors = validation::validate(&*entity);
        let invalid = !errors.is_empty();
        if invalid {
            tracing::debug!(
                entity_type = T::TYPE_NAME,
                id = entity.id(),
                errors = errors.len(),
                "save skipped: validation failed"
            );
        }
        entity.metadata_mut().set_errors(errors);
        if invalid {
            return Ok(SaveOutcome::Skipped(SkipReason::Invalid));
        }

        let now = Utc::now();
        entity.metadata_mut().touch(now);
        if config.user_auditing_enabled() {
            if let Some(user) = self
                .registry
                .global()
                .user_provider()
                .and_then(|provider| provider.current_user())
            {
                entity.metadata_mut().set_updated_by(user);
            }
        }

        let store = self.store_for::<T>()?;
        let id = write(store, entity).await?;

        let mut version_id = None;
        if config.versioning_enabled() {
            let mut version = entity.clone();
            version.metadata_mut().make_version_of(id.clone(), Utc::now());
            let snapshot_id = write(store, &mut version).await?;
            self.emit(
                LogEvent::new(LifecycleOperation::Version, T::TYPE_NAME)
                    .with_id(snapshot_id.as_str())
                    .with_id(id.as_str()),
            );
            version_id = Some(snapshot_id);
        }

        dispatcher.run_after(HookPoint::AfterSave, config.after_save_hooks(), entity);

        self.emit(LogEvent::new(LifecycleOperation::Save, T::TYPE_NAME).with_id(id.as_str()));
        Ok(SaveOutcome::Persisted { id, version_id })
    }
}

/// Writes `entity` with an acknowledged write and copies the stored
/// identifier back onto it.
pub(super) async fn write<T: Entity>(store: &dyn DocumentStore, entity: &mut T) -> StorageResult<String> {
    let document = serde_json::to_value(&*entity)?;
    let stored = store
        .save(T::TYPE_NAME, document, WriteConcern::Acknowledged)
        .await?;

    let id = stored
        .get(fields::ID)
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ResourceError::MissingId {
            collection: T::TYPE_NAME.to_string(),
        })?
        .to_string();

    entity.metadata_mut().set_id(id.clone());
    Ok(id)
}
