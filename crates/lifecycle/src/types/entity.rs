//! Entity model types.
//!
//! This module defines the [`Entity`] trait every persisted type implements and
//! the [`EntityMetadata`] block carrying the lifecycle fields the engine owns.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::registry::CapabilitySet;
use crate::validation::{Validate, ValidationDetail};

/// Serialized names of the engine-owned fields.
///
/// These are the keys under which [`EntityMetadata`] appears in a stored
/// document, and the field names used when composing filters.
pub mod fields {
    /// Store-assigned identifier.
    pub const ID: &str = "id";
    /// First successful save.
    pub const DATE_CREATED: &str = "dateCreated";
    /// Most recent successful save.
    pub const DATE_UPDATED: &str = "dateUpdated";
    /// Soft-delete marker.
    pub const IS_DELETED: &str = "isDeleted";
    /// Soft-delete timestamp.
    pub const DATE_DELETED: &str = "dateDeleted";
    /// Version marker.
    pub const IS_VERSION: &str = "isVersion";
    /// Version creation timestamp.
    pub const DATE_VERSIONED: &str = "dateVersioned";
    /// Back-reference from a version to its source.
    pub const VERSION_OF_ID: &str = "versionOfId";
    /// Audited user.
    pub const UPDATED_BY: &str = "updatedBy";
}

/// Lifecycle metadata embedded in every entity.
///
/// All fields are owned by the engine and exposed read-only. Embed it in an
/// entity with `#[serde(flatten)]` so the fields sit at the top level of the
/// stored document:
///
/// ```
/// use docket_lifecycle::types::EntityMetadata;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Debug, Clone, Serialize, Deserialize)]
/// struct Widget {
///     #[serde(flatten)]
///     meta: EntityMetadata,
///     name: String,
/// }
///
/// let widget = Widget { meta: EntityMetadata::default(), name: "A".into() };
/// let doc = serde_json::to_value(&widget).unwrap();
/// assert!(doc.get("id").is_none());
/// assert_eq!(doc["isDeleted"], false);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityMetadata {
    /// Store-assigned identifier; absent on a transient instance.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,

    /// When the entity was first saved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    date_created: Option<DateTime<Utc>>,

    /// When the entity was last saved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    date_updated: Option<DateTime<Utc>>,

    #[serde(default)]
    is_deleted: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    date_deleted: Option<DateTime<Utc>>,

    #[serde(default)]
    is_version: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    date_versioned: Option<DateTime<Utc>>,

    /// Identifier of the entity this version was taken from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    version_of_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    updated_by: Option<String>,

    /// Validation results of the last save attempt.
    #[serde(skip)]
    errors: Vec<ValidationDetail>,
}

impl EntityMetadata {
    /// Creates metadata for a transient (never saved) entity.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the store-assigned identifier, if the entity has been saved.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Returns `true` if the entity has never been persisted.
    pub fn is_transient(&self) -> bool {
        self.id.as_deref().is_none_or(str::is_empty)
    }

    /// Returns when the entity was first saved.
    pub fn date_created(&self) -> Option<DateTime<Utc>> {
        self.date_created
    }

    /// Returns when the entity was last saved.
    pub fn date_updated(&self) -> Option<DateTime<Utc>> {
        self.date_updated
    }

    /// Returns `true` if the entity has been soft-deleted.
    pub fn is_deleted(&self) -> bool {
        self.is_deleted
    }

    /// Returns when the entity was soft-deleted.
    pub fn date_deleted(&self) -> Option<DateTime<Utc>> {
        self.date_deleted
    }

    /// Returns `true` if this is a version snapshot.
    pub fn is_version(&self) -> bool {
        self.is_version
    }

    /// Returns when this version snapshot was taken.
    pub fn date_versioned(&self) -> Option<DateTime<Utc>> {
        self.date_versioned
    }

    /// Returns the identifier of the source entity of this version.
    pub fn version_of_id(&self) -> Option<&str> {
        self.version_of_id.as_deref()
    }

    /// Returns the user recorded by the last audited save.
    pub fn updated_by(&self) -> Option<&str> {
        self.updated_by.as_deref()
    }

    /// Returns the validation errors of the last save attempt.
    pub fn errors(&self) -> &[ValidationDetail] {
        &self.errors
    }

    /// Returns `true` if the last save attempt failed validation.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub(crate) fn set_id(&mut self, id: String) {
        self.id = Some(id);
    }

    pub(crate) fn set_errors(&mut self, errors: Vec<ValidationDetail>) {
        self.errors = errors;
    }

    pub(crate) fn set_updated_by(&mut self, user: String) {
        self.updated_by = Some(user);
    }

    /// Stamps a save: `dateCreated` once, `dateUpdated` always.
    pub(crate) fn touch(&mut self, now: DateTime<Utc>) {
        if self.date_created.is_none() {
            self.date_created = Some(now);
        }
        self.date_updated = Some(now);
    }

    pub(crate) fn mark_deleted(&mut self, now: DateTime<Utc>) {
        self.is_deleted = true;
        self.date_deleted = Some(now);
        self.date_updated = Some(now);
    }

    /// Turns a copy of a persisted entity into a version of `source_id`.
    ///
    /// The identifier is cleared so the store assigns a fresh one.
    pub(crate) fn make_version_of(&mut self, source_id: String, now: DateTime<Utc>) {
        self.id = None;
        self.is_version = true;
        self.version_of_id = Some(source_id);
        self.date_versioned = Some(now);
        self.date_updated = Some(now);
        self.errors.clear();
    }
}

/// A persisted entity type.
///
/// Implementors embed an [`EntityMetadata`] and expose it through
/// [`metadata`](Entity::metadata) and [`metadata_mut`](Entity::metadata_mut).
/// [`TYPE_NAME`](Entity::TYPE_NAME) names the store collection and appears in
/// every log event about the type.
///
/// Capabilities are declared in [`capabilities`](Entity::capabilities); each
/// declaration requires a matching [`Implements`](crate::registry::Implements)
/// impl, so capability-scoped hooks only ever reach types that statically
/// provide the capability.
///
/// # Example
///
/// ```
/// use docket_lifecycle::types::{Entity, EntityMetadata};
/// use docket_lifecycle::validation::{Validate, Validator};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Debug, Clone, Serialize, Deserialize)]
/// struct Widget {
///     #[serde(flatten)]
///     meta: EntityMetadata,
///     name: String,
/// }
///
/// impl Validate for Widget {
///     fn validate(&self, v: &mut Validator) {
///         v.required("name", &self.name);
///     }
/// }
///
/// impl Entity for Widget {
///     const TYPE_NAME: &'static str = "Widget";
///
///     fn metadata(&self) -> &EntityMetadata {
///         &self.meta
///     }
///
///     fn metadata_mut(&mut self) -> &mut EntityMetadata {
///         &mut self.meta
///     }
/// }
/// ```
pub trait Entity: Validate + Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// The entity type name, used as the collection name.
    const TYPE_NAME: &'static str;

    /// Returns the lifecycle metadata.
    fn metadata(&self) -> &EntityMetadata;

    /// Returns the lifecycle metadata mutably.
    fn metadata_mut(&mut self) -> &mut EntityMetadata;

    /// Declares the capabilities this type provides.
    fn capabilities(_set: &mut CapabilitySet<Self>) {}

    /// Returns the store-assigned identifier.
    fn id(&self) -> Option<&str> {
        self.metadata().id()
    }

    /// Returns the validation errors of the last save attempt.
    fn errors(&self) -> &[ValidationDetail] {
        self.metadata().errors()
    }
}
