//! Docket persistence lifecycle engine
//!
//! This crate layers a persistence lifecycle on top of a schemaless document
//! store. Entity types opt into lifecycle features through a configuration
//! registry, and every save, delete and query goes through the engine, which
//! applies them uniformly.
//!
//! # Features
//!
//! - **Soft delete**: deletes mark documents instead of removing them, and queries hide them
//! - **Versioning**: every save also writes an immutable snapshot of the entity
//! - **Hooks**: before/after save and delete hooks, per type or per capability
//! - **Validation**: declarative and nested rules, checked before every write
//! - **Auditing**: `dateCreated`, `dateUpdated` and an optional `updatedBy`
//! - **Query behaviours**: filters added to every query of a type or capability
//!
//! # Architecture
//!
//! - [`types`] - The [`Entity`] trait, lifecycle metadata and query options
//! - [`registry`] - Global and per-type configuration, capabilities
//! - [`validation`] - Validation rules and the validator
//! - [`behavior`] - Hook types and the hook dispatcher
//! - [`query`] - Filters and query composition
//! - [`core`] - The [`DocumentStore`] trait and store routing
//! - [`backends`] - Store implementations
//! - [`engine`] - The [`LifecycleEngine`] itself
//! - [`events`], [`providers`] - Lifecycle events, user and log providers
//! - [`config`] - Deployment settings and logging setup
//! - [`error`] - Error types for all operations
//!
//! # Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use docket_lifecycle::backends::MemoryStore;
//! use docket_lifecycle::engine::{LifecycleEngine, SaveOutcome, SkipReason};
//! use docket_lifecycle::registry::Registry;
//! use docket_lifecycle::types::{Entity, EntityMetadata};
//! use docket_lifecycle::validation::{Validate, Validator};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Clone, Serialize, Deserialize)]
//! struct Widget {
//!     #[serde(flatten)]
//!     meta: EntityMetadata,
//!     name: String,
//! }
//!
//! impl Validate for Widget {
//!     fn validate(&self, v: &mut Validator) {
//!         v.required("name", &self.name);
//!     }
//! }
//!
//! impl Entity for Widget {
//!     const TYPE_NAME: &'static str = "Widget";
//!
//!     fn metadata(&self) -> &EntityMetadata {
//!         &self.meta
//!     }
//!
//!     fn metadata_mut(&mut self) -> &mut EntityMetadata {
//!         &mut self.meta
//!     }
//! }
//!
//! # tokio_test::block_on(async {
//! let mut registry = Registry::new();
//! registry.enable_soft_delete::<Widget>();
//! let engine = LifecycleEngine::new(registry, Arc::new(MemoryStore::new()));
//!
//! let mut widget = Widget { meta: EntityMetadata::new(), name: String::new() };
//! let outcome = engine.save(&mut widget).await.unwrap();
//! assert_eq!(outcome, SaveOutcome::Skipped(SkipReason::Invalid));
//! assert_eq!(widget.errors()[0].path, "name");
//!
//! widget.name = "gear".into();
//! assert!(engine.save(&mut widget).await.unwrap().is_persisted());
//!
//! engine.delete(&mut widget).await.unwrap();
//! assert!(engine.all::<Widget>().await.unwrap().is_empty());
//! # });
//! ```
//!
//! # Capabilities
//!
//! Hooks and query behaviours can target a capability trait instead of a
//! concrete type. They then apply to every entity type that declares the
//! capability in [`Entity::capabilities`]:
//!
//! ```
//! use docket_lifecycle::impl_capabilities;
//! use docket_lifecycle::query::Filter;
//! use docket_lifecycle::registry::{CapabilitySet, Registry};
//! # use docket_lifecycle::types::{Entity, EntityMetadata};
//! # use docket_lifecycle::validation::Validate;
//! # use serde::{Deserialize, Serialize};
//!
//! trait Tenanted {
//!     fn tenant(&self) -> &str;
//! }
//!
//! # #[derive(Debug, Clone, Serialize, Deserialize)]
//! # struct Invoice { #[serde(flatten)] meta: EntityMetadata, tenant: String }
//! # impl Validate for Invoice {}
//! impl Tenanted for Invoice {
//!     fn tenant(&self) -> &str {
//!         &self.tenant
//!     }
//! }
//! impl_capabilities!(Invoice => dyn Tenanted);
//!
//! impl Entity for Invoice {
//!     const TYPE_NAME: &'static str = "Invoice";
//! #   fn metadata(&self) -> &EntityMetadata { &self.meta }
//! #   fn metadata_mut(&mut self) -> &mut EntityMetadata { &mut self.meta }
//!
//!     fn capabilities(set: &mut CapabilitySet<Self>) {
//!         set.declare::<dyn Tenanted>();
//!     }
//! }
//!
//! let mut registry = Registry::new();
//! registry
//!     .add_capability_before_save::<dyn Tenanted>(|t| !t.tenant().is_empty())
//!     .add_capability_query_behavior::<dyn Tenanted>(Filter::eq("tenant", "acme"));
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod backends;
pub mod behavior;
pub mod config;
pub mod core;
pub mod engine;
pub mod error;
pub mod events;
pub mod providers;
pub mod query;
pub mod registry;
pub mod types;
pub mod validation;

// Re-export commonly used types at crate root
pub use engine::{DeleteOutcome, LifecycleEngine, SaveOutcome, SkipReason};
pub use error::{StorageError, StorageResult};
pub use query::Filter;
pub use registry::{CapabilitySet, GlobalConfig, Implements, Registry, TypeConfig};
pub use types::{Entity, EntityMetadata, QueryOptions};

// Re-export core traits
pub use core::{DocumentStore, StoreRouter, WriteConcern};
pub use validation::{Validate, ValidationDetail, Validator};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
