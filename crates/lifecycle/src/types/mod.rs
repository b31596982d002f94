//! Core types for the lifecycle engine.
//!
//! - [`Entity`] - The trait every persisted type implements
//! - [`EntityMetadata`] - Engine-owned lifecycle fields
//! - [`QueryOptions`] - Soft-delete/version inclusion switches for queries
//!
//! # Examples
//!
//! ```
//! use docket_lifecycle::types::{fields, EntityMetadata, QueryOptions};
//!
//! let meta = EntityMetadata::new();
//! assert!(meta.is_transient());
//!
//! let lookup = QueryOptions::point_lookup();
//! assert!(lookup.include_deleted);
//! assert_eq!(fields::VERSION_OF_ID, "versionOfId");
//! ```

pub mod entity;
pub mod options;

pub use entity::{fields, Entity, EntityMetadata};
pub use options::QueryOptions;
