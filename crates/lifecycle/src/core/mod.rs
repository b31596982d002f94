//! Core storage traits and routing.
//!
//! - [`DocumentStore`] - The schemaless document store the engine persists to
//! - [`WriteConcern`] - Durability requested for a write
//! - [`StoreRouter`] - Resolves store locators to stores
//!
//! # Example: Implementing a Store
//!
//! ```ignore
//! use async_trait::async_trait;
//! use docket_lifecycle::core::{DocumentStore, WriteConcern};
//! use docket_lifecycle::error::StorageResult;
//! use docket_lifecycle::query::Filter;
//! use serde_json::Value;
//!
//! struct MyStore { /* ... */ }
//!
//! #[async_trait]
//! impl DocumentStore for MyStore {
//!     fn backend_name(&self) -> &'static str {
//!         "my-store"
//!     }
//!
//!     async fn find_all(&self, collection: &str, filter: &Filter) -> StorageResult<Vec<Value>> {
//!         // Translate the filter to the native query language
//!         todo!()
//!     }
//!
//!     // ... save, delete, delete_many, drop_collection
//! }
//! ```

mod router;
mod store;

pub use router::StoreRouter;
pub use store::{DocumentStore, WriteConcern};
