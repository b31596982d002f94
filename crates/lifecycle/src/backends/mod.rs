//! Document store implementations.
//!
//! # Available Backends
//!
//! | Backend | Description |
//! |---------|-------------|
//! | [`MemoryStore`] | Thread-safe in-memory store, for tests and embedded use |
//!
//! Other stores plug in by implementing
//! [`DocumentStore`](crate::core::DocumentStore).
//!
//! # Example
//!
//! ```
//! use docket_lifecycle::backends::MemoryStore;
//!
//! let store = MemoryStore::new();
//! assert_eq!(store.stats().documents, 0);
//! ```

pub mod memory;

pub use memory::{MemoryStore, MemoryStoreStats};
