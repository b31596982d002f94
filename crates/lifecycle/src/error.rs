//! Error types for the lifecycle engine.
//!
//! Only genuine failures are errors here. Gating decisions made by the engine
//! (validation failures, hook rejections, the deleted/version save guards) are
//! reported through [`SaveOutcome`](crate::engine::SaveOutcome) and
//! [`DeleteOutcome`](crate::engine::DeleteOutcome) instead, so callers inspect
//! entity state rather than match on failures for those paths.

// Error enum variant fields are self-documenting via their #[error(...)] messages
#![allow(missing_docs)]

use thiserror::Error;

/// The primary error type for all engine and store operations.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Document or collection state errors
    #[error(transparent)]
    Resource(#[from] ResourceError),

    /// Store-specific errors
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// Configuration errors
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Errors related to document and collection state.
#[derive(Error, Debug)]
pub enum ResourceError {
    /// The collection does not exist.
    #[error("collection not found: {collection}")]
    CollectionNotFound { collection: String },

    /// The store acknowledged a write but returned a document without an `id`.
    #[error("document written to {collection} has no identifier")]
    MissingId { collection: String },
}

/// Errors originating from the document store.
#[derive(Error, Debug)]
pub enum BackendError {
    /// The store is currently unavailable.
    #[error("store unavailable: {backend_name}")]
    Unavailable {
        backend_name: String,
        message: String,
    },

    /// No store is registered under the requested locator.
    #[error("no store registered for locator '{locator}'")]
    UnknownLocator { locator: String },

    /// Internal store error.
    #[error("internal error in {backend_name}: {message}")]
    Internal {
        backend_name: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Query execution error.
    #[error("query execution failed: {message}")]
    QueryError { message: String },

    /// Serialization/deserialization error.
    #[error("serialization error: {message}")]
    SerializationError { message: String },
}

/// Errors related to engine configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Settings failed validation.
    #[error("invalid settings: {}", errors.join("; "))]
    InvalidSettings { errors: Vec<String> },

    /// A per-type store override could not be parsed.
    #[error("invalid store override '{entry}': expected Type=locator")]
    InvalidOverride { entry: String },
}

/// Result type alias for engine and store operations.
pub type StorageResult<T> = Result<T, StorageError>;

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Backend(BackendError::SerializationError {
            message: err.to_string(),
        })
    }
}

impl StorageError {
    /// Returns `true` if this error reports a missing collection.
    pub fn is_collection_not_found(&self) -> bool {
        matches!(
            self,
            StorageError::Resource(ResourceError::CollectionNotFound { .. })
        )
    }
}
