//! Query options.

/// Controls which lifecycle exclusions a query applies.
///
/// By default list and find queries hide soft-deleted documents (when soft
/// delete is enabled for the type) and version documents (when versioning is
/// enabled).
///
/// ```
/// use docket_lifecycle::types::QueryOptions;
///
/// let options = QueryOptions::new().with_deleted();
/// assert!(options.include_deleted);
/// assert!(!options.include_versions);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueryOptions {
    /// Include soft-deleted documents.
    pub include_deleted: bool,
    /// Include version documents.
    pub include_versions: bool,
}

impl QueryOptions {
    /// Default options: both exclusions applied.
    pub fn new() -> Self {
        Self::default()
    }

    /// Options for point lookups by identifier.
    ///
    /// Soft-deleted documents stay retrievable by identifier; versions do not.
    pub fn point_lookup() -> Self {
        Self {
            include_deleted: true,
            include_versions: false,
        }
    }

    /// Includes soft-deleted documents.
    pub fn with_deleted(mut self) -> Self {
        self.include_deleted = true;
        self
    }

    /// Excludes soft-deleted documents.
    pub fn without_deleted(mut self) -> Self {
        self.include_deleted = false;
        self
    }

    /// Includes version documents.
    pub fn with_versions(mut self) -> Self {
        self.include_versions = true;
        self
    }
}
