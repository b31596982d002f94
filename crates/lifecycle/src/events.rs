//! Lifecycle events.

use std::fmt;

/// The operation a [`LogEvent`] describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleOperation {
    /// A composed query (list, find, count, point lookup).
    Query,
    /// A persisted save.
    Save,
    /// A soft delete.
    SoftDelete,
    /// A hard delete.
    Delete,
    /// A version snapshot write.
    Version,
    /// A dropped collection.
    DropCollection,
}

impl fmt::Display for LifecycleOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LifecycleOperation::Query => "query",
            LifecycleOperation::Save => "save",
            LifecycleOperation::SoftDelete => "soft-delete",
            LifecycleOperation::Delete => "delete",
            LifecycleOperation::Version => "version",
            LifecycleOperation::DropCollection => "drop-collection",
        };
        f.write_str(name)
    }
}

/// A structured record of one lifecycle operation.
///
/// ```
/// use docket_lifecycle::events::{LifecycleOperation, LogEvent};
///
/// let event = LogEvent::new(LifecycleOperation::Save, "Widget").with_id("w-1");
/// assert_eq!(event.to_string(), "save Widget ids=[w-1]");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEvent {
    /// What happened.
    pub operation: LifecycleOperation,
    /// The entity type name.
    pub entity_type: &'static str,
    /// Identifiers involved, if any.
    pub ids: Vec<String>,
    /// The rendered filter, for queries and bulk deletes.
    pub filter: Option<String>,
}

impl LogEvent {
    /// Creates an event with no identifiers or filter.
    pub fn new(operation: LifecycleOperation, entity_type: &'static str) -> Self {
        Self {
            operation,
            entity_type,
            ids: Vec::new(),
            filter: None,
        }
    }

    /// Adds an identifier.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.ids.push(id.into());
        self
    }

    /// Sets the rendered filter.
    pub fn with_filter(mut self, filter: impl fmt::Display) -> Self {
        self.filter = Some(filter.to_string());
        self
    }
}

impl fmt::Display for LogEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.operation, self.entity_type)?;
        if !self.ids.is_empty() {
            write!(f, " ids=[{}]", self.ids.join(", "))?;
        }
        if let Some(filter) = &self.filter {
            write!(f, " filter={}", filter)?;
        }
        Ok(())
    }
}
