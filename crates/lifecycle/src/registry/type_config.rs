//! Per-type configuration.

use std::fmt;
use std::sync::Arc;

use crate::behavior::{AfterHook, BeforeHook};
use crate::query::{Filter, QueryBehavior};
use crate::registry::CapabilitySet;
use crate::types::Entity;

/// Lifecycle configuration for one entity type.
///
/// All flags default to off and all hook lists to empty; an unconfigured
/// type saves, deletes and queries as a plain document.
pub struct TypeConfig<T> {
    soft_delete: bool,
    versioning: bool,
    user_auditing: bool,
    store_locator: Option<String>,
    query_behaviors: Vec<QueryBehavior>,
    before_save: Vec<BeforeHook<T>>,
    after_save: Vec<AfterHook<T>>,
    before_delete: Vec<BeforeHook<T>>,
    after_delete: Vec<AfterHook<T>>,
    capabilities: CapabilitySet<T>,
}

impl<T: Entity> TypeConfig<T> {
    /// Creates the default configuration, with the capabilities `T` declares.
    pub fn new() -> Self {
        let mut capabilities = CapabilitySet::new();
        T::capabilities(&mut capabilities);
        Self {
            soft_delete: false,
            versioning: false,
            user_auditing: false,
            store_locator: None,
            query_behaviors: Vec::new(),
            before_save: Vec::new(),
            after_save: Vec::new(),
            before_delete: Vec::new(),
            after_delete: Vec::new(),
            capabilities,
        }
    }

    /// Turns deletes into soft deletes and hides deleted documents from queries.
    pub fn enable_soft_delete(&mut self) -> &mut Self {
        self.soft_delete = true;
        self
    }

    /// Writes a version snapshot after every save and hides versions from queries.
    pub fn enable_versioning(&mut self) -> &mut Self {
        self.versioning = true;
        self
    }

    /// Records the current user in `updatedBy` on every save.
    pub fn enable_user_auditing(&mut self) -> &mut Self {
        self.user_auditing = true;
        self
    }

    /// Routes this type to the store registered under `locator`.
    pub fn set_store_locator(&mut self, locator: impl Into<String>) -> &mut Self {
        self.store_locator = Some(locator.into());
        self
    }

    /// Adds a filter applied to every list and find query.
    pub fn add_query_behavior(&mut self, filter: Filter) -> &mut Self {
        self.query_behaviors.push(QueryBehavior::fixed(filter));
        self
    }

    /// Adds a filter computed on every list and find query.
    pub fn add_dynamic_query_behavior(
        &mut self,
        source: impl Fn() -> Filter + Send + Sync + 'static,
    ) -> &mut Self {
        self.query_behaviors.push(QueryBehavior::dynamic(source));
        self
    }

    /// Adds a save predicate. Returning `false` vetoes the save.
    pub fn add_before_save_behavior(
        &mut self,
        hook: impl Fn(&mut T) -> bool + Send + Sync + 'static,
    ) -> &mut Self {
        self.before_save.push(Arc::new(hook));
        self
    }

    /// Adds a hook run after every persisted save.
    pub fn add_after_save_behavior(&mut self, hook: impl Fn(&T) + Send + Sync + 'static) -> &mut Self {
        self.after_save.push(Arc::new(hook));
        self
    }

    /// Adds a delete predicate. Returning `false` vetoes the delete.
    pub fn add_before_delete_behavior(
        &mut self,
        hook: impl Fn(&mut T) -> bool + Send + Sync + 'static,
    ) -> &mut Self {
        self.before_delete.push(Arc::new(hook));
        self
    }

    /// Adds a hook run after every completed delete.
    pub fn add_after_delete_behavior(
        &mut self,
        hook: impl Fn(&T) + Send + Sync + 'static,
    ) -> &mut Self {
        self.after_delete.push(Arc::new(hook));
        self
    }
}

impl<T> TypeConfig<T> {
    /// Returns `true` if soft delete is enabled.
    pub fn soft_delete_enabled(&self) -> bool {
        self.soft_delete
    }

    /// Returns `true` if versioning is enabled.
    pub fn versioning_enabled(&self) -> bool {
        self.versioning
    }

    /// Returns `true` if user auditing is enabled.
    pub fn user_auditing_enabled(&self) -> bool {
        self.user_auditing
    }

    /// Returns the store locator override, if set.
    pub fn store_locator(&self) -> Option<&str> {
        self.store_locator.as_deref()
    }

    /// Returns the type's query behaviours.
    pub fn query_behaviors(&self) -> &[QueryBehavior] {
        &self.query_behaviors
    }

    /// Returns the capabilities the type declares.
    pub fn capabilities(&self) -> &CapabilitySet<T> {
        &self.capabilities
    }

    pub(crate) fn before_save_hooks(&self) -> &[BeforeHook<T>] {
        &self.before_save
    }

    pub(crate) fn after_save_hooks(&self) -> &[AfterHook<T>] {
        &self.after_save
    }

    pub(crate) fn before_delete_hooks(&self) -> &[BeforeHook<T>] {
        &self.before_delete
    }

    pub(crate) fn after_delete_hooks(&self) -> &[AfterHook<T>] {
        &self.after_delete
    }
}

impl<T: Entity> Default for TypeConfig<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for TypeConfig<T> {
    fn clone(&self) -> Self {
        Self {
            soft_delete: self.soft_delete,
            versioning: self.versioning,
            user_auditing: self.user_auditing,
            store_locator: self.store_locator.clone(),
            query_behaviors: self.query_behaviors.clone(),
            before_save: self.before_save.clone(),
            after_save: self.after_save.clone(),
            before_delete: self.before_delete.clone(),
            after_delete: self.after_delete.clone(),
            capabilities: self.capabilities.clone(),
        }
    }
}

impl<T> fmt::Debug for TypeConfig<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeConfig")
            .field("soft_delete", &self.soft_delete)
            .field("versioning", &self.versioning)
            .field("user_auditing", &self.user_auditing)
            .field("store_locator", &self.store_locator)
            .field("query_behaviors", &self.query_behaviors.len())
            .field("before_save", &self.before_save.len())
            .field("after_save", &self.after_save.len())
            .field("before_delete", &self.before_delete.len())
            .field("after_delete", &self.after_delete.len())
            .field("capabilities", &self.capabilities)
            .finish()
    }
}
