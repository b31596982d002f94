//! Configuration registry.
//!
//! The [`Registry`] holds one [`GlobalConfig`] and a [`TypeConfig`] per
//! configured entity type. It is built up front with chained `&mut self`
//! calls, then moved into a [`LifecycleEngine`](crate::engine::LifecycleEngine),
//! which only ever reads it. Types that are never configured behave as if
//! configured with all defaults.
//!
//! # Example
//!
//! ```
//! use docket_lifecycle::query::Filter;
//! use docket_lifecycle::registry::Registry;
//! # use docket_lifecycle::types::{Entity, EntityMetadata};
//! # use docket_lifecycle::validation::Validate;
//! # use serde::{Deserialize, Serialize};
//! # #[derive(Debug, Clone, Serialize, Deserialize)]
//! # struct Widget { #[serde(flatten)] meta: EntityMetadata }
//! # impl Validate for Widget {}
//! # impl Entity for Widget {
//! #     const TYPE_NAME: &'static str = "Widget";
//! #     fn metadata(&self) -> &EntityMetadata { &self.meta }
//! #     fn metadata_mut(&mut self) -> &mut EntityMetadata { &mut self.meta }
//! # }
//!
//! let mut registry = Registry::new();
//! registry
//!     .enable_versioning::<Widget>()
//!     .enable_soft_delete::<Widget>()
//!     .add_query_behavior::<Widget>(Filter::eq("archived", false));
//!
//! let config = registry.resolve::<Widget>();
//! assert!(config.versioning_enabled());
//! assert_eq!(config.query_behaviors().len(), 1);
//! ```

mod capability;
mod global;
mod type_config;

pub use capability::{CapabilitySet, Implements};
pub use global::{GlobalConfig, DEFAULT_LOCATOR};
pub use type_config::TypeConfig;

use std::any::{Any, TypeId};
use std::borrow::Cow;
use std::collections::HashMap;

use crate::config::EngineSettings;
use crate::error::ConfigError;
use crate::providers::{LogSink, UserProvider};
use crate::query::Filter;
use crate::types::Entity;

/// Global and per-type lifecycle configuration.
#[derive(Debug, Default)]
pub struct Registry {
    global: GlobalConfig,
    types: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with the given global configuration.
    pub fn with_global(global: GlobalConfig) -> Self {
        Self {
            global,
            types: HashMap::new(),
        }
    }

    /// Creates a registry whose global configuration comes from `settings`.
    pub fn from_settings(settings: &EngineSettings) -> Result<Self, ConfigError> {
        Ok(Self::with_global(GlobalConfig::from_settings(settings)?))
    }

    /// Returns the global configuration.
    pub fn global(&self) -> &GlobalConfig {
        &self.global
    }

    /// Returns the global configuration mutably.
    pub fn global_mut(&mut self) -> &mut GlobalConfig {
        &mut self.global
    }

    /// Returns the configuration of `T` if it has been configured.
    pub fn type_config<T: Entity>(&self) -> Option<&TypeConfig<T>> {
        self.types
            .get(&TypeId::of::<T>())
            .and_then(|config| config.downcast_ref::<TypeConfig<T>>())
    }

    /// Returns the configuration of `T`, creating the default on first use.
    pub fn configure<T: Entity>(&mut self) -> &mut TypeConfig<T> {
        let slot = self
            .types
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(TypeConfig::<T>::new()));
        match slot.downcast_mut::<TypeConfig<T>>() {
            Some(config) => config,
            // Entries are keyed by the TypeId of their own entity type.
            None => unreachable!("type config stored under a foreign TypeId"),
        }
    }

    /// Returns the effective configuration of `T`: the registered one, or
    /// the defaults if `T` was never configured.
    pub fn resolve<T: Entity>(&self) -> Cow<'_, TypeConfig<T>> {
        match self.type_config::<T>() {
            Some(config) => Cow::Borrowed(config),
            None => Cow::Owned(TypeConfig::new()),
        }
    }

    /// Returns the store locator for `T`.
    ///
    /// The type's own locator wins over a global per-type override, which
    /// wins over the default locator.
    pub fn locator_for<T: Entity>(&self) -> &str {
        self.type_config::<T>()
            .and_then(TypeConfig::store_locator)
            .or_else(|| self.global.locator_override(T::TYPE_NAME))
            .unwrap_or_else(|| self.global.default_locator())
    }

    /// Enables soft delete for `T`.
    pub fn enable_soft_delete<T: Entity>(&mut self) -> &mut Self {
        self.configure::<T>().enable_soft_delete();
        self
    }

    /// Enables versioning for `T`.
    pub fn enable_versioning<T: Entity>(&mut self) -> &mut Self {
        self.configure::<T>().enable_versioning();
        self
    }

    /// Enables `updatedBy` auditing for `T`.
    pub fn enable_user_auditing<T: Entity>(&mut self) -> &mut Self {
        self.configure::<T>().enable_user_auditing();
        self
    }

    /// Routes `T` to the store registered under `locator`.
    pub fn set_store_locator<T: Entity>(&mut self, locator: impl Into<String>) -> &mut Self {
        self.configure::<T>().set_store_locator(locator);
        self
    }

    /// Adds a filter to every list and find query of `T`.
    pub fn add_query_behavior<T: Entity>(&mut self, filter: Filter) -> &mut Self {
        self.configure::<T>().add_query_behavior(filter);
        self
    }

    /// Adds a per-query computed filter to every list and find query of `T`.
    pub fn add_dynamic_query_behavior<T: Entity>(
        &mut self,
        source: impl Fn() -> Filter + Send + Sync + 'static,
    ) -> &mut Self {
        self.configure::<T>().add_dynamic_query_behavior(source);
        self
    }

    /// Adds a save predicate for `T`.
    pub fn add_before_save_behavior<T: Entity>(
        &mut self,
        hook: impl Fn(&mut T) -> bool + Send + Sync + 'static,
    ) -> &mut Self {
        self.configure::<T>().add_before_save_behavior(hook);
        self
    }

    /// Adds an after-save hook for `T`.
    pub fn add_after_save_behavior<T: Entity>(
        &mut self,
        hook: impl Fn(&T) + Send + Sync + 'static,
    ) -> &mut Self {
        self.configure::<T>().add_after_save_behavior(hook);
        self
    }

    /// Adds a delete predicate for `T`.
    pub fn add_before_delete_behavior<T: Entity>(
        &mut self,
        hook: impl Fn(&mut T) -> bool + Send + Sync + 'static,
    ) -> &mut Self {
        self.configure::<T>().add_before_delete_behavior(hook);
        self
    }

    /// Adds an after-delete hook for `T`.
    pub fn add_after_delete_behavior<T: Entity>(
        &mut self,
        hook: impl Fn(&T) + Send + Sync + 'static,
    ) -> &mut Self {
        self.configure::<T>().add_after_delete_behavior(hook);
        self
    }

    /// Adds a save predicate for every type declaring capability `C`.
    pub fn add_capability_before_save<C: ?Sized + 'static>(
        &mut self,
        hook: impl Fn(&mut C) -> bool + Send + Sync + 'static,
    ) -> &mut Self {
        self.global.add_capability_before_save::<C>(hook);
        self
    }

    /// Adds an after-save hook for every type declaring capability `C`.
    pub fn add_capability_after_save<C: ?Sized + 'static>(
        &mut self,
        hook: impl Fn(&C) + Send + Sync + 'static,
    ) -> &mut Self {
        self.global.add_capability_after_save::<C>(hook);
        self
    }

    /// Adds a delete predicate for every type declaring capability `C`.
    pub fn add_capability_before_delete<C: ?Sized + 'static>(
        &mut self,
        hook: impl Fn(&mut C) -> bool + Send + Sync + 'static,
    ) -> &mut Self {
        self.global.add_capability_before_delete::<C>(hook);
        self
    }

    /// Adds an after-delete hook for every type declaring capability `C`.
    pub fn add_capability_after_delete<C: ?Sized + 'static>(
        &mut self,
        hook: impl Fn(&C) + Send + Sync + 'static,
    ) -> &mut Self {
        self.global.add_capability_after_delete::<C>(hook);
        self
    }

    /// Adds a query filter for every type declaring capability `C`.
    pub fn add_capability_query_behavior<C: ?Sized + 'static>(&mut self, filter: Filter) -> &mut Self {
        self.global.add_capability_query_behavior::<C>(filter);
        self
    }

    /// Sets the provider consulted for `updatedBy`.
    pub fn set_user_provider(&mut self, provider: impl UserProvider + 'static) -> &mut Self {
        self.global.set_user_provider(provider);
        self
    }

    /// Sets the sink that receives every lifecycle event line.
    pub fn set_log_sink(&mut self, sink: impl LogSink + 'static) -> &mut Self {
        self.global.set_log_sink(sink);
        self
    }
}
