//! Engine-wide configuration.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::behavior::{AfterHook, BeforeHook, HookPoint};
use crate::config::EngineSettings;
use crate::error::ConfigError;
use crate::providers::{LogSink, UserProvider};
use crate::query::{Filter, QueryBehavior};

/// Locator of the store used when nothing more specific is configured.
pub const DEFAULT_LOCATOR: &str = "default";

/// A hook registered against a capability rather than a concrete type.
pub(crate) struct CapabilityHook {
    pub(crate) capability: TypeId,
    pub(crate) capability_name: &'static str,
    pub(crate) point: HookPoint,
    /// A [`BeforeHook<C>`] or [`AfterHook<C>`] for the capability `C`.
    pub(crate) handler: Arc<dyn Any + Send + Sync>,
}

/// A query behaviour registered against a capability.
pub(crate) struct CapabilityQueryBehavior {
    pub(crate) capability: TypeId,
    pub(crate) behavior: QueryBehavior,
}

/// Configuration shared by every entity type.
pub struct GlobalConfig {
    default_locator: String,
    locator_overrides: HashMap<String, String>,
    user_provider: Option<Arc<dyn UserProvider>>,
    log_sink: Option<Arc<dyn LogSink>>,
    trace_queries: bool,
    capability_hooks: Vec<CapabilityHook>,
    capability_query_behaviors: Vec<CapabilityQueryBehavior>,
}

impl GlobalConfig {
    /// Creates a configuration routing everything to [`DEFAULT_LOCATOR`].
    pub fn new() -> Self {
        Self {
            default_locator: DEFAULT_LOCATOR.to_string(),
            locator_overrides: HashMap::new(),
            user_provider: None,
            log_sink: None,
            trace_queries: true,
            capability_hooks: Vec::new(),
            capability_query_behaviors: Vec::new(),
        }
    }

    /// Builds a configuration from validated settings.
    pub fn from_settings(settings: &EngineSettings) -> Result<Self, ConfigError> {
        settings
            .validate()
            .map_err(|errors| ConfigError::InvalidSettings { errors })?;

        let mut config = Self::new();
        config
            .set_default_locator(settings.default_store.as_str())
            .set_trace_queries(settings.trace_queries);
        for (type_name, locator) in settings.store_overrides()? {
            config.override_locator(type_name, locator);
        }
        Ok(config)
    }

    /// Returns the default store locator.
    pub fn default_locator(&self) -> &str {
        &self.default_locator
    }

    /// Sets the default store locator.
    pub fn set_default_locator(&mut self, locator: impl Into<String>) -> &mut Self {
        self.default_locator = locator.into();
        self
    }

    /// Routes the type named `type_name` to `locator`.
    ///
    /// A locator set on the type's own configuration takes precedence.
    pub fn override_locator(
        &mut self,
        type_name: impl Into<String>,
        locator: impl Into<String>,
    ) -> &mut Self {
        self.locator_overrides.insert(type_name.into(), locator.into());
        self
    }

    /// Returns the locator override for `type_name`, if any.
    pub fn locator_override(&self, type_name: &str) -> Option<&str> {
        self.locator_overrides.get(type_name).map(String::as_str)
    }

    /// Sets the provider consulted for `updatedBy`.
    pub fn set_user_provider(&mut self, provider: impl UserProvider + 'static) -> &mut Self {
        self.user_provider = Some(Arc::new(provider));
        self
    }

    /// Returns the user provider, if set.
    pub fn user_provider(&self) -> Option<&dyn UserProvider> {
        self.user_provider.as_deref()
    }

    /// Sets the sink that receives every lifecycle event line.
    pub fn set_log_sink(&mut self, sink: impl LogSink + 'static) -> &mut Self {
        self.log_sink = Some(Arc::new(sink));
        self
    }

    /// Returns the log sink, if set.
    pub fn log_sink(&self) -> Option<&dyn LogSink> {
        self.log_sink.as_deref()
    }

    /// Returns `true` if query events are emitted.
    pub fn trace_queries(&self) -> bool {
        self.trace_queries
    }

    /// Turns query events on or off. Write events are always emitted.
    pub fn set_trace_queries(&mut self, enabled: bool) -> &mut Self {
        self.trace_queries = enabled;
        self
    }

    /// Adds a save predicate for every type declaring capability `C`.
    pub fn add_capability_before_save<C: ?Sized + 'static>(
        &mut self,
        hook: impl Fn(&mut C) -> bool + Send + Sync + 'static,
    ) -> &mut Self {
        let hook: BeforeHook<C> = Arc::new(hook);
        self.push_hook::<C>(HookPoint::BeforeSave, Arc::new(hook))
    }

    /// Adds an after-save hook for every type declaring capability `C`.
    pub fn add_capability_after_save<C: ?Sized + 'static>(
        &mut self,
        hook: impl Fn(&C) + Send + Sync + 'static,
    ) -> &mut Self {
        let hook: AfterHook<C> = Arc::new(hook);
        self.push_hook::<C>(HookPoint::AfterSave, Arc::new(hook))
    }

    /// Adds a delete predicate for every type declaring capability `C`.
    pub fn add_capability_before_delete<C: ?Sized + 'static>(
        &mut self,
        hook: impl Fn(&mut C) -> bool + Send + Sync + 'static,
    ) -> &mut Self {
        let hook: BeforeHook<C> = Arc::new(hook);
        self.push_hook::<C>(HookPoint::BeforeDelete, Arc::new(hook))
    }

    /// Adds an after-delete hook for every type declaring capability `C`.
    pub fn add_capability_after_delete<C: ?Sized + 'static>(
        &mut self,
        hook: impl Fn(&C) + Send + Sync + 'static,
    ) -> &mut Self {
        let hook: AfterHook<C> = Arc::new(hook);
        self.push_hook::<C>(HookPoint::AfterDelete, Arc::new(hook))
    }

    /// Adds a query filter for every type declaring capability `C`.
    pub fn add_capability_query_behavior<C: ?Sized + 'static>(&mut self, filter: Filter) -> &mut Self {
        self.push_query_behavior::<C>(QueryBehavior::fixed(filter))
    }

    /// Adds a per-query computed filter for every type declaring capability `C`.
    pub fn add_dynamic_capability_query_behavior<C: ?Sized + 'static>(
        &mut self,
        source: impl Fn() -> Filter + Send + Sync + 'static,
    ) -> &mut Self {
        self.push_query_behavior::<C>(QueryBehavior::dynamic(source))
    }

    pub(crate) fn capability_hooks(&self, point: HookPoint) -> impl Iterator<Item = &CapabilityHook> {
        self.capability_hooks
            .iter()
            .filter(move |hook| hook.point == point)
    }

    pub(crate) fn capability_query_behaviors(&self) -> &[CapabilityQueryBehavior] {
        &self.capability_query_behaviors
    }

    fn push_hook<C: ?Sized + 'static>(
        &mut self,
        point: HookPoint,
        handler: Arc<dyn Any + Send + Sync>,
    ) -> &mut Self {
        self.capability_hooks.push(CapabilityHook {
            capability: TypeId::of::<C>(),
            capability_name: std::any::type_name::<C>(),
            point,
            handler,
        });
        self
    }

    fn push_query_behavior<C: ?Sized + 'static>(&mut self, behavior: QueryBehavior) -> &mut Self {
        self.capability_query_behaviors.push(CapabilityQueryBehavior {
            capability: TypeId::of::<C>(),
            behavior,
        });
        self
    }
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for GlobalConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hooks: Vec<_> = self
            .capability_hooks
            .iter()
            .map(|hook| format!("{} {}", hook.point, hook.capability_name))
            .collect();
        f.debug_struct("GlobalConfig")
            .field("default_locator", &self.default_locator)
            .field("locator_overrides", &self.locator_overrides)
            .field("user_provider", &self.user_provider.is_some())
            .field("log_sink", &self.log_sink.is_some())
            .field("trace_queries", &self.trace_queries)
            .field("capability_hooks", &hooks)
            .field(
                "capability_query_behaviors",
                &self.capability_query_behaviors.len(),
            )
            .finish()
    }
}
