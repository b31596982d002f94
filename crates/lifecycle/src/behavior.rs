//! Behaviour dispatcher.
//!
//! Runs the before/after hooks for one lifecycle point against one entity.
//! Capability-scoped hooks run first, in registration order, followed by the
//! hooks registered on the entity's own type.
//!
//! Before-hooks are predicates: every one of them runs, and the operation is
//! allowed only if all of them returned `true`. A rejecting hook does not
//! stop later hooks from running, since hooks may also normalise the entity.

use std::any::TypeId;
use std::fmt;
use std::sync::Arc;

use crate::registry::{CapabilitySet, GlobalConfig};

/// A predicate run before a save or delete. Returning `false` vetoes the operation.
pub type BeforeHook<T> = Arc<dyn Fn(&mut T) -> bool + Send + Sync>;

/// A hook run after a successful save or delete.
pub type AfterHook<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// The lifecycle point a hook is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookPoint {
    /// Before a save; may veto.
    BeforeSave,
    /// After a successful save.
    AfterSave,
    /// Before a delete; may veto.
    BeforeDelete,
    /// After a successful delete.
    AfterDelete,
}

impl fmt::Display for HookPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HookPoint::BeforeSave => write!(f, "before-save"),
            HookPoint::AfterSave => write!(f, "after-save"),
            HookPoint::BeforeDelete => write!(f, "before-delete"),
            HookPoint::AfterDelete => write!(f, "after-delete"),
        }
    }
}

/// Dispatches hooks for entities of type `T`.
pub struct BehaviorDispatcher<'a, T> {
    global: &'a GlobalConfig,
    capabilities: &'a CapabilitySet<T>,
}

impl<'a, T: 'static> BehaviorDispatcher<'a, T> {
    /// Creates a dispatcher over the global capability hooks and the
    /// capabilities `T` declares.
    pub fn new(global: &'a GlobalConfig, capabilities: &'a CapabilitySet<T>) -> Self {
        Self {
            global,
            capabilities,
        }
    }

    /// Runs every before-hook for `point` and returns the conjunction of
    /// their results. `true` when there are no hooks.
    pub fn run_before(&self, point: HookPoint, type_hooks: &[BeforeHook<T>], entity: &mut T) -> bool {
        let mut allowed = true;

        for hook in self.global.capability_hooks(point) {
            if let Some(projection) = self.capabilities.projection(hook.capability) {
                if let Some(ok) = projection.run_before(hook.handler.as_ref(), entity) {
                    if !ok {
                        tracing::debug!(
                            point = %point,
                            capability = hook.capability_name,
                            "capability hook vetoed operation"
                        );
                    }
                    allowed &= ok;
                }
            }
        }

        for hook in type_hooks {
            let ok = hook(entity);
            allowed &= ok;
        }

        allowed
    }

    /// Runs every after-hook for `point`.
    pub fn run_after(&self, point: HookPoint, type_hooks: &[AfterHook<T>], entity: &T) {
        for hook in self.global.capability_hooks(point) {
            if let Some(projection) = self.capabilities.projection(hook.capability) {
                projection.run_after(hook.handler.as_ref(), entity);
            }
        }

        for hook in type_hooks {
            hook(entity);
        }
    }

    /// Returns `true` if `T` declares the capability with the given id.
    pub fn applies(&self, capability: TypeId) -> bool {
        self.capabilities.contains_id(capability)
    }
}
