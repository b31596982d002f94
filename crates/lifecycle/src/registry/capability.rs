//! Capability declarations.
//!
//! A capability is a marker trait object type such as `dyn Tenanted`. Hooks
//! and query behaviours registered against a capability apply to every entity
//! type that declares it, whatever its concrete type.
//!
//! Declaration is static: [`CapabilitySet::declare`] requires the entity to
//! implement [`Implements<C>`](Implements), which projects the entity onto the
//! capability. At dispatch time the engine matches a hook's capability by
//! [`TypeId`] and calls it through the stored projection; no runtime
//! reflection is involved.
//!
//! # Example
//!
//! ```
//! use docket_lifecycle::impl_capabilities;
//! use docket_lifecycle::registry::CapabilitySet;
//!
//! trait Tenanted {
//!     fn tenant(&self) -> &str;
//! }
//!
//! struct Invoice {
//!     tenant: String,
//! }
//!
//! impl Tenanted for Invoice {
//!     fn tenant(&self) -> &str {
//!         &self.tenant
//!     }
//! }
//!
//! impl_capabilities!(Invoice => dyn Tenanted);
//!
//! let mut set = CapabilitySet::<Invoice>::new();
//! set.declare::<dyn Tenanted>();
//! assert!(set.contains::<dyn Tenanted>());
//! ```

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

use crate::behavior::{AfterHook, BeforeHook};

/// Projects an entity onto a capability.
///
/// Usually implemented through [`impl_capabilities!`](crate::impl_capabilities).
pub trait Implements<C: ?Sized> {
    /// Borrows the entity as the capability.
    fn as_capability(&self) -> &C;

    /// Mutably borrows the entity as the capability.
    fn as_capability_mut(&mut self) -> &mut C;
}

/// Implements [`Implements`] for an entity and one or more capabilities.
///
/// ```ignore
/// impl_capabilities!(Order => dyn Tenanted, dyn Audited);
/// ```
#[macro_export]
macro_rules! impl_capabilities {
    ($entity:ty => $(dyn $capability:path),+ $(,)?) => {
        $(
            impl $crate::registry::Implements<dyn $capability> for $entity {
                fn as_capability(&self) -> &(dyn $capability + 'static) {
                    self
                }

                fn as_capability_mut(&mut self) -> &mut (dyn $capability + 'static) {
                    self
                }
            }
        )+
    };
}

/// Calls capability-typed hooks with an entity of type `T`.
pub(crate) trait ErasedProjection<T>: Send + Sync {
    /// Runs a [`BeforeHook<C>`]; `None` if `handler` has another capability type.
    fn run_before(&self, handler: &(dyn Any + Send + Sync), entity: &mut T) -> Option<bool>;

    /// Runs an [`AfterHook<C>`]; `false` if `handler` has another capability type.
    fn run_after(&self, handler: &(dyn Any + Send + Sync), entity: &T) -> bool;
}

struct Projection<T, C: ?Sized> {
    by_ref: fn(&T) -> &C,
    by_mut: fn(&mut T) -> &mut C,
}

impl<T: 'static, C: ?Sized + 'static> ErasedProjection<T> for Projection<T, C> {
    fn run_before(&self, handler: &(dyn Any + Send + Sync), entity: &mut T) -> Option<bool> {
        let hook = handler.downcast_ref::<BeforeHook<C>>()?;
        Some(hook((self.by_mut)(entity)))
    }

    fn run_after(&self, handler: &(dyn Any + Send + Sync), entity: &T) -> bool {
        match handler.downcast_ref::<AfterHook<C>>() {
            Some(hook) => {
                hook((self.by_ref)(entity));
                true
            }
            None => false,
        }
    }
}

struct CapabilityEntry<T> {
    id: TypeId,
    name: &'static str,
    projection: Arc<dyn ErasedProjection<T>>,
}

impl<T> Clone for CapabilityEntry<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            name: self.name,
            projection: Arc::clone(&self.projection),
        }
    }
}

/// The capabilities an entity type declares.
pub struct CapabilitySet<T> {
    entries: Vec<CapabilityEntry<T>>,
}

impl<T: 'static> CapabilitySet<T> {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Declares capability `C`. Declaring the same capability twice is a no-op.
    pub fn declare<C>(&mut self) -> &mut Self
    where
        C: ?Sized + 'static,
        T: Implements<C>,
    {
        let id = TypeId::of::<C>();
        if !self.contains_id(id) {
            let projection: Projection<T, C> = Projection {
                by_ref: <T as Implements<C>>::as_capability,
                by_mut: <T as Implements<C>>::as_capability_mut,
            };
            self.entries.push(CapabilityEntry {
                id,
                name: std::any::type_name::<C>(),
                projection: Arc::new(projection),
            });
        }
        self
    }

    /// Returns `true` if capability `C` is declared.
    pub fn contains<C: ?Sized + 'static>(&self) -> bool {
        self.contains_id(TypeId::of::<C>())
    }

    /// Returns the declared capability type names, in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|entry| entry.name)
    }

    /// Returns the number of declared capabilities.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no capability is declared.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn contains_id(&self, id: TypeId) -> bool {
        self.entries.iter().any(|entry| entry.id == id)
    }

    pub(crate) fn projection(&self, id: TypeId) -> Option<&dyn ErasedProjection<T>> {
        self.entries
            .iter()
            .find(|entry| entry.id == id)
            .map(|entry| entry.projection.as_ref())
    }
}

impl<T: 'static> Default for CapabilitySet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for CapabilitySet<T> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
        }
    }
}

impl<T> fmt::Debug for CapabilitySet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|entry| entry.name))
            .finish()
    }
}
