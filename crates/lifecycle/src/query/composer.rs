//! Query composition.
//!
//! Every query the engine issues is the conjunction of:
//!
//! 1. the caller's base filter
//! 2. the capability-scoped query behaviours the entity type declares
//! 3. the type's own query behaviours
//! 4. `isDeleted = false` when soft delete is on and deleted documents are not requested
//! 5. `isVersion = false` when versioning is on and versions are not requested
//!
//! Point lookups by identifier skip steps 2 and 3.

use std::fmt;
use std::sync::Arc;

use crate::query::Filter;
use crate::registry::{GlobalConfig, TypeConfig};
use crate::types::{fields, Entity, QueryOptions};

/// A filter contributed to every query of a type or capability.
///
/// Dynamic behaviours are re-evaluated on each query, so they can read
/// ambient state such as the current tenant.
#[derive(Clone)]
pub struct QueryBehavior {
    source: Arc<dyn Fn() -> Filter + Send + Sync>,
}

impl QueryBehavior {
    /// A behaviour that always contributes `filter`.
    pub fn fixed(filter: Filter) -> Self {
        Self {
            source: Arc::new(move || filter.clone()),
        }
    }

    /// A behaviour whose filter is computed per query.
    pub fn dynamic(source: impl Fn() -> Filter + Send + Sync + 'static) -> Self {
        Self {
            source: Arc::new(source),
        }
    }

    /// Produces this behaviour's filter for the current query.
    pub fn filter(&self) -> Filter {
        (self.source)()
    }
}

impl fmt::Debug for QueryBehavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryBehavior").finish_non_exhaustive()
    }
}

/// Builds effective filters for entity type `T`.
pub struct QueryComposer<'a, T> {
    global: &'a GlobalConfig,
    config: &'a TypeConfig<T>,
}

impl<'a, T: Entity> QueryComposer<'a, T> {
    /// Creates a composer for `T` under the given configuration.
    pub fn new(global: &'a GlobalConfig, config: &'a TypeConfig<T>) -> Self {
        Self { global, config }
    }

    /// Composes the effective filter for a list or find query.
    pub fn compose(&self, base: Option<Filter>, options: QueryOptions) -> Filter {
        let capabilities = self.config.capabilities();
        let capability_filters = self
            .global
            .capability_query_behaviors()
            .iter()
            .filter(|scoped| capabilities.contains_id(scoped.capability))
            .map(|scoped| scoped.behavior.filter());
        let type_filters = self.config.query_behaviors().iter().map(QueryBehavior::filter);

        Filter::all_of(
            base.into_iter()
                .chain(capability_filters)
                .chain(type_filters)
                .chain(self.exclusions(options)),
        )
    }

    /// Composes the filter for a point lookup by identifier.
    ///
    /// Query behaviours are not applied; only the lifecycle exclusions are.
    pub fn compose_by_id(&self, id: &str, options: QueryOptions) -> Filter {
        Filter::all_of(std::iter::once(Filter::by_id(id)).chain(self.exclusions(options)))
    }

    fn exclusions(&self, options: QueryOptions) -> Vec<Filter> {
        let mut exclusions = Vec::with_capacity(2);
        if self.config.soft_delete_enabled() && !options.include_deleted {
            exclusions.push(Filter::eq(fields::IS_DELETED, false));
        }
        if self.config.versioning_enabled() && !options.include_versions {
            exclusions.push(Filter::eq(fields::IS_VERSION, false));
        }
        exclusions
    }
}
