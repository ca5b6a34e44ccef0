use agency_security::ScopePredicate;
use sea_orm::{
    DbBackend, EntityTrait, Order, QueryFilter, QueryOrder, QuerySelect, QueryTrait, Select,
    Statement,
};

use crate::page::Page;
use crate::secure::{FilterSet, ScopableEntity, build_scope_condition};

/// Outcome of query construction.
#[derive(Debug)]
pub enum QueryPlan<E: EntityTrait> {
    /// Denied scope: nothing may be queried; the result is an empty page.
    Empty,
    Select(ScopedSelect<E>),
}

impl<E: EntityTrait> QueryPlan<E> {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, QueryPlan::Empty)
    }
}

/// One filtered select (base query, then filters, then scope) from which
/// both the list query and the count query are derived.
#[derive(Debug)]
pub struct ScopedSelect<E: EntityTrait> {
    filtered: Select<E>,
    sort: Vec<(E::Column, Order)>,
}

impl<E: EntityTrait> ScopedSelect<E> {
    /// Rows of `page`, in the entity's fixed sort order.
    #[must_use]
    pub fn list_query(&self, page: &Page) -> Select<E> {
        self.sorted().offset(page.offset()).limit(page.limit())
    }

    /// The same conjunction, to be wrapped in a row-count projection.
    #[must_use]
    pub fn count_query(&self) -> Select<E> {
        self.filtered()
    }

    /// Base query with filters and scope applied, unsorted and unpaged.
    #[must_use]
    pub fn filtered(&self) -> Select<E> {
        self.filtered.clone()
    }

    /// Unpaged, sorted select.
    #[must_use]
    pub fn sorted(&self) -> Select<E> {
        self.sort
            .iter()
            .fold(self.filtered.clone(), |q, (col, order)| {
                q.order_by(*col, order.clone())
            })
    }

    /// Rendered list statement, for logging and tests.
    #[must_use]
    pub fn list_statement(&self, backend: DbBackend, page: &Page) -> Statement {
        self.list_query(page).build(backend)
    }

    /// Rendered count statement, for logging and tests.
    #[must_use]
    pub fn count_statement(&self, backend: DbBackend) -> Statement {
        self.count_query().build(backend)
    }
}

/// Builds the query pair for `E` from caller filters and the caller's scope.
///
/// The base query gets every present filter in order, then the scope
/// condition. Filters are rendered for `backend`. A denied scope
/// short-circuits to [`QueryPlan::Empty`].
#[must_use]
pub fn build_queries<E: ScopableEntity>(
    filters: &FilterSet,
    scope: &ScopePredicate,
    backend: DbBackend,
) -> QueryPlan<E> {
    let Some(scope_cond) = build_scope_condition::<E>(scope) else {
        return QueryPlan::Empty;
    };

    let filtered = E::base_query()
        .filter(filters.condition(backend))
        .filter(scope_cond);

    tracing::trace!(kind = %E::KIND, filters = ?filters.names(), %scope, "built scoped query");

    QueryPlan::Select(ScopedSelect {
        filtered,
        sort: E::sort(),
    })
}
