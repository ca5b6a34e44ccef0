use agency_security::ScopePredicate;
use sea_orm::{ConnectionTrait, PaginatorTrait};

use crate::error::DbError;
use crate::page::{Page, Paged};
use crate::secure::{FilterSet, QueryPlan, ScopableEntity, build_queries};

/// Executes a plan: count first, then the page of rows.
///
/// The two statements are issued back to back on the pool without a shared
/// transaction; under concurrent writes `total` is best-effort.
///
/// # Errors
///
/// Returns [`DbError`] if either statement fails.
pub async fn fetch_page<E, C>(
    conn: &C,
    plan: &QueryPlan<E>,
    page: &Page,
) -> Result<Paged<E::Model>, DbError>
where
    E: ScopableEntity,
    E::Model: Send + Sync + 'static,
    C: ConnectionTrait,
{
    let QueryPlan::Select(query) = plan else {
        return Ok(Paged::empty(page));
    };

    let total = query.count_query().count(conn).await?;
    let rows = query.list_query(page).all(conn).await?;
    Ok(Paged::new(rows, page, total))
}

/// Fetches one record by id within `scope`, with optional extra filters.
///
/// Out-of-scope and missing records are indistinguishable: both are `None`.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails.
pub async fn find_scoped<E, C>(
    conn: &C,
    scope: &ScopePredicate,
    id: i64,
) -> Result<Option<E::Model>, DbError>
where
    E: ScopableEntity,
    C: ConnectionTrait,
{
    let filters = FilterSet::new().eq("id", E::id_col(), Some(id));
    match build_queries::<E>(&filters, scope, conn.get_database_backend()) {
        QueryPlan::Empty => Ok(None),
        QueryPlan::Select(query) => Ok(query.filtered().one(conn).await?),
    }
}

/// Counts rows matching `filters` within `scope`. Zero for a denied scope.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails.
pub async fn count_scoped<E, C>(
    conn: &C,
    filters: &FilterSet,
    scope: &ScopePredicate,
) -> Result<u64, DbError>
where
    E: ScopableEntity,
    E::Model: Send + Sync + 'static,
    C: ConnectionTrait,
{
    match build_queries::<E>(filters, scope, conn.get_database_backend()) {
        QueryPlan::Empty => Ok(0),
        QueryPlan::Select(query) => Ok(query.count_query().count(conn).await?),
    }
}
