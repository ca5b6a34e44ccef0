use std::sync::Arc;

use agency_db::Paged;
use agency_security::Principal;
use axum::extract::State;
use axum::{Extension, Json};

use crate::api::rest::error::{ApiQuery, ApiResult};
use crate::api::rest::query::AuditLogQuery;
use crate::domain::models::AuditEntry;
use crate::domain::service::AppServices;

pub async fn list(
    State(svc): State<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    ApiQuery(q): ApiQuery<AuditLogQuery>,
) -> ApiResult<Json<Paged<AuditEntry>>> {
    let page = svc.page(q.paging.page.as_deref(), q.paging.limit.as_deref());
    Ok(Json(svc.audit_logs.list(&principal, &q.filter(), &page).await?))
}
