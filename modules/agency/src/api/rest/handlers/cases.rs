use std::sync::Arc;

use agency_db::Paged;
use agency_security::Principal;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Extension, Json};

use crate::api::rest::error::{ApiJson, ApiQuery, ApiResult};
use crate::api::rest::query::CaseQuery;
use crate::domain::models::{CasePatch, InsuranceCase, NewCase};
use crate::domain::service::AppServices;
use crate::domain::validate::parse_id;

pub async fn list(
    State(svc): State<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    ApiQuery(q): ApiQuery<CaseQuery>,
) -> ApiResult<Json<Paged<InsuranceCase>>> {
    let filter = q.filter()?;
    let page = svc.page(q.paging.page.as_deref(), q.paging.limit.as_deref());
    Ok(Json(svc.cases.list(&principal, &filter, &page).await?))
}

pub async fn get(
    State(svc): State<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> ApiResult<Json<InsuranceCase>> {
    let id = parse_id(&id, "id")?;
    Ok(Json(svc.cases.get(&principal, id).await?))
}

pub async fn create(
    State(svc): State<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    ApiJson(body): ApiJson<NewCase>,
) -> ApiResult<impl IntoResponse> {
    let case = svc.cases.create(&principal, body).await?;
    Ok((StatusCode::CREATED, Json(case)))
}

pub async fn update(
    State(svc): State<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<CasePatch>,
) -> ApiResult<Json<InsuranceCase>> {
    let id = parse_id(&id, "id")?;
    Ok(Json(svc.cases.update(&principal, id, body).await?))
}

pub async fn delete(
    State(svc): State<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = parse_id(&id, "id")?;
    svc.cases.delete(&principal, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
