use std::sync::Arc;

use agency_db::Paged;
use agency_security::Principal;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Extension, Json};

use crate::api::rest::error::{ApiJson, ApiQuery, ApiResult};
use crate::api::rest::query::BranchQuery;
use crate::domain::models::{Branch, BranchPatch, NewBranch};
use crate::domain::service::AppServices;
use crate::domain::validate::parse_id;

pub async fn list(
    State(svc): State<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    ApiQuery(q): ApiQuery<BranchQuery>,
) -> ApiResult<Json<Paged<Branch>>> {
    let page = svc.page(q.paging.page.as_deref(), q.paging.limit.as_deref());
    let branches = svc
        .branches
        .list(&principal, q.query.as_deref(), &page)
        .await?;
    Ok(Json(branches))
}

pub async fn get(
    State(svc): State<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> ApiResult<Json<Branch>> {
    let id = parse_id(&id, "id")?;
    Ok(Json(svc.branches.get(&principal, id).await?))
}

pub async fn create(
    State(svc): State<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    ApiJson(body): ApiJson<NewBranch>,
) -> ApiResult<impl IntoResponse> {
    let branch = svc.branches.create(&principal, body).await?;
    Ok((StatusCode::CREATED, Json(branch)))
}

pub async fn update(
    State(svc): State<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<BranchPatch>,
) -> ApiResult<Json<Branch>> {
    let id = parse_id(&id, "id")?;
    Ok(Json(svc.branches.update(&principal, id, body).await?))
}

pub async fn delete(
    State(svc): State<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = parse_id(&id, "id")?;
    svc.branches.delete(&principal, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
