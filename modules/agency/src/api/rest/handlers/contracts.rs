use std::sync::Arc;

use agency_db::Paged;
use agency_security::Principal;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Extension, Json};

use crate::api::rest::error::{ApiJson, ApiQuery, ApiResult};
use crate::api::rest::query::ContractQuery;
use crate::domain::models::{Contract, ContractPatch, NewContract, StatusChange};
use crate::domain::service::AppServices;
use crate::domain::validate::parse_id;

pub async fn list(
    State(svc): State<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    ApiQuery(q): ApiQuery<ContractQuery>,
) -> ApiResult<Json<Paged<Contract>>> {
    let filter = q.filter()?;
    let page = svc.page(q.paging.page.as_deref(), q.paging.limit.as_deref());
    Ok(Json(svc.contracts.list(&principal, &filter, &page).await?))
}

pub async fn get(
    State(svc): State<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> ApiResult<Json<Contract>> {
    let id = parse_id(&id, "id")?;
    Ok(Json(svc.contracts.get(&principal, id).await?))
}

pub async fn create(
    State(svc): State<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    ApiJson(body): ApiJson<NewContract>,
) -> ApiResult<impl IntoResponse> {
    let contract = svc.contracts.create(&principal, body).await?;
    Ok((StatusCode::CREATED, Json(contract)))
}

pub async fn update(
    State(svc): State<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<ContractPatch>,
) -> ApiResult<Json<Contract>> {
    let id = parse_id(&id, "id")?;
    Ok(Json(svc.contracts.update(&principal, id, body).await?))
}

/// `POST /contracts/{id}/status`
pub async fn set_status(
    State(svc): State<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<StatusChange>,
) -> ApiResult<Json<Contract>> {
    let id = parse_id(&id, "id")?;
    Ok(Json(
        svc.contracts.set_status(&principal, id, body.status).await?,
    ))
}

pub async fn delete(
    State(svc): State<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = parse_id(&id, "id")?;
    svc.contracts.delete(&principal, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
