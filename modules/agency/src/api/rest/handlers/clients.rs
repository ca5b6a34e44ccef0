use std::sync::Arc;

use agency_db::Paged;
use agency_security::Principal;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Extension, Json};

use crate::api::rest::error::{ApiJson, ApiQuery, ApiResult};
use crate::api::rest::query::{ClientContractsQuery, ClientQuery};
use crate::domain::models::{Client, ClientPatch, Contract, NewClient};
use crate::domain::service::AppServices;
use crate::domain::validate::parse_id;

pub async fn list(
    State(svc): State<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    ApiQuery(q): ApiQuery<ClientQuery>,
) -> ApiResult<Json<Paged<Client>>> {
    let page = svc.page(q.paging.page.as_deref(), q.paging.limit.as_deref());
    Ok(Json(svc.clients.list(&principal, &q.filter(), &page).await?))
}

pub async fn get(
    State(svc): State<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> ApiResult<Json<Client>> {
    let id = parse_id(&id, "id")?;
    Ok(Json(svc.clients.get(&principal, id).await?))
}

pub async fn create(
    State(svc): State<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    ApiJson(body): ApiJson<NewClient>,
) -> ApiResult<impl IntoResponse> {
    let client = svc.clients.create(&principal, body).await?;
    Ok((StatusCode::CREATED, Json(client)))
}

pub async fn update(
    State(svc): State<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<ClientPatch>,
) -> ApiResult<Json<Client>> {
    let id = parse_id(&id, "id")?;
    Ok(Json(svc.clients.update(&principal, id, body).await?))
}

pub async fn delete(
    State(svc): State<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = parse_id(&id, "id")?;
    svc.clients.delete(&principal, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /clients/{id}/contracts`
pub async fn contracts(
    State(svc): State<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    ApiQuery(q): ApiQuery<ClientContractsQuery>,
) -> ApiResult<Json<Paged<Contract>>> {
    let id = parse_id(&id, "id")?;
    let active_only = q.active_only()?;
    let page = svc.page(q.paging.page.as_deref(), q.paging.limit.as_deref());
    let contracts = svc
        .clients
        .contracts(&principal, id, active_only, &page)
        .await?;
    Ok(Json(contracts))
}
