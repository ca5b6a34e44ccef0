use std::sync::Arc;

use agency_db::Paged;
use agency_security::Principal;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Extension, Json};

use crate::api::rest::error::{ApiJson, ApiQuery, ApiResult};
use crate::api::rest::query::NameQuery;
use crate::domain::models::{InsuranceType, InsuranceTypePatch, NewInsuranceType};
use crate::domain::service::AppServices;
use crate::domain::validate::parse_id;

pub async fn list(
    State(svc): State<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    ApiQuery(q): ApiQuery<NameQuery>,
) -> ApiResult<Json<Paged<InsuranceType>>> {
    let page = svc.page(q.paging.page.as_deref(), q.paging.limit.as_deref());
    let types = svc
        .insurance_types
        .list(&principal, q.name.as_deref(), &page)
        .await?;
    Ok(Json(types))
}

pub async fn get(
    State(svc): State<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> ApiResult<Json<InsuranceType>> {
    let id = parse_id(&id, "id")?;
    Ok(Json(svc.insurance_types.get(&principal, id).await?))
}

pub async fn create(
    State(svc): State<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    ApiJson(body): ApiJson<NewInsuranceType>,
) -> ApiResult<impl IntoResponse> {
    let ty = svc.insurance_types.create(&principal, body).await?;
    Ok((StatusCode::CREATED, Json(ty)))
}

pub async fn update(
    State(svc): State<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<InsuranceTypePatch>,
) -> ApiResult<Json<InsuranceType>> {
    let id = parse_id(&id, "id")?;
    Ok(Json(svc.insurance_types.update(&principal, id, body).await?))
}

pub async fn delete(
    State(svc): State<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = parse_id(&id, "id")?;
    svc.insurance_types.delete(&principal, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
