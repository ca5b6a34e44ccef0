use std::sync::Arc;

use agency_db::Paged;
use agency_security::Principal;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Extension, Json};

use crate::api::rest::error::{ApiJson, ApiQuery, ApiResult};
use crate::api::rest::query::AgentQuery;
use crate::domain::models::{Agent, AgentPatch, NewAgent};
use crate::domain::service::AppServices;
use crate::domain::validate::parse_id;

pub async fn list(
    State(svc): State<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    ApiQuery(q): ApiQuery<AgentQuery>,
) -> ApiResult<Json<Paged<Agent>>> {
    let page = svc.page(q.paging.page.as_deref(), q.paging.limit.as_deref());
    let branch_id = q.branch_id()?;
    let agents = svc
        .agents
        .list(&principal, q.name.as_deref(), branch_id, &page)
        .await?;
    Ok(Json(agents))
}

pub async fn get(
    State(svc): State<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> ApiResult<Json<Agent>> {
    let id = parse_id(&id, "id")?;
    Ok(Json(svc.agents.get(&principal, id).await?))
}

pub async fn create(
    State(svc): State<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    ApiJson(body): ApiJson<NewAgent>,
) -> ApiResult<impl IntoResponse> {
    let agent = svc.agents.create(&principal, body).await?;
    Ok((StatusCode::CREATED, Json(agent)))
}

pub async fn update(
    State(svc): State<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<AgentPatch>,
) -> ApiResult<Json<Agent>> {
    let id = parse_id(&id, "id")?;
    Ok(Json(svc.agents.update(&principal, id, body).await?))
}

pub async fn delete(
    State(svc): State<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = parse_id(&id, "id")?;
    svc.agents.delete(&principal, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
