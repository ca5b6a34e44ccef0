use std::sync::Arc;

use agency_security::Principal;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Extension, Json};

use crate::api::rest::error::{ApiJson, ApiResult};
use crate::domain::models::{AuthSession, LoginRequest, NewUser, User};
use crate::domain::service::AppServices;

/// `POST /auth/login`. Public.
pub async fn login(
    State(svc): State<Arc<AppServices>>,
    ApiJson(body): ApiJson<LoginRequest>,
) -> ApiResult<Json<AuthSession>> {
    Ok(Json(svc.auth.login(body).await?))
}

pub async fn register(
    State(svc): State<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    ApiJson(body): ApiJson<NewUser>,
) -> ApiResult<impl IntoResponse> {
    let session = svc.auth.register(&principal, body).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

pub async fn me(
    State(svc): State<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<Json<User>> {
    Ok(Json(svc.auth.me(&principal).await?))
}
