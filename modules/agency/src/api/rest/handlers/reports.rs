use std::sync::Arc;

use agency_security::Principal;
use axum::extract::State;
use axum::{Extension, Json};

use crate::api::rest::error::{ApiQuery, ApiResult};
use crate::api::rest::query::ActiveContractsQuery;
use crate::domain::models::ActiveContractsReport;
use crate::domain::service::AppServices;

/// `GET /reports/active-contracts?clientId=`
pub async fn active_contracts(
    State(svc): State<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    ApiQuery(q): ApiQuery<ActiveContractsQuery>,
) -> ApiResult<Json<ActiveContractsReport>> {
    let client_id = q.client_id()?;
    Ok(Json(
        svc.reports.active_contracts(&principal, client_id).await?,
    ))
}
