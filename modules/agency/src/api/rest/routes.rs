use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::api::rest::handlers::{
    agents, audit_logs, auth, branches, cases, clients, contracts, insurance_types, meta, reports,
};
use crate::auth::authn_middleware;
use crate::domain::service::AppServices;

/// Routes that require a bearer token.
fn protected_routes() -> Router<Arc<AppServices>> {
    Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/me", get(auth::me))
        .route("/branches", get(branches::list).post(branches::create))
        .route(
            "/branches/{id}",
            get(branches::get)
                .put(branches::update)
                .delete(branches::delete),
        )
        .route("/agents", get(agents::list).post(agents::create))
        .route(
            "/agents/{id}",
            get(agents::get).put(agents::update).delete(agents::delete),
        )
        .route(
            "/insurance-types",
            get(insurance_types::list).post(insurance_types::create),
        )
        .route(
            "/insurance-types/{id}",
            get(insurance_types::get)
                .put(insurance_types::update)
                .delete(insurance_types::delete),
        )
        .route("/clients", get(clients::list).post(clients::create))
        .route(
            "/clients/{id}",
            get(clients::get).put(clients::update).delete(clients::delete),
        )
        .route("/clients/{id}/contracts", get(clients::contracts))
        .route("/contracts", get(contracts::list).post(contracts::create))
        .route(
            "/contracts/{id}",
            get(contracts::get)
                .put(contracts::update)
                .delete(contracts::delete),
        )
        .route("/contracts/{id}/status", post(contracts::set_status))
        .route("/cases", get(cases::list).post(cases::create))
        .route(
            "/cases/{id}",
            get(cases::get).put(cases::update).delete(cases::delete),
        )
        .route("/audit-logs", get(audit_logs::list))
        .route("/reports/active-contracts", get(reports::active_contracts))
        .route("/status-options", get(meta::status_options))
}

/// The complete HTTP application.
///
/// `/health` and `/api/v1/auth/login` are public; every other route runs
/// behind [`authn_middleware`].
#[must_use]
pub fn router(services: Arc<AppServices>, request_timeout: Duration) -> Router {
    let api = Router::new()
        .route("/auth/login", post(auth::login))
        .merge(protected_routes().route_layer(from_fn_with_state(
            Arc::clone(&services),
            authn_middleware,
        )));

    Router::new()
        .route("/health", get(meta::health))
        .nest("/api/v1", api)
        .fallback(meta::not_found)
        .with_state(services)
        .layer(TimeoutLayer::new(request_timeout))
        .layer(CatchPanicLayer::new())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}
