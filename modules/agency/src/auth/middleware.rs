use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::api::rest::error::ApiError;
use crate::domain::error::DomainError;
use crate::domain::service::AppServices;

/// Authenticates every request of the routes it wraps.
///
/// Extracts the bearer token, resolves it to a
/// [`Principal`](agency_security::Principal) and inserts that into the
/// request extensions. Any failure ends the request with `401`.
pub async fn authn_middleware(
    State(services): State<Arc<AppServices>>,
    mut req: Request,
    next: Next,
) -> Response {
    let Some(token) = extract_bearer_token(req.headers()).map(str::to_owned) else {
        return ApiError::from(DomainError::unauthenticated(
            "Missing or invalid Authorization header",
        ))
        .into_response();
    };

    match services.auth.authenticate(&token).await {
        Ok(principal) => {
            req.extensions_mut().insert(principal);
            next.run(req).await
        }
        Err(err) => ApiError::from(err).into_response(),
    }
}

/// Extract Bearer token from Authorization header
fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer ").map(str::trim))
        .filter(|t| !t.is_empty())
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut h = HeaderMap::new();
        h.insert(
            axum::http::header::AUTHORIZATION,
            HeaderValue::from_str(value).unwrap(),
        );
        h
    }

    #[test]
    fn bearer_token_is_extracted() {
        assert_eq!(extract_bearer_token(&headers("Bearer abc.def")), Some("abc.def"));
    }

    #[test]
    fn other_schemes_and_blank_tokens_are_ignored() {
        assert_eq!(extract_bearer_token(&headers("Basic dXNlcg==")), None);
        assert_eq!(extract_bearer_token(&headers("Bearer   ")), None);
        assert_eq!(extract_bearer_token(&HeaderMap::new()), None);
    }
}
