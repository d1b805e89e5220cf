//! Staff authentication and request correlation middleware.

use crate::state::AppState;
use crate::Error;
use axum::extract::{Request, State};
use axum::http::{HeaderMap, HeaderValue};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use rand::Rng;
use std::sync::Arc;
use subtle::ConstantTimeEq;
use tracing::warn;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Gate `/admin` on the staff key, sent as `X-Api-Key` or `Authorization: Bearer`.
/// Open when no key is configured (dev mode).
pub async fn api_key_auth(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let Some(expected) = state.config.api_key() else {
        return next.run(request).await;
    };

    if presented_key(request.headers()).is_some_and(|key| key_matches(key, expected)) {
        return next.run(request).await;
    }

    warn!(
        method = %request.method(),
        path = %request.uri().path(),
        "Rejected payout fee admin request: bad or missing staff key"
    );
    Error::Unauthorized.into_response()
}

fn presented_key(headers: &HeaderMap) -> Option<&str> {
    header_str(headers, "x-api-key")
        .or_else(|| header_str(headers, "authorization")?.strip_prefix("Bearer "))
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn key_matches(provided: &str, expected: &str) -> bool {
    provided.len() == expected.len() && bool::from(provided.as_bytes().ct_eq(expected.as_bytes()))
}

/// Reuse the caller's `x-request-id` or mint one, and echo it on the response.
pub async fn inject_request_id(mut request: Request, next: Next) -> Response {
    let id = header_str(request.headers(), REQUEST_ID_HEADER)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
        .unwrap_or_else(|| format!("pfa-{:016x}", rand::thread_rng().gen::<u64>()));

    let header = HeaderValue::from_str(&id).ok();
    request.extensions_mut().insert(RequestId(id));

    let mut response = next.run(request).await;
    if let Some(header) = header {
        response.headers_mut().insert(REQUEST_ID_HEADER, header);
    }
    response
}

/// Correlation id for the current request, available as an `Extension`.
#[derive(Clone, Debug, Default)]
pub struct RequestId(pub String);
