//! HTTP router setup.

use crate::config::Config;
use crate::handlers;
use crate::middleware::{api_key_auth, inject_request_id};
use crate::state::AppState;
use axum::http::StatusCode;
use axum::middleware;
use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// Create the application router. `/admin` routes require the staff API key.
pub fn create(state: Arc<AppState>) -> Router {
    let timeout = request_timeout(&state.config);

    let admin = Router::new()
        .route(
            "/payout-fees",
            get(handlers::list_fee_config).post(handlers::update_fee_setting),
        )
        .route("/payout-fees/preview", get(handlers::preview))
        .route("/payout-fees/describe", get(handlers::describe))
        .route("/payout-fees/reconcile", get(handlers::reconcile_with_mirror))
        .route_layer(middleware::from_fn_with_state(state.clone(), api_key_auth));

    Router::new()
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics))
        .nest("/admin", admin)
        .layer(middleware::from_fn(inject_request_id))
        .layer(TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, timeout))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Whole-request budget. Reconcile runs its mirror calls concurrently, each
/// bounded by the client timeout, so it answers well before this fires.
fn request_timeout(config: &Config) -> Duration {
    Duration::from_secs(config.request_timeout_secs.max(1) * 2 + 1)
}
