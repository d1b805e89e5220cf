//! HTTP request handlers.

use crate::metrics::METRICS;
use crate::middleware::RequestId;
use crate::response::{
    FeeConfigResponse, HealthResponse, MethodDescription, PreviewResponse, ReconcileResponse,
    UpdateResponse,
};
use crate::state::AppState;
use crate::Error;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Extension, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use payout_fees::{
    compare_configs, describe_fee, get_breakdown_with_currency, reconcile, reference_matrix,
    PayoutMethod, NET_REFERENCE_CASES,
};
use serde::Deserialize;
use serde_json::Value;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

/// Liveness with basic counters.
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        uptime_secs: state.start_time.elapsed().as_secs(),
        requests: state.request_count.load(Ordering::Relaxed),
        mirror_configured: state.mirror.is_some(),
    })
}

/// Prometheus metrics in text exposition format.
pub async fn metrics() -> impl IntoResponse {
    (
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; version=0.0.4",
        )],
        METRICS.render(),
    )
}

fn count_request(state: &AppState) {
    state.request_count.fetch_add(1, Ordering::Relaxed);
    METRICS.requests_total.fetch_add(1, Ordering::Relaxed);
}

/// Stored settings, the parsed schedule, and the mirrored schedule for comparison.
pub async fn list_fee_config(
    State(state): State<Arc<AppState>>,
) -> Result<Json<FeeConfigResponse>, Error> {
    count_request(&state);
    let config = state.store.snapshot()?;

    let rpc_data = match &state.mirror {
        Some(mirror) => {
            METRICS.mirror_calls_total.fetch_add(1, Ordering::Relaxed);
            match mirror.fetch_config().await {
                Ok(c) => Some(c),
                Err(e) => {
                    METRICS.mirror_errors.fetch_add(1, Ordering::Relaxed);
                    error!(error = %e, "Error fetching payout fee config via mirror");
                    None
                }
            }
        }
        None => None,
    };

    let mismatched_keys = rpc_data
        .as_ref()
        .map(|m| compare_configs(&config, m))
        .unwrap_or_default();
    if !mismatched_keys.is_empty() {
        warn!(keys = ?mismatched_keys, "Stored and mirrored payout fee settings differ");
    }

    Ok(Json(FeeConfigResponse {
        data: state.store.entries(),
        config,
        rpc_data,
        mismatched_keys,
        can_write: true,
    }))
}

#[derive(Debug, Deserialize)]
pub struct UpdateRequest {
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub value: Option<Value>,
}

/// Update one setting. `value` may be a JSON string or number.
pub async fn update_fee_setting(
    State(state): State<Arc<AppState>>,
    Extension(req_id): Extension<RequestId>,
    body: Result<Json<UpdateRequest>, JsonRejection>,
) -> Result<Json<UpdateResponse>, Error> {
    count_request(&state);
    let result = apply_update(&state, body).await;
    match &result {
        Ok(row) => {
            METRICS.config_writes_total.fetch_add(1, Ordering::Relaxed);
            info!(req_id = %req_id.0, key = %row.key, value = %row.value, "Payout fee config updated");
        }
        Err(e) => {
            METRICS.config_writes_rejected.fetch_add(1, Ordering::Relaxed);
            warn!(req_id = %req_id.0, error = %e, "Payout fee config update rejected");
        }
    }
    result.map(|data| {
        Json(UpdateResponse {
            success: true,
            data,
        })
    })
}

async fn apply_update(
    state: &Arc<AppState>,
    body: Result<Json<UpdateRequest>, JsonRejection>,
) -> Result<crate::store::SettingRow, Error> {
    let Json(request) = body.map_err(|_| Error::BadRequest("Invalid JSON body".into()))?;

    let key = request.key.filter(|k| !k.is_empty());
    let raw = match request.value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Null) | None => None,
        Some(_) => return Err(Error::BadRequest("Value must be a string or number".into())),
    };
    let (Some(key), Some(raw)) = (key, raw) else {
        return Err(Error::BadRequest("Missing key or value".into()));
    };

    // The store writes its file under a lock.
    let state = Arc::clone(state);
    tokio::task::spawn_blocking(move || state.store.upsert(&key, &raw))
        .await
        .map_err(|e| Error::Store(format!("settings write task failed: {e}")))?
}

#[derive(Debug, Deserialize)]
pub struct PreviewQuery {
    pub method: String,
    pub amount_cents: i64,
}

/// Fee breakdown for one prospective payout under the current schedule.
pub async fn preview(
    State(state): State<Arc<AppState>>,
    query: Result<Query<PreviewQuery>, QueryRejection>,
) -> Result<Json<PreviewResponse>, Error> {
    count_request(&state);
    METRICS.previews_total.fetch_add(1, Ordering::Relaxed);

    let Query(query) = query.map_err(|e| Error::BadRequest(format!("Invalid query: {e}")))?;
    let method = PayoutMethod::parse_tag(&query.method)
        .ok_or_else(|| Error::BadRequest(format!("Unknown payout method: {}", query.method)))?;

    let config = state.store.snapshot()?;
    Ok(Json(PreviewResponse {
        method,
        description: describe_fee(method, &config),
        breakdown: get_breakdown_with_currency(
            method,
            query.amount_cents,
            &config,
            &state.config.currency,
        ),
    }))
}

/// Policy text for every method.
pub async fn describe(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<MethodDescription>>, Error> {
    count_request(&state);
    let config = state.store.snapshot()?;
    Ok(Json(
        PayoutMethod::ALL
            .into_iter()
            .map(|method| MethodDescription {
                method,
                description: describe_fee(method, &config),
            })
            .collect(),
    ))
}

/// Run the fee matrix and the net cases against the mirrored calculation.
pub async fn reconcile_with_mirror(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ReconcileResponse>, Error> {
    count_request(&state);
    let mirror = state.mirror()?;
    let start = Instant::now();
    let config = state.store.snapshot()?;

    let cases = reference_matrix();
    METRICS.mirror_calls_total.fetch_add(
        (cases.len() + NET_REFERENCE_CASES.len() + 1) as u64,
        Ordering::Relaxed,
    );
    // All mirror calls share one client timeout, well inside the router's.
    let (observed, net_observed, mirrored_config) = tokio::join!(
        mirror.observe(&cases),
        mirror.observe_net(&NET_REFERENCE_CASES),
        mirror.fetch_config(),
    );
    let (observed, net_observed, mirrored_config) = match (observed, net_observed, mirrored_config) {
        (Ok(o), Ok(n), Ok(c)) => (o, n, c),
        (Err(e), _, _) | (_, Err(e), _) | (_, _, Err(e)) => {
            METRICS.mirror_errors.fetch_add(1, Ordering::Relaxed);
            error!(error = %e, "Reconcile aborted: mirror unavailable");
            return Err(e);
        }
    };

    let report = reconcile(&config, &observed, &net_observed);
    let config_mismatches = compare_configs(&config, &mirrored_config);
    METRICS.record_reconcile(start, report.divergences.len() + report.net_divergences.len());

    if report.is_consistent() && config_mismatches.is_empty() {
        info!(checked = report.checked, "Mirrored fee calculation consistent");
    } else {
        warn!(
            checked = report.checked,
            divergences = report.divergences.len(),
            net_divergences = report.net_divergences.len(),
            config_mismatches = ?config_mismatches,
            "Mirrored fee calculation diverges"
        );
    }

    Ok(Json(ReconcileResponse {
        consistent: report.is_consistent(),
        checked: report.checked,
        divergences: report.divergences,
        net_divergences: report.net_divergences,
        config_mismatches,
    }))
}
