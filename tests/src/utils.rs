//! Shared helpers: an in-process admin service and a fake hosted database
//! serving the mirrored fee RPCs over the same REST shape as the real one.

use anyhow::Result;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use payout_admin::{AppState, Config};
use payout_fees::FeeConfig;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

pub const DB_API_KEY: &str = "service-role-test-key";

/// How the fake database rounds percentage components.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rounding {
    /// `ROUND()` on `numeric`: half away from zero.
    HalfUp,
    /// A broken mirror that casts instead of rounding.
    Truncate,
}

/// Fee settings the way the database holds them: text, read as `numeric`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredSchedule(BTreeMap<String, String>);

impl StoredSchedule {
    /// Store `raw` under `key` verbatim, without the admin's validation.
    pub fn set(&mut self, key: &str, raw: &str) {
        self.0.insert(key.to_string(), raw.to_string());
    }

    fn raw(&self, field: &str) -> &str {
        self.0
            .get(&format!("payout_fee_{field}"))
            .map(String::as_str)
            .unwrap_or("0")
    }

    // A `numeric` holds the stored text exactly.
    fn numeric(&self, field: &str) -> Decimal {
        let raw = self.raw(field).trim();
        Decimal::from_str_exact(raw)
            .or_else(|_| Decimal::from_scientific(raw))
            .unwrap()
    }

    fn cents(&self, field: &str) -> i64 {
        self.raw(field).trim().parse().unwrap()
    }

    /// The `get_payout_fee_config` row: every field as a JSON number.
    fn row(&self) -> Value {
        let row: serde_json::Map<String, Value> = self
            .0
            .iter()
            .filter_map(|(key, raw)| {
                let field = key.strip_prefix("payout_fee_")?;
                Some((field.to_string(), serde_json::from_str(raw.trim()).unwrap()))
            })
            .collect();
        Value::Object(row)
    }
}

impl From<&FeeConfig> for StoredSchedule {
    fn from(config: &FeeConfig) -> Self {
        Self(
            config
                .to_settings()
                .into_iter()
                .map(|(key, raw)| (key.to_string(), raw))
                .collect(),
        )
    }
}

/// Stand-in for the hosted database holding the mirrored fee logic.
pub struct FakeDatabase {
    schedule: Mutex<StoredSchedule>,
    rounding: Rounding,
    down: AtomicBool,
    clamp_net: AtomicBool,
    delay_ms: AtomicU64,
    pub calls: AtomicU64,
}

impl FakeDatabase {
    pub fn new(config: FeeConfig) -> Arc<Self> {
        Self::with_rounding(config, Rounding::HalfUp)
    }

    pub fn with_rounding(config: FeeConfig, rounding: Rounding) -> Arc<Self> {
        Arc::new(Self {
            schedule: Mutex::new(StoredSchedule::from(&config)),
            rounding,
            down: AtomicBool::new(false),
            clamp_net: AtomicBool::new(true),
            delay_ms: AtomicU64::new(0),
            calls: AtomicU64::new(0),
        })
    }

    pub fn set_config(&self, config: FeeConfig) {
        *self.schedule.lock().unwrap() = StoredSchedule::from(&config);
    }

    /// Write one setting's stored text directly.
    pub fn set_setting(&self, key: &str, raw: &str) {
        self.schedule.lock().unwrap().set(key, raw);
    }

    /// Every RPC answers 500 while down.
    pub fn set_down(&self, down: bool) {
        self.down.store(down, Ordering::SeqCst);
    }

    /// With the clamp off, net settlement goes negative when fees exceed gross.
    pub fn set_clamp_net(&self, clamp: bool) {
        self.clamp_net.store(clamp, Ordering::SeqCst);
    }

    /// Hold every RPC answer for `delay`.
    pub fn set_delay(&self, delay: Duration) {
        self.delay_ms.store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    fn schedule(&self) -> StoredSchedule {
        self.schedule.lock().unwrap().clone()
    }

    async fn check(&self, headers: &HeaderMap) -> Result<(), StatusCode> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let delay = self.delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        if self.down.load(Ordering::SeqCst) {
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
        let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());
        let bearer = format!("Bearer {DB_API_KEY}");
        if header("apikey") != Some(DB_API_KEY) || header("authorization") != Some(bearer.as_str()) {
            return Err(StatusCode::UNAUTHORIZED);
        }
        Ok(())
    }
}

/// The mirrored `calculate_payout_fee_cents` function, evaluated the way the
/// database does: `ROUND(p_amount_cents * (pct / 100))` over `numeric`.
pub fn sql_fee_cents(
    schedule: &StoredSchedule,
    method: &str,
    amount_cents: i64,
    rounding: Rounding,
) -> i64 {
    if amount_cents <= 0 {
        return 0;
    }
    let strategy = match rounding {
        Rounding::HalfUp => RoundingStrategy::MidpointAwayFromZero,
        Rounding::Truncate => RoundingStrategy::ToZero,
    };
    let pct_fee = |field: &str| {
        (Decimal::from(amount_cents) * (schedule.numeric(field) / Decimal::ONE_HUNDRED))
            .round_dp_with_strategy(0, strategy)
            .to_i64()
            .unwrap()
    };
    match method {
        "stripe_connect" => pct_fee("stripe_percentage") + schedule.cents("stripe_fixed_cents"),
        "paypal" => pct_fee("paypal_percentage").min(schedule.cents("paypal_cap_cents")),
        "venmo" => pct_fee("venmo_percentage").min(schedule.cents("venmo_cap_cents")),
        "bank_ach" => schedule.cents("bank_ach_cents"),
        _ => 0,
    }
}

/// The mirrored `compute_net_payout_cents`: `GREATEST(gross - platform - payout, 0)`.
pub fn sql_net_cents(gross_cents: i64, platform_fee_cents: i64, payout_fee_cents: i64, clamp: bool) -> i64 {
    let net = gross_cents - platform_fee_cents - payout_fee_cents;
    if clamp {
        net.max(0)
    } else {
        net
    }
}

async fn get_payout_fee_config(
    State(db): State<Arc<FakeDatabase>>,
    headers: HeaderMap,
) -> Result<Json<Value>, StatusCode> {
    db.check(&headers).await?;
    Ok(Json(json!([db.schedule().row()])))
}

async fn calculate_payout_fee_cents(
    State(db): State<Arc<FakeDatabase>>,
    headers: HeaderMap,
    Json(args): Json<Value>,
) -> Result<Json<Value>, StatusCode> {
    db.check(&headers).await?;
    let method = args["p_method_type"].as_str().unwrap_or_default();
    let amount = args["p_amount_cents"]
        .as_i64()
        .ok_or(StatusCode::BAD_REQUEST)?;
    Ok(Json(json!(sql_fee_cents(
        &db.schedule(),
        method,
        amount,
        db.rounding
    ))))
}

async fn compute_net_payout_cents(
    State(db): State<Arc<FakeDatabase>>,
    headers: HeaderMap,
    Json(args): Json<Value>,
) -> Result<Json<Value>, StatusCode> {
    db.check(&headers).await?;
    let arg = |name: &str| args[name].as_i64().ok_or(StatusCode::BAD_REQUEST);
    Ok(Json(json!(sql_net_cents(
        arg("p_gross_cents")?,
        arg("p_platform_fee_cents")?,
        arg("p_payout_fee_cents")?,
        db.clamp_net.load(Ordering::SeqCst),
    ))))
}

pub fn database_router(db: Arc<FakeDatabase>) -> Router {
    Router::new()
        .route("/rest/v1/rpc/get_payout_fee_config", post(get_payout_fee_config))
        .route(
            "/rest/v1/rpc/calculate_payout_fee_cents",
            post(calculate_payout_fee_cents),
        )
        .route(
            "/rest/v1/rpc/compute_net_payout_cents",
            post(compute_net_payout_cents),
        )
        .with_state(db)
}

/// Serve `app` on an ephemeral local port for the rest of the test.
pub async fn serve(app: Router) -> Result<SocketAddr> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(addr)
}

/// Base URL of a freshly started fake database.
pub async fn spawn_database(db: Arc<FakeDatabase>) -> Result<String> {
    let addr = serve(database_router(db)).await?;
    Ok(format!("http://{addr}"))
}

/// In-memory admin config pointing at `mirror_url`.
pub fn admin_config(mirror_url: Option<String>) -> Config {
    Config {
        mirror_url,
        mirror_api_key: Some(DB_API_KEY.into()),
        request_timeout_secs: 5,
        ..Config::for_testing()
    }
}

/// Base URL of a freshly started admin service.
pub async fn spawn_admin(config: Config) -> Result<String> {
    let state = Arc::new(AppState::new(config)?);
    let addr = serve(payout_admin::create_router(state)).await?;
    Ok(format!("http://{addr}"))
}

/// Unique settings file path under the system temp dir.
pub fn temp_settings_path(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "payout-admin-it-{name}-{}",
        std::process::id()
    ));
    let _ = std::fs::remove_dir_all(&dir);
    dir.join("settings.json")
}

pub async fn post_setting(
    client: &reqwest::Client,
    base: &str,
    key: &str,
    value: Value,
) -> Result<(reqwest::StatusCode, Value)> {
    let resp = client
        .post(format!("{base}/admin/payout-fees"))
        .json(&json!({ "key": key, "value": value }))
        .send()
        .await?;
    let status = resp.status();
    Ok((status, resp.json().await?))
}

pub async fn get_json(client: &reqwest::Client, url: &str) -> Result<(reqwest::StatusCode, Value)> {
    let resp = client.get(url).send().await?;
    let status = resp.status();
    Ok((status, resp.json().await?))
}
