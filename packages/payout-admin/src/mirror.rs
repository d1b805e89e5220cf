//! Client for the fee logic mirrored in the hosted database.
//!
//! Exposes the `get_payout_fee_config`, `calculate_payout_fee_cents` and
//! `compute_net_payout_cents` RPC functions over the database's REST gateway. Only used to cross-check the
//! in-process calculator, never as its source of truth.

use crate::Error;
use payout_fees::{FeeConfig, NetObservation, Observation, PayoutMethod};
use serde_json::{json, Value};
use std::future::Future;
use std::time::Duration;
use tokio::task::JoinSet;
use tracing::{debug, warn};

#[derive(Clone)]
pub struct MirrorClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl MirrorClient {
    pub fn new(base_url: &str, api_key: Option<String>, timeout: Duration) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("Failed to build mirror HTTP client: {e}")))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.is_empty()),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Mirrored configuration snapshot (first row of the RPC result).
    pub async fn fetch_config(&self) -> Result<FeeConfig, Error> {
        let body = self.call("get_payout_fee_config", json!({})).await?;
        parse_config_rows(body)
    }

    /// Fee computed by the mirrored implementation.
    pub async fn fetch_fee(&self, method: PayoutMethod, gross_cents: i64) -> Result<i64, Error> {
        let body = self
            .call(
                "calculate_payout_fee_cents",
                json!({ "p_method_type": method.as_str(), "p_amount_cents": gross_cents }),
            )
            .await?;
        parse_cents("calculate_payout_fee_cents", &body)
    }

    /// Net settlement computed by the mirrored implementation.
    pub async fn fetch_net(
        &self,
        gross_cents: i64,
        platform_fee_cents: i64,
        payout_fee_cents: i64,
    ) -> Result<i64, Error> {
        let body = self
            .call(
                "compute_net_payout_cents",
                json!({
                    "p_gross_cents": gross_cents,
                    "p_platform_fee_cents": platform_fee_cents,
                    "p_payout_fee_cents": payout_fee_cents,
                }),
            )
            .await?;
        parse_cents("compute_net_payout_cents", &body)
    }

    /// Mirrored fee for every `(method, amount)` case.
    pub async fn observe(&self, cases: &[(PayoutMethod, i64)]) -> Result<Vec<Observation>, Error> {
        self.fan_out(cases, |client, (method, gross_cents)| async move {
            let mirrored_cents = client.fetch_fee(method, gross_cents).await?;
            Ok(Observation {
                method,
                gross_cents,
                mirrored_cents,
            })
        })
        .await
    }

    /// Mirrored net settlement for every `(gross, platform fee, payout fee)` case.
    pub async fn observe_net(&self, cases: &[(i64, i64, i64)]) -> Result<Vec<NetObservation>, Error> {
        self.fan_out(cases, |client, (gross_cents, platform_fee_cents, payout_fee_cents)| async move {
            let mirrored_cents = client
                .fetch_net(gross_cents, platform_fee_cents, payout_fee_cents)
                .await?;
            Ok(NetObservation {
                gross_cents,
                platform_fee_cents,
                payout_fee_cents,
                mirrored_cents,
            })
        })
        .await
    }

    // Run one call per case concurrently; fails on the first error. Results
    // keep the order of `cases`.
    async fn fan_out<C, T, F, Fut>(&self, cases: &[C], call: F) -> Result<Vec<T>, Error>
    where
        C: Copy,
        T: Send + 'static,
        F: Fn(MirrorClient, C) -> Fut,
        Fut: Future<Output = Result<T, Error>> + Send + 'static,
    {
        let mut tasks = JoinSet::new();
        for (idx, &case) in cases.iter().enumerate() {
            let fut = call(self.clone(), case);
            tasks.spawn(async move { fut.await.map(|value| (idx, value)) });
        }

        let mut out = Vec::with_capacity(cases.len());
        while let Some(joined) = tasks.join_next().await {
            let entry = joined.map_err(|e| Error::Mirror(format!("mirror task failed: {e}")))??;
            out.push(entry);
        }
        out.sort_by_key(|(idx, _)| *idx);
        Ok(out.into_iter().map(|(_, value)| value).collect())
    }

    async fn call(&self, function: &str, args: Value) -> Result<Value, Error> {
        let url = format!("{}/rest/v1/rpc/{function}", self.base_url);
        debug!(url = %url, "Mirror RPC call");

        let mut req = self.http.post(&url).json(&args);
        if let Some(key) = &self.api_key {
            req = req.header("apikey", key).bearer_auth(key);
        }

        let resp = req.send().await.map_err(|e| {
            warn!(function, error = %e, "Mirror RPC request failed");
            Error::Mirror(format!("{function}: {e}"))
        })?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            warn!(function, status = status.as_u16(), body = %text, "Mirror RPC returned error");
            return Err(Error::Mirror(format!("{function}: HTTP {status}")));
        }

        resp.json::<Value>()
            .await
            .map_err(|e| Error::Mirror(format!("{function}: invalid JSON: {e}")))
    }
}

fn parse_config_rows(body: Value) -> Result<FeeConfig, Error> {
    let row = match body {
        Value::Array(rows) => rows.into_iter().next(),
        obj @ Value::Object(_) => Some(obj),
        _ => None,
    }
    .ok_or_else(|| Error::Mirror("get_payout_fee_config: no rows".into()))?;
    let config: FeeConfig = serde_json::from_value(row)
        .map_err(|e| Error::Mirror(format!("get_payout_fee_config: {e}")))?;
    config
        .validate()
        .map_err(|e| Error::Mirror(format!("get_payout_fee_config: {e}")))?;
    Ok(config)
}

// Integer results may come back as JSON numbers or numeric strings.
fn parse_cents(function: &str, body: &Value) -> Result<i64, Error> {
    let parsed = match body {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| Error::Mirror(format!("{function}: unexpected result {body}")))
}
