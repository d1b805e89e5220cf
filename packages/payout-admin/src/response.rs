//! Response types for the admin API.

use crate::store::SettingRow;
use payout_fees::{Divergence, FeeBreakdown, FeeConfig, NetDivergence, PayoutMethod};
use serde::Serialize;

/// Response from the health endpoint.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub uptime_secs: u64,
    pub requests: u64,
    pub mirror_configured: bool,
}

/// `GET /admin/payout-fees`.
#[derive(Serialize)]
pub struct FeeConfigResponse {
    pub data: Vec<SettingRow>,
    pub config: FeeConfig,
    /// Mirrored configuration; `null` if unconfigured or unreachable.
    pub rpc_data: Option<FeeConfig>,
    /// Keys whose stored and mirrored values differ.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub mismatched_keys: Vec<&'static str>,
    pub can_write: bool,
}

/// `POST /admin/payout-fees`.
#[derive(Serialize)]
pub struct UpdateResponse {
    pub success: bool,
    pub data: SettingRow,
}

/// `GET /admin/payout-fees/preview`.
#[derive(Serialize)]
pub struct PreviewResponse {
    pub method: PayoutMethod,
    pub description: String,
    #[serde(flatten)]
    pub breakdown: FeeBreakdown,
}

#[derive(Serialize)]
pub struct MethodDescription {
    pub method: PayoutMethod,
    pub description: String,
}

/// `GET /admin/payout-fees/reconcile`.
#[derive(Serialize)]
pub struct ReconcileResponse {
    pub consistent: bool,
    pub checked: usize,
    pub divergences: Vec<Divergence>,
    pub net_divergences: Vec<NetDivergence>,
    pub config_mismatches: Vec<&'static str>,
}
