//! Cross-check against the mirrored fee and net settlement calculations kept
//! in the hosted database.
//!
//! The two implementations are maintained separately; any difference in
//! integer cents for the same inputs is a bug on one side.

use crate::calc::{compute_fee_cents, compute_net_cents};
use crate::config::{FeeConfig, FeeSetting};
use crate::method::PayoutMethod;
use serde::{Deserialize, Serialize};

/// Amounts checked for every method: non-positive, rounding ties, cap edges.
pub const REFERENCE_AMOUNTS: [i64; 14] = [
    -100, 0, 1, 50, 100, 199, 200, 1_000, 5_000, 10_000, 99_999, 100_000, 200_000, 1_000_000,
];

/// `(gross, platform fee, payout fee)` cases checked against the mirrored net
/// settlement, including the clamp at zero.
pub const NET_REFERENCE_CASES: [(i64, i64, i64); 8] = [
    (10_000, 0, 50),
    (10_000, 0, 0),
    (10_000, 500, 0),
    (10_000, 200, 50),
    (1_000, 900, 200),
    (0, 0, 25),
    (25, 0, 25),
    (-100, 0, 0),
];

/// Fee reported by the mirrored calculation for one case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    pub method: PayoutMethod,
    pub gross_cents: i64,
    pub mirrored_cents: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Divergence {
    pub method: PayoutMethod,
    pub gross_cents: i64,
    pub local_cents: i64,
    pub mirrored_cents: i64,
}

/// Net settlement reported by the mirrored calculation for one case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetObservation {
    pub gross_cents: i64,
    pub platform_fee_cents: i64,
    pub payout_fee_cents: i64,
    pub mirrored_cents: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetDivergence {
    pub gross_cents: i64,
    pub platform_fee_cents: i64,
    pub payout_fee_cents: i64,
    pub local_cents: i64,
    pub mirrored_cents: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    /// Fee and net cases compared.
    pub checked: usize,
    pub divergences: Vec<Divergence>,
    pub net_divergences: Vec<NetDivergence>,
}

impl ReconcileReport {
    pub fn is_consistent(&self) -> bool {
        self.divergences.is_empty() && self.net_divergences.is_empty()
    }
}

/// Every method crossed with [`REFERENCE_AMOUNTS`].
pub fn reference_matrix() -> Vec<(PayoutMethod, i64)> {
    PayoutMethod::ALL
        .iter()
        .flat_map(|m| REFERENCE_AMOUNTS.iter().map(move |a| (*m, *a)))
        .collect()
}

/// Recompute each observed case locally and collect mismatches.
pub fn reconcile(
    config: &FeeConfig,
    observations: &[Observation],
    net_observations: &[NetObservation],
) -> ReconcileReport {
    let divergences = observations
        .iter()
        .filter_map(|o| {
            let local_cents = compute_fee_cents(o.method, o.gross_cents, config);
            (local_cents != o.mirrored_cents).then_some(Divergence {
                method: o.method,
                gross_cents: o.gross_cents,
                local_cents,
                mirrored_cents: o.mirrored_cents,
            })
        })
        .collect();

    let net_divergences = net_observations
        .iter()
        .filter_map(|o| {
            let local_cents =
                compute_net_cents(o.gross_cents, o.platform_fee_cents, o.payout_fee_cents);
            (local_cents != o.mirrored_cents).then_some(NetDivergence {
                gross_cents: o.gross_cents,
                platform_fee_cents: o.platform_fee_cents,
                payout_fee_cents: o.payout_fee_cents,
                local_cents,
                mirrored_cents: o.mirrored_cents,
            })
        })
        .collect();

    ReconcileReport {
        checked: observations.len() + net_observations.len(),
        divergences,
        net_divergences,
    }
}

/// Setting keys whose values differ between two snapshots.
pub fn compare_configs(local: &FeeConfig, mirrored: &FeeConfig) -> Vec<&'static str> {
    FeeSetting::ALL
        .into_iter()
        .filter(|s| local.value_of(*s) != mirrored.value_of(*s))
        .map(FeeSetting::key)
        .collect()
}
