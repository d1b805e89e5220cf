//! Payout fee schedule and settlement math for the marketplace admin portal.
//! Pure functions over a `FeeConfig` snapshot. No I/O, no shared state; callers
//! load the configuration and pass it in.

mod calc;
mod config;
mod error;
mod format;
mod method;
mod reconcile;

pub use calc::{
    FeeBreakdown, PLATFORM_FEE_CENTS, compute_fee_cents, compute_fee_cents_for_tag,
    compute_net_cents, describe_fee, describe_fee_for_tag, get_breakdown,
    get_breakdown_with_currency,
};
pub use config::{FeeConfig, FeeSetting, SETTING_KEY_PREFIX, SettingKind, SettingValue};
pub use error::{ConfigError, UnknownMethod};
pub use format::{DEFAULT_CURRENCY, format_currency, format_usd};
pub use method::PayoutMethod;
pub use reconcile::{
    Divergence, NET_REFERENCE_CASES, NetDivergence, NetObservation, Observation,
    REFERENCE_AMOUNTS, ReconcileReport, compare_configs, reconcile, reference_matrix,
};
