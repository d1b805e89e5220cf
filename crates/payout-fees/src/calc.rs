//! Payout fee, net settlement, and display breakdown.
//!
//! ```text
//! stripe_connect  round(gross * pct / 100) + fixed
//! paypal, venmo   min(round(gross * pct / 100), cap)
//! bank_ach        flat
//! ```
//!
//! Non-positive amounts are always fee-free, including for `bank_ach`.

use crate::config::FeeConfig;
use crate::format::{DEFAULT_CURRENCY, format_currency};
use crate::method::PayoutMethod;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

/// Platform cut taken at payout time. Sellers only pay the provider fee.
pub const PLATFORM_FEE_CENTS: i64 = 0;

/// Provider fee in cents for paying out `gross_cents` via `method`.
pub fn compute_fee_cents(method: PayoutMethod, gross_cents: i64, config: &FeeConfig) -> i64 {
    if gross_cents <= 0 {
        return 0;
    }

    match method {
        PayoutMethod::StripeConnect => {
            percentage_fee(gross_cents, config.stripe_percentage)
                .saturating_add(config.stripe_fixed_cents)
        }
        PayoutMethod::Paypal => {
            percentage_fee(gross_cents, config.paypal_percentage).min(config.paypal_cap_cents)
        }
        PayoutMethod::Venmo => {
            percentage_fee(gross_cents, config.venmo_percentage).min(config.venmo_cap_cents)
        }
        PayoutMethod::BankAch => config.bank_ach_cents,
    }
}

/// Same as [`compute_fee_cents`] for a raw wire tag. Unknown tags cost nothing.
pub fn compute_fee_cents_for_tag(tag: &str, gross_cents: i64, config: &FeeConfig) -> i64 {
    PayoutMethod::parse_tag(tag)
        .map(|m| compute_fee_cents(m, gross_cents, config))
        .unwrap_or(0)
}

/// Seller's settlement after fees, floored at zero.
pub fn compute_net_cents(gross_cents: i64, platform_fee_cents: i64, payout_fee_cents: i64) -> i64 {
    gross_cents
        .saturating_sub(platform_fee_cents)
        .saturating_sub(payout_fee_cents)
        .max(0)
}

fn percentage_fee(gross_cents: i64, percentage: f64) -> i64 {
    // Float fallback only for values a validated config never holds.
    // `as` saturates out-of-range values and maps NaN to 0.
    exact_percentage_fee(gross_cents, percentage)
        .unwrap_or_else(|| (gross_cents as f64 * (percentage / 100.0)).round() as i64)
}

// The percentage is read at its shortest decimal form ("2.9", not the nearest
// binary fraction), the same value the database's numeric column holds, so
// 2.9% of 500 is exactly 14.5 and rounds to 15.
fn exact_percentage_fee(gross_cents: i64, percentage: f64) -> Option<i64> {
    let rate: Decimal = percentage.to_string().parse().ok()?;
    Decimal::from(gross_cents)
        .checked_mul(rate)?
        .checked_div(Decimal::ONE_HUNDRED)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
}

/// Per-payout amounts for display. Rebuilt on every request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeeBreakdown {
    pub gross_cents: i64,
    pub platform_fee_cents: i64,
    pub payout_fee_cents: i64,
    pub net_cents: i64,
    pub gross_formatted: String,
    pub platform_fee_formatted: String,
    pub payout_fee_formatted: String,
    pub net_formatted: String,
}

pub fn get_breakdown(method: PayoutMethod, gross_cents: i64, config: &FeeConfig) -> FeeBreakdown {
    get_breakdown_with_currency(method, gross_cents, config, DEFAULT_CURRENCY)
}

pub fn get_breakdown_with_currency(
    method: PayoutMethod,
    gross_cents: i64,
    config: &FeeConfig,
    currency: &str,
) -> FeeBreakdown {
    let payout_fee_cents = compute_fee_cents(method, gross_cents, config);
    let net_cents = compute_net_cents(gross_cents, PLATFORM_FEE_CENTS, payout_fee_cents);

    FeeBreakdown {
        gross_cents,
        platform_fee_cents: PLATFORM_FEE_CENTS,
        payout_fee_cents,
        net_cents,
        gross_formatted: format_currency(gross_cents, currency),
        platform_fee_formatted: format_currency(PLATFORM_FEE_CENTS, currency),
        payout_fee_formatted: format_currency(payout_fee_cents, currency),
        net_formatted: format_currency(net_cents, currency),
    }
}

/// Short policy text, e.g. `2% (max $20.00)`. Built from the same config
/// fields the formula reads.
pub fn describe_fee(method: PayoutMethod, config: &FeeConfig) -> String {
    let usd = |cents| format_currency(cents, DEFAULT_CURRENCY);
    match method {
        PayoutMethod::StripeConnect => format!(
            "{}% + {}",
            config.stripe_percentage,
            usd(config.stripe_fixed_cents)
        ),
        PayoutMethod::Paypal => format!(
            "{}% (max {})",
            config.paypal_percentage,
            usd(config.paypal_cap_cents)
        ),
        PayoutMethod::Venmo => format!(
            "{}% (max {})",
            config.venmo_percentage,
            usd(config.venmo_cap_cents)
        ),
        PayoutMethod::BankAch => usd(config.bank_ach_cents),
    }
}

pub fn describe_fee_for_tag(tag: &str, config: &FeeConfig) -> String {
    match PayoutMethod::parse_tag(tag) {
        Some(method) => describe_fee(method, config),
        None => "Unknown method".to_string(),
    }
}
