//! The in-process calculator against the database's `numeric` evaluation of
//! the same formulas. Both sides must agree on every integer cent.

use payout_fees::{
    compute_fee_cents, compute_fee_cents_for_tag, compute_net_cents, get_breakdown, ConfigError,
    FeeConfig, PayoutMethod, PLATFORM_FEE_CENTS,
};

use crate::utils::{sql_fee_cents, sql_net_cents, Rounding, StoredSchedule};

fn schedules() -> Vec<FeeConfig> {
    vec![
        FeeConfig::default(),
        FeeConfig {
            stripe_fixed_cents: 50,
            stripe_percentage: 0.5,
            paypal_percentage: 3.0,
            paypal_cap_cents: 1000,
            venmo_percentage: 3.0,
            venmo_cap_cents: 1000,
            bank_ach_cents: 50,
        },
        // Percentages with no exact binary representation.
        FeeConfig {
            stripe_fixed_cents: 30,
            stripe_percentage: 2.9,
            paypal_percentage: 3.49,
            paypal_cap_cents: 5000,
            venmo_percentage: 1.15,
            venmo_cap_cents: 1500,
            bank_ach_cents: 0,
        },
    ]
}

fn amounts() -> impl Iterator<Item = i64> {
    (-50..=2_000)
        .chain((2_000..=300_000).step_by(7))
        .chain([999_999, 1_000_000, 25_000_000])
}

#[test]
fn test_calculator_agrees_with_database_numeric() {
    for config in schedules() {
        let stored = StoredSchedule::from(&config);
        for method in PayoutMethod::ALL {
            for gross in amounts() {
                assert_eq!(
                    compute_fee_cents(method, gross, &config),
                    sql_fee_cents(&stored, method.as_str(), gross, Rounding::HalfUp),
                    "{method} {gross} {config:?}"
                );
            }
        }
    }
}

#[test]
fn test_half_cent_ties_round_up_on_both_sides() {
    let config = &schedules()[2];
    let stored = StoredSchedule::from(config);
    // 2.9% of 500 = 14.5, 1.15% of 1_000 = 11.5
    for (method, gross, fee) in [
        (PayoutMethod::StripeConnect, 500, 15 + 30),
        (PayoutMethod::Venmo, 1_000, 12),
    ] {
        assert_eq!(compute_fee_cents(method, gross, config), fee);
        assert_eq!(sql_fee_cents(&stored, method.as_str(), gross, Rounding::HalfUp), fee);
    }
}

#[test]
fn test_unknown_method_is_fee_free_on_both_sides() {
    let config = FeeConfig::default();
    let stored = StoredSchedule::from(&config);
    for tag in ["zelle", "", "PAYPAL", "bank-ach"] {
        assert_eq!(compute_fee_cents_for_tag(tag, 10_000, &config), 0);
        assert_eq!(sql_fee_cents(&stored, tag, 10_000, Rounding::HalfUp), 0);
    }
}

#[test]
fn test_documented_fee_examples() {
    let c = FeeConfig::default();
    assert_eq!(compute_fee_cents(PayoutMethod::StripeConnect, 10_000, &c), 50);
    assert_eq!(compute_fee_cents(PayoutMethod::StripeConnect, 100_000, &c), 275);
    assert_eq!(compute_fee_cents(PayoutMethod::Paypal, 5_000, &c), 100);
    assert_eq!(compute_fee_cents(PayoutMethod::Paypal, 200_000, &c), 2_000);
    assert_eq!(compute_fee_cents(PayoutMethod::Venmo, 200_000, &c), 2_000);
    assert_eq!(compute_fee_cents(PayoutMethod::BankAch, 10_000, &c), 25);
    assert_eq!(compute_fee_cents(PayoutMethod::BankAch, 0, &c), 0);
    assert_eq!(compute_net_cents(10_000, 0, 50), 9_950);
    assert_eq!(compute_net_cents(1_000, 900, 200), 0);
}

#[test]
fn test_breakdown_amounts_add_up() {
    for config in schedules() {
        for method in PayoutMethod::ALL {
            for gross in [1, 199, 5_000, 123_456, 10_000_000] {
                let b = get_breakdown(method, gross, &config);
                assert_eq!(b.platform_fee_cents, PLATFORM_FEE_CENTS);
                assert!(b.net_cents >= 0);
                if gross >= b.payout_fee_cents {
                    assert_eq!(b.net_cents + b.payout_fee_cents + b.platform_fee_cents, gross);
                } else {
                    assert_eq!(b.net_cents, 0);
                }
            }
        }
    }
}

#[test]
fn test_net_settlement_agrees_with_database() {
    for (gross, platform, payout) in [
        (10_000, 0, 50),
        (10_000, 500, 0),
        (1_000, 900, 200),
        (0, 0, 25),
        (25, 0, 25),
        (-100, 0, 0),
    ] {
        assert_eq!(
            compute_net_cents(gross, platform, payout),
            sql_net_cents(gross, platform, payout, true),
            "{gross} {platform} {payout}"
        );
    }
}

#[test]
fn test_percentage_beyond_f64_precision_is_never_stored() {
    // As `numeric` this is below half a percent; as f64 it is exactly 0.5.
    let raw = "0.49999999999999999";
    let mut stored = StoredSchedule::from(&FeeConfig::default());
    stored.set("payout_fee_stripe_percentage", raw);
    assert_eq!(sql_fee_cents(&stored, "stripe_connect", 100, Rounding::HalfUp), 25);
    let lossy = FeeConfig {
        stripe_percentage: 0.5,
        ..FeeConfig::default()
    };
    assert_eq!(compute_fee_cents(PayoutMethod::StripeConnect, 100, &lossy), 26);

    // So the calculator refuses the text outright.
    assert_eq!(
        FeeConfig::from_settings([("payout_fee_stripe_percentage", raw)]),
        Err(ConfigError::ImprecisePercentage(raw.to_string()))
    );
}
