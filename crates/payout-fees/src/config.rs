//! Fee configuration record and the typed schema of its stored settings.
//!
//! Settings are stored as strings under `payout_fee_<field>` keys. The key
//! suffix (`_percentage` or `_cents`) decides how the value is parsed.

use crate::error::ConfigError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Prefix shared by every payout fee setting key.
pub const SETTING_KEY_PREFIX: &str = "payout_fee_";

const PERCENTAGE_SUFFIX: &str = "_percentage";

/// Snapshot of the active fee schedule. Percentages are in percent (0.25 = 0.25%).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeConfig {
    pub stripe_fixed_cents: i64,
    pub stripe_percentage: f64,
    pub paypal_percentage: f64,
    pub paypal_cap_cents: i64,
    pub venmo_percentage: f64,
    pub venmo_cap_cents: i64,
    /// Flat ACH fee, independent of amount.
    pub bank_ach_cents: i64,
}

impl Default for FeeConfig {
    fn default() -> Self {
        Self {
            stripe_fixed_cents: 25,
            stripe_percentage: 0.25,
            paypal_percentage: 2.0,
            paypal_cap_cents: 2000,
            venmo_percentage: 2.0,
            venmo_cap_cents: 2000,
            bank_ach_cents: 25,
        }
    }
}

impl FeeConfig {
    /// Build from stored `(key, value)` rows. Missing settings keep their
    /// defaults; keys outside the payout fee schema are skipped.
    pub fn from_settings<'a, I>(rows: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut config = Self::default();
        for (key, raw) in rows {
            if let Ok(setting) = FeeSetting::from_key(key) {
                config.set(setting, raw)?;
            }
        }
        Ok(config)
    }

    /// Stored form of every setting, in `FeeSetting::ALL` order.
    pub fn to_settings(&self) -> Vec<(&'static str, String)> {
        FeeSetting::ALL
            .iter()
            .map(|s| (s.key(), self.value_of(*s).to_string()))
            .collect()
    }

    /// Parse `raw` for `setting` and write it. The record is unchanged on error.
    pub fn set(&mut self, setting: FeeSetting, raw: &str) -> Result<(), ConfigError> {
        let value = setting.parse_value(raw)?;
        self.apply(setting, value);
        Ok(())
    }

    /// Write an already validated value. A value of the wrong kind is ignored.
    pub fn apply(&mut self, setting: FeeSetting, value: SettingValue) {
        match (setting, value) {
            (FeeSetting::StripeFixedCents, SettingValue::Cents(v)) => self.stripe_fixed_cents = v,
            (FeeSetting::StripePercentage, SettingValue::Percentage(v)) => {
                self.stripe_percentage = v
            }
            (FeeSetting::PaypalPercentage, SettingValue::Percentage(v)) => {
                self.paypal_percentage = v
            }
            (FeeSetting::PaypalCapCents, SettingValue::Cents(v)) => self.paypal_cap_cents = v,
            (FeeSetting::VenmoPercentage, SettingValue::Percentage(v)) => {
                self.venmo_percentage = v
            }
            (FeeSetting::VenmoCapCents, SettingValue::Cents(v)) => self.venmo_cap_cents = v,
            (FeeSetting::BankAchCents, SettingValue::Cents(v)) => self.bank_ach_cents = v,
            _ => {}
        }
    }

    pub fn value_of(&self, setting: FeeSetting) -> SettingValue {
        match setting {
            FeeSetting::StripeFixedCents => SettingValue::Cents(self.stripe_fixed_cents),
            FeeSetting::StripePercentage => SettingValue::Percentage(self.stripe_percentage),
            FeeSetting::PaypalPercentage => SettingValue::Percentage(self.paypal_percentage),
            FeeSetting::PaypalCapCents => SettingValue::Cents(self.paypal_cap_cents),
            FeeSetting::VenmoPercentage => SettingValue::Percentage(self.venmo_percentage),
            FeeSetting::VenmoCapCents => SettingValue::Cents(self.venmo_cap_cents),
            FeeSetting::BankAchCents => SettingValue::Cents(self.bank_ach_cents),
        }
    }

    /// Whole-record check for snapshots that did not come through `set`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for setting in FeeSetting::ALL {
            let ok = match self.value_of(setting) {
                SettingValue::Percentage(p) => p.is_finite() && (0.0..=100.0).contains(&p),
                SettingValue::Cents(c) => c >= 0,
            };
            if !ok {
                return Err(ConfigError::OutOfRange(setting.field()));
            }
        }
        Ok(())
    }
}

/// How a setting's stored string is parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SettingKind {
    Percentage,
    Cents,
}

/// A parsed setting value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SettingValue {
    Percentage(f64),
    Cents(i64),
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingValue::Percentage(p) => write!(f, "{p}"),
            SettingValue::Cents(c) => write!(f, "{c}"),
        }
    }
}

/// One stored payout fee setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeeSetting {
    StripeFixedCents,
    StripePercentage,
    PaypalPercentage,
    PaypalCapCents,
    VenmoPercentage,
    VenmoCapCents,
    BankAchCents,
}

impl FeeSetting {
    pub const ALL: [FeeSetting; 7] = [
        FeeSetting::StripeFixedCents,
        FeeSetting::StripePercentage,
        FeeSetting::PaypalPercentage,
        FeeSetting::PaypalCapCents,
        FeeSetting::VenmoPercentage,
        FeeSetting::VenmoCapCents,
        FeeSetting::BankAchCents,
    ];

    /// Storage key, e.g. `payout_fee_paypal_cap_cents`.
    pub const fn key(self) -> &'static str {
        match self {
            FeeSetting::StripeFixedCents => "payout_fee_stripe_fixed_cents",
            FeeSetting::StripePercentage => "payout_fee_stripe_percentage",
            FeeSetting::PaypalPercentage => "payout_fee_paypal_percentage",
            FeeSetting::PaypalCapCents => "payout_fee_paypal_cap_cents",
            FeeSetting::VenmoPercentage => "payout_fee_venmo_percentage",
            FeeSetting::VenmoCapCents => "payout_fee_venmo_cap_cents",
            FeeSetting::BankAchCents => "payout_fee_bank_ach_cents",
        }
    }

    /// `FeeConfig` field name (key without prefix).
    pub fn field(self) -> &'static str {
        &self.key()[SETTING_KEY_PREFIX.len()..]
    }

    pub fn kind(self) -> SettingKind {
        if self.key().ends_with(PERCENTAGE_SUFFIX) {
            SettingKind::Percentage
        } else {
            SettingKind::Cents
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            FeeSetting::StripeFixedCents => "Stripe Connect fixed fee per payout (cents)",
            FeeSetting::StripePercentage => "Stripe Connect percentage fee",
            FeeSetting::PaypalPercentage => "PayPal percentage fee",
            FeeSetting::PaypalCapCents => "PayPal maximum fee (cents)",
            FeeSetting::VenmoPercentage => "Venmo percentage fee",
            FeeSetting::VenmoCapCents => "Venmo maximum fee (cents)",
            FeeSetting::BankAchCents => "Bank ACH flat fee (cents)",
        }
    }

    pub fn from_key(key: &str) -> Result<Self, ConfigError> {
        Self::ALL
            .into_iter()
            .find(|s| s.key() == key)
            .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))
    }

    /// Validate a raw stored string for this setting.
    pub fn parse_value(self, raw: &str) -> Result<SettingValue, ConfigError> {
        let trimmed = raw.trim();
        match self.kind() {
            SettingKind::Percentage => match trimmed.parse::<f64>() {
                Ok(p) if p.is_finite() && (0.0..=100.0).contains(&p) => {
                    if !same_decimal(trimmed, p) {
                        return Err(ConfigError::ImprecisePercentage(raw.to_string()));
                    }
                    Ok(SettingValue::Percentage(p))
                }
                _ => Err(ConfigError::InvalidPercentage(raw.to_string())),
            },
            SettingKind::Cents => match trimmed.parse::<i64>() {
                Ok(c) if c >= 0 => Ok(SettingValue::Cents(c)),
                _ => Err(ConfigError::InvalidCents(raw.to_string())),
            },
        }
    }

    /// Seed value written on first start.
    pub fn default_value(self) -> String {
        FeeConfig::default().value_of(self).to_string()
    }
}

// The database evaluates the stored string as `numeric`; the calculator sees
// the f64. A value is only accepted if both denote the same decimal.
fn same_decimal(raw: &str, parsed: f64) -> bool {
    let stored = if raw.contains(['e', 'E']) {
        Decimal::from_scientific(raw)
    } else {
        Decimal::from_str_exact(raw)
    };
    match (stored, Decimal::from_str_exact(&parsed.to_string())) {
        (Ok(stored), Ok(seen)) => stored == seen,
        _ => false,
    }
}
