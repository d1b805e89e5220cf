//! Payout settlement channels.

use crate::error::UnknownMethod;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Settlement channel chosen when a payout is created. Selects the fee formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayoutMethod {
    /// Percentage plus fixed fee, uncapped.
    StripeConnect,
    /// Percentage, capped.
    Paypal,
    /// Percentage, capped.
    Venmo,
    /// Flat fee.
    BankAch,
}

impl PayoutMethod {
    pub const ALL: [PayoutMethod; 4] = [
        PayoutMethod::StripeConnect,
        PayoutMethod::Paypal,
        PayoutMethod::Venmo,
        PayoutMethod::BankAch,
    ];

    /// Wire tag, as stored on payout records.
    pub const fn as_str(self) -> &'static str {
        match self {
            PayoutMethod::StripeConnect => "stripe_connect",
            PayoutMethod::Paypal => "paypal",
            PayoutMethod::Venmo => "venmo",
            PayoutMethod::BankAch => "bank_ach",
        }
    }

    /// `None` for anything outside the four tags. Exact match, no trimming or case folding.
    pub fn parse_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.as_str() == tag)
    }
}

impl fmt::Display for PayoutMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PayoutMethod {
    type Err = UnknownMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_tag(s).ok_or_else(|| UnknownMethod(s.to_string()))
    }
}
