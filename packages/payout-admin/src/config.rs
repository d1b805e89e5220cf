//! Service configuration.

use serde::Deserialize;

/// Configuration for the payout fee admin service.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "defaults::bind_address")]
    pub bind_address: String,

    /// JSON file backing the settings store. Empty keeps settings in memory only.
    #[serde(default = "defaults::settings_path")]
    pub settings_path: String,

    /// ISO code used for formatted amounts in previews.
    #[serde(default = "defaults::currency")]
    pub currency: String,

    /// Base URL of the hosted database REST API holding the mirrored fee logic.
    #[serde(default)]
    pub mirror_url: Option<String>,

    #[serde(default)]
    pub mirror_api_key: Option<String>,

    /// Staff API key for `/admin` routes. Unset = dev mode (no auth).
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "defaults::request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: defaults::bind_address(),
            settings_path: defaults::settings_path(),
            currency: defaults::currency(),
            mirror_url: None,
            mirror_api_key: None,
            api_key: None,
            request_timeout_secs: defaults::request_timeout_secs(),
        }
    }
}

impl Config {
    /// In-memory settings, no mirror, no auth.
    pub fn for_testing() -> Self {
        Self {
            settings_path: String::new(),
            ..Self::default()
        }
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|k| !k.is_empty())
    }

    pub fn mirror_url(&self) -> Option<&str> {
        self.mirror_url.as_deref().filter(|u| !u.is_empty())
    }
}

mod defaults {
    pub fn bind_address() -> String {
        "0.0.0.0:3050".into()
    }

    pub fn settings_path() -> String {
        "./data/payout_fee_settings.json".into()
    }

    pub fn currency() -> String {
        payout_fees::DEFAULT_CURRENCY.into()
    }

    pub fn request_timeout_secs() -> u64 {
        10
    }
}
