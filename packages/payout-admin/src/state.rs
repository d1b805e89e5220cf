//! Application state shared across handlers.

use crate::config::Config;
use crate::mirror::MirrorClient;
use crate::store::SettingsStore;
use std::path::PathBuf;
use std::sync::atomic::AtomicU64;
use std::time::{Duration, Instant};
use tracing::info;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub store: SettingsStore,
    pub mirror: Option<MirrorClient>,
    pub start_time: Instant,
    pub request_count: AtomicU64,
}

impl AppState {
    /// Create application state from configuration.
    pub fn new(config: Config) -> Result<Self, crate::Error> {
        let store = if config.settings_path.is_empty() {
            info!("Settings kept in memory only");
            SettingsStore::in_memory()
        } else {
            SettingsStore::open(PathBuf::from(&config.settings_path))?
        };

        let mirror = match config.mirror_url() {
            Some(url) => {
                info!(url, "Mirrored fee calculation configured");
                Some(MirrorClient::new(
                    url,
                    config.mirror_api_key.clone(),
                    Duration::from_secs(config.request_timeout_secs),
                )?)
            }
            None => None,
        };

        Ok(Self::with_parts(config, store, mirror))
    }

    pub fn with_parts(config: Config, store: SettingsStore, mirror: Option<MirrorClient>) -> Self {
        Self {
            config,
            store,
            mirror,
            start_time: Instant::now(),
            request_count: AtomicU64::new(0),
        }
    }

    pub fn mirror(&self) -> Result<&MirrorClient, crate::Error> {
        self.mirror.as_ref().ok_or(crate::Error::MirrorUnavailable)
    }
}
