//! String-valued settings store with optional JSON file persistence.
//!
//! Values are validated through `FeeSetting` before they are persisted, so the
//! calculator only ever sees well-formed snapshots. Writes go to disk first
//! (tmp + rename) and then to memory; a failed write changes nothing.

use crate::Error;
use payout_fees::{FeeConfig, FeeSetting};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{info, warn};

#[derive(Serialize, Deserialize, Default)]
struct StoredSettings {
    settings: BTreeMap<String, String>,
}

/// One stored setting row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SettingRow {
    pub key: String,
    pub value: String,
}

pub struct SettingsStore {
    path: Option<PathBuf>,
    entries: RwLock<BTreeMap<String, String>>,
}

impl SettingsStore {
    /// Memory-only store seeded with defaults.
    pub fn in_memory() -> Self {
        let mut entries = BTreeMap::new();
        seed_defaults(&mut entries);
        Self {
            path: None,
            entries: RwLock::new(entries),
        }
    }

    /// Load `path` (if present), seed missing settings with defaults, and
    /// persist the seeded result. Fails if a stored value is malformed.
    pub fn open(path: PathBuf) -> Result<Self, Error> {
        let mut entries = if path.exists() {
            let data = std::fs::read(&path)
                .map_err(|e| Error::Store(format!("Failed to read settings: {e}")))?;
            let stored: StoredSettings = serde_json::from_slice(&data)
                .map_err(|e| Error::Store(format!("Failed to parse settings: {e}")))?;
            info!(path = %path.display(), count = stored.settings.len(), "Settings loaded");
            stored.settings
        } else {
            info!(path = %path.display(), "No settings file found, seeding defaults");
            BTreeMap::new()
        };

        let seeded = seed_defaults(&mut entries);

        FeeConfig::from_settings(entries.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .map_err(|e| Error::Config(format!("Stored payout fee setting rejected: {e}")))?;

        let store = Self {
            path: Some(path),
            entries: RwLock::new(BTreeMap::new()),
        };
        if seeded > 0 {
            store.persist(&entries)?;
        }
        *store.write() = entries;
        Ok(store)
    }

    /// Current fee schedule.
    pub fn snapshot(&self) -> Result<FeeConfig, Error> {
        let entries = self.read();
        FeeConfig::from_settings(entries.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .map_err(|e| Error::Store(format!("Stored payout fee setting rejected: {e}")))
    }

    /// Payout fee rows ordered by key. Other settings sharing the file are omitted.
    pub fn entries(&self) -> Vec<SettingRow> {
        self.read()
            .iter()
            .filter(|(k, _)| FeeSetting::from_key(k).is_ok())
            .map(|(k, v)| SettingRow {
                key: k.clone(),
                value: v.clone(),
            })
            .collect()
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.read().get(key).cloned()
    }

    /// Validate and store one setting. Returns the stored row.
    pub fn upsert(&self, key: &str, raw: &str) -> Result<SettingRow, Error> {
        let setting = FeeSetting::from_key(key)?;
        setting.parse_value(raw)?;
        let value = raw.trim().to_string();

        let mut entries = self.write();
        let mut next = entries.clone();
        next.insert(key.to_string(), value.clone());
        self.persist(&next)?;
        *entries = next;

        info!(key, value = %value, "Payout fee setting updated");
        Ok(SettingRow {
            key: key.to_string(),
            value,
        })
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<(), Error> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let stored = StoredSettings {
            settings: entries.clone(),
        };
        let json = serde_json::to_string_pretty(&stored)
            .map_err(|e| Error::Store(format!("Failed to serialize settings: {e}")))?;

        // Atomic write: tmp + rename
        let tmp = path.with_extension("tmp");
        if let Some(parent) = tmp.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                Error::Store(format!("Failed to create settings directory: {e}"))
            })?;
        }
        std::fs::write(&tmp, json.as_bytes())
            .map_err(|e| Error::Store(format!("Failed to write settings: {e}")))?;
        std::fs::rename(&tmp, path)
            .map_err(|e| Error::Store(format!("Failed to rename settings: {e}")))?;

        Ok(())
    }

    fn read(&self) -> RwLockReadGuard<'_, BTreeMap<String, String>> {
        self.entries.read().unwrap_or_else(|poisoned| {
            warn!("Settings lock poisoned, continuing with last state");
            poisoned.into_inner()
        })
    }

    fn write(&self) -> RwLockWriteGuard<'_, BTreeMap<String, String>> {
        self.entries.write().unwrap_or_else(|poisoned| {
            warn!("Settings lock poisoned, continuing with last state");
            poisoned.into_inner()
        })
    }
}

/// Insert defaults for missing settings. Returns how many were added.
fn seed_defaults(entries: &mut BTreeMap<String, String>) -> usize {
    let mut added = 0;
    for setting in FeeSetting::ALL {
        if !entries.contains_key(setting.key()) {
            entries.insert(setting.key().to_string(), setting.default_value());
            added += 1;
        }
    }
    added
}
