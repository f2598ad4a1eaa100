//! Store configuration.
//!
//! Every field has a default, so an empty TOML document (or
//! `StoreConfig::default()`) yields a working local store:
//!
//! ```toml
//! db_path = "studio_site"
//! page_view_cap = 500
//! corrupt_value_policy = "fail"
//!
//! [analytics]
//! refresh_interval_secs = 30
//! inclusion_probability = 0.3
//!
//! [backup]
//! delay_ms = 1500
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::store_error::{StoreError, StoreResult};

#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,
    #[serde(default = "default_map_size")]
    pub map_size_bytes: usize,
    /// Prefix prepended to every storage key, e.g. `"studio:"`.
    #[serde(default)]
    pub key_namespace: Option<String>,
    #[serde(default = "default_page_view_cap")]
    pub page_view_cap: usize,
    #[serde(default)]
    pub corrupt_value_policy: CorruptValuePolicy,
    #[serde(default)]
    pub analytics: AnalyticsConfig,
    #[serde(default)]
    pub backup: BackupConfig,
}

/// What a getter does when the stored JSON does not parse as its record.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum CorruptValuePolicy {
    /// Return `StoreError::Corrupt`.
    #[default]
    Fail,
    /// Log a warning and return the domain default.
    FallbackToDefault,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AnalyticsConfig {
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,
    #[serde(default = "default_inclusion_probability")]
    pub inclusion_probability: f64,
    /// How many of the most recent page views are candidates for sampling.
    #[serde(default = "default_sample_window")]
    pub sample_window: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BackupConfig {
    #[serde(default = "default_backup_delay_ms")]
    pub delay_ms: u64,
}

/// Upper bound for `analytics.refresh_interval_secs`: one day.
pub const MAX_REFRESH_INTERVAL_SECS: u64 = 24 * 60 * 60;

fn default_db_path() -> PathBuf {
    PathBuf::from("studio_site")
}
fn default_map_size() -> usize {
    10 * 1024 * 1024
}
fn default_page_view_cap() -> usize {
    500
}
fn default_refresh_interval_secs() -> u64 {
    30
}
fn default_inclusion_probability() -> f64 {
    0.3
}
fn default_sample_window() -> usize {
    50
}
fn default_backup_delay_ms() -> u64 {
    1500
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            map_size_bytes: default_map_size(),
            key_namespace: None,
            page_view_cap: default_page_view_cap(),
            corrupt_value_policy: CorruptValuePolicy::default(),
            analytics: AnalyticsConfig::default(),
            backup: BackupConfig::default(),
        }
    }
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            refresh_interval_secs: default_refresh_interval_secs(),
            inclusion_probability: default_inclusion_probability(),
            sample_window: default_sample_window(),
        }
    }
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            delay_ms: default_backup_delay_ms(),
        }
    }
}

impl StoreConfig {
    pub fn from_toml_str(raw: &str) -> StoreResult<Self> {
        let config: StoreConfig =
            toml::from_str(raw).map_err(|e| StoreError::Config(format!("invalid TOML: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> StoreResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            StoreError::Config(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&raw)
    }

    fn validate(&self) -> StoreResult<()> {
        if self.page_view_cap == 0 {
            return Err(StoreError::Config("page_view_cap must be at least 1".into()));
        }
        if !(0.0..=1.0).contains(&self.analytics.inclusion_probability) {
            return Err(StoreError::Config(format!(
                "analytics.inclusion_probability must be within 0..=1, got {}",
                self.analytics.inclusion_probability
            )));
        }
        if !(1..=MAX_REFRESH_INTERVAL_SECS).contains(&self.analytics.refresh_interval_secs) {
            return Err(StoreError::Config(format!(
                "analytics.refresh_interval_secs must be within 1..={}, got {}",
                MAX_REFRESH_INTERVAL_SECS, self.analytics.refresh_interval_secs
            )));
        }
        if self.map_size_bytes < 64 * 1024 {
            return Err(StoreError::Config("map_size_bytes must be at least 64 KiB".into()));
        }
        Ok(())
    }
}
