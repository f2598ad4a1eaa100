//! Backup port and its simulated implementation.
//!
//! [`BackupService`] is the seam a real, networked backup service plugs
//! into. [`SimulatedBackupService`] keeps an in-memory list of backup
//! entries, waits a fixed delay to mimic remote calls, and exports only the
//! current contacts on download. It is not a point-in-time backup.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;

use crate::config::BackupConfig;
use crate::content_model::{new_record_id, BackupKind, BackupMetadata, BackupStatus};
use crate::content_store::ContentStore;
use crate::key_value::KeyValueStorage;
use crate::store_error::StoreResult;

/// A downloadable export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupExport {
    pub file_name: String,
    pub content_type: &'static str,
    pub body: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreOutcome {
    Restored,
}

#[async_trait]
pub trait BackupService: Send + Sync {
    /// Known backups, newest first.
    async fn list(&self) -> StoreResult<Vec<BackupMetadata>>;

    /// Takes a manual backup and returns its metadata.
    async fn create(&self) -> StoreResult<BackupMetadata>;

    async fn restore(&self, id: &str) -> StoreResult<RestoreOutcome>;

    async fn download(&self, id: &str) -> StoreResult<BackupExport>;
}

pub struct SimulatedBackupService<S> {
    store: Arc<ContentStore<S>>,
    delay: StdDuration,
    entries: Mutex<Vec<BackupMetadata>>,
}

impl<S: KeyValueStorage> SimulatedBackupService<S> {
    pub fn new(store: Arc<ContentStore<S>>, config: &BackupConfig) -> Self {
        Self::seeded_at(store, config, Utc::now())
    }

    /// Seeds the entry list with plausible history relative to `now`.
    pub fn seeded_at(store: Arc<ContentStore<S>>, config: &BackupConfig, now: DateTime<Utc>) -> Self {
        let seed = vec![
            seed_entry(now - Duration::days(1), "2.4 MB", BackupKind::Auto, BackupStatus::Completed),
            seed_entry(now - Duration::days(2), "2.3 MB", BackupKind::Auto, BackupStatus::Completed),
            seed_entry(now - Duration::days(5), "2.3 MB", BackupKind::Manual, BackupStatus::Completed),
            seed_entry(now - Duration::days(8), "0 B", BackupKind::Auto, BackupStatus::Failed),
        ];
        Self {
            store,
            delay: StdDuration::from_millis(config.delay_ms),
            entries: Mutex::new(seed),
        }
    }

    fn export_contacts(&self, now: DateTime<Utc>) -> StoreResult<BackupExport> {
        let contacts = self.store.get_contacts()?;
        let body = serde_json::to_string_pretty(&contacts)?;
        Ok(BackupExport {
            file_name: format!("contacts-backup-{}.json", now.format("%Y-%m-%d")),
            content_type: "application/json",
            body,
        })
    }

    async fn simulate_latency(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}

#[async_trait]
impl<S: KeyValueStorage + 'static> BackupService for SimulatedBackupService<S> {
    async fn list(&self) -> StoreResult<Vec<BackupMetadata>> {
        Ok(self.entries.lock().clone())
    }

    async fn create(&self) -> StoreResult<BackupMetadata> {
        self.simulate_latency().await;

        let now = Utc::now();
        let export = self.export_contacts(now)?;
        let entry = BackupMetadata {
            id: new_record_id(),
            date: now,
            size: format_size(export.body.len()),
            kind: BackupKind::Manual,
            status: BackupStatus::Completed,
        };
        self.entries.lock().insert(0, entry.clone());
        log::info!("BACKUP_CREATED id={} size={}", entry.id, entry.size);
        Ok(entry)
    }

    async fn restore(&self, id: &str) -> StoreResult<RestoreOutcome> {
        self.simulate_latency().await;
        log::info!("BACKUP_RESTORE_SIMULATED id={}", id);
        Ok(RestoreOutcome::Restored)
    }

    async fn download(&self, id: &str) -> StoreResult<BackupExport> {
        let export = self.export_contacts(Utc::now())?;
        log::info!("BACKUP_DOWNLOADED id={} bytes={}", id, export.body.len());
        Ok(export)
    }
}

fn seed_entry(date: DateTime<Utc>, size: &str, kind: BackupKind, status: BackupStatus) -> BackupMetadata {
    BackupMetadata {
        id: new_record_id(),
        date,
        size: size.to_string(),
        kind,
        status,
    }
}

/// Formats a byte count for display, e.g. `1536` → `"1.5 KB"`.
pub fn format_size(bytes: usize) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.1} {}", UNITS[unit])
}
