//! Durable LMDB-backed storage.
//!
//! Each [`AppDbState`] owns one LMDB environment stored in a `<name>.lmdb`
//! directory with a single named database holding the site's keys.

use std::fs;
use std::path::{Path, PathBuf};

use lmdb::{Cursor, Database, DatabaseFlags, Environment, Transaction, WriteFlags};
use log::{info, warn};

use crate::config::StoreConfig;
use crate::key_value::KeyValueStorage;
use crate::store_error::{StoreError, StoreResult};

const DEFAULT_MAP_SIZE: usize = 10 * 1024 * 1024;
const MAIN_DB_NAME: &str = "site";

pub struct AppDbState {
    env: Environment,
    db: Database,
    path: PathBuf,
    map_size: usize,
}

impl AppDbState {
    /// Opens (or creates) the environment at `<name>.lmdb`.
    pub fn init(name: String) -> StoreResult<Self> {
        Self::init_with_map_size(name, DEFAULT_MAP_SIZE)
    }

    pub fn init_with_map_size(name: String, map_size: usize) -> StoreResult<Self> {
        let path = PathBuf::from(format!("{name}.lmdb"));
        Self::open_at(path, map_size)
    }

    /// Opens the environment named by `config.db_path` with its map size.
    pub fn from_config(config: &StoreConfig) -> StoreResult<Self> {
        Self::init_with_map_size(config.db_path.display().to_string(), config.map_size_bytes)
    }

    fn open_at(path: PathBuf, map_size: usize) -> StoreResult<Self> {
        fs::create_dir_all(&path)?;

        let env = Environment::new()
            .set_max_dbs(1)
            .set_map_size(map_size)
            .open(&path)?;
        let db = env.create_db(Some(MAIN_DB_NAME), DatabaseFlags::empty())?;

        info!("LMDB_OPENED path={} map_size={}", path.display(), map_size);
        Ok(Self { env, db, path, map_size })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Removes every key and returns how many were removed.
    pub fn clear_all_records(&self) -> StoreResult<usize> {
        let count = self.keys()?.len();
        let mut txn = self.env.begin_rw_txn()?;
        txn.clear_db(self.db)?;
        txn.commit()?;
        info!("LMDB_CLEARED path={} removed={}", self.path.display(), count);
        Ok(count)
    }

    /// Switches this handle to a fresh, empty environment named `name`.
    ///
    /// The previous environment is closed and its directory removed unless it
    /// is the same directory, in which case it is cleared in place.
    pub fn reset_database(&mut self, name: &str) -> StoreResult<()> {
        let new_path = PathBuf::from(format!("{name}.lmdb"));
        if new_path == self.path {
            self.clear_all_records()?;
            return Ok(());
        }

        if new_path.exists() {
            fs::remove_dir_all(&new_path)?;
        }
        let fresh = Self::open_at(new_path, self.map_size)?;
        let old = std::mem::replace(self, fresh);
        let old_path = old.path.clone();
        drop(old);

        if let Err(e) = fs::remove_dir_all(&old_path) {
            warn!("LMDB_RESET_CLEANUP_FAILED path={} error={}", old_path.display(), e);
        }
        info!("LMDB_RESET path={}", self.path.display());
        Ok(())
    }

    /// Flushes buffers to disk. The environment itself closes on drop.
    pub fn close_database(&mut self) -> StoreResult<()> {
        self.env.sync(true)?;
        info!("LMDB_SYNCED path={}", self.path.display());
        Ok(())
    }
}

impl KeyValueStorage for AppDbState {
    fn get_item(&self, key: &str) -> StoreResult<Option<String>> {
        let txn = self.env.begin_ro_txn()?;
        let value = match txn.get(self.db, &key) {
            Ok(bytes) => Some(String::from_utf8_lossy(bytes).into_owned()),
            Err(lmdb::Error::NotFound) => None,
            Err(e) => return Err(e.into()),
        };
        txn.commit()?;
        Ok(value)
    }

    fn set_item(&self, key: &str, value: &str) -> StoreResult<()> {
        let mut txn = self.env.begin_rw_txn()?;
        match txn.put(self.db, &key, &value, WriteFlags::empty()) {
            Ok(()) => {}
            Err(lmdb::Error::MapFull) => {
                txn.abort();
                return Err(StoreError::QuotaExceeded {
                    key: key.to_string(),
                    needed: key.len() + value.len(),
                    available: self.map_size,
                });
            }
            Err(e) => return Err(e.into()),
        }
        txn.commit()?;
        Ok(())
    }

    fn remove_item(&self, key: &str) -> StoreResult<()> {
        let mut txn = self.env.begin_rw_txn()?;
        match txn.del(self.db, &key, None) {
            Ok(()) | Err(lmdb::Error::NotFound) => {}
            Err(e) => return Err(e.into()),
        }
        txn.commit()?;
        Ok(())
    }

    fn keys(&self) -> StoreResult<Vec<String>> {
        let txn = self.env.begin_ro_txn()?;
        let mut keys = Vec::new();
        {
            let mut cursor = txn.open_ro_cursor(self.db)?;
            for (key, _) in cursor.iter() {
                keys.push(String::from_utf8_lossy(key).into_owned());
            }
        }
        txn.commit()?;
        Ok(keys)
    }
}
