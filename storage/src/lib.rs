//! Upkeep Storage Layer - Sled-Backed Save Store
//!
//! Designed for the per-transition persistence model:
//! - Every state change is written through immediately
//! - Each write is flushed, so a crash never loses a committed transition
//! - Values are small bincode-encoded scalars under fixed keys

use std::path::Path;

use upkeep_core::error::{CoreError, Result};
use upkeep_core::store::SaveStore;

/// Sled-backed implementation of the core save store.
#[derive(Debug, Clone)]
pub struct SledStore {
    db: sled::Db,
}

impl SledStore {
    /// Open (or create) the save database at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let db = sled::open(path.as_ref())
            .map_err(|e| CoreError::Storage(format!("Failed to open save store: {}", e)))?;
        log::debug!("save store opened at {:?}", path.as_ref());
        Ok(Self { db })
    }

    fn read(&self, key: &str) -> Result<Option<sled::IVec>> {
        self.db
            .get(key)
            .map_err(|e| CoreError::Storage(format!("Failed to read {}: {}", key, e)))
    }

    fn write(&self, key: &str, bytes: Vec<u8>) -> Result<()> {
        self.db
            .insert(key, bytes)
            .map_err(|e| CoreError::Storage(format!("Failed to write {}: {}", key, e)))?;
        self.flush()
    }

    fn flush(&self) -> Result<()> {
        self.db
            .flush()
            .map_err(|e| CoreError::Storage(format!("Failed to flush save store: {}", e)))?;
        Ok(())
    }
}

impl SaveStore for SledStore {
    fn get_f64(&self, key: &str) -> Result<Option<f64>> {
        match self.read(key)? {
            Some(bytes) => {
                let value = bincode::deserialize(&bytes)
                    .map_err(|e| CoreError::Storage(format!("Corrupt value for {}: {}", key, e)))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    fn set_f64(&self, key: &str, value: f64) -> Result<()> {
        let bytes = bincode::serialize(&value)
            .map_err(|e| CoreError::Storage(format!("Failed to encode {}: {}", key, e)))?;
        self.write(key, bytes)
    }

    fn get_bool(&self, key: &str) -> Result<Option<bool>> {
        match self.read(key)? {
            Some(bytes) => {
                let value = bincode::deserialize(&bytes)
                    .map_err(|e| CoreError::Storage(format!("Corrupt value for {}: {}", key, e)))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    fn set_bool(&self, key: &str, value: bool) -> Result<()> {
        let bytes = bincode::serialize(&value)
            .map_err(|e| CoreError::Storage(format!("Failed to encode {}: {}", key, e)))?;
        self.write(key, bytes)
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.db
            .remove(key)
            .map_err(|e| CoreError::Storage(format!("Failed to delete {}: {}", key, e)))?;
        self.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use upkeep_core::store::keys;

    #[test]
    fn test_save_and_load_scalars() {
        let dir = tempdir().unwrap();
        let store = SledStore::open(dir.path()).unwrap();

        store.set_f64(keys::MONEY, 842.5).unwrap();
        store.set_bool(keys::TIMER_RUNNING, false).unwrap();

        assert_eq!(store.get_f64(keys::MONEY).unwrap(), Some(842.5));
        assert_eq!(store.get_bool(keys::TIMER_RUNNING).unwrap(), Some(false));
    }

    #[test]
    fn test_missing_key_is_none() {
        let dir = tempdir().unwrap();
        let store = SledStore::open(dir.path()).unwrap();
        assert_eq!(store.get_f64(keys::TIMER).unwrap(), None);
        assert_eq!(store.get_bool(keys::FIRST_TOGGLE_DONE).unwrap(), None);
    }

    #[test]
    fn test_negative_balance_roundtrips() {
        let dir = tempdir().unwrap();
        let store = SledStore::open(dir.path()).unwrap();
        store.set_f64(keys::MONEY, -150.0).unwrap();
        assert_eq!(store.get_f64(keys::MONEY).unwrap(), Some(-150.0));
    }

    #[test]
    fn test_delete_removes_value() {
        let dir = tempdir().unwrap();
        let store = SledStore::open(dir.path()).unwrap();

        store.set_f64(keys::TIMER, 300.0).unwrap();
        store.delete(keys::TIMER).unwrap();
        assert_eq!(store.get_f64(keys::TIMER).unwrap(), None);
    }

    #[test]
    fn test_clear_removes_every_save_key() {
        let dir = tempdir().unwrap();
        let store = SledStore::open(dir.path()).unwrap();

        store.set_f64(keys::MONEY, 1.0).unwrap();
        store.set_f64(keys::TIMER, 2.0).unwrap();
        store.set_bool(keys::FIRST_TOGGLE_DONE, true).unwrap();
        store.set_bool(keys::TIMER_RUNNING, true).unwrap();

        store.clear().unwrap();

        assert_eq!(store.get_f64(keys::MONEY).unwrap(), None);
        assert_eq!(store.get_f64(keys::TIMER).unwrap(), None);
        assert_eq!(store.get_bool(keys::FIRST_TOGGLE_DONE).unwrap(), None);
        assert_eq!(store.get_bool(keys::TIMER_RUNNING).unwrap(), None);
    }

    #[test]
    fn test_values_survive_reopen() {
        let dir = tempdir().unwrap();
        {
            let store = SledStore::open(dir.path()).unwrap();
            store.set_f64(keys::MONEY, 640.0).unwrap();
            store.set_bool(keys::TIMER_RUNNING, true).unwrap();
        }

        let reopened = SledStore::open(dir.path()).unwrap();
        assert_eq!(reopened.get_f64(keys::MONEY).unwrap(), Some(640.0));
        assert_eq!(reopened.get_bool(keys::TIMER_RUNNING).unwrap(), Some(true));
    }
}
