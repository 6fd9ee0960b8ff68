//! Save-store abstraction over the session's persisted key-value state.
//!
//! Components receive a shared [`SaveStore`] handle at construction and write
//! through it after every state transition, so a crash never loses more than
//! the current tick. The daemon wires in a sled-backed store; tests use
//! [`MemoryStore`].

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::Result;

/// Persisted keys, matching the original save layout.
pub mod keys {
    /// Current ledger balance.
    pub const MONEY: &str = "Money";
    /// Phase timer elapsed seconds.
    pub const TIMER: &str = "Timer";
    /// Whether the first phase mark has already fired.
    pub const FIRST_TOGGLE_DONE: &str = "FirstToggleDone";
    /// Whether the phase timer is still running.
    pub const TIMER_RUNNING: &str = "TimerRunning";

    /// Every key the session persists.
    pub const ALL: [&str; 4] = [MONEY, TIMER, FIRST_TOGGLE_DONE, TIMER_RUNNING];
}

/// Typed key-value persistence for session state.
///
/// A missing key reads as `None`; callers fall back to their defaults.
/// Implementations may treat undecodable values as storage errors.
pub trait SaveStore: Send + Sync {
    fn get_f64(&self, key: &str) -> Result<Option<f64>>;
    fn set_f64(&self, key: &str, value: f64) -> Result<()>;
    fn get_bool(&self, key: &str) -> Result<Option<bool>>;
    fn set_bool(&self, key: &str, value: bool) -> Result<()>;
    fn delete(&self, key: &str) -> Result<()>;

    /// Remove every known save key.
    fn clear(&self) -> Result<()> {
        for key in keys::ALL {
            self.delete(key)?;
        }
        Ok(())
    }
}

/// Shared handle to a save store.
pub type SharedStore = Arc<dyn SaveStore>;

#[derive(Debug, Clone, Copy, PartialEq)]
enum SavedValue {
    F64(f64),
    Bool(bool),
}

/// In-memory store for tests and ephemeral sessions.
///
/// A value written under one type reads as absent under the other, the same
/// way a fresh key would.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, SavedValue>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SaveStore for MemoryStore {
    fn get_f64(&self, key: &str) -> Result<Option<f64>> {
        Ok(match self.values.lock().get(key) {
            Some(SavedValue::F64(v)) => Some(*v),
            _ => None,
        })
    }

    fn set_f64(&self, key: &str, value: f64) -> Result<()> {
        self.values
            .lock()
            .insert(key.to_string(), SavedValue::F64(value));
        Ok(())
    }

    fn get_bool(&self, key: &str) -> Result<Option<bool>> {
        Ok(match self.values.lock().get(key) {
            Some(SavedValue::Bool(v)) => Some(*v),
            _ => None,
        })
    }

    fn set_bool(&self, key: &str, value: bool) -> Result<()> {
        self.values
            .lock()
            .insert(key.to_string(), SavedValue::Bool(value));
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.values.lock().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_returns_none() {
        let store = MemoryStore::new();
        assert_eq!(store.get_f64(keys::MONEY).unwrap(), None);
        assert_eq!(store.get_bool(keys::TIMER_RUNNING).unwrap(), None);
    }

    #[test]
    fn test_values_roundtrip() {
        let store = MemoryStore::new();
        store.set_f64(keys::MONEY, 850.0).unwrap();
        store.set_bool(keys::FIRST_TOGGLE_DONE, true).unwrap();

        assert_eq!(store.get_f64(keys::MONEY).unwrap(), Some(850.0));
        assert_eq!(store.get_bool(keys::FIRST_TOGGLE_DONE).unwrap(), Some(true));
    }

    #[test]
    fn test_type_mismatch_reads_as_absent() {
        let store = MemoryStore::new();
        store.set_bool(keys::MONEY, true).unwrap();
        assert_eq!(store.get_f64(keys::MONEY).unwrap(), None);
    }

    #[test]
    fn test_overwrite_replaces_value() {
        let store = MemoryStore::new();
        store.set_f64(keys::TIMER, 10.0).unwrap();
        store.set_f64(keys::TIMER, 20.0).unwrap();
        assert_eq!(store.get_f64(keys::TIMER).unwrap(), Some(20.0));
    }

    #[test]
    fn test_clear_removes_every_save_key() {
        let store = MemoryStore::new();
        store.set_f64(keys::MONEY, 100.0).unwrap();
        store.set_f64(keys::TIMER, 42.0).unwrap();
        store.set_bool(keys::FIRST_TOGGLE_DONE, true).unwrap();
        store.set_bool(keys::TIMER_RUNNING, false).unwrap();

        store.clear().unwrap();

        assert_eq!(store.get_f64(keys::MONEY).unwrap(), None);
        assert_eq!(store.get_f64(keys::TIMER).unwrap(), None);
        assert_eq!(store.get_bool(keys::FIRST_TOGGLE_DONE).unwrap(), None);
        assert_eq!(store.get_bool(keys::TIMER_RUNNING).unwrap(), None);
    }
}
