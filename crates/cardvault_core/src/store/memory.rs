//! In-memory store implementation.
//!
//! # Responsibility
//! - Provide the injectable fake used by tests and ephemeral sessions.
//! - Model capacity rejection so quota paths are exercisable without a
//!   real device limit.

use super::{KeyValueStore, StoreError, StoreResult};
use std::collections::HashMap;

/// In-memory key-value store with an optional byte capacity.
///
/// Capacity accounting counts value bytes across all keys, mirroring how
/// device-level quotas treat the whole namespace as one budget.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, Vec<u8>>,
    capacity_bytes: Option<usize>,
}

impl MemoryStore {
    /// Creates an unbounded in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that rejects writes once `capacity_bytes` of value
    /// data would be stored.
    pub fn with_capacity(capacity_bytes: usize) -> Self {
        Self {
            entries: HashMap::new(),
            capacity_bytes: Some(capacity_bytes),
        }
    }

    /// Returns the total number of value bytes currently stored.
    pub fn used_bytes(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    /// Returns the number of keys currently stored.
    pub fn key_count(&self) -> usize {
        self.entries.len()
    }
}

impl KeyValueStore for MemoryStore {
    fn read(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        Ok(self.entries.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &[u8]) -> StoreResult<()> {
        if let Some(capacity) = self.capacity_bytes {
            let existing = self.entries.get(key).map_or(0, Vec::len);
            let attempted = self.used_bytes() - existing + value.len();
            if attempted > capacity {
                return Err(StoreError::QuotaExceeded {
                    attempted_bytes: attempted,
                    capacity_bytes: capacity,
                });
            }
        }
        self.entries.insert(key.to_string(), value.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::MemoryStore;
    use crate::store::{KeyValueStore, StoreError};

    #[test]
    fn read_absent_key_returns_none() {
        let store = MemoryStore::new();
        assert!(store.read("cards").expect("read should succeed").is_none());
    }

    #[test]
    fn write_then_read_round_trips() {
        let mut store = MemoryStore::new();
        store.write("cards", b"[]").expect("write should succeed");
        assert_eq!(
            store.read("cards").expect("read should succeed").as_deref(),
            Some(b"[]".as_slice())
        );
    }

    #[test]
    fn capacity_counts_all_keys_and_rejects_overflow() {
        let mut store = MemoryStore::with_capacity(8);
        store.write("a", b"1234").expect("first write fits");
        store.write("b", b"1234").expect("second write fits");

        let err = store.write("c", b"1").expect_err("third write must overflow");
        assert!(matches!(err, StoreError::QuotaExceeded { .. }));

        // Replacing an existing value only charges the delta.
        store.write("a", b"12345678").expect_err("grown value overflows");
        store.write("a", b"12").expect("shrunk value fits");
        assert_eq!(store.used_bytes(), 6);
    }
}
