//! In-memory shared store.
//!
//! Implements the same primitives as the Redis store against process-local
//! maps. Used by the test suites and by single-instance development setups
//! where no external store is running. Expiry is enforced lazily on read.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::{epoch_ms, SharedStore, StoreError, WindowCount};

#[derive(Debug)]
struct ValueEntry {
    value: String,
    expires_at_ms: u64,
}

#[derive(Debug)]
struct CounterEntry {
    count: u64,
    reset_at_ms: u64,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, ValueEntry>>,
    counters: Mutex<HashMap<String, CounterEntry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SharedStore for MemoryStore {
    async fn kv_get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let now = epoch_ms();
        let mut values = self.values.lock().expect("store lock poisoned");
        match values.get(key) {
            Some(entry) if entry.expires_at_ms > now => Ok(Some(entry.value.clone())),
            Some(_) => {
                values.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn kv_set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError> {
        let entry = ValueEntry {
            value: value.to_string(),
            expires_at_ms: epoch_ms() + ttl.as_millis() as u64,
        };
        self.values
            .lock()
            .expect("store lock poisoned")
            .insert(key.to_string(), entry);
        Ok(())
    }

    async fn kv_delete(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self
            .values
            .lock()
            .expect("store lock poisoned")
            .remove(key)
            .is_some())
    }

    async fn incr_window(&self, key: &str, window: Duration) -> Result<WindowCount, StoreError> {
        let now = epoch_ms();
        let mut counters = self.counters.lock().expect("store lock poisoned");
        let entry = counters.entry(key.to_string()).or_insert(CounterEntry {
            count: 0,
            reset_at_ms: now + window.as_millis() as u64,
        });
        if entry.reset_at_ms <= now {
            entry.count = 0;
            entry.reset_at_ms = now + window.as_millis() as u64;
        }
        entry.count += 1;

        Ok(WindowCount {
            count: entry.count,
            window_remaining_ms: entry.reset_at_ms.saturating_sub(now),
        })
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_roundtrip() {
        let store = MemoryStore::new();
        store
            .kv_set("k", "v", Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(store.kv_get("k").await.unwrap(), Some("v".to_string()));
    }

    #[tokio::test]
    async fn test_get_missing_key() {
        let store = MemoryStore::new();
        assert_eq!(store.kv_get("absent").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_expired_value_reads_as_miss() {
        let store = MemoryStore::new();
        store
            .kv_set("k", "v", Duration::from_millis(10))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(store.kv_get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_delete_reports_presence() {
        let store = MemoryStore::new();
        store
            .kv_set("k", "v", Duration::from_secs(60))
            .await
            .unwrap();
        assert!(store.kv_delete("k").await.unwrap());
        assert!(!store.kv_delete("k").await.unwrap());
    }

    #[tokio::test]
    async fn test_incr_window_counts_up() {
        let store = MemoryStore::new();
        let first = store
            .incr_window("id", Duration::from_secs(60))
            .await
            .unwrap();
        let second = store
            .incr_window("id", Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(first.count, 1);
        assert_eq!(second.count, 2);
        assert!(second.window_remaining_ms > 0);
    }

    #[tokio::test]
    async fn test_incr_window_resets_after_elapse() {
        let store = MemoryStore::new();
        store
            .incr_window("id", Duration::from_millis(10))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;
        let after = store
            .incr_window("id", Duration::from_millis(10))
            .await
            .unwrap();
        assert_eq!(after.count, 1);
    }
}
