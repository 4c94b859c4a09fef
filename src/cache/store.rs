//! Cache Store Module
//!
//! Soft-failing cache tier over the shared store.

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::cache::{CacheStats, MAX_KEY_LENGTH};
use crate::store::SharedStore;

// == Cache Store ==
/// Cache tier used by the search and translation paths.
///
/// Constructed without a store when the backing service has no usable
/// configuration; every operation then behaves as a cold cache. A store error
/// at call time is treated the same way, so callers never see an error from
/// this type.
pub struct CacheStore {
    store: Option<Arc<dyn SharedStore>>,
    /// Key namespace, keeps gateway entries apart from other store tenants
    prefix: &'static str,
    stats: CacheStats,
}

impl CacheStore {
    pub fn new(store: Option<Arc<dyn SharedStore>>) -> Self {
        Self {
            store,
            prefix: "pw",
            stats: CacheStats::new(),
        }
    }

    /// Whether a backing store is configured.
    ///
    /// Probe for composing components that want to skip cache work entirely.
    /// Correctness never depends on it: every operation degrades on its own,
    /// so a stale answer here is harmless.
    pub fn is_available(&self) -> bool {
        self.store.is_some()
    }

    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    // == Get ==
    /// Fetches and deserializes a cached value. Any store error or decode
    /// failure reads as a miss.
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let store = self.store.as_ref()?;
        match store.kv_get(&self.namespaced(key)).await {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(value) => {
                    self.stats.record_hit();
                    Some(value)
                }
                Err(err) => {
                    // stale schema from an older deploy reads as a miss
                    debug!(key, error = %err, "discarding undecodable cache entry");
                    self.stats.record_miss();
                    None
                }
            },
            Ok(None) => {
                self.stats.record_miss();
                None
            }
            Err(err) => {
                warn!(key, error = %err, "cache read failed, treating as miss");
                self.stats.record_store_error();
                None
            }
        }
    }

    // == Set ==
    /// Serializes and stores a value with a TTL. Returns whether the write
    /// was accepted.
    pub async fn set_json<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) -> bool {
        let Some(store) = self.store.as_ref() else {
            return false;
        };
        if key.len() > MAX_KEY_LENGTH {
            warn!(key_len = key.len(), "cache key too long, skipping write");
            return false;
        }
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(err) => {
                warn!(key, error = %err, "cache serialization failed");
                return false;
            }
        };
        match store.kv_set(&self.namespaced(key), &raw, ttl).await {
            Ok(()) => true,
            Err(err) => {
                warn!(key, error = %err, "cache write failed");
                self.stats.record_store_error();
                false
            }
        }
    }

    // == Delete ==
    /// Removes a key, e.g. on content-invalidation events. Returns whether
    /// anything was removed.
    pub async fn delete(&self, key: &str) -> bool {
        let Some(store) = self.store.as_ref() else {
            return false;
        };
        match store.kv_delete(&self.namespaced(key)).await {
            Ok(removed) => removed,
            Err(err) => {
                warn!(key, error = %err, "cache delete failed");
                self.stats.record_store_error();
                false
            }
        }
    }

    fn namespaced(&self, key: &str) -> String {
        format!("{}:{}", self.prefix, key)
    }
}
