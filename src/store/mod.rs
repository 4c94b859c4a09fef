//! Shared Store Module
//!
//! Abstraction over the backing key/value + atomic-counter service shared by
//! the cache tier and the rate limiter. Both components degrade independently
//! when no store is reachable; neither fails closed.

mod memory;
mod redis_store;

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use thiserror::Error;

pub use memory::MemoryStore;
pub use redis_store::RedisStore;

// == Store Error Enum ==
/// Errors from the backing store. Callers convert these into degraded-mode
/// behavior rather than surfacing them.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Store connection failed: {0}")]
    Connection(String),

    #[error("Store operation timed out")]
    Timeout,

    #[error("Store protocol error: {0}")]
    Protocol(String),
}

impl From<redis::RedisError> for StoreError {
    fn from(err: redis::RedisError) -> Self {
        if err.is_connection_refusal() || err.is_io_error() {
            StoreError::Connection(err.to_string())
        } else {
            StoreError::Protocol(err.to_string())
        }
    }
}

/// Result of an atomic window increment.
#[derive(Debug, Clone, Copy)]
pub struct WindowCount {
    /// Counter value after this increment
    pub count: u64,
    /// Time until the window resets, in milliseconds
    pub window_remaining_ms: u64,
}

// == Shared Store Trait ==
/// Key/value and atomic-counter primitives of the shared backing store.
///
/// Implementations bound every remote operation by a timeout; a slow store
/// degrades to an error, never an indefinitely blocked caller.
#[async_trait]
pub trait SharedStore: Send + Sync {
    /// Fetches a value, `None` on absent or expired keys.
    async fn kv_get(&self, key: &str) -> std::result::Result<Option<String>, StoreError>;

    /// Stores a value with a time-to-live.
    async fn kv_set(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> std::result::Result<(), StoreError>;

    /// Removes a key, reporting whether it existed.
    async fn kv_delete(&self, key: &str) -> std::result::Result<bool, StoreError>;

    /// Atomically increments the window counter for `key`, starting a new
    /// window of length `window` on first touch. The increment and the window
    /// boundary are established in one atomic step so that concurrent
    /// requests for the same identifier cannot exceed the ceiling.
    async fn incr_window(
        &self,
        key: &str,
        window: Duration,
    ) -> std::result::Result<WindowCount, StoreError>;

    /// Liveness probe.
    async fn ping(&self) -> std::result::Result<(), StoreError>;
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn epoch_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("Time went backwards")
        .as_millis() as u64
}
