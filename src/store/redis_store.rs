//! Redis-backed shared store.
//!
//! One `ConnectionManager` is shared by all requests; it reconnects on its
//! own, so operations after an outage recover without a restart.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use redis::{
    aio::{ConnectionManager, ConnectionManagerConfig},
    Client,
};
use tracing::info;

use super::{SharedStore, StoreError, WindowCount};

pub struct RedisStore {
    connection: ConnectionManager,
    op_timeout: Duration,
}

impl RedisStore {
    /// Connects and verifies the store with a ping.
    ///
    /// # Arguments
    /// * `redis_url` - e.g. `redis://127.0.0.1:6379`
    /// * `op_timeout` - budget applied to every subsequent operation
    pub async fn connect(redis_url: &str, op_timeout: Duration) -> Result<Self, StoreError> {
        let config = ConnectionManagerConfig::new()
            .set_number_of_retries(1)
            .set_connection_timeout(op_timeout);

        let client = Client::open(redis_url).map_err(StoreError::from)?;
        let connection = client
            .get_connection_manager_with_config(config)
            .await
            .map_err(StoreError::from)?;

        let store = Self {
            connection,
            op_timeout,
        };
        store.ping().await?;
        info!("Connected to shared store");
        Ok(store)
    }

    /// Applies the per-operation time budget.
    async fn bounded<T, F>(&self, fut: F) -> Result<T, StoreError>
    where
        F: Future<Output = redis::RedisResult<T>>,
    {
        match tokio::time::timeout(self.op_timeout, fut).await {
            Ok(result) => result.map_err(StoreError::from),
            Err(_) => Err(StoreError::Timeout),
        }
    }
}

#[async_trait]
impl SharedStore for RedisStore {
    async fn kv_get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut conn = self.connection.clone();
        let value: Option<String> = self
            .bounded(async move { redis::cmd("GET").arg(key).query_async(&mut conn).await })
            .await?;
        Ok(value)
    }

    async fn kv_set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError> {
        let mut conn = self.connection.clone();
        let ttl_ms = ttl.as_millis() as u64;
        let _: () = self
            .bounded(async move {
                redis::cmd("SET")
                    .arg(key)
                    .arg(value)
                    .arg("PX")
                    .arg(ttl_ms)
                    .query_async(&mut conn)
                    .await
            })
            .await?;
        Ok(())
    }

    async fn kv_delete(&self, key: &str) -> Result<bool, StoreError> {
        let mut conn = self.connection.clone();
        let removed: i64 = self
            .bounded(async move { redis::cmd("DEL").arg(key).query_async(&mut conn).await })
            .await?;
        Ok(removed > 0)
    }

    async fn incr_window(&self, key: &str, window: Duration) -> Result<WindowCount, StoreError> {
        let mut conn = self.connection.clone();
        let window_ms = window.as_millis() as u64;
        // INCR and PEXPIRE NX run in one MULTI/EXEC so the first request in a
        // window both creates the counter and pins the reset boundary; NX
        // keeps later requests from sliding it.
        let (count, _, pttl): (i64, i64, i64) = self
            .bounded(async move {
                redis::pipe()
                    .atomic()
                    .cmd("INCR")
                    .arg(key)
                    .cmd("PEXPIRE")
                    .arg(key)
                    .arg(window_ms)
                    .arg("NX")
                    .cmd("PTTL")
                    .arg(key)
                    .query_async(&mut conn)
                    .await
            })
            .await?;

        Ok(WindowCount {
            count: count.max(0) as u64,
            window_remaining_ms: pttl.max(0) as u64,
        })
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let mut conn = self.connection.clone();
        let _: String = self
            .bounded(async move { redis::cmd("PING").query_async(&mut conn).await })
            .await?;
        Ok(())
    }
}
