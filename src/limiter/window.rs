//! Fixed-window rate limiter.
//!
//! Store path: one atomic increment per request establishes both the count
//! and the window boundary, so concurrent requests from the same identifier
//! cannot race past the ceiling. Fallback path: the in-process window map.

use std::sync::Arc;

use std::time::Duration;

use tracing::{debug, warn};

use crate::limiter::{MemoryWindows, RateLimitConfig, RateLimitDecision};
use crate::store::{epoch_ms, SharedStore};

// == Rate Limiter ==
pub struct RateLimiter {
    config: RateLimitConfig,
    store: Option<Arc<dyn SharedStore>>,
    local: MemoryWindows,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig, store: Option<Arc<dyn SharedStore>>) -> Self {
        Self {
            config,
            store,
            local: MemoryWindows::new(),
        }
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    // == Check ==
    /// Runs one admission check for `identifier`.
    ///
    /// Fails open: a store error during the increment admits the request.
    /// Real traffic is never rejected over an infrastructure error. The
    /// degradation is logged, and the decision reports a full window since
    /// the true count is unknowable at that point.
    pub async fn check(&self, identifier: &str) -> RateLimitDecision {
        let Some(store) = self.store.as_ref() else {
            return self.local.check(identifier, &self.config);
        };

        let key = format!("rl:{identifier}");
        let window = Duration::from_millis(self.config.window_ms);
        match store.incr_window(&key, window).await {
            Ok(count) => {
                let now_ms = epoch_ms();
                let reset_at_ms = now_ms + count.window_remaining_ms;
                if count.count <= self.config.max_requests {
                    RateLimitDecision::admitted(&self.config, count.count, reset_at_ms)
                } else {
                    debug!(identifier, count = count.count, "rate limit exceeded");
                    RateLimitDecision::rejected(&self.config, reset_at_ms, now_ms)
                }
            }
            Err(err) => {
                warn!(identifier, error = %err, "store increment failed, admitting request");
                RateLimitDecision::admitted(&self.config, 1, epoch_ms() + self.config.window_ms)
            }
        }
    }

    // == Sweep ==
    /// Evicts elapsed windows from the in-process fallback map. Invoked by
    /// the background sweep task; the store path expires its own keys.
    pub fn sweep_local(&self) -> usize {
        self.local.sweep()
    }

    /// Number of identifiers tracked by the fallback map.
    pub fn local_len(&self) -> usize {
        self.local.len()
    }
}
