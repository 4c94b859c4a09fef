//! Rate Limiter Module
//!
//! Fixed-window admission control per client identifier. Counters live in the
//! shared store so all instances see one window; with no store reachable the
//! limiter falls back to an in-process window map, which is weaker (no
//! cross-instance consistency) but never silently disabled.
//!
//! One algorithm is implemented everywhere: a fixed window, i.e. a counter
//! that resets entirely at a fixed boundary rather than continuously
//! decaying. Both the store-backed path and the fallback map follow it.

mod memory;
mod window;

#[cfg(test)]
mod property_tests;

pub use memory::MemoryWindows;
pub use window::RateLimiter;

use serde::Serialize;

// == Rate Limit Config ==
/// Ceiling and window length for one limiter.
#[derive(Debug, Clone, Copy)]
pub struct RateLimitConfig {
    /// Requests admitted per identifier per window
    pub max_requests: u64,
    /// Window length in milliseconds
    pub window_ms: u64,
}

impl RateLimitConfig {
    pub fn new(max_requests: u64, window_ms: u64) -> Self {
        Self {
            max_requests,
            window_ms,
        }
    }
}

// == Rate Limit Decision ==
/// Outcome of one admission check.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct RateLimitDecision {
    pub allowed: bool,
    /// Configured ceiling, echoed for response headers
    pub limit: u64,
    /// Requests left in the current window
    pub remaining: u64,
    /// When the current window resets (epoch milliseconds)
    pub reset_at_ms: u64,
    /// Seconds until a rejected caller may retry; 0 when allowed
    pub retry_after_secs: u64,
}

impl RateLimitDecision {
    /// Decision for a request admitted as the `count`-th of its window.
    pub(crate) fn admitted(config: &RateLimitConfig, count: u64, reset_at_ms: u64) -> Self {
        Self {
            allowed: true,
            limit: config.max_requests,
            remaining: config.max_requests.saturating_sub(count),
            reset_at_ms,
            retry_after_secs: 0,
        }
    }

    /// Decision for a rejected request.
    pub(crate) fn rejected(config: &RateLimitConfig, reset_at_ms: u64, now_ms: u64) -> Self {
        let remaining_ms = reset_at_ms.saturating_sub(now_ms);
        Self {
            allowed: false,
            limit: config.max_requests,
            remaining: 0,
            reset_at_ms,
            // round up so "retry after" is never zero while the window holds
            retry_after_secs: remaining_ms.div_ceil(1000).max(1),
        }
    }
}
