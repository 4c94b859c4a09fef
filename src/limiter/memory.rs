//! In-process fallback window map.
//!
//! Scoped to a single process: when the shared store is down, each instance
//! enforces the ceiling on its own traffic. Entries for elapsed windows are
//! evicted by a periodic sweep so sustained traffic from many distinct
//! identifiers cannot grow the map without bound.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::limiter::{RateLimitConfig, RateLimitDecision};
use crate::store::epoch_ms;

#[derive(Debug)]
struct WindowRecord {
    count: u64,
    reset_at_ms: u64,
}

// == Memory Windows ==
/// Mutex-guarded map of identifier -> active window.
///
/// The mutex covers only the map update; nothing awaits while holding it.
#[derive(Debug, Default)]
pub struct MemoryWindows {
    records: Mutex<HashMap<String, WindowRecord>>,
}

impl MemoryWindows {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs one admission check against the wall clock.
    pub fn check(&self, identifier: &str, config: &RateLimitConfig) -> RateLimitDecision {
        self.check_at(identifier, config, epoch_ms())
    }

    /// Admission check at an explicit instant. The window algebra is pure in
    /// `now_ms`, which keeps the tests free of sleeps.
    pub fn check_at(
        &self,
        identifier: &str,
        config: &RateLimitConfig,
        now_ms: u64,
    ) -> RateLimitDecision {
        let mut records = self.records.lock().expect("window map lock poisoned");

        match records.get_mut(identifier) {
            Some(record) if now_ms < record.reset_at_ms => {
                if record.count < config.max_requests {
                    record.count += 1;
                    RateLimitDecision::admitted(config, record.count, record.reset_at_ms)
                } else {
                    RateLimitDecision::rejected(config, record.reset_at_ms, now_ms)
                }
            }
            _ => {
                // first request, or the previous window has elapsed
                let reset_at_ms = now_ms + config.window_ms;
                records.insert(
                    identifier.to_string(),
                    WindowRecord {
                        count: 1,
                        reset_at_ms,
                    },
                );
                RateLimitDecision::admitted(config, 1, reset_at_ms)
            }
        }
    }

    /// Evicts every record whose window has elapsed. Returns the number of
    /// records removed.
    pub fn sweep(&self) -> usize {
        self.sweep_at(epoch_ms())
    }

    pub fn sweep_at(&self, now_ms: u64) -> usize {
        let mut records = self.records.lock().expect("window map lock poisoned");
        let before = records.len();
        records.retain(|_, record| record.reset_at_ms > now_ms);
        before - records.len()
    }

    /// Number of identifiers currently tracked.
    pub fn len(&self) -> usize {
        self.records.lock().expect("window map lock poisoned").len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: RateLimitConfig = RateLimitConfig {
        max_requests: 3,
        window_ms: 1_000,
    };

    #[test]
    fn test_first_request_starts_window() {
        let windows = MemoryWindows::new();
        let decision = windows.check_at("id", &CONFIG, 10_000);

        assert!(decision.allowed);
        assert_eq!(decision.remaining, 2);
        assert_eq!(decision.reset_at_ms, 11_000);
        assert_eq!(decision.retry_after_secs, 0);
    }

    #[test]
    fn test_ceiling_rejects_with_retry_after() {
        let windows = MemoryWindows::new();
        for _ in 0..3 {
            assert!(windows.check_at("id", &CONFIG, 10_000).allowed);
        }

        let rejected = windows.check_at("id", &CONFIG, 10_400);
        assert!(!rejected.allowed);
        assert_eq!(rejected.remaining, 0);
        assert_eq!(rejected.reset_at_ms, 11_000);
        assert_eq!(rejected.retry_after_secs, 1);
    }

    #[test]
    fn test_window_elapse_resets_count() {
        let windows = MemoryWindows::new();
        for _ in 0..4 {
            windows.check_at("id", &CONFIG, 10_000);
        }

        // past the reset boundary a fresh window starts at count 1
        let fresh = windows.check_at("id", &CONFIG, 11_000);
        assert!(fresh.allowed);
        assert_eq!(fresh.remaining, 2);
        assert_eq!(fresh.reset_at_ms, 12_000);
    }

    #[test]
    fn test_identifiers_do_not_interfere() {
        let windows = MemoryWindows::new();
        for _ in 0..3 {
            windows.check_at("a", &CONFIG, 10_000);
        }
        assert!(!windows.check_at("a", &CONFIG, 10_000).allowed);
        assert!(windows.check_at("b", &CONFIG, 10_000).allowed);
    }

    #[test]
    fn test_sweep_evicts_only_elapsed_windows() {
        let windows = MemoryWindows::new();
        windows.check_at("old", &CONFIG, 10_000);
        windows.check_at("live", &CONFIG, 10_800);

        let removed = windows.sweep_at(11_000);
        assert_eq!(removed, 1);
        assert_eq!(windows.len(), 1);

        // the surviving record still enforces its ceiling
        windows.check_at("live", &CONFIG, 10_900);
        windows.check_at("live", &CONFIG, 10_900);
        assert!(!windows.check_at("live", &CONFIG, 10_900).allowed);
    }

    #[test]
    fn test_sweep_empty_map() {
        let windows = MemoryWindows::new();
        assert_eq!(windows.sweep_at(10_000), 0);
    }

    #[test]
    fn test_concurrent_checks_respect_ceiling() {
        use std::sync::Arc;

        let windows = Arc::new(MemoryWindows::new());
        let config = RateLimitConfig::new(50, 60_000);
        let now = epoch_ms();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let windows = windows.clone();
                std::thread::spawn(move || {
                    (0..25)
                        .filter(|_| windows.check_at("id", &config, now).allowed)
                        .count()
                })
            })
            .collect();

        let admitted: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(admitted, 50);
    }
}
