//! Property-Based Tests for the Limiter Window Algebra
//!
//! Uses proptest over the in-process window map, with explicit instants
//! instead of sleeps.

use proptest::prelude::*;

use crate::limiter::{MemoryWindows, RateLimitConfig};

const WINDOW_MS: u64 = 1_000;

fn identifier_strategy() -> impl Strategy<Value = String> {
    "[a-f0-9]{4}".prop_map(|s| s)
}

/// (identifier, offset into the timeline in ms)
fn request_strategy() -> impl Strategy<Value = (String, u64)> {
    (identifier_strategy(), 0..5_000u64)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // For any request sequence, the number of admitted requests for one
    // identifier inside one window never exceeds the ceiling.
    #[test]
    fn prop_admissions_never_exceed_ceiling(
        max_requests in 1..10u64,
        requests in prop::collection::vec(request_strategy(), 1..200),
    ) {
        let config = RateLimitConfig::new(max_requests, WINDOW_MS);
        let windows = MemoryWindows::new();

        let mut requests = requests;
        requests.sort_by_key(|(_, at)| *at);

        // identifier -> (window reset, admitted in that window)
        let mut admitted: std::collections::HashMap<String, (u64, u64)> =
            std::collections::HashMap::new();

        for (id, at) in requests {
            let decision = windows.check_at(&id, &config, at);
            if decision.allowed {
                let entry = admitted.entry(id).or_insert((decision.reset_at_ms, 0));
                if decision.reset_at_ms != entry.0 {
                    *entry = (decision.reset_at_ms, 0);
                }
                entry.1 += 1;
                prop_assert!(
                    entry.1 <= max_requests,
                    "admitted {} > ceiling {} within one window",
                    entry.1,
                    max_requests
                );
            }
        }
    }

    // Remaining decreases by exactly one per admission and reaches zero
    // exactly at the ceiling.
    #[test]
    fn prop_remaining_counts_down(max_requests in 1..20u64) {
        let config = RateLimitConfig::new(max_requests, WINDOW_MS);
        let windows = MemoryWindows::new();

        for i in 1..=max_requests {
            let decision = windows.check_at("id", &config, 0);
            prop_assert!(decision.allowed);
            prop_assert_eq!(decision.remaining, max_requests - i);
        }
        prop_assert!(!windows.check_at("id", &config, 0).allowed);
    }

    // A request after the reset boundary always starts a fresh window,
    // regardless of how the previous window ended.
    #[test]
    fn prop_elapsed_window_always_readmits(
        max_requests in 1..5u64,
        burst in 1..20u64,
    ) {
        let config = RateLimitConfig::new(max_requests, WINDOW_MS);
        let windows = MemoryWindows::new();

        for _ in 0..burst {
            windows.check_at("id", &config, 0);
        }

        let fresh = windows.check_at("id", &config, WINDOW_MS);
        prop_assert!(fresh.allowed);
        prop_assert_eq!(fresh.remaining, max_requests - 1);
        prop_assert_eq!(fresh.reset_at_ms, 2 * WINDOW_MS);
    }

    // Rejected requests always report a positive retry-after that does not
    // outlive the window.
    #[test]
    fn prop_retry_after_is_positive_and_bounded(extra in 1..50u64) {
        let config = RateLimitConfig::new(1, WINDOW_MS);
        let windows = MemoryWindows::new();

        windows.check_at("id", &config, 0);
        for at in (0..extra).map(|i| i * 17 % WINDOW_MS) {
            let rejected = windows.check_at("id", &config, at);
            prop_assert!(!rejected.allowed);
            prop_assert!(rejected.retry_after_secs >= 1);
            prop_assert!(rejected.retry_after_secs <= WINDOW_MS.div_ceil(1000));
        }
    }

    // Sweeping never evicts a live window and always evicts elapsed ones.
    #[test]
    fn prop_sweep_is_exact(
        requests in prop::collection::vec(request_strategy(), 1..100),
        sweep_at in 0..6_000u64,
    ) {
        let config = RateLimitConfig::new(3, WINDOW_MS);
        let windows = MemoryWindows::new();

        let mut requests = requests;
        requests.sort_by_key(|(_, at)| *at);
        let mut live_after_sweep = std::collections::HashSet::new();
        let mut latest_reset: std::collections::HashMap<String, u64> =
            std::collections::HashMap::new();

        for (id, at) in requests {
            let decision = windows.check_at(&id, &config, at);
            latest_reset.insert(id, decision.reset_at_ms);
        }
        for (id, reset) in &latest_reset {
            if *reset > sweep_at {
                live_after_sweep.insert(id.clone());
            }
        }

        windows.sweep_at(sweep_at);
        prop_assert_eq!(windows.len(), live_after_sweep.len());
    }
}
