//! Window Sweep Task
//!
//! Background task that periodically evicts elapsed rate-limit windows from
//! the limiter's in-process fallback map, bounding its memory use under
//! sustained traffic from many distinct identifiers.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::limiter::RateLimiter;

/// Spawns a background task that periodically sweeps the limiter's fallback
/// window map.
///
/// The sweep holds the map's lock only for the eviction itself; requests in
/// flight are never blocked across it.
///
/// # Arguments
/// * `limiter` - shared limiter whose local map is swept
/// * `sweep_interval_secs` - Interval in seconds between sweeps
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
pub fn spawn_sweep_task(limiter: Arc<RateLimiter>, sweep_interval_secs: u64) -> JoinHandle<()> {
    let interval = Duration::from_secs(sweep_interval_secs);

    tokio::spawn(async move {
        info!(
            "Starting window sweep task with interval of {} seconds",
            sweep_interval_secs
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = limiter.sweep_local();
            if removed > 0 {
                info!("Window sweep: evicted {} elapsed windows", removed);
            } else {
                debug!("Window sweep: no elapsed windows");
            }
        }
    })
}
