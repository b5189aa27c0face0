//! Periodic eviction of expired rate windows.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::debug;

use super::backend::AdmissionControl;

/// Spawn a background task that periodically sweeps the policy's state.
///
/// Without this, the key map grows with every distinct client ever seen.
/// The task runs for the life of the process; the returned handle can be
/// aborted on shutdown.
pub fn start_sweeper(policy: Arc<dyn AdmissionControl>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // The first tick fires immediately; nothing to sweep yet.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let evicted = policy.sweep();
            if evicted > 0 {
                debug!(
                    evicted,
                    remaining = policy.tracked_keys(),
                    "swept expired rate windows"
                );
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ratelimit::{
        FixedWindowLimiter, KeyScope, PathFilter, RequestMeta, WindowSettings,
    };

    // Uses real time: the limiters read the wall clock, not the tokio clock.
    #[tokio::test]
    async fn test_sweeper_evicts_expired_windows() {
        let limiter = Arc::new(FixedWindowLimiter::new(
            WindowSettings {
                max: 3,
                window_ms: 50,
                eviction_grace_ms: 50,
            },
            KeyScope::Global,
            PathFilter::all("/admin"),
        ));

        let policy: Arc<dyn AdmissionControl> = limiter.clone();
        policy
            .admit(&RequestMeta::new("GET", "/api/blogs", "1.2.3.4"))
            .await;
        assert_eq!(limiter.tracked_keys(), 1);

        let handle = start_sweeper(policy, Duration::from_millis(100));

        // Window (50ms) plus grace (50ms) passes well before the second sweep.
        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(limiter.tracked_keys(), 0);

        handle.abort();
    }
}
