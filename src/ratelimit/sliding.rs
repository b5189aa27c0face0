//! Sliding-log rate limiter.

use std::collections::{HashMap, VecDeque};

use parking_lot::Mutex;

use super::filter::PathFilter;
use super::key::{ClientKey, KeyScope};
use super::request::{Decision, RequestMeta};
use super::WindowSettings;

/// A sliding-log rate limiter.
///
/// Instead of a counter per fixed window, each key keeps the timestamps of
/// its recent requests. On every request, timestamps that have fallen out of
/// the trailing window are discarded before the remainder is counted. This
/// smooths the boundary bursts a fixed window permits, at the cost of
/// O(requests-in-window) memory per key.
pub struct SlidingLogLimiter {
    logs: Mutex<HashMap<ClientKey, VecDeque<u64>>>,
    settings: WindowSettings,
    scope: KeyScope,
    filter: PathFilter,
}

impl SlidingLogLimiter {
    pub fn new(settings: WindowSettings, scope: KeyScope, filter: PathFilter) -> Self {
        Self {
            logs: Mutex::new(HashMap::new()),
            settings,
            scope,
            filter,
        }
    }

    /// Decide whether to admit a request observed at `now_ms`.
    pub fn admit_at(&self, meta: &RequestMeta, now_ms: u64) -> Decision {
        if !self.filter.applies_to(&meta.url) {
            return Decision::Allow;
        }

        let key = self.scope.key_for(meta);
        let window_ms = self.settings.window_ms;
        let mut logs = self.logs.lock();
        let log = logs.entry(key).or_default();

        // A timestamp at exactly window-age is out of range.
        while let Some(&oldest) = log.front() {
            if oldest + window_ms <= now_ms {
                log.pop_front();
            } else {
                break;
            }
        }

        if log.len() as u64 >= self.settings.max {
            let oldest = log.front().copied().unwrap_or(now_ms);
            Decision::Reject {
                attempts: log.len() as u64,
                retry_after_ms: (oldest + window_ms).saturating_sub(now_ms),
            }
        } else {
            log.push_back(now_ms);
            Decision::Allow
        }
    }

    /// Prune stale timestamps and drop keys whose log has been empty for
    /// longer than the grace period.
    ///
    /// Returns the number of keys evicted.
    pub fn sweep_at(&self, now_ms: u64) -> usize {
        let horizon = self
            .settings
            .window_ms
            .saturating_add(self.settings.eviction_grace_ms);
        let mut logs = self.logs.lock();
        let before = logs.len();
        logs.retain(|_, log| {
            while let Some(&oldest) = log.front() {
                if oldest + horizon <= now_ms {
                    log.pop_front();
                } else {
                    break;
                }
            }
            !log.is_empty()
        });
        before - logs.len()
    }

    /// Number of keys currently tracked.
    pub fn tracked_keys(&self) -> usize {
        self.logs.lock().len()
    }
}
