//! Fixed-window rate limiter.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use parking_lot::Mutex;
use tracing::debug;

use super::filter::PathFilter;
use super::key::{ClientKey, KeyScope};
use super::request::{Decision, RequestMeta};
use super::WindowSettings;

/// Per-key counting state for one window.
#[derive(Debug, Clone, Copy)]
struct RateWindow {
    /// Requests observed in the current window.
    count: u64,
    /// Absolute time (unix millis) at which this window expires.
    reset_at_ms: u64,
}

/// A fixed-window rate limiter.
///
/// Each key owns a counter and a reset deadline. The first request from a
/// key opens a window; requests within it are counted and rejected past the
/// configured maximum; a request at or after the deadline opens a fresh
/// window. Exactly `max` requests are admitted per window.
///
/// All state lives behind a single mutex, so read-check-increment is one
/// critical section: concurrent requests for the same key cannot lose an
/// increment or admit past the limit.
pub struct FixedWindowLimiter {
    windows: Mutex<HashMap<ClientKey, RateWindow>>,
    settings: WindowSettings,
    scope: KeyScope,
    filter: PathFilter,
}

impl FixedWindowLimiter {
    pub fn new(settings: WindowSettings, scope: KeyScope, filter: PathFilter) -> Self {
        Self {
            windows: Mutex::new(HashMap::new()),
            settings,
            scope,
            filter,
        }
    }

    /// Decide whether to admit a request observed at `now_ms`.
    ///
    /// Requests whose URL is not subject to limiting are admitted without
    /// touching any state.
    pub fn admit_at(&self, meta: &RequestMeta, now_ms: u64) -> Decision {
        if !self.filter.applies_to(&meta.url) {
            return Decision::Allow;
        }

        let key = self.scope.key_for(meta);
        let fresh = RateWindow {
            count: 1,
            reset_at_ms: now_ms + self.settings.window_ms,
        };

        let mut windows = self.windows.lock();
        match windows.entry(key) {
            Entry::Occupied(mut occupied) => {
                let window = occupied.get_mut();
                if now_ms >= window.reset_at_ms {
                    // A window at its reset deadline is expired, not still
                    // active.
                    *window = fresh;
                    Decision::Allow
                } else if window.count < self.settings.max {
                    window.count += 1;
                    Decision::Allow
                } else {
                    Decision::Reject {
                        attempts: window.count,
                        retry_after_ms: window.reset_at_ms - now_ms,
                    }
                }
            }
            Entry::Vacant(vacant) => {
                debug!(key = %vacant.key(), "opening rate window");
                vacant.insert(fresh);
                Decision::Allow
            }
        }
    }

    /// Drop windows that expired more than the grace period ago.
    ///
    /// Returns the number of keys evicted.
    pub fn sweep_at(&self, now_ms: u64) -> usize {
        let mut windows = self.windows.lock();
        let before = windows.len();
        let grace = self.settings.eviction_grace_ms;
        windows.retain(|_, w| now_ms < w.reset_at_ms.saturating_add(grace));
        before - windows.len()
    }

    /// Number of keys currently tracked.
    pub fn tracked_keys(&self) -> usize {
        self.windows.lock().len()
    }
}
