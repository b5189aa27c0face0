//! Admission control trait for abstracting over limiter policies.

use std::sync::Arc;

use async_trait::async_trait;

use super::fixed::FixedWindowLimiter;
use super::key::KeyScope;
use super::request::{Decision, RequestMeta};
use super::sliding::SlidingLogLimiter;
use super::{unix_millis, PathFilter, WindowSettings};
use crate::config::{LimiterConfig, PolicyKind};

/// Trait for admission policy implementations.
///
/// This abstracts over the fixed-window and sliding-log limiters so the
/// HTTP middleware and the sweeper can work with either.
#[async_trait]
pub trait AdmissionControl: Send + Sync {
    /// Decide whether to admit a request observed now.
    async fn admit(&self, meta: &RequestMeta) -> Decision;

    /// Evict state that has outlived its window plus the grace period.
    /// Returns the number of keys evicted.
    fn sweep(&self) -> usize;

    /// Number of keys currently tracked.
    fn tracked_keys(&self) -> usize;
}

#[async_trait]
impl AdmissionControl for FixedWindowLimiter {
    async fn admit(&self, meta: &RequestMeta) -> Decision {
        self.admit_at(meta, unix_millis())
    }

    fn sweep(&self) -> usize {
        self.sweep_at(unix_millis())
    }

    fn tracked_keys(&self) -> usize {
        FixedWindowLimiter::tracked_keys(self)
    }
}

#[async_trait]
impl AdmissionControl for SlidingLogLimiter {
    async fn admit(&self, meta: &RequestMeta) -> Decision {
        self.admit_at(meta, unix_millis())
    }

    fn sweep(&self) -> usize {
        self.sweep_at(unix_millis())
    }

    fn tracked_keys(&self) -> usize {
        SlidingLogLimiter::tracked_keys(self)
    }
}

/// Construct the admission policy selected by the configuration.
pub fn build_policy(config: &LimiterConfig) -> Arc<dyn AdmissionControl> {
    let settings = WindowSettings {
        max: config.max,
        window_ms: config.window_ms,
        eviction_grace_ms: config.eviction_grace_ms,
    };

    match config.policy {
        PolicyKind::PathScopedFixedWindow => Arc::new(FixedWindowLimiter::new(
            settings,
            KeyScope::PerPath,
            PathFilter::scoped(config.paths.clone(), config.admin_prefix.clone()),
        )),
        PolicyKind::GlobalFixedWindow => Arc::new(FixedWindowLimiter::new(
            settings,
            KeyScope::Global,
            PathFilter::all(config.admin_prefix.clone()),
        )),
        PolicyKind::SlidingLog => Arc::new(SlidingLogLimiter::new(
            settings,
            KeyScope::PerPath,
            PathFilter::scoped(config.paths.clone(), config.admin_prefix.clone()),
        )),
    }
}
