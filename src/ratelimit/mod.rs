//! Rate limiting logic and state management.

mod backend;
mod filter;
mod fixed;
mod key;
mod request;
mod sliding;
mod sweeper;

pub use backend::{build_policy, AdmissionControl};
pub use filter::PathFilter;
pub use fixed::FixedWindowLimiter;
pub use key::{ClientKey, KeyScope};
pub use request::{Decision, RequestMeta};
pub use sliding::SlidingLogLimiter;
pub use sweeper::start_sweeper;

use std::time::{SystemTime, UNIX_EPOCH};

/// Sizing knobs shared by both window policies.
#[derive(Debug, Clone, Copy)]
pub struct WindowSettings {
    /// Maximum requests admitted per key within one window.
    pub max: u64,
    /// Window duration in milliseconds.
    pub window_ms: u64,
    /// How long past expiry a window may linger before the sweeper drops it.
    pub eviction_grace_ms: u64,
}

/// Current wall-clock time in milliseconds since the Unix epoch.
pub(crate) fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
