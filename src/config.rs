//! Configuration management for Turnpike.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

use crate::error::{Result, TurnpikeError};

/// Main configuration for the Turnpike service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnpikeConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Rate limiter configuration
    #[serde(default)]
    pub limiter: LimiterConfig,
}

impl Default for TurnpikeConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            limiter: LimiterConfig::default(),
        }
    }
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP listen address
    #[serde(default = "default_listen_addr")]
    pub listen_addr: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
        }
    }
}

fn default_listen_addr() -> SocketAddr {
    // The literal is well-formed, so the parse cannot fail.
    "127.0.0.1:8080".parse().unwrap()
}

/// Which admission policy the limiter runs.
///
/// The two fixed-window policies mirror the two middleware variants this
/// service replaces; neither was authoritative, so the choice is explicit
/// configuration rather than a silent merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyKind {
    /// Fixed window keyed by client IP and URL, scoped to `paths`.
    PathScopedFixedWindow,
    /// Fixed window keyed by client IP alone, applied to all URLs.
    GlobalFixedWindow,
    /// Sliding log keyed by client IP and URL, scoped to `paths`.
    SlidingLog,
}

/// Rate limiter configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimiterConfig {
    /// Admission policy to run
    #[serde(default = "default_policy")]
    pub policy: PolicyKind,

    /// Window duration in milliseconds
    #[serde(default = "default_window_ms")]
    pub window_ms: u64,

    /// Maximum requests per key within one window
    #[serde(default = "default_max")]
    pub max: u64,

    /// URL substrings subject to limiting (path-scoped policies only)
    #[serde(default = "default_paths")]
    pub paths: Vec<String>,

    /// URL prefix that always bypasses limiting
    #[serde(default = "default_admin_prefix")]
    pub admin_prefix: String,

    /// How long past expiry a window survives before eviction, in milliseconds
    #[serde(default = "default_eviction_grace_ms")]
    pub eviction_grace_ms: u64,

    /// Interval between eviction sweeps, in seconds
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,
}

impl Default for LimiterConfig {
    fn default() -> Self {
        Self {
            policy: default_policy(),
            window_ms: default_window_ms(),
            max: default_max(),
            paths: default_paths(),
            admin_prefix: default_admin_prefix(),
            eviction_grace_ms: default_eviction_grace_ms(),
            sweep_interval_secs: default_sweep_interval(),
        }
    }
}

fn default_policy() -> PolicyKind {
    PolicyKind::PathScopedFixedWindow
}

fn default_window_ms() -> u64 {
    // 15 minutes
    900_000
}

fn default_max() -> u64 {
    8
}

fn default_paths() -> Vec<String> {
    vec!["/api/auth/local".to_string()]
}

fn default_admin_prefix() -> String {
    "/admin".to_string()
}

fn default_eviction_grace_ms() -> u64 {
    // One extra window before a stale key is dropped
    900_000
}

fn default_sweep_interval() -> u64 {
    60
}

impl TurnpikeConfig {
    /// Load configuration from a YAML file.
    pub fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: TurnpikeConfig = serde_yaml::from_str(&contents)
            .map_err(|e| TurnpikeError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate option values once at startup.
    pub fn validate(&self) -> Result<()> {
        self.limiter.validate()
    }
}

impl LimiterConfig {
    /// Validate option values once at startup.
    pub fn validate(&self) -> Result<()> {
        if self.max == 0 {
            return Err(TurnpikeError::Config(
                "limiter.max must be at least 1".to_string(),
            ));
        }
        if self.window_ms == 0 {
            return Err(TurnpikeError::Config(
                "limiter.window_ms must be at least 1".to_string(),
            ));
        }
        if self.sweep_interval_secs == 0 {
            return Err(TurnpikeError::Config(
                "limiter.sweep_interval_secs must be at least 1".to_string(),
            ));
        }
        if self.admin_prefix.is_empty() {
            return Err(TurnpikeError::Config(
                "limiter.admin_prefix must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
