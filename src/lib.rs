//! Turnpike - Per-Client HTTP Rate Limiting
//!
//! This crate implements per-client rate limiting for an HTTP middleware
//! pipeline. Requests are counted per key (client address, optionally per
//! URL) within configurable time windows; requests past the configured
//! maximum are terminated with HTTP 429 and a structured error body. Two
//! window policies are provided (fixed window and sliding log) behind a
//! common admission trait, with a background sweeper bounding memory.

pub mod config;
pub mod error;
pub mod http;
pub mod ratelimit;
