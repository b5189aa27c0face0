//! HTTP surface: middleware and server.

mod logging;
mod middleware;
mod server;

pub use logging::security_log;
pub use middleware::{enforce, RateGate};
pub use server::HttpServer;
