//! HTTP server wrapper.

use std::net::SocketAddr;

use axum::{
    extract::State,
    middleware::{from_fn, from_fn_with_state},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tracing::info;

use super::logging::security_log;
use super::middleware::{enforce, RateGate};
use crate::error::Result;

/// HTTP server hosting the rate-limited pipeline.
///
/// The router carries the limiter middleware plus the security logger;
/// library users embedding the middleware in their own application build
/// their own router and attach [`enforce`] the same way.
pub struct HttpServer {
    /// Address to bind to
    addr: SocketAddr,
    /// Shared admission policy handle
    gate: RateGate,
}

impl HttpServer {
    pub fn new(addr: SocketAddr, gate: RateGate) -> Self {
        Self { addr, gate }
    }

    /// Build the service router.
    ///
    /// The operational endpoints sit outside the limiter layer, so a
    /// monitoring probe never consumes quota or gets rejected. Everything
    /// else passes through the limiter. The security logger wraps both so
    /// rejections are logged with their final status.
    pub fn router(&self) -> Router {
        let limited = Router::new()
            .fallback(not_found)
            .layer(from_fn_with_state(self.gate.clone(), enforce));

        Router::new()
            .route("/health", get(health))
            .route("/status", get(status).with_state(self.gate.clone()))
            .merge(limited)
            .layer(from_fn(security_log))
    }

    /// Start the server with graceful shutdown.
    ///
    /// The server stops accepting connections when the provided signal
    /// resolves.
    pub async fn serve_with_shutdown<F>(self, signal: F) -> Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let router = self.router();

        info!(addr = %self.addr, "Starting HTTP server");

        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(signal)
        .await?;

        Ok(())
    }
}

async fn health() -> &'static str {
    "ok"
}

async fn not_found() -> axum::http::StatusCode {
    axum::http::StatusCode::NOT_FOUND
}

/// Limiter occupancy, for operators watching memory growth.
async fn status(State(gate): State<RateGate>) -> Json<Value> {
    Json(json!({
        "tracked_keys": gate.policy().tracked_keys(),
    }))
}
