//! Security-relevant request logging.

use std::time::Instant;

use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use tracing::{error, info, warn};

/// Middleware that logs security-relevant request outcomes.
///
/// Runs outside the rate limiter so rejected requests are observed with
/// their final 429 status. Logs: access to administrative and user routes,
/// failed authorization, authentication attempt outcomes, file upload
/// attempts, rate limit hits, and server errors.
pub async fn security_log(request: Request, next: Next) -> Response {
    let method = request.method().to_string();
    let url = request.uri().to_string();
    let ip = super::middleware::client_ip(&request);
    let start = Instant::now();

    let response = next.run(request).await;

    let status = response.status();
    let elapsed_ms = start.elapsed().as_millis() as u64;

    if url.contains("/admin") || url.contains("/api/users") {
        info!(%method, %url, status = status.as_u16(), elapsed_ms, %ip, "sensitive route access");
    }

    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        warn!(%method, %url, %ip, "unauthorized access attempt");
    }

    if url.contains("/api/auth/local") {
        let outcome = if status == StatusCode::OK {
            "success"
        } else {
            "failed"
        };
        info!(%ip, elapsed_ms, outcome, "authentication attempt");
    }

    if url.contains("/api/upload") && method == "POST" {
        info!(status = status.as_u16(), %ip, "file upload attempt");
    }

    if status == StatusCode::TOO_MANY_REQUESTS {
        warn!(%method, %url, %ip, "request rate limited");
    }

    if status.is_server_error() {
        error!(%method, %url, status = status.as_u16(), %ip, "server error");
    }

    response
}
