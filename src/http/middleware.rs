//! Rate limiting middleware.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::warn;

use crate::ratelimit::{AdmissionControl, Decision, RequestMeta};

/// Shared handle to the admission policy, cloned into the middleware state.
#[derive(Clone)]
pub struct RateGate {
    policy: Arc<dyn AdmissionControl>,
}

impl RateGate {
    pub fn new(policy: Arc<dyn AdmissionControl>) -> Self {
        Self { policy }
    }

    /// The underlying admission policy.
    pub fn policy(&self) -> &Arc<dyn AdmissionControl> {
        &self.policy
    }
}

/// Middleware entry point: admit the request or terminate it with 429.
///
/// Register with `axum::middleware::from_fn_with_state`. On rejection the
/// wrapped handler is never invoked and a single warning is logged with the
/// method, URL, client IP, and attempt count.
pub async fn enforce(State(gate): State<RateGate>, request: Request, next: Next) -> Response {
    let meta = RequestMeta::new(
        request.method().as_str(),
        request.uri().to_string(),
        client_ip(&request),
    );

    match gate.policy.admit(&meta).await {
        Decision::Allow => next.run(request).await,
        Decision::Reject {
            attempts,
            retry_after_ms,
        } => {
            warn!(
                method = %meta.method,
                url = %meta.url,
                ip = %meta.client_ip,
                attempts,
                "rate limit exceeded"
            );
            too_many_requests(retry_after_ms)
        }
    }
}

/// Resolve the client address: first `X-Forwarded-For` hop, then
/// `X-Real-IP`, then the peer address.
pub(super) fn client_ip(request: &Request) -> String {
    if let Some(ip) = forwarded_ip(request.headers()) {
        return ip;
    }
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn forwarded_ip(headers: &HeaderMap) -> Option<String> {
    if let Some(value) = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
    {
        let value = value.trim();
        if !value.is_empty() {
            return Some(value.to_string());
        }
    }
    headers
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// The terminal 429 response.
fn too_many_requests(retry_after_ms: u64) -> Response {
    let retry_after_secs = retry_after_ms.div_ceil(1000).max(1);
    (
        StatusCode::TOO_MANY_REQUESTS,
        [(header::RETRY_AFTER, retry_after_secs.to_string())],
        Json(json!({
            "data": null,
            "error": {
                "status": 429,
                "name": "TooManyRequestsError",
                "message": "Too many requests, please try again later."
            }
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        middleware::from_fn_with_state,
        routing::{get, post},
        Router,
    };
    use http_body_util::BodyExt;
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::config::{LimiterConfig, PolicyKind};
    use crate::ratelimit::build_policy;

    fn test_router(max: u64) -> Router {
        let config = LimiterConfig {
            policy: PolicyKind::PathScopedFixedWindow,
            max,
            window_ms: 900_000,
            paths: vec!["/api/auth/local".into()],
            admin_prefix: "/admin".into(),
            eviction_grace_ms: 900_000,
            sweep_interval_secs: 60,
        };
        let gate = RateGate::new(build_policy(&config));
        Router::new()
            .route("/api/auth/local", post(|| async { "ok" }))
            .route("/api/blogs", get(|| async { "ok" }))
            .layer(from_fn_with_state(gate, enforce))
    }

    fn request(method: &str, uri: &str, ip: [u8; 4]) -> Request {
        let mut request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        request
            .extensions_mut()
            .insert(ConnectInfo(SocketAddr::from((ip, 4000))));
        request
    }

    #[tokio::test]
    async fn test_limited_path_rejected_past_max() {
        let router = test_router(3);
        for _ in 0..3 {
            let response = router
                .clone()
                .oneshot(request("POST", "/api/auth/local", [1, 2, 3, 4]))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }
        let response = router
            .oneshot(request("POST", "/api/auth/local", [1, 2, 3, 4]))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert!(response.headers().contains_key(header::RETRY_AFTER));
    }

    #[tokio::test]
    async fn test_rejection_body_shape() {
        let router = test_router(1);
        router
            .clone()
            .oneshot(request("POST", "/api/auth/local", [1, 2, 3, 4]))
            .await
            .unwrap();
        let response = router
            .oneshot(request("POST", "/api/auth/local", [1, 2, 3, 4]))
            .await
            .unwrap();

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(
            body,
            json!({
                "data": null,
                "error": {
                    "status": 429,
                    "name": "TooManyRequestsError",
                    "message": "Too many requests, please try again later."
                }
            })
        );
    }

    #[tokio::test]
    async fn test_unlisted_path_never_limited() {
        let router = test_router(1);
        for _ in 0..10 {
            let response = router
                .clone()
                .oneshot(request("GET", "/api/blogs", [1, 2, 3, 4]))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }
    }

    #[tokio::test]
    async fn test_clients_limited_independently() {
        let router = test_router(1);
        router
            .clone()
            .oneshot(request("POST", "/api/auth/local", [1, 2, 3, 4]))
            .await
            .unwrap();
        let response = router
            .clone()
            .oneshot(request("POST", "/api/auth/local", [1, 2, 3, 4]))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

        let response = router
            .oneshot(request("POST", "/api/auth/local", [5, 6, 7, 8]))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_forwarded_for_takes_precedence() {
        let router = test_router(1);

        // Same peer address, distinct forwarded clients: separate windows.
        for ip in ["10.0.0.1", "10.0.0.2"] {
            let mut req = request("POST", "/api/auth/local", [127, 0, 0, 1]);
            req.headers_mut()
                .insert("x-forwarded-for", ip.parse().unwrap());
            let response = router.clone().oneshot(req).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        let mut req = request("POST", "/api/auth/local", [127, 0, 0, 1]);
        req.headers_mut()
            .insert("x-forwarded-for", "10.0.0.1".parse().unwrap());
        let response = router.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[test]
    fn test_forwarded_ip_parsing() {
        let mut headers = HeaderMap::new();
        assert_eq!(forwarded_ip(&headers), None);

        headers.insert("x-real-ip", "9.9.9.9".parse().unwrap());
        assert_eq!(forwarded_ip(&headers), Some("9.9.9.9".to_string()));

        headers.insert(
            "x-forwarded-for",
            "1.2.3.4, 10.0.0.1, 10.0.0.2".parse().unwrap(),
        );
        assert_eq!(forwarded_ip(&headers), Some("1.2.3.4".to_string()));
    }
}
