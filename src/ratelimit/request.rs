//! Request metadata and admission decisions.

/// The subset of an HTTP request the limiter inspects.
///
/// The middleware builds one of these per inbound request; the limiter
/// never sees headers, bodies, or the underlying connection.
#[derive(Debug, Clone)]
pub struct RequestMeta {
    /// HTTP method, e.g. `POST`.
    pub method: String,
    /// Request path including any query string, e.g. `/api/auth/local`.
    pub url: String,
    /// Client network address as reported by the pipeline.
    pub client_ip: String,
}

impl RequestMeta {
    pub fn new(
        method: impl Into<String>,
        url: impl Into<String>,
        client_ip: impl Into<String>,
    ) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
            client_ip: client_ip.into(),
        }
    }
}

/// Outcome of an admission check for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// The request proceeds to the wrapped handler.
    Allow,
    /// The request must be terminated with HTTP 429.
    Reject {
        /// Requests observed in the current window for this key.
        attempts: u64,
        /// Milliseconds until the key's window resets.
        retry_after_ms: u64,
    },
}

impl Decision {
    /// Whether this decision lets the request through.
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }
}
