//! Key generation for rate limit windows.

use super::request::RequestMeta;

/// A key that uniquely identifies one rate limit window.
///
/// Under [`KeyScope::PerPath`] the key combines the client address with the
/// requested URL, so a client is tracked independently per distinct path.
/// Under [`KeyScope::Global`] the key is the client address alone.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClientKey {
    /// The client network address.
    pub ip: String,
    /// The requested URL, when the scope tracks paths separately.
    pub url: Option<String>,
}

/// How requests are grouped into windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyScope {
    /// One window per client address and URL pair.
    PerPath,
    /// One window per client address across all URLs.
    Global,
}

impl KeyScope {
    /// Derive the window key for a request under this scope.
    pub fn key_for(&self, meta: &RequestMeta) -> ClientKey {
        match self {
            KeyScope::PerPath => ClientKey {
                ip: meta.client_ip.clone(),
                url: Some(meta.url.clone()),
            },
            KeyScope::Global => ClientKey {
                ip: meta.client_ip.clone(),
                url: None,
            },
        }
    }
}

impl std::fmt::Display for ClientKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.url {
            Some(url) => write!(f, "{}:{}", self.ip, url),
            None => write!(f, "{}", self.ip),
        }
    }
}
