//! URL filtering: which requests are subject to limiting at all.

/// Decides whether a request URL is subject to rate limiting.
///
/// Two rules, checked in order:
/// 1. URLs under the administrative prefix always bypass limiting,
///    independent of the allow-list.
/// 2. When an allow-list is configured, only URLs containing one of its
///    entries as a substring are limited. Without an allow-list every
///    non-administrative URL is limited.
#[derive(Debug, Clone)]
pub struct PathFilter {
    paths: Option<Vec<String>>,
    admin_prefix: String,
}

impl PathFilter {
    /// Build a filter with an allow-list of URL substrings.
    pub fn scoped(paths: Vec<String>, admin_prefix: impl Into<String>) -> Self {
        Self {
            paths: Some(paths),
            admin_prefix: admin_prefix.into(),
        }
    }

    /// Build a filter that limits every non-administrative URL.
    pub fn all(admin_prefix: impl Into<String>) -> Self {
        Self {
            paths: None,
            admin_prefix: admin_prefix.into(),
        }
    }

    /// Whether limiting applies to the given URL.
    pub fn applies_to(&self, url: &str) -> bool {
        if url.starts_with(&self.admin_prefix) {
            return false;
        }
        match &self.paths {
            Some(paths) => paths.iter().any(|p| url.contains(p.as_str())),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allow_list_matches_substring() {
        let filter = PathFilter::scoped(vec!["/api/auth/local".into()], "/admin");
        assert!(filter.applies_to("/api/auth/local"));
        assert!(filter.applies_to("/api/auth/local?foo=1"));
        assert!(!filter.applies_to("/api/blogs"));
        assert!(!filter.applies_to("/api/blogs?populate=*"));
    }

    #[test]
    fn test_no_allow_list_limits_everything() {
        let filter = PathFilter::all("/admin");
        assert!(filter.applies_to("/api/blogs"));
        assert!(filter.applies_to("/anything"));
    }

    #[test]
    fn test_admin_prefix_always_bypasses() {
        let filter = PathFilter::scoped(vec!["/admin/login".into()], "/admin");
        assert!(!filter.applies_to("/admin/login"));
        assert!(!filter.applies_to("/admin"));

        let filter = PathFilter::all("/admin");
        assert!(!filter.applies_to("/admin/content-manager"));
    }

    #[test]
    fn test_admin_prefix_only_matches_start() {
        let filter = PathFilter::all("/admin");
        assert!(filter.applies_to("/api/admin-ish"));
    }
}
