//! Cross-origin policy for browser clients.
//!
//! An origin is allowed when it matches the configured allow-list exactly
//! (ignoring case) or when its host belongs to one of the deployments we always
//! trust. The decision itself is a pure function so it can be exercised without
//! an HTTP stack; [`cors_layer`] plugs it into `tower-http`.

use std::sync::Arc;

use axum::http::{request::Parts, HeaderValue};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tracing::warn;
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrustedHost {
    Exact(&'static str),
    /// Matches any host ending in the given suffix (the suffix includes the leading dot).
    Suffix(&'static str),
}

impl TrustedHost {
    fn matches(&self, host: &str) -> bool {
        match *self {
            TrustedHost::Exact(expected) => host.eq_ignore_ascii_case(expected),
            TrustedHost::Suffix(suffix) => host.len() >= suffix.len()
                && host.is_char_boundary(host.len() - suffix.len())
                && host[host.len() - suffix.len()..].eq_ignore_ascii_case(suffix),
        }
    }
}

pub const TRUSTED_HOSTS: &[TrustedHost] = &[
    TrustedHost::Exact("codex-50f3xxj1b-s022511hs-projects.vercel.app"),
    TrustedHost::Exact("codex-six-teal.vercel.app"),
    TrustedHost::Suffix(".vercel.app"),
    TrustedHost::Exact("n15labs.co.uk"),
    TrustedHost::Suffix(".n15labs.co.uk"),
    TrustedHost::Exact("localhost"),
];

#[derive(Debug, Clone, Default)]
pub struct OriginPolicy {
    allowed: Vec<String>,
}

impl OriginPolicy {
    pub fn new(allowed: Vec<String>) -> Self {
        Self { allowed }
    }

    pub fn allowed_origins(&self) -> &[String] {
        &self.allowed
    }

    /// Decides whether `origin` may make credentialed cross-origin requests.
    ///
    /// Errors only when a non-empty origin that is not on the allow-list cannot
    /// be parsed as an absolute URL.
    pub fn evaluate(&self, origin: &str) -> Result<bool, url::ParseError> {
        if origin.trim().is_empty() {
            return Ok(false);
        }
        if self.allowed.iter().any(|o| o.eq_ignore_ascii_case(origin)) {
            return Ok(true);
        }
        let url = Url::parse(origin)?;
        Ok(url.host_str().is_some_and(is_trusted_host))
    }

    /// Like [`OriginPolicy::evaluate`], but a malformed origin is logged and denied.
    pub fn is_allowed(&self, origin: &str) -> bool {
        match self.evaluate(origin) {
            Ok(allowed) => allowed,
            Err(e) => {
                warn!(origin, error = %e, "rejecting malformed CORS origin");
                false
            }
        }
    }
}

pub fn is_trusted_host(host: &str) -> bool {
    TRUSTED_HOSTS.iter().any(|rule| rule.matches(host))
}

/// Credentialed CORS for any method and header, gated by `policy`.
pub fn cors_layer(policy: Arc<OriginPolicy>) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(move |origin: &HeaderValue, _parts: &Parts| {
            match origin.to_str() {
                Ok(origin) => policy.is_allowed(origin),
                Err(_) => {
                    warn!("rejecting non-ASCII CORS origin");
                    false
                }
            }
        }))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suffix_rule_requires_the_dot() {
        let rule = TrustedHost::Suffix(".vercel.app");
        assert!(rule.matches("preview-123.vercel.app"));
        assert!(rule.matches("PREVIEW.Vercel.App"));
        assert!(!rule.matches("vercel.app"));
        assert!(!rule.matches("evilvercel.app"));
    }

    #[test]
    fn exact_rule_ignores_case() {
        let rule = TrustedHost::Exact("localhost");
        assert!(rule.matches("LocalHost"));
        assert!(!rule.matches("localhost.evil.com"));
    }
}
