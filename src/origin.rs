//! Origin allow-list gate.
//!
//! Every inbound request passes through [`enforce_origin`] before CORS
//! handling or any route handler runs. A request is rejected when:
//!
//! - it carries no (or an empty) `Origin` header and is not the liveness
//!   probe, or
//! - it carries an `Origin` header that is not exactly in the allow-list.
//!
//! Rejections are answered with `404 Not Found` rather than `403`, so the
//! existence of the rule is not revealed.
//!
//! # Limitation
//!
//! The `Origin` header is supplied by the caller. Browsers set it honestly,
//! so this stops disallowed cross-origin browser calls, but a direct API
//! client can send any value it likes. This is not authentication.

use axum::{
    body::Body,
    extract::State,
    http::{header::ORIGIN, HeaderValue, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::collections::HashSet;
use std::sync::Arc;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};

use crate::server::{not_found, HEALTH_PATH};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OriginDecision {
    Allow,
    Reject,
}

/// Allow-list computed once at startup and shared read-only.
#[derive(Debug, Clone)]
pub struct OriginGate {
    allowed: HashSet<String>,
}

impl OriginGate {
    pub fn new(allowed: impl IntoIterator<Item = String>) -> Self {
        Self {
            allowed: allowed.into_iter().collect(),
        }
    }

    pub fn is_allowed(&self, origin: &str) -> bool {
        self.allowed.contains(origin)
    }

    /// Decide whether a request with the given `Origin` header and path may
    /// proceed.
    ///
    /// An empty header counts as no header.
    pub fn check(&self, origin: Option<&str>, path: &str) -> OriginDecision {
        match origin.filter(|o| !o.is_empty()) {
            None if is_liveness_probe(path) => OriginDecision::Allow,
            None => OriginDecision::Reject,
            Some(origin) if self.is_allowed(origin) => OriginDecision::Allow,
            Some(_) => OriginDecision::Reject,
        }
    }

    /// CORS layer answering preflights for exactly the allowed origins.
    ///
    /// Credentials are allowed, so methods and headers are mirrored from
    /// the request instead of using wildcards.
    pub fn cors_layer(&self) -> CorsLayer {
        let origins: Vec<HeaderValue> = self
            .allowed
            .iter()
            .filter_map(|o| HeaderValue::from_str(o).ok())
            .collect();

        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_credentials(true)
            .allow_methods(AllowMethods::mirror_request())
            .allow_headers(AllowHeaders::mirror_request())
    }
}

fn is_liveness_probe(path: &str) -> bool {
    path == HEALTH_PATH
}

/// Axum middleware applying [`OriginGate::check`].
///
/// Install with `axum::middleware::from_fn_with_state` as the outermost
/// layer of the router.
pub async fn enforce_origin(
    State(gate): State<Arc<OriginGate>>,
    req: Request<Body>,
    next: Next,
) -> Response {
    // A header that is not valid UTF-8 cannot match the allow-list
    let origin = req
        .headers()
        .get(ORIGIN)
        .map(|v| v.to_str().unwrap_or("\u{fffd}"));
    let path = req.uri().path();

    match gate.check(origin, path) {
        OriginDecision::Allow => next.run(req).await,
        OriginDecision::Reject => {
            tracing::debug!(origin = ?origin, path, "rejected request origin");
            not_found("Not Found").into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gate() -> OriginGate {
        OriginGate::new(vec![
            "http://localhost:3000".to_string(),
            "https://designer.example".to_string(),
        ])
    }

    #[test]
    fn test_allowed_origin_passes() {
        assert_eq!(
            gate().check(Some("http://localhost:3000"), "/humphrey/chat"),
            OriginDecision::Allow
        );
    }

    #[test]
    fn test_unknown_origin_rejected() {
        assert_eq!(
            gate().check(Some("http://evil.example"), "/humphrey/chat"),
            OriginDecision::Reject
        );
    }

    #[test]
    fn test_unknown_origin_rejected_on_health() {
        assert_eq!(
            gate().check(Some("http://evil.example"), "/health"),
            OriginDecision::Reject
        );
    }

    #[test]
    fn test_missing_origin_allowed_for_health() {
        assert_eq!(gate().check(None, "/health"), OriginDecision::Allow);
    }

    #[test]
    fn test_missing_origin_rejected_elsewhere() {
        assert_eq!(gate().check(None, "/humphrey/chat"), OriginDecision::Reject);
        assert_eq!(gate().check(None, "/"), OriginDecision::Reject);
        assert_eq!(gate().check(None, "/healthz"), OriginDecision::Reject);
    }

    #[test]
    fn test_match_is_exact() {
        let g = gate();
        let trailing = g.check(Some("http://localhost:3000/"), "/health");
        assert_eq!(trailing, OriginDecision::Reject);
        let upper = g.check(Some("HTTP://LOCALHOST:3000"), "/health");
        assert_eq!(upper, OriginDecision::Reject);
    }

    #[test]
    fn test_empty_origin_treated_as_missing() {
        let g = gate();
        assert_eq!(g.check(Some(""), "/health"), OriginDecision::Allow);
        assert_eq!(g.check(Some(""), "/humphrey/chat"), OriginDecision::Reject);
    }
}
