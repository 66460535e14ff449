//! CORS policy built from configured origins.
//!
//! Origins are matched exactly, or with a single `*` standing for one
//! subdomain label (`https://*.vercel.app`). A lone `*` allows any origin.

use axum::http::{HeaderValue, Method, header::CONTENT_TYPE, request::Parts};
use tower_http::cors::{AllowOrigin, CorsLayer};

/// One allowed-origin rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OriginPattern {
    Any,
    Exact(String),
    Wildcard { prefix: String, suffix: String },
}

impl OriginPattern {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim().trim_end_matches('/');
        if raw == "*" {
            return OriginPattern::Any;
        }
        match raw.split_once('*') {
            Some((prefix, suffix)) => OriginPattern::Wildcard {
                prefix: prefix.to_string(),
                suffix: suffix.to_string(),
            },
            None => OriginPattern::Exact(raw.to_string()),
        }
    }

    pub fn matches(&self, origin: &str) -> bool {
        match self {
            OriginPattern::Any => true,
            OriginPattern::Exact(allowed) => allowed == origin,
            OriginPattern::Wildcard { prefix, suffix } => origin
                .strip_prefix(prefix.as_str())
                .and_then(|rest| rest.strip_suffix(suffix.as_str()))
                .is_some_and(|label| {
                    !label.is_empty()
                        && label
                            .chars()
                            .all(|c| c.is_ascii_alphanumeric() || c == '-')
                }),
        }
    }
}

/// CORS layer allowing GET/POST with JSON or form bodies from `origins`
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let patterns: Vec<OriginPattern> = origins.iter().map(|o| OriginPattern::parse(o)).collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(
            move |origin: &HeaderValue, _parts: &Parts| {
                origin
                    .to_str()
                    .map(|o| patterns.iter().any(|p| p.matches(o)))
                    .unwrap_or(false)
            },
        ))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE])
}
