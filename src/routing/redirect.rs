//! Edge redirect rule: canonicalizes inbound request paths before any page
//! logic runs.
//!
//! Requests under the default-language prefix (`/en`, `/en/...`) are
//! redirected to the unprefixed path. Everything else continues untouched.
//! Internal, API and static-file paths bypass the rule entirely.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use regex::Regex;
use tracing::debug;

use crate::i18n::Language;
use crate::routing::locale::has_locale_segment;

/// Prefix of the JSON API; never redirected.
pub const API_PREFIX: &str = "/api";

/// Internal prefixes excluded when none are configured.
pub const DEFAULT_INTERNAL_PREFIXES: &[&str] = &["/_internal", "/static", "/assets"];

const STATIC_EXTENSIONS: &[&str] = &["svg", "png", "jpg", "jpeg", "gif", "webp"];

/// Outcome of evaluating the rule for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EdgeDecision {
    /// Respond with a redirect to this location.
    Redirect(String),
    /// Hand the request to the router unmodified.
    Continue,
}

#[derive(Debug, Clone)]
pub struct EdgeRedirectRule {
    exclusions: Regex,
}

impl EdgeRedirectRule {
    /// Build the rule. `internal_prefixes` are path prefixes (segment-bounded)
    /// that bypass the rule in addition to the API prefix.
    pub fn new<S: AsRef<str>>(internal_prefixes: &[S]) -> Result<Self, regex::Error> {
        let mut prefixes: Vec<String> = internal_prefixes
            .iter()
            .map(|p| p.as_ref().trim().trim_end_matches('/'))
            .filter(|p| !p.is_empty() && *p != "/")
            .map(|p| {
                let p = if p.starts_with('/') {
                    p.to_string()
                } else {
                    format!("/{}", p)
                };
                regex::escape(&p)
            })
            .collect();
        prefixes.push(regex::escape(API_PREFIX));

        let pattern = format!(
            r"^(?:{})(?:/|$)|(?i:\.(?:{})$)|^/favicon\.ico$",
            prefixes.join("|"),
            STATIC_EXTENSIONS.join("|")
        );

        Ok(Self {
            exclusions: Regex::new(&pattern)?,
        })
    }

    /// `true` for paths the rule never applies to.
    pub fn is_excluded(&self, path: &str) -> bool {
        self.exclusions.is_match(path)
    }

    /// Decide what to do with a request for `path` (and its raw query).
    pub fn evaluate(&self, path: &str, query: Option<&str>) -> EdgeDecision {
        if self.is_excluded(path) {
            return EdgeDecision::Continue;
        }

        let default_code = Language::default_language().code();
        if !has_locale_segment(path, default_code) {
            return EdgeDecision::Continue;
        }

        // Collapse leading slashes so "/en//host" cannot become "//host".
        let rest = &path[default_code.len() + 1..];
        let canonical = format!("/{}", rest.trim_start_matches('/'));

        let location = match query {
            Some(query) if !query.is_empty() => format!("{}?{}", canonical, query),
            _ => canonical,
        };
        EdgeDecision::Redirect(location)
    }
}

impl Default for EdgeRedirectRule {
    fn default() -> Self {
        Self::new(DEFAULT_INTERNAL_PREFIXES).expect("default exclusion pattern is valid")
    }
}

/// Axum middleware applying [`EdgeRedirectRule`] to every request.
pub async fn edge_redirect(
    State(rule): State<Arc<EdgeRedirectRule>>,
    request: Request,
    next: Next,
) -> Response {
    let uri = request.uri();
    match rule.evaluate(uri.path(), uri.query()) {
        EdgeDecision::Redirect(location) => {
            debug!(from = %uri, to = %location, "Redirecting default-locale path");
            Redirect::permanent(&location).into_response()
        }
        EdgeDecision::Continue => next.run(request).await,
    }
}
