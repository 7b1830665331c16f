use std::sync::Arc;

use async_trait::async_trait;
use axum::response::IntoResponse;
use http::request::Parts;
use medrx_errors::Problem;

use crate::auth::{is_preflight_request, request_id};
use crate::pipeline::{RequestContext, Stage, StageOutcome};

/// Whether a route requires authentication.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthRequirement {
    /// No authentication required (public route).
    None,
    /// Authentication required.
    Required,
}

#[derive(Debug, thiserror::Error)]
pub enum RoutePolicyError {
    #[error("public route pattern '{pattern}' is invalid: {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

/// One public pattern, compiled into its own matcher.
#[derive(Clone)]
struct PublicPattern {
    raw: String,
    /// Literal path without the trailing `/**`.
    base: String,
    wildcard: bool,
    matcher: matchit::Router<()>,
}

impl PublicPattern {
    fn compile(pattern: &str) -> Result<Self, RoutePolicyError> {
        let invalid = |reason: &str| RoutePolicyError::InvalidPattern {
            pattern: pattern.to_owned(),
            reason: reason.to_owned(),
        };

        let trimmed = pattern.trim();
        if trimmed.is_empty() {
            return Err(invalid("pattern is empty"));
        }
        // `api/v1/**` and `/api/v1/**` are the same pattern
        let normalized = if trimmed.starts_with('/') {
            trimmed.to_owned()
        } else {
            format!("/{trimmed}")
        };

        let (base, wildcard) = match normalized.strip_suffix("/**") {
            Some(base) => (base.to_owned(), true),
            None => (normalized.clone(), false),
        };
        if base.contains(['*', '{', '}']) {
            return Err(invalid("only a trailing `/**` wildcard is supported"));
        }

        let mut matcher = matchit::Router::new();
        let mut insert = |path: &str| {
            matcher
                .insert(path, ())
                .map_err(|e| invalid(&e.to_string()))
        };
        if wildcard {
            // `/x/**` covers `/x`, `/x/` and everything below
            if base.is_empty() {
                insert("/")?;
            } else {
                insert(&base)?;
                insert(&format!("{base}/"))?;
            }
            insert(&format!("{base}/{{*rest}}"))?;
        } else {
            insert(&base)?;
        }

        Ok(Self {
            raw: pattern.to_owned(),
            base,
            wildcard,
            matcher,
        })
    }

    fn matches(&self, path: &str) -> bool {
        self.matcher.at(path).is_ok()
    }
}

/// Set of path patterns that are reachable without authentication.
///
/// A path is public iff any pattern matches it, so the order patterns are
/// declared in never changes a decision. Everything else requires an
/// authenticated security context.
#[derive(Clone)]
pub struct RoutePolicy {
    patterns: Arc<[PublicPattern]>,
}

impl RoutePolicy {
    /// Compile the public allow-list.
    ///
    /// # Errors
    /// Returns [`RoutePolicyError::InvalidPattern`] for any pattern using a
    /// wildcard other than a trailing `/**`.
    pub fn new<I, S>(patterns: I) -> Result<Self, RoutePolicyError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|p| PublicPattern::compile(p.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            patterns: patterns.into(),
        })
    }

    #[must_use]
    pub fn is_public(&self, path: &str) -> bool {
        self.patterns.iter().any(|p| p.matches(path))
    }

    #[must_use]
    pub fn resolve(&self, path: &str) -> AuthRequirement {
        if self.is_public(path) {
            AuthRequirement::None
        } else {
            AuthRequirement::Required
        }
    }

    /// Pairs `(shadowed, broader)` where a wildcard pattern already covers
    /// everything another pattern would open.
    #[must_use]
    pub fn shadowed_patterns(&self) -> Vec<(&str, &str)> {
        let mut shadowed = Vec::new();
        for (i, pattern) in self.patterns.iter().enumerate() {
            let probe = if pattern.base.is_empty() { "/" } else { &pattern.base };
            let covering = self.patterns.iter().enumerate().find(|(j, other)| {
                *j != i
                    && other.wildcard
                    && (other.base != pattern.base || !pattern.wildcard)
                    && other.matches(probe)
            });
            if let Some((_, other)) = covering {
                shadowed.push((pattern.raw.as_str(), other.raw.as_str()));
            }
        }
        shadowed
    }

    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(|p| p.raw.as_str())
    }
}

/// Pipeline stage that refuses anonymous requests to non-public paths.
pub struct RoutePolicyEnforcer {
    policy: RoutePolicy,
}

impl RoutePolicyEnforcer {
    pub const NAME: &'static str = "route-policy";

    #[must_use]
    pub fn new(policy: RoutePolicy) -> Self {
        Self { policy }
    }
}

#[async_trait]
impl Stage for RoutePolicyEnforcer {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    async fn process(&self, parts: &Parts, ctx: &mut RequestContext) -> StageOutcome {
        // Preflight is answered by the CORS layer, never by a handler.
        if is_preflight_request(&parts.method, &parts.headers) {
            return StageOutcome::Continue;
        }

        let path = parts.uri.path();
        match self.policy.resolve(path) {
            AuthRequirement::None => StageOutcome::Continue,
            AuthRequirement::Required if ctx.security().is_authenticated() => {
                StageOutcome::Continue
            }
            AuthRequirement::Required => {
                tracing::debug!(path, "anonymous request to protected route refused");
                let mut problem = Problem::unauthorized(
                    "Full authentication is required to access this resource",
                )
                .with_instance(path);
                if let Some(rid) = request_id(&parts.headers) {
                    problem = problem.with_trace_id(rid);
                }
                StageOutcome::Respond(problem.into_response())
            }
        }
    }
}
