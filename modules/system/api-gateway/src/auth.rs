use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::ConnectInfo;
use axum::http::{HeaderMap, Method, header};
use http::request::Parts;
use medrx_authn::{CredentialVerifier, IdentityDirectory};
use medrx_security::{Authentication, AuthenticationDetails};
use secrecy::SecretString;

use crate::pipeline::{RequestContext, Stage, StageOutcome};

/// Header carrying the request correlation id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Pipeline stage that turns a valid bearer token into an authenticated
/// security context.
///
/// For each request:
/// 1. Reads `Authorization: Bearer <token>`; anything else stays anonymous
/// 2. Extracts the token subject through the `CredentialVerifier`
/// 3. Skips the lookup if the context is already authenticated
/// 4. Resolves the subject through the `IdentityDirectory`
/// 5. Re-validates the token against the identity and, on success, records
///    the identity plus request details
///
/// Never answers the request. Denying anonymous callers is the job of
/// [`RoutePolicyEnforcer`](crate::route_policy::RoutePolicyEnforcer).
pub struct AuthenticationGate {
    verifier: Arc<dyn CredentialVerifier>,
    directory: Arc<dyn IdentityDirectory>,
}

impl AuthenticationGate {
    pub const NAME: &'static str = "authentication-gate";

    #[must_use]
    pub fn new(verifier: Arc<dyn CredentialVerifier>, directory: Arc<dyn IdentityDirectory>) -> Self {
        Self {
            verifier,
            directory,
        }
    }
}

#[async_trait]
impl Stage for AuthenticationGate {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    async fn process(&self, parts: &Parts, ctx: &mut RequestContext) -> StageOutcome {
        let Some(token) = extract_bearer_token(&parts.headers) else {
            return StageOutcome::Continue;
        };

        let subject = match self.verifier.extract_subject(token) {
            Ok(subject) => subject,
            Err(err) => {
                tracing::debug!("AuthN indeterminate, continuing anonymous: {err}");
                return StageOutcome::Continue;
            }
        };

        if ctx.security().is_authenticated() {
            tracing::debug!(%subject, "security context already authenticated");
            return StageOutcome::Continue;
        }

        let identity = match self.directory.load_by_subject(&subject).await {
            Ok(identity) => identity,
            Err(err) => {
                tracing::debug!("AuthN rejected: {err}");
                return StageOutcome::Continue;
            }
        };

        if !self.verifier.is_valid(token, &identity) {
            tracing::debug!(%subject, "AuthN rejected: token no longer valid for identity");
            return StageOutcome::Continue;
        }

        let authentication = Authentication::new(
            identity,
            request_details(parts),
            SecretString::from(token),
        );
        match ctx.security_mut().authenticate(authentication) {
            Ok(()) => tracing::debug!(%subject, "request authenticated"),
            Err(err) => tracing::warn!(%subject, "{err}"),
        }
        StageOutcome::Continue
    }
}

fn request_details(parts: &Parts) -> AuthenticationDetails {
    AuthenticationDetails {
        remote_addr: parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr),
        request_id: request_id(&parts.headers).map(str::to_owned),
        user_agent: parts
            .headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned),
    }
}

/// Extract Bearer token from Authorization header
pub(crate) fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

pub(crate) fn request_id(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
}

/// Check if this is a CORS preflight request
///
/// Preflight requests are OPTIONS requests with:
/// - Origin header present
/// - Access-Control-Request-Method header present
pub(crate) fn is_preflight_request(method: &Method, headers: &HeaderMap) -> bool {
    method == Method::OPTIONS
        && headers.contains_key(header::ORIGIN)
        && headers.contains_key(header::ACCESS_CONTROL_REQUEST_METHOD)
}
