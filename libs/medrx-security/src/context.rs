use std::net::SocketAddr;

use secrecy::SecretString;

use crate::identity::Identity;

/// Request-derived facts recorded next to an authenticated identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct AuthenticationDetails {
    pub remote_addr: Option<SocketAddr>,
    pub request_id: Option<String>,
    pub user_agent: Option<String>,
}

/// A successful authentication: who the caller is, plus where the request came from.
#[derive(Debug, Clone)]
pub struct Authentication {
    identity: Identity,
    details: AuthenticationDetails,
    /// Original bearer token. `SecretString` redacts it from `Debug`.
    bearer_token: SecretString,
}

impl Authentication {
    #[must_use]
    pub fn new(identity: Identity, details: AuthenticationDetails, bearer_token: SecretString) -> Self {
        Self {
            identity,
            details,
            bearer_token,
        }
    }

    #[must_use]
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    #[must_use]
    pub fn details(&self) -> &AuthenticationDetails {
        &self.details
    }

    #[must_use]
    pub fn bearer_token(&self) -> &SecretString {
        &self.bearer_token
    }
}

#[derive(Debug, thiserror::Error)]
#[error("security context already holds an authenticated identity")]
pub struct AlreadyAuthenticated;

/// `SecurityContext` holds the outcome of authentication for exactly one request.
///
/// It starts anonymous, is written at most once by the authentication gate and
/// is read by the route policy and handlers. It is never shared between requests.
#[derive(Debug, Clone, Default)]
pub struct SecurityContext {
    authentication: Option<Authentication>,
}

impl SecurityContext {
    /// Create an empty context with no authenticated identity.
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.authentication.is_some()
    }

    #[must_use]
    pub fn authentication(&self) -> Option<&Authentication> {
        self.authentication.as_ref()
    }

    #[must_use]
    pub fn identity(&self) -> Option<&Identity> {
        self.authentication.as_ref().map(Authentication::identity)
    }

    #[must_use]
    pub fn details(&self) -> Option<&AuthenticationDetails> {
        self.authentication.as_ref().map(Authentication::details)
    }

    #[must_use]
    pub fn bearer_token(&self) -> Option<&SecretString> {
        self.authentication.as_ref().map(Authentication::bearer_token)
    }

    /// Record a successful authentication.
    ///
    /// # Errors
    /// Returns [`AlreadyAuthenticated`] if an identity is already present; the
    /// existing one is left untouched.
    pub fn authenticate(&mut self, authentication: Authentication) -> Result<(), AlreadyAuthenticated> {
        if self.authentication.is_some() {
            return Err(AlreadyAuthenticated);
        }
        self.authentication = Some(authentication);
        Ok(())
    }
}
