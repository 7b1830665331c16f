//! HS256 JWT implementation of [`CredentialVerifier`].

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use medrx_security::Identity;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

use crate::api::CredentialVerifier;
use crate::config::JwtConfig;
use crate::error::AuthNError;

/// Claim set carried by medrx bearer tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: u64,
    #[serde(default)]
    pub iat: u64,
    /// Credential version the token was issued against.
    #[serde(default)]
    pub ver: u32,
}

pub struct JwtCredentialVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl JwtCredentialVerifier {
    /// Build a verifier from configuration.
    ///
    /// # Errors
    /// Returns `Internal` if the secret is empty.
    pub fn from_config(cfg: &JwtConfig) -> Result<Self, AuthNError> {
        let secret = cfg.secret.expose_secret();
        if secret.is_empty() {
            return Err(AuthNError::Internal("jwt secret must not be empty".to_owned()));
        }

        // A configured issuer or audience must be present, not just correct when present.
        let mut required = vec!["exp", "sub"];
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = cfg.leeway_secs;
        if let Some(issuer) = &cfg.issuer {
            validation.set_issuer(&[issuer]);
            required.push("iss");
        }
        match &cfg.audience {
            Some(audience) => {
                validation.set_audience(&[audience]);
                required.push("aud");
            }
            None => validation.validate_aud = false,
        }
        validation.set_required_spec_claims(&required);

        Ok(Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        })
    }

    fn claims(&self, token: &str) -> Result<Claims, AuthNError> {
        decode::<Claims>(token, &self.key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| AuthNError::InvalidToken(e.to_string()))
    }
}

impl CredentialVerifier for JwtCredentialVerifier {
    fn extract_subject(&self, token: &str) -> Result<String, AuthNError> {
        self.claims(token).map(|claims| claims.sub)
    }

    fn is_valid(&self, token: &str, identity: &Identity) -> bool {
        let Ok(claims) = self.claims(token) else {
            return false;
        };
        if claims.sub != identity.subject() {
            tracing::debug!("token subject does not match resolved identity");
            return false;
        }
        if !identity.is_enabled() {
            tracing::debug!(subject = %claims.sub, "identity is disabled");
            return false;
        }
        if claims.ver != identity.credential_version() {
            tracing::debug!(
                subject = %claims.sub,
                token_version = claims.ver,
                current_version = identity.credential_version(),
                "token issued against a stale credential version"
            );
            return false;
        }
        true
    }
}
