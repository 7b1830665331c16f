//! Configuration for token verification and the static identity directory.

use secrecy::SecretString;
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthNConfig {
    pub jwt: JwtConfig,

    /// Identities served by the static directory.
    pub identities: Vec<IdentityConfig>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct JwtConfig {
    /// HMAC-SHA256 signing secret shared with the token issuer.
    pub secret: SecretString,

    /// Expected `iss` claim. Not checked when unset.
    pub issuer: Option<String>,

    /// Expected `aud` claim. Not checked when unset.
    pub audience: Option<String>,

    /// Clock skew tolerated on `exp`, in seconds.
    pub leeway_secs: u64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: SecretString::from(String::new()),
            issuer: None,
            audience: None,
            leeway_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IdentityConfig {
    pub subject: String,

    #[serde(default)]
    pub display_name: Option<String>,

    #[serde(default)]
    pub roles: Vec<String>,

    /// Bumped to revoke every token issued before the change.
    #[serde(default)]
    pub credential_version: u32,

    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Argon2 PHC string, produced by `medrx-server hash-password` and checked
    /// by [`StaticIdentityDirectory::verify_password`](crate::StaticIdentityDirectory::verify_password).
    #[serde(default)]
    pub password_hash: Option<String>,
}

fn default_enabled() -> bool {
    true
}
