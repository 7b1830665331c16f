//! Capability traits consumed by the authentication gate.
//!
//! Both are injected as `Arc<dyn ...>` at startup and shared immutably by all
//! request tasks:
//!
//! ```ignore
//! let subject = verifier.extract_subject(token)?;
//! let identity = directory.load_by_subject(&subject).await?;
//! if verifier.is_valid(token, &identity) { /* authenticate */ }
//! ```

use async_trait::async_trait;
use medrx_security::Identity;

use crate::error::AuthNError;

pub trait CredentialVerifier: Send + Sync {
    /// Parse and verify `token`, returning the subject it was issued to.
    ///
    /// # Errors
    /// `InvalidToken` for any malformed, tampered or expired token.
    fn extract_subject(&self, token: &str) -> Result<String, AuthNError>;

    /// Re-validate `token` against the live `identity`.
    ///
    /// Returns `false` when the subject differs, the identity is disabled,
    /// the credential version moved on, or the token has expired.
    fn is_valid(&self, token: &str, identity: &Identity) -> bool;
}

#[async_trait]
pub trait IdentityDirectory: Send + Sync {
    /// Load the identity registered under `subject`.
    ///
    /// # Errors
    /// `UnknownSubject` when nothing is registered under the key.
    async fn load_by_subject(&self, subject: &str) -> Result<Identity, AuthNError>;
}
