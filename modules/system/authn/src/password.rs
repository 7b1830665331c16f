//! Password hashing scheme handed to credential-storage collaborators.

use argon2::Argon2;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};

use crate::error::AuthNError;

pub trait PasswordEncoder: Send + Sync {
    /// Scheme identifier, e.g. `argon2id`.
    fn scheme(&self) -> &'static str;

    /// Hash `raw` into a self-describing PHC string.
    ///
    /// # Errors
    /// `Internal` when the salt cannot be generated or hashing fails.
    fn encode(&self, raw: &str) -> Result<String, AuthNError>;

    /// Check `raw` against a previously encoded hash. Malformed hashes never match.
    fn matches(&self, raw: &str, encoded: &str) -> bool;
}

#[derive(Default)]
pub struct Argon2PasswordEncoder {
    argon2: Argon2<'static>,
}

impl PasswordEncoder for Argon2PasswordEncoder {
    fn scheme(&self) -> &'static str {
        "argon2id"
    }

    fn encode(&self, raw: &str) -> Result<String, AuthNError> {
        let mut salt_bytes = [0u8; 16];
        getrandom::getrandom(&mut salt_bytes)
            .map_err(|e| AuthNError::Internal(format!("salt generation failed: {e}")))?;
        let salt = SaltString::encode_b64(&salt_bytes)
            .map_err(|e| AuthNError::Internal(format!("salt encoding failed: {e}")))?;

        self.argon2
            .hash_password(raw.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AuthNError::Internal(format!("password hashing failed: {e}")))
    }

    fn matches(&self, raw: &str, encoded: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(encoded) else {
            tracing::warn!("stored password hash is not a valid PHC string");
            return false;
        };
        self.argon2
            .verify_password(raw.as_bytes(), &parsed)
            .is_ok()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn encoded_password_matches_only_the_original() {
        let encoder = Argon2PasswordEncoder::default();
        let hash = encoder.encode("s3cret!").unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(encoder.matches("s3cret!", &hash));
        assert!(!encoder.matches("s3cret?", &hash));
    }

    #[test]
    fn salts_differ_between_encodings() {
        let encoder = Argon2PasswordEncoder::default();

        assert_ne!(encoder.encode("pw").unwrap(), encoder.encode("pw").unwrap());
    }

    #[test]
    fn malformed_hash_never_matches() {
        assert!(!Argon2PasswordEncoder::default().matches("pw", "plaintext"));
    }
}
