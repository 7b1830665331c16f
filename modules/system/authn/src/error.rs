//! Error types for token verification and identity lookup.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthNError {
    /// The token is malformed, badly signed, expired or otherwise unusable.
    #[error("invalid token: {0}")]
    InvalidToken(String),

    /// No identity is registered under the subject.
    #[error("unknown subject: {0}")]
    UnknownSubject(String),

    /// Password hashing or a backing store failed.
    #[error("internal error: {0}")]
    Internal(String),
}
