#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Token verification and identity lookup for the authentication gate.
//!
//! The gate consumes two capabilities from this crate:
//! - [`CredentialVerifier`]: pulls the subject out of a bearer token and
//!   re-validates the token against a resolved identity.
//! - [`IdentityDirectory`]: resolves a subject to its live [`Identity`].
//!
//! [`Identity`]: medrx_security::Identity

pub mod api;
pub mod config;
pub mod directory;
pub mod error;
pub mod jwt;
pub mod password;

pub use api::{CredentialVerifier, IdentityDirectory};
pub use config::{AuthNConfig, IdentityConfig, JwtConfig};
pub use directory::StaticIdentityDirectory;
pub use error::AuthNError;
pub use jwt::{Claims, JwtCredentialVerifier};
pub use password::{Argon2PasswordEncoder, PasswordEncoder};
