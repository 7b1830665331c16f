//! Configuration-backed [`IdentityDirectory`].

use std::collections::HashMap;

use async_trait::async_trait;
use medrx_security::Identity;

use crate::api::IdentityDirectory;
use crate::config::IdentityConfig;
use crate::error::AuthNError;
use crate::password::PasswordEncoder;

/// Identities loaded once from configuration and kept immutable afterwards.
///
/// Password hashes stay here rather than on [`Identity`], which travels with
/// the request and is serializable.
pub struct StaticIdentityDirectory {
    identities: HashMap<String, Identity>,
    password_hashes: HashMap<String, String>,
}

impl StaticIdentityDirectory {
    #[must_use]
    pub fn from_config(configs: &[IdentityConfig]) -> Self {
        let identities = configs
            .iter()
            .map(|cfg| {
                let mut builder = Identity::builder(cfg.subject.clone())
                    .roles(cfg.roles.iter().cloned())
                    .credential_version(cfg.credential_version)
                    .enabled(cfg.enabled);
                if let Some(name) = &cfg.display_name {
                    builder = builder.display_name(name.clone());
                }
                (cfg.subject.clone(), builder.build())
            })
            .collect();
        let password_hashes = configs
            .iter()
            .filter_map(|cfg| {
                cfg.password_hash
                    .as_ref()
                    .map(|hash| (cfg.subject.clone(), hash.clone()))
            })
            .collect();

        Self {
            identities,
            password_hashes,
        }
    }

    /// Check a raw password for `subject` with the given hashing scheme.
    ///
    /// Unknown subjects, disabled identities and identities without a stored
    /// hash never match.
    #[must_use]
    pub fn verify_password(&self, subject: &str, raw: &str, encoder: &dyn PasswordEncoder) -> bool {
        let enabled = self
            .identities
            .get(subject)
            .is_some_and(Identity::is_enabled);
        match self.password_hashes.get(subject) {
            Some(encoded) if enabled => encoder.matches(raw, encoded),
            _ => {
                tracing::debug!(%subject, "no usable password credential");
                false
            }
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.identities.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.identities.is_empty()
    }
}

#[async_trait]
impl IdentityDirectory for StaticIdentityDirectory {
    async fn load_by_subject(&self, subject: &str) -> Result<Identity, AuthNError> {
        self.identities
            .get(subject)
            .cloned()
            .ok_or_else(|| AuthNError::UnknownSubject(subject.to_owned()))
    }
}
