use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// A resolved caller: the live record an Identity Directory returns for a
/// token subject.
///
/// `credential_version` and `enabled` are what token re-validation checks
/// against; bumping the version or disabling the account invalidates every
/// token issued before the change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    subject: String,
    display_name: String,
    roles: BTreeSet<String>,
    credential_version: u32,
    enabled: bool,
}

impl Identity {
    #[must_use]
    pub fn builder(subject: impl Into<String>) -> IdentityBuilder {
        IdentityBuilder {
            subject: subject.into(),
            display_name: None,
            roles: BTreeSet::new(),
            credential_version: 0,
            enabled: true,
        }
    }

    /// Lookup key; equals the `sub` claim of tokens issued to this identity.
    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    #[must_use]
    pub fn roles(&self) -> &BTreeSet<String> {
        &self.roles
    }

    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }

    #[must_use]
    pub fn credential_version(&self) -> u32 {
        self.credential_version
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

pub struct IdentityBuilder {
    subject: String,
    display_name: Option<String>,
    roles: BTreeSet<String>,
    credential_version: u32,
    enabled: bool,
}

impl IdentityBuilder {
    #[must_use]
    pub fn display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    #[must_use]
    pub fn role(mut self, role: impl Into<String>) -> Self {
        self.roles.insert(role.into());
        self
    }

    #[must_use]
    pub fn roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles.extend(roles.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn credential_version(mut self, version: u32) -> Self {
        self.credential_version = version;
        self
    }

    #[must_use]
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Display name falls back to the subject.
    #[must_use]
    pub fn build(self) -> Identity {
        let display_name = self.display_name.unwrap_or_else(|| self.subject.clone());
        Identity {
            subject: self.subject,
            display_name,
            roles: self.roles,
            credential_version: self.credential_version,
            enabled: self.enabled,
        }
    }
}
