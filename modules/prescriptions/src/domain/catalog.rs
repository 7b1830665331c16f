//! Read-only catalog of roles and the permissions they grant.

use std::collections::{BTreeMap, BTreeSet};

use crate::config::AccessCatalogConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Role {
    pub name: String,
    pub permissions: BTreeSet<String>,
}

#[derive(Debug, Clone, Default)]
pub struct AccessCatalog {
    roles: Vec<Role>,
}

impl AccessCatalog {
    #[must_use]
    pub fn from_config(cfg: &AccessCatalogConfig) -> Self {
        let roles = cfg
            .roles
            .iter()
            .map(|r| Role {
                name: r.name.clone(),
                permissions: r.permissions.iter().cloned().collect(),
            })
            .collect();
        Self { roles }
    }

    #[must_use]
    pub fn roles(&self) -> &[Role] {
        &self.roles
    }

    /// Every permission granted by at least one role, sorted.
    #[must_use]
    pub fn permissions(&self) -> BTreeSet<&str> {
        self.roles
            .iter()
            .flat_map(|r| r.permissions.iter().map(String::as_str))
            .collect()
    }

    /// Permission -> roles granting it.
    #[must_use]
    pub fn privileges(&self) -> BTreeMap<&str, BTreeSet<&str>> {
        let mut out: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
        for role in &self.roles {
            for permission in &role.permissions {
                out.entry(permission.as_str())
                    .or_default()
                    .insert(role.name.as_str());
            }
        }
        out
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn default_catalog_shares_read_permissions() {
        let catalog = AccessCatalog::from_config(&AccessCatalogConfig::default());

        assert_eq!(catalog.roles().len(), 2);
        assert!(catalog.permissions().contains("prescription:delete"));

        let privileges = catalog.privileges();
        assert_eq!(
            privileges["prescription:read"],
            BTreeSet::from(["ASSISTANT", "DOCTOR"])
        );
        assert_eq!(privileges["prescription:delete"], BTreeSet::from(["DOCTOR"]));
    }

    #[test]
    fn empty_catalog() {
        let catalog = AccessCatalog::default();
        assert!(catalog.permissions().is_empty());
        assert!(catalog.privileges().is_empty());
    }
}
