use serde::{Deserialize, Serialize};

fn default_database_url() -> String {
    "sqlite://medrx.db?mode=rwc".to_owned()
}

fn default_interactions_url() -> String {
    "https://rxnav.nlm.nih.gov/REST/interaction/interaction.json?rxcui=341248".to_owned()
}

fn default_interactions_timeout_secs() -> u64 {
    10
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseConfig {
    /// sea-orm connection string, e.g. `sqlite://medrx.db?mode=rwc` or `sqlite::memory:`
    pub url: String,
    /// Apply pending migrations on startup.
    pub run_migrations: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            run_migrations: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct InteractionsConfig {
    /// Upstream drug-interaction endpoint queried by `GET /posts`.
    pub url: String,
    pub timeout_secs: u64,
}

impl Default for InteractionsConfig {
    fn default() -> Self {
        Self {
            url: default_interactions_url(),
            timeout_secs: default_interactions_timeout_secs(),
        }
    }
}

/// Roles and what each may do, published read-only under `/api/v1/roles`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct AccessCatalogConfig {
    pub roles: Vec<RoleConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct RoleConfig {
    pub name: String,
    #[serde(default)]
    pub permissions: Vec<String>,
}

impl Default for AccessCatalogConfig {
    fn default() -> Self {
        let role = |name: &str, permissions: &[&str]| RoleConfig {
            name: name.to_owned(),
            permissions: permissions.iter().map(|&p| p.to_owned()).collect(),
        };
        Self {
            roles: vec![
                role(
                    "DOCTOR",
                    &[
                        "prescription:read",
                        "prescription:write",
                        "prescription:delete",
                        "report:read",
                    ],
                ),
                role("ASSISTANT", &["prescription:read", "report:read"]),
            ],
        }
    }
}
