//! Layered server configuration: YAML file, then `MEDRX__` environment overrides.

use std::path::Path;

use anyhow::{Context, bail};
use api_gateway::ApiGatewayConfig;
use figment::Figment;
use figment::providers::{Env, Format, Yaml};
use medrx_authn::AuthNConfig;
use prescriptions::{AccessCatalogConfig, DatabaseConfig, InteractionsConfig};
use serde::Deserialize;

/// Prefix of environment overrides; nested keys are separated by `__`,
/// e.g. `MEDRX__API_GATEWAY__BIND_ADDR`.
pub const ENV_PREFIX: &str = "MEDRX__";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub api_gateway: ApiGatewayConfig,
    pub authn: AuthNConfig,
    pub database: DatabaseConfig,
    pub interactions: InteractionsConfig,
    pub access_catalog: AccessCatalogConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// How long in-flight requests may take to finish after a shutdown signal.
    pub shutdown_grace_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            shutdown_grace_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            format: LogFormat::Text,
        }
    }
}

fn figment(path: Option<&Path>) -> anyhow::Result<Figment> {
    let mut figment = Figment::new();
    if let Some(path) = path {
        if !path.is_file() {
            bail!("configuration file '{}' does not exist", path.display());
        }
        figment = figment.merge(Yaml::file(path));
    }
    Ok(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
}

/// Load the configuration.
///
/// # Errors
/// Fails on a missing file, unknown keys, or values of the wrong type.
pub fn load(path: Option<&Path>) -> anyhow::Result<AppConfig> {
    figment(path)?
        .extract()
        .context("invalid medrx configuration")
}
