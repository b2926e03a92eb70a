use std::path::Path;

use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use schemars::{schema_for, JsonSchema};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::api::ApiConfig;
use super::identity::IdentityConfig;
use super::logging::LoggingConfig;

/// Prefix for environment overrides, e.g. `STOCKDESK_API__BASE_URL`.
pub const ENV_PREFIX: &str = "STOCKDESK_";

/// A top-level enum for versioned configurations.
#[derive(Deserialize, Serialize, JsonSchema)]
#[serde(tag = "version")]
pub enum Config {
    #[serde(rename = "1.0.0")]
    ConfigV1(ConfigV1),
}

/// Main config for v1.0.0: where the identity provider and the API gateway live.
#[derive(Deserialize, Serialize, Debug, Clone, Default, JsonSchema)]
pub struct ConfigV1 {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub identity: IdentityConfig,
    #[serde(default)]
    pub api: ApiConfig,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("error loading configuration: {0}")]
    Load(#[from] Box<figment::Error>),
    #[error("invalid logging.level '{0}'. Valid values: trace, debug, info, warn, error")]
    InvalidLogLevel(String),
    #[error("failed to install log subscriber: {0}")]
    Logging(String),
}

/// The layered sources: built-in version tag, then the YAML file, then the environment.
pub fn figment(path: &Path) -> Figment {
    Figment::new()
        .merge(Serialized::default("version", "1.0.0"))
        .merge(Yaml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
}

/// Extract a `ConfigV1` from any figment, migrating older versions when they exist.
pub fn extract(figment: &Figment) -> Result<ConfigV1, ConfigError> {
    let config = figment
        .extract::<Config>()
        .map_err(|e| ConfigError::Load(Box::new(e)))?;
    match config {
        Config::ConfigV1(c) => Ok(c),
    }
}

/// Load config from the YAML file at `path`; a missing file means "all defaults".
pub fn load_config(path: &Path) -> Result<ConfigV1, ConfigError> {
    extract(&figment(path))
}

/// Render the JSON schema for the configuration.
pub fn config_schema() -> Result<String, serde_json::Error> {
    let schema = schema_for!(Config);
    serde_json::to_string_pretty(&schema)
}
