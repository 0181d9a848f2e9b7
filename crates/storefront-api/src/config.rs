//! Service configuration
//!
//! Defaults, overlaid by an optional TOML file, overlaid by flags and
//! environment variables (see `main.rs`).

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use storefront_graphql::{GraphqlConfig, DEFAULT_COUNTRIES_ENDPOINT};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),

    #[error("cannot build GraphQL client: {0}")]
    Client(#[from] storefront_graphql::GraphqlError),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub commerce: CommerceConfig,
    pub countries: CountriesConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind: "0.0.0.0:8080".into() }
    }
}

/// Commerce GraphQL API (review mutation)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommerceConfig {
    pub endpoint: Option<String>,
    pub token: Option<String>,
    pub timeout_secs: u64,
}

impl Default for CommerceConfig {
    fn default() -> Self {
        Self { endpoint: None, token: None, timeout_secs: 30 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CountriesConfig {
    pub endpoint: String,
    pub timeout_secs: u64,
}

impl Default for CountriesConfig {
    fn default() -> Self {
        Self { endpoint: DEFAULT_COUNTRIES_ENDPOINT.into(), timeout_secs: 30 }
    }
}

impl AppConfig {
    /// Load from a TOML file, or defaults when no path is given
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => {
                let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })?;
                Self::from_toml_str(&content)
            }
            None => Ok(Self::default()),
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.bind.is_empty() {
            return Err(ConfigError::Invalid("server.bind cannot be empty".into()));
        }
        match &self.commerce.endpoint {
            Some(endpoint) if !endpoint.is_empty() => {}
            _ => return Err(ConfigError::Invalid("commerce.endpoint is not set".into())),
        }
        if self.commerce.timeout_secs == 0 || self.countries.timeout_secs == 0 {
            return Err(ConfigError::Invalid("timeout_secs must be positive".into()));
        }
        Ok(())
    }

    pub fn commerce_graphql(&self) -> Result<GraphqlConfig, ConfigError> {
        let endpoint = self
            .commerce
            .endpoint
            .clone()
            .ok_or_else(|| ConfigError::Invalid("commerce.endpoint is not set".into()))?;
        let mut config = GraphqlConfig::new(endpoint)
            .with_timeout(Duration::from_secs(self.commerce.timeout_secs));
        if let Some(token) = &self.commerce.token {
            config = config.with_token(token.clone());
        }
        Ok(config)
    }

    pub fn countries_graphql(&self) -> GraphqlConfig {
        GraphqlConfig::new(self.countries.endpoint.clone())
            .with_timeout(Duration::from_secs(self.countries.timeout_secs))
    }
}
