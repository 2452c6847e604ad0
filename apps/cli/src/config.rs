//! Console configuration
//!
//! Sources, later ones overriding earlier ones:
//! 1. built-in defaults
//! 2. `hie-admin.toml` in the working directory (or the file given with `--config`)
//! 3. `HIE__`-prefixed environment variables, e.g. `HIE__REPOSITORY__BASE_URL`
//!    or `HIE__CACHE__TTL_SECONDS`
//!
//! A `.env` file is loaded into the environment first when present.

use config::{ConfigError, Environment, File};
use hie_core::CacheConfig;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

const DEFAULT_CONFIG_FILE: &str = "hie-admin";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Clinical-entity repository (places, materials, organizations)
    pub repository: ServiceConfig,
    /// Administrative-metadata service (concepts, assigning authorities)
    pub metadata: ServiceConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    pub base_url: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl ServiceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

fn default_timeout_seconds() -> u64 {
    30
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Default filter level when `RUST_LOG` is unset
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

fn default_level() -> String {
    "warn".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            json: false,
        }
    }
}

impl Config {
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        config::Config::builder()
            .set_default("repository.base_url", "http://localhost:8080/imsi")?
            .set_default("metadata.base_url", "http://localhost:8080/ami")?
            .add_source(file)
            .add_source(
                Environment::with_prefix("HIE")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    pub fn validate(&self) -> Result<(), String> {
        for (name, service) in [("repository", &self.repository), ("metadata", &self.metadata)] {
            if service.base_url.trim().is_empty() {
                return Err(format!("{name}.base_url must not be empty"));
            }
            if service.timeout_seconds == 0 {
                return Err(format!("{name}.timeout_seconds must be greater than zero"));
            }
        }
        if self.cache.capacity == 0 {
            return Err("cache.capacity must be greater than zero".to_string());
        }
        Ok(())
    }
}
