//! Server configuration
//!
//! Layered with the `config` crate: built-in defaults, then an optional TOML
//! file, then `RESOURCE_SERVER_*` environment variables (nested keys use
//! `__`, e.g. `RESOURCE_SERVER_STORAGE__BACKEND=memory`).

use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use resource_types::Resource;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Environment variable naming the config file
pub const CONFIG_PATH_ENV: &str = "RESOURCE_CONFIG";
/// File read when `RESOURCE_CONFIG` is unset; missing is fine
pub const DEFAULT_CONFIG_PATH: &str = "resource-server.toml";

const ENV_PREFIX: &str = "RESOURCE_SERVER";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Sqlite,
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub database_path: String,
    /// Names loaded into the memory backend at start-up
    #[serde(default)]
    pub seed_names: Vec<String>,
}

impl StorageConfig {
    /// Records for the memory backend, numbered from 1 in listed order
    pub fn seed_resources(&self) -> Vec<Resource> {
        self.seed_names
            .iter()
            .zip(1u64..)
            .map(|(name, id)| {
                let mut resource = Resource::new(name.clone());
                resource.id = id;
                resource
            })
            .collect()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub bind_address: String,
    /// Per-request storage deadline; 0 disables it
    pub request_timeout_ms: u64,
    pub storage: StorageConfig,
}

impl ServerConfig {
    /// Load from the file named by `RESOURCE_CONFIG` (or the default path)
    /// and the process environment.
    pub fn load() -> Result<Self> {
        let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into());
        Self::from_sources(Some(Path::new(&path)), true)
    }

    pub fn from_sources(file: Option<&Path>, with_env: bool) -> Result<Self> {
        Self::assemble(file, with_env.then(Self::environment))
    }

    fn environment() -> Environment {
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .list_separator(",")
            .with_list_parse_key("storage.seed_names")
            .try_parsing(true)
    }

    fn assemble(file: Option<&Path>, env: Option<Environment>) -> Result<Self> {
        let mut builder = Config::builder()
            .set_default("bind_address", "0.0.0.0:8080")?
            .set_default("request_timeout_ms", 5000_i64)?
            .set_default("storage.backend", "sqlite")?
            .set_default("storage.database_path", "data/resources.db")?;

        if let Some(path) = file {
            builder = builder.add_source(
                File::from(path)
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        if let Some(env) = env {
            builder = builder.add_source(env);
        }

        builder
            .build()
            .context("Failed to assemble configuration")?
            .try_deserialize()
            .context("Invalid configuration")
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        match self.request_timeout_ms {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        }
    }
}
