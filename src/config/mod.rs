//! Configuration loading and management

use crate::core::error::SalesError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

/// HTTP listener settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,

    /// Prefix every route is mounted under (e.g. "/api")
    pub base_path: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            base_path: "/api".to_string(),
        }
    }
}

impl ServerConfig {
    /// Socket address string for binding
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Which transaction store to serve from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    #[default]
    InMemory,
    Mongodb,
}

impl FromStr for StorageBackend {
    type Err = SalesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "in_memory" | "in-memory" | "memory" => Ok(StorageBackend::InMemory),
            "mongodb" | "mongo" => Ok(StorageBackend::Mongodb),
            other => Err(SalesError::config(format!(
                "unknown storage backend '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub mongodb_uri: String,
    pub database: String,
    pub collection: String,

    /// Create the query indexes on startup
    pub ensure_indexes: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::InMemory,
            mongodb_uri: "mongodb://localhost:27017".to_string(),
            database: "retail_sales".to_string(),
            collection: "salestransactions".to_string(),
            ensure_indexes: true,
        }
    }
}

/// Cache lifetimes, in seconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub transactions_ttl_secs: u64,
    pub filter_options_ttl_secs: u64,
    pub default_ttl_secs: u64,
    pub sweep_interval_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            transactions_ttl_secs: 120,
            filter_options_ttl_secs: 600,
            default_ttl_secs: 300,
            sweep_interval_secs: 60,
        }
    }
}

impl CacheConfig {
    pub fn transactions_ttl(&self) -> Duration {
        Duration::from_secs(self.transactions_ttl_secs)
    }

    pub fn filter_options_ttl(&self) -> Duration {
        Duration::from_secs(self.filter_options_ttl_secs)
    }

    pub fn default_ttl(&self) -> Duration {
        Duration::from_secs(self.default_ttl_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
    pub default_page_size: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page_size: crate::core::query::DEFAULT_PAGE_SIZE,
        }
    }
}

/// Complete application configuration
///
/// Every section is optional in YAML; missing values take their defaults.
///
/// ```yaml
/// server:
///   port: 8080
/// storage:
///   backend: mongodb
///   mongodb_uri: mongodb://db:27017
/// cache:
///   transactions_ttl_secs: 60
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub cache: CacheConfig,
    pub pagination: PaginationConfig,
}

impl AppConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self, SalesError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self, SalesError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Apply `PORT`, `HOST`, `MONGODB_URI`, `MONGODB_DATABASE` and
    /// `STORAGE_BACKEND` from the process environment
    pub fn apply_env_overrides(self) -> Result<Self, SalesError> {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    /// Apply overrides from an arbitrary variable lookup
    pub fn apply_overrides<F>(mut self, lookup: F) -> Result<Self, SalesError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("PORT") {
            self.server.port = port
                .trim()
                .parse()
                .map_err(|_| SalesError::config(format!("invalid PORT '{}'", port)))?;
        }
        if let Some(host) = lookup("HOST") {
            self.server.host = host;
        }
        if let Some(uri) = lookup("MONGODB_URI") {
            self.storage.mongodb_uri = uri;
        }
        if let Some(database) = lookup("MONGODB_DATABASE") {
            self.storage.database = database;
        }
        if let Some(backend) = lookup("STORAGE_BACKEND") {
            self.storage.backend = backend.parse()?;
        }
        Ok(self)
    }

    /// Reject values that would make the service misbehave
    pub fn validate(&self) -> Result<(), SalesError> {
        let positive = [
            ("cache.transactions_ttl_secs", self.cache.transactions_ttl_secs),
            (
                "cache.filter_options_ttl_secs",
                self.cache.filter_options_ttl_secs,
            ),
            ("cache.default_ttl_secs", self.cache.default_ttl_secs),
            ("cache.sweep_interval_secs", self.cache.sweep_interval_secs),
            (
                "pagination.default_page_size",
                self.pagination.default_page_size,
            ),
        ];
        for (field, value) in positive {
            if value == 0 {
                return Err(SalesError::Validation {
                    field: field.to_string(),
                    message: "must be greater than zero".to_string(),
                });
            }
        }

        if !self.server.base_path.is_empty() && !self.server.base_path.starts_with('/') {
            return Err(SalesError::Validation {
                field: "server.base_path".to_string(),
                message: "must start with '/'".to_string(),
            });
        }

        Ok(())
    }
}
