//! Configuration management using Figment
//!
//! Sources, lowest priority first:
//!
//! 1. Built-in defaults
//! 2. A TOML file (`./campus.toml` for [`Config::load`])
//! 3. Environment variables prefixed `CAMPUS_`, nested with `__`
//!    (e.g. `CAMPUS_PAGINATION__TAGS=50`)

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::repository::PageSize;

/// Default configuration file, relative to the working directory
pub const DEFAULT_CONFIG_FILE: &str = "campus.toml";

/// Prefix for environment overrides
pub const ENV_PREFIX: &str = "CAMPUS_";

/// Main configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Service identity and logging
    pub service: ServiceConfig,

    /// Page sizes per querier
    #[serde(default)]
    pub pagination: PaginationConfig,

    /// SQLite connection pool
    #[serde(default)]
    pub database: DatabaseConfig,
}

/// Service-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Service name
    pub name: String,

    /// Log filter directive (trace, debug, info, warn, error, or an `EnvFilter` expression)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Environment (dev, staging, production)
    #[serde(default = "default_environment")]
    pub environment: String,
}

/// Results per page for each querier
///
/// A configured size of 0 is clamped to 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationConfig {
    #[serde(default = "default_page_size")]
    pub tags: u32,
    #[serde(default = "default_page_size")]
    pub users: u32,
    #[serde(default = "default_page_size")]
    pub classes: u32,
    #[serde(default = "default_page_size")]
    pub questions: u32,
}

impl PaginationConfig {
    #[must_use]
    pub const fn tags(&self) -> PageSize {
        PageSize::new(self.tags)
    }

    #[must_use]
    pub const fn users(&self) -> PageSize {
        PageSize::new(self.users)
    }

    #[must_use]
    pub const fn classes(&self) -> PageSize {
        PageSize::new(self.classes)
    }

    #[must_use]
    pub const fn questions(&self) -> PageSize {
        PageSize::new(self.questions)
    }
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            tags: default_page_size(),
            users: default_page_size(),
            classes: default_page_size(),
            questions: default_page_size(),
        }
    }
}

/// Database configuration
///
/// An in-memory URL (`sqlite::memory:`) gives every pool its own private
/// database, held on a single connection for the life of the pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL
    #[serde(default = "default_database_url")]
    pub url: String,

    /// Maximum number of connections in the pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Minimum number of idle connections to maintain
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    /// Seconds to wait for a free connection
    #[serde(default = "default_connection_timeout")]
    pub connection_timeout_secs: u64,

    /// Maximum connection attempts before giving up (0 = try once)
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base delay between attempts, doubled after each failure
    #[serde(default = "default_retry_delay")]
    pub retry_delay_secs: u64,
}

impl DatabaseConfig {
    /// Whether the URL names a private in-memory database
    #[must_use]
    pub fn is_in_memory(&self) -> bool {
        self.url.contains(":memory:") || self.url.contains("mode=memory")
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connection_timeout_secs: default_connection_timeout(),
            max_retries: default_max_retries(),
            retry_delay_secs: default_retry_delay(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_environment() -> String {
    "dev".to_string()
}

fn default_page_size() -> u32 {
    PageSize::DEFAULT.get()
}

fn default_database_url() -> String {
    "sqlite::memory:".to_string()
}

fn default_max_connections() -> u32 {
    8
}

fn default_min_connections() -> u32 {
    1
}

fn default_connection_timeout() -> u64 {
    10
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay() -> u64 {
    1
}

impl Config {
    /// Load configuration from `./campus.toml` (if present) and the environment
    pub fn load() -> Result<Self> {
        Self::load_from(DEFAULT_CONFIG_FILE)
    }

    /// Load configuration from a specific file
    ///
    /// A missing file is not an error; defaults and the environment still apply.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            tracing::info!("Loading configuration from: {}", path.display());
        } else {
            tracing::debug!("No configuration file at {}", path.display());
        }
        let config = Self::figment(path).extract()?;
        Ok(config)
    }

    /// The layered provider stack, for callers that merge their own sources on top
    pub fn figment(path: impl AsRef<Path>) -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Database URL the pool connects to
    #[must_use]
    pub fn database_url(&self) -> &str {
        &self.database.url
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service: ServiceConfig {
                name: "campus".to_string(),
                log_level: default_log_level(),
                environment: default_environment(),
            },
            pagination: PaginationConfig::default(),
            database: DatabaseConfig::default(),
        }
    }
}
