//! Configuration System
//!
//! Provides hierarchical configuration loading from:
//! - saferdb.toml (default configuration)
//! - saferdb.local.toml (git-ignored local overrides)
//! - Environment variables (SAFERDB_* prefix)
//!
//! ## Example
//!
//! ```toml
//! # saferdb.toml
//! [database]
//! path = "/var/lib/app/app.sqlite"
//! busy_timeout_ms = 5000
//!
//! [logging]
//! level = "info"
//! log_queries = true
//! query_level = "debug"
//! ```
//!
//! Environment variable overrides:
//! ```bash
//! SAFERDB_DATABASE__PATH=/custom/app.sqlite
//! SAFERDB_LOGGING__FORMAT=json
//! ```

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration struct
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Database connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite database file (":memory:" for a private in-memory database)
    #[serde(default = "default_database_path")]
    pub path: PathBuf,

    /// How long a statement waits on a locked database, in milliseconds
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,

    /// Enforce foreign key constraints
    #[serde(default = "default_true")]
    pub foreign_keys: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (text, json)
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Report every executed statement through `tracing`
    #[serde(default = "default_true")]
    pub log_queries: bool,

    /// Level used for per-statement events
    #[serde(default = "default_query_level")]
    pub query_level: String,
}

// Default value functions
fn default_database_path() -> PathBuf {
    PathBuf::from(":memory:")
}
fn default_busy_timeout_ms() -> u64 {
    5_000
}
fn default_true() -> bool {
    true
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "text".to_string()
}
fn default_query_level() -> String {
    "debug".to_string()
}

impl Config {
    /// Load configuration from default locations
    ///
    /// Merges in order:
    /// 1. saferdb.toml (base configuration)
    /// 2. saferdb.local.toml (local overrides, git-ignored)
    /// 3. Environment variables (SAFERDB_* prefix)
    pub fn load() -> Result<Self, figment::Error> {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file("saferdb.toml"))
            .merge(Toml::file("saferdb.local.toml"))
            .merge(Env::prefixed("SAFERDB_").split("__"))
            .extract()
    }

    /// Load configuration from specific file path
    pub fn from_file(path: &str) -> Result<Self, figment::Error> {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed("SAFERDB_").split("__"))
            .extract()
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            database: DatabaseConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl DatabaseConfig {
    /// Private in-memory database with default settings
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// On-disk database at `path` with default settings
    pub fn at(path: impl Into<PathBuf>) -> Self {
        DatabaseConfig {
            path: path.into(),
            ..Self::default()
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        DatabaseConfig {
            path: default_database_path(),
            busy_timeout_ms: default_busy_timeout_ms(),
            foreign_keys: true,
        }
    }
}

impl LoggingConfig {
    /// `query_level` as a `tracing::Level`, falling back to DEBUG
    pub fn query_tracing_level(&self) -> tracing::Level {
        self.query_level.parse().unwrap_or(tracing::Level::DEBUG)
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: default_log_level(),
            format: default_log_format(),
            log_queries: true,
            query_level: default_query_level(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.database.path, PathBuf::from(":memory:"));
        assert_eq!(config.database.busy_timeout_ms, 5_000);
        assert!(config.database.foreign_keys);
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string(&config).unwrap();

        // Verify it contains expected sections
        assert!(toml_str.contains("[database]"));
        assert!(toml_str.contains("[logging]"));
    }

    #[test]
    fn test_default_logging_config() {
        let config = Config::default();
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, "text");
        assert!(config.logging.log_queries);
        assert_eq!(config.logging.query_level, "debug");
    }

    #[test]
    fn test_query_tracing_level() {
        let mut logging = LoggingConfig::default();
        assert_eq!(logging.query_tracing_level(), tracing::Level::DEBUG);
        logging.query_level = "info".to_string();
        assert_eq!(logging.query_tracing_level(), tracing::Level::INFO);
        logging.query_level = "nonsense".to_string();
        assert_eq!(logging.query_tracing_level(), tracing::Level::DEBUG);
    }

    #[test]
    fn test_database_config_at() {
        let db = DatabaseConfig::at("/tmp/x.sqlite");
        assert_eq!(db.path, PathBuf::from("/tmp/x.sqlite"));
        assert_eq!(db.busy_timeout_ms, 5_000);
    }

    #[test]
    fn test_config_toml_roundtrip() {
        let config = Config::default();
        let toml_str = toml::to_string(&config).unwrap();
        let back: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(back.database.path, PathBuf::from(":memory:"));
        assert_eq!(back.logging.level, "info");
    }

    #[test]
    fn test_config_json_roundtrip() {
        let config = Config::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(back.database.busy_timeout_ms, 5_000);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let back: Config = toml::from_str("[database]\npath = \"app.sqlite\"\n").unwrap();
        assert_eq!(back.database.path, PathBuf::from("app.sqlite"));
        assert!(back.database.foreign_keys);
        assert_eq!(back.logging.format, "text");
    }
}
