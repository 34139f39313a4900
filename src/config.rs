//! Configuration module for the feedback service
//!
//! This module handles loading and validating configuration from environment
//! variables. Configuration is read once at startup.

use envconfig::Envconfig;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::OnceLock;
use std::time::Duration;

use crate::error::{Error, Result};

/// Main configuration structure
#[derive(Debug, Clone, Deserialize, Serialize, Envconfig)]
pub struct Config {
    /// Server configuration
    #[serde(flatten)]
    #[envconfig(nested)]
    pub server: ServerConfig,

    /// Database configuration
    #[serde(flatten)]
    #[envconfig(nested)]
    pub database: DatabaseConfig,

    /// Cross-origin configuration
    #[serde(flatten)]
    #[envconfig(nested)]
    pub cors: CorsConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize, Envconfig)]
pub struct ServerConfig {
    /// Host to bind to
    #[envconfig(from = "HOST", default = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[envconfig(from = "PORT", default = "5050")]
    pub port: u16,

    /// Log level
    #[envconfig(from = "LOG_LEVEL", default = "info")]
    pub log_level: String,

    /// Environment (development, staging, production)
    #[envconfig(from = "ENVIRONMENT", default = "development")]
    pub environment: String,

    /// Request timeout in seconds
    #[envconfig(from = "REQUEST_TIMEOUT_SECS", default = "30")]
    pub request_timeout_secs: u64,
}

impl ServerConfig {
    /// Get the server address as a string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get request timeout as Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Check if running in production mode
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

/// Which storage collaborator to construct at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// PostgreSQL through sqlx
    Postgres,
    /// Process-local store, contents are lost on exit
    Memory,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StorageBackend::Postgres),
            "memory" => Ok(StorageBackend::Memory),
            other => Err(format!(
                "unknown storage backend '{}' (expected postgres or memory)",
                other
            )),
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize, Envconfig)]
pub struct DatabaseConfig {
    /// Storage backend
    #[envconfig(from = "STORAGE_BACKEND", default = "postgres")]
    pub backend: StorageBackend,

    /// PostgreSQL connection URL, including the database name
    #[envconfig(from = "DATABASE_URL", default = "postgres://localhost:5432/feedback_db")]
    pub url: String,

    /// Table that receives feedback rows
    #[envconfig(from = "FEEDBACK_TABLE", default = "feedback")]
    pub table: String,

    /// Maximum pool size
    #[envconfig(from = "DATABASE_POOL_MAX_SIZE", default = "10")]
    pub pool_max_size: u32,

    /// Minimum idle connections
    #[envconfig(from = "DATABASE_POOL_MIN_IDLE", default = "1")]
    pub pool_min_idle: u32,

    /// Pool timeout in seconds
    #[envconfig(from = "DATABASE_POOL_TIMEOUT_SECONDS", default = "30")]
    pub pool_timeout_seconds: u64,

    /// Idle timeout in seconds
    #[envconfig(from = "DATABASE_POOL_IDLE_TIMEOUT_SECONDS", default = "600")]
    pub pool_idle_timeout_seconds: u64,
}

static TABLE_NAME_REGEX: OnceLock<Regex> = OnceLock::new();

fn table_name_regex() -> &'static Regex {
    TABLE_NAME_REGEX
        .get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]{0,62}$").expect("Invalid regex"))
}

impl DatabaseConfig {
    /// Get pool timeout as Duration
    pub fn pool_timeout(&self) -> Duration {
        Duration::from_secs(self.pool_timeout_seconds)
    }

    /// Get idle timeout as Duration
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.pool_idle_timeout_seconds)
    }

    /// The table name is interpolated into SQL, so it must be a bare identifier
    pub fn has_valid_table_name(&self) -> bool {
        table_name_regex().is_match(&self.table)
    }

    /// Mask password in URL for logging
    pub fn masked_url(&self) -> String {
        if let Some(at_pos) = self.url.find('@') {
            if let Some(scheme_end) = self.url.find("://") {
                let start = &self.url[..scheme_end + 3];
                let end = &self.url[at_pos..];
                return format!("{}***{}", start, end);
            }
        }
        self.url.clone()
    }
}

/// Cross-origin configuration
#[derive(Debug, Clone, Deserialize, Serialize, Envconfig)]
pub struct CorsConfig {
    /// Allowed origins (comma-separated, `*` for any)
    #[envconfig(
        from = "CORS_ALLOWED_ORIGINS",
        default = "http://localhost:5173,http://127.0.0.1:5173"
    )]
    pub allowed_origins: String,
}

impl CorsConfig {
    /// Get origins as a vector
    pub fn origins_list(&self) -> Vec<String> {
        self.allowed_origins
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// Check if any origin is allowed
    pub fn allows_any(&self) -> bool {
        self.origins_list().iter().any(|o| o == "*")
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists (for local development)
        dotenv::dotenv().ok();

        Config::init_from_env().map_err(Error::from)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(Error::config("Server port cannot be 0"));
        }

        if self.database.backend == StorageBackend::Postgres {
            if self.database.url.is_empty() {
                return Err(Error::config("Database URL cannot be empty"));
            }

            if self.database.pool_max_size == 0 {
                return Err(Error::config("Database pool size must be at least 1"));
            }
        }

        if !self.database.has_valid_table_name() {
            return Err(Error::config(format!(
                "Invalid feedback table name: '{}'",
                self.database.table
            )));
        }

        Ok(())
    }

    /// Log configuration (with sensitive data masked)
    pub fn log_config(&self) {
        tracing::info!(
            server_address = %self.server.address(),
            environment = %self.server.environment,
            log_level = %self.server.log_level,
            "Server configuration"
        );

        tracing::info!(
            backend = ?self.database.backend,
            url = %self.database.masked_url(),
            table = %self.database.table,
            pool_size = %self.database.pool_max_size,
            "Database configuration"
        );

        tracing::info!(origins = %self.cors.allowed_origins, "CORS configuration");
    }
}
