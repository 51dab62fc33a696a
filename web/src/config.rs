//! Configuration for the todo server.
//!
//! Loads configuration from environment variables with sensible defaults.

use composable_todo_postgres::PoolConfig;
use std::env;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Errors for configuration values that have no sensible fallback
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// `TODO_ENV` is neither `production` nor `development`
    #[error("Unknown TODO_ENV value: {0} (expected production or development)")]
    UnknownEnvironment(String),

    /// `TODO_STORAGE` is neither `memory` nor `postgres`
    #[error("Unknown TODO_STORAGE value: {0} (expected memory or postgres)")]
    UnknownStorage(String),
}

/// Deployment mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AppEnvironment {
    /// Error bodies never carry internal detail
    #[default]
    Production,
    /// 500 bodies include the underlying error text
    Development,
}

impl AppEnvironment {
    /// Whether internal error text may be sent to clients
    #[must_use]
    pub const fn exposes_errors(self) -> bool {
        matches!(self, Self::Development)
    }
}

impl FromStr for AppEnvironment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Ok(Self::Production),
            "development" | "dev" => Ok(Self::Development),
            _ => Err(ConfigError::UnknownEnvironment(s.to_string())),
        }
    }
}

/// Where todos are kept
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StorageBackend {
    /// Process memory, seeded at startup
    #[default]
    Memory,
    /// `PostgreSQL` through a connection pool
    Postgres,
}

impl FromStr for StorageBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "postgres" | "postgresql" => Ok(Self::Postgres),
            _ => Err(ConfigError::UnknownStorage(s.to_string())),
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to bind to
    pub port: u16,
    /// Artificial delay applied to every todo request
    pub latency: Duration,
    /// Deployment mode
    pub environment: AppEnvironment,
}

impl ServerConfig {
    /// `host:port` for the listener
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// HTTP server settings
    pub server: ServerConfig,
    /// Selected storage backend
    pub storage: StorageBackend,
    /// Pool settings, used only with [`StorageBackend::Postgres`]
    pub postgres: PoolConfig,
}

impl Config {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `TODO_ENV` or `TODO_STORAGE` holds an
    /// unknown value. Unparsable numbers fall back to their defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from any key/value source.
    ///
    /// # Errors
    ///
    /// Same as [`Config::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = lookup("TODO_ENV")
            .map(|value| value.parse())
            .transpose()?
            .unwrap_or_default();
        let storage = lookup("TODO_STORAGE")
            .map(|value| value.parse())
            .transpose()?
            .unwrap_or_default();

        Ok(Self {
            server: ServerConfig {
                host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port: number(&lookup, "PORT", 3000),
                latency: Duration::from_millis(number(&lookup, "TODO_API_LATENCY_MS", 200)),
                environment,
            },
            storage,
            postgres: PoolConfig {
                database_url: lookup("DATABASE_URL")
                    .unwrap_or_else(|| "postgres://root@localhost:5432/todo_db".to_string()),
                max_connections: number(&lookup, "DATABASE_MAX_CONNECTIONS", 10),
                acquire_timeout: Duration::from_secs(number(&lookup, "DATABASE_CONNECT_TIMEOUT", 30)),
            },
        })
    }
}

fn number<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Copy + std::fmt::Display,
{
    match lookup(key) {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, %default, "Ignoring unparsable setting");
            default
        }),
    }
}
