//! Runtime configuration loaded from the environment.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Which record store backs the progress data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreConfig {
    Postgres {
        url: String,
        max_connections: u32,
    },
    /// In-process store, lost on restart.
    Memory,
}

/// Server configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub store: StoreConfig,
    pub cors_origin: Option<String>,
    pub log_filter: String,
}

impl Config {
    /// Load from process environment, reading `.env` first if present.
    ///
    /// Recognised variables:
    /// - HOST, PORT: listen address (default 0.0.0.0:3000)
    /// - DB_TYPE: `postgres` or `memory` (default memory)
    /// - DATABASE_URL: required for postgres
    /// - DATABASE_MAX_CONNECTIONS: pool size (default 10)
    /// - CORS_ORIGIN: allowed origin, permissive when unset
    /// - RUST_LOG: tracing filter (default info)
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = parse_or("PORT", lookup("PORT"), 3000)?;

        let store = match lookup("DB_TYPE").as_deref() {
            None | Some("memory") => StoreConfig::Memory,
            Some("postgres") => StoreConfig::Postgres {
                url: lookup("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?,
                max_connections: parse_or(
                    "DATABASE_MAX_CONNECTIONS",
                    lookup("DATABASE_MAX_CONNECTIONS"),
                    10,
                )?,
            },
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: "DB_TYPE",
                    value: other.to_string(),
                })
            }
        };

        Ok(Self {
            host,
            port,
            store,
            cors_origin: lookup("CORS_ORIGIN").filter(|o| !o.is_empty()),
            log_filter: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T: std::str::FromStr>(
    name: &'static str,
    value: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match value {
        None => Ok(default),
        Some(v) => v.parse().map_err(|_| ConfigError::Invalid { name, value: v }),
    }
}
