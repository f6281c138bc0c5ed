//! Server configuration from environment variables.
//!
//! `.env` is loaded first (if present), then each variable falls back to a
//! development default. [`ServerConfig::from_lookup`] takes the variable source as
//! a closure so tests never touch the process environment.

use axum::http::HeaderValue;
use log::{info, warn};
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

pub const DEFAULT_JWT_SECRET: &str = "demo_secret";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {variable}: '{value}' ({reason})")]
    InvalidValue {
        variable: String,
        value: String,
        reason: String,
    },
}

impl ConfigError {
    fn invalid(variable: &str, value: &str, reason: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            variable: variable.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

/// Which datastore backs the repositories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    /// SQLite file at the given path.
    Sqlite { path: PathBuf },
    /// Process memory, seeded with demo data.
    Memory,
}

impl StorageBackend {
    pub fn is_demo(&self) -> bool {
        matches!(self, StorageBackend::Memory)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppEnv {
    #[default]
    Development,
    Production,
}

impl FromStr for AppEnv {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Ok(AppEnv::Development),
            "production" | "prod" => Ok(AppEnv::Production),
            _ => Err("expected development or production".to_string()),
        }
    }
}

impl fmt::Display for AppEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppEnv::Development => f.write_str("development"),
            AppEnv::Production => f.write_str("production"),
        }
    }
}

/// Everything the binary needs to start serving.
#[derive(Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
    pub storage: StorageBackend,
    pub jwt_secret: String,
    pub app_env: AppEnv,
    pub cors_origin: String,
}

// The secret stays out of logs.
impl fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("storage", &self.storage)
            .field("jwt_secret", &"<redacted>")
            .field("app_env", &self.app_env)
            .field("cors_origin", &self.cors_origin)
            .finish()
    }
}

impl ServerConfig {
    /// Load `.env` and read the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a configuration from any variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str, default: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let host_raw = var("HOST", "0.0.0.0");
        let host = host_raw
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::invalid("HOST", &host_raw, e.to_string()))?;

        let port_raw = var("PORT", "3001");
        let port = port_raw
            .parse::<u16>()
            .map_err(|e| ConfigError::invalid("PORT", &port_raw, e.to_string()))?;

        let backend_raw = var("STORAGE_BACKEND", "sqlite");
        let storage = match backend_raw.to_lowercase().as_str() {
            "sqlite" => StorageBackend::Sqlite {
                path: PathBuf::from(var("DATABASE_PATH", "data/school_portal.db")),
            },
            "memory" | "demo" => StorageBackend::Memory,
            _ => {
                return Err(ConfigError::invalid(
                    "STORAGE_BACKEND",
                    &backend_raw,
                    "expected sqlite or memory",
                ));
            }
        };

        let env_raw = var("APP_ENV", "development");
        let app_env = env_raw
            .parse::<AppEnv>()
            .map_err(|reason| ConfigError::invalid("APP_ENV", &env_raw, reason))?;

        let jwt_secret = var("JWT_SECRET", DEFAULT_JWT_SECRET);
        let cors_origin = var("CORS_ORIGIN", "http://localhost:3000");
        HeaderValue::from_str(&cors_origin)
            .map_err(|e| ConfigError::invalid("CORS_ORIGIN", &cors_origin, e.to_string()))?;

        Ok(ServerConfig {
            host,
            port,
            storage,
            jwt_secret,
            app_env,
            cors_origin,
        })
    }

    /// `CORS_ORIGIN` as a header value. Checked at load time, so this only fails
    /// for a config assembled by hand.
    pub fn cors_origin_header(&self) -> Result<HeaderValue, ConfigError> {
        HeaderValue::from_str(&self.cors_origin)
            .map_err(|e| ConfigError::invalid("CORS_ORIGIN", &self.cors_origin, e.to_string()))
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Error details are only shown to clients outside production.
    pub fn expose_errors(&self) -> bool {
        self.app_env != AppEnv::Production
    }

    pub fn uses_default_secret(&self) -> bool {
        self.jwt_secret == DEFAULT_JWT_SECRET
    }

    /// Write the effective configuration to the log.
    pub fn log_summary(&self) {
        info!(
            "Configuration loaded: addr={}, env={}, storage={:?}, cors_origin={}",
            self.bind_addr(),
            self.app_env,
            self.storage,
            self.cors_origin
        );
        if self.uses_default_secret() {
            warn!("JWT_SECRET is not set; tokens are signed with the built-in demo secret");
        }
    }
}
