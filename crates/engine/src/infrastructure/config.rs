//! Engine configuration from environment variables.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

const DEFAULT_MEETINGS_DB: &str = "meetings.db";
const DEFAULT_USERS_DB: &str = "users.db";
const DEFAULT_SERVER_HOST: &str = "0.0.0.0";
const DEFAULT_SERVER_PORT: u16 = 3000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown storage backend '{0}' (expected 'sqlite' or 'memory')")]
    UnknownStorage(String),
    #[error("invalid server port '{0}'")]
    InvalidPort(String),
}

/// Where meetings and identities are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageBackend {
    #[default]
    Sqlite,
    /// Lost on restart.
    Memory,
}

impl FromStr for StorageBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Ok(Self::Sqlite),
            "memory" => Ok(Self::Memory),
            _ => Err(ConfigError::UnknownStorage(s.to_string())),
        }
    }
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sqlite => write!(f, "sqlite"),
            Self::Memory => write!(f, "memory"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub storage: StorageBackend,
    pub meetings_db: String,
    pub users_db: String,
    pub server_host: String,
    pub server_port: u16,
    /// `*`, a comma-separated origin list, or `None` for no CORS layer.
    pub cors_allowed_origins: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            storage: StorageBackend::default(),
            meetings_db: DEFAULT_MEETINGS_DB.to_string(),
            users_db: DEFAULT_USERS_DB.to_string(),
            server_host: DEFAULT_SERVER_HOST.to_string(),
            server_port: DEFAULT_SERVER_PORT,
            cors_allowed_origins: None,
        }
    }
}

impl EngineConfig {
    /// Read the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key lookup. Unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(storage) = lookup("BGORG_STORAGE") {
            config.storage = storage.parse()?;
        }
        if let Some(path) = lookup("BGORG_MEETINGS_DB") {
            config.meetings_db = path;
        }
        if let Some(path) = lookup("BGORG_USERS_DB") {
            config.users_db = path;
        }
        if let Some(host) = lookup("SERVER_HOST") {
            config.server_host = host;
        }
        if let Some(port) = lookup("SERVER_PORT").or_else(|| lookup("PORT")) {
            config.server_port = port
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidPort(port.clone()))?;
        }
        config.cors_allowed_origins = lookup("CORS_ALLOWED_ORIGINS")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        Ok(config)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}
