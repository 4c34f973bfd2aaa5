//! Application configuration
//!
//! Loaded from an optional TOML file; every section has defaults.
//!
//! ```toml
//! log_level = "info"
//!
//! [database]
//! url = "sqlite:data/paybank.db"
//! max_connections = 8
//! busy_timeout_ms = 5000
//!
//! [auth]
//! secret = "change-me"
//! access_ttl_secs = 86400
//! refresh_ttl_secs = 604800
//!
//! [ledger]
//! lock_timeout_ms = 5000
//! include_received_transfers = false
//! ```

use paybank_auth::{TokenConfig, TokenKind};
use paybank_ledger::LedgerConfig;
use paybank_persistence::DatabaseConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Configuration loading errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("validation error: {0}")]
    Validation(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub auth: TokenConfig,

    #[serde(default)]
    pub ledger: LedgerConfig,

    /// Default tracing filter, overridden by RUST_LOG
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            auth: TokenConfig::default(),
            ledger: LedgerConfig::default(),
            log_level: default_log_level(),
        }
    }
}

impl AppConfig {
    /// Load from `path`, or defaults when no path is given
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }
        let content = std::fs::read_to_string(path)?;
        Self::load_str(&content)
    }

    pub fn load_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Command-line and environment overrides
    pub fn with_overrides(mut self, db_url: Option<String>, token_secret: Option<String>) -> Self {
        if let Some(url) = db_url {
            self.database.url = url;
        }
        if let Some(secret) = token_secret {
            self.auth.secret = secret;
        }
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.url.trim().is_empty() {
            return Err(ConfigError::Validation("database.url is empty".to_string()));
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::Validation(
                "database.max_connections must be at least 1".to_string(),
            ));
        }
        if self.auth.secret.is_empty() {
            return Err(ConfigError::Validation("auth.secret is empty".to_string()));
        }
        if self.auth.access_ttl_secs == 0 || self.auth.refresh_ttl_secs == 0 {
            return Err(ConfigError::Validation(
                "auth token lifetimes must be positive".to_string(),
            ));
        }
        for kind in [TokenKind::Access, TokenKind::Refresh] {
            self.auth
                .ttl_secs(kind)
                .map_err(|e| ConfigError::Validation(e.to_string()))?;
        }
        if self.auth.access_ttl_secs > self.auth.refresh_ttl_secs {
            return Err(ConfigError::Validation(format!(
                "auth.access_ttl_secs ({}) exceeds auth.refresh_ttl_secs ({})",
                self.auth.access_ttl_secs, self.auth.refresh_ttl_secs
            )));
        }
        if self.auth.uses_dev_secret() {
            tracing::warn!(
                "auth.secret is the built-in development secret; set [auth].secret or PAYBANK_TOKEN_SECRET"
            );
        }
        Ok(())
    }
}
