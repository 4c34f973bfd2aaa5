//! Database configuration

use serde::{Deserialize, Serialize};

/// SQLite connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite database URL (e.g., "sqlite:data/paybank.db")
    #[serde(default = "default_url")]
    pub url: String,

    /// Pool size
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// How long a statement waits on the store's write lock before failing
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

fn default_url() -> String {
    "sqlite:data/paybank.db".to_string()
}

fn default_max_connections() -> u32 {
    8
}

fn default_busy_timeout_ms() -> u64 {
    5_000
}

impl DatabaseConfig {
    /// Config cho một file SQLite cụ thể
    pub fn for_path(path: impl AsRef<std::path::Path>) -> Self {
        Self {
            url: format!("sqlite:{}", path.as_ref().display()),
            ..Self::default()
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            max_connections: default_max_connections(),
            busy_timeout_ms: default_busy_timeout_ms(),
        }
    }
}
