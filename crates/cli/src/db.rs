//! Database opening and wiring of the ledger context

use anyhow::{Context, Result};
use paybank_auth::TokenService;
use paybank_ledger::LedgerContext;
use paybank_persistence::Database;
use std::path::PathBuf;

use crate::config::AppConfig;

/// File path behind a `sqlite:` url, if it names a file
fn sqlite_file(url: &str) -> Option<PathBuf> {
    let path = url
        .strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"))?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() || path == ":memory:" {
        return None;
    }
    Some(PathBuf::from(path))
}

/// Open the store (applying pending migrations) and build the ledger context
pub async fn open(config: &AppConfig) -> Result<LedgerContext> {
    if let Some(parent) = sqlite_file(&config.database.url)
        .as_deref()
        .and_then(|p| p.parent())
        .filter(|p| !p.as_os_str().is_empty())
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let db = Database::init(&config.database)
        .await
        .with_context(|| format!("Failed to open database {}", config.database.url))?;
    tracing::debug!(url = %config.database.url, "database ready");

    Ok(LedgerContext::new(
        db,
        TokenService::new(config.auth.clone()),
        config.ledger.clone(),
    ))
}
