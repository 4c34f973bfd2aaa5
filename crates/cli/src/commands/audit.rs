//! Read-side commands: history, verify, status

use anyhow::Result;
use paybank_ledger::{AuditService, HistoryService, LedgerContext};
use serde_json::{json, Value};

use crate::config::AppConfig;

pub async fn history(ctx: &LedgerContext, token: &str) -> Result<Value> {
    let principal = ctx.authenticate(token)?;
    let entries = HistoryService::new(ctx).history(&principal).await?;
    Ok(serde_json::to_value(entries)?)
}

/// Chain check of the caller's own account
pub async fn verify(ctx: &LedgerContext, token: &str) -> Result<Value> {
    let principal = ctx.authenticate(token)?;
    let report = AuditService::new(ctx)
        .verify_account(principal.account_id)
        .await?;
    Ok(serde_json::to_value(report)?)
}

pub async fn status(ctx: &LedgerContext, config: &AppConfig) -> Result<Value> {
    let stats = AuditService::new(ctx).stats().await?;
    Ok(json!({
        "database": config.database.url,
        "accounts": stats.accounts,
        "transfers": stats.transfers,
        "include_received_transfers": config.ledger.include_received_transfers,
    }))
}
