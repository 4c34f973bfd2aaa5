//! Balance-moving commands: topup, pay, transfer

use anyhow::Result;
use paybank_ledger::{LedgerContext, TransferService, WalletService};
use rust_decimal::Decimal;
use serde_json::Value;
use uuid::Uuid;

pub async fn top_up(ctx: &LedgerContext, token: &str, amount: Decimal) -> Result<Value> {
    let principal = ctx.authenticate(token)?;
    let record = WalletService::new(ctx).top_up(&principal, amount).await?;
    Ok(serde_json::to_value(record)?)
}

pub async fn pay(ctx: &LedgerContext, token: &str, amount: Decimal, remarks: &str) -> Result<Value> {
    let principal = ctx.authenticate(token)?;
    let record = WalletService::new(ctx)
        .pay(&principal, amount, remarks)
        .await?;
    Ok(serde_json::to_value(record)?)
}

pub async fn transfer(
    ctx: &LedgerContext,
    token: &str,
    to: Uuid,
    amount: Decimal,
    remarks: &str,
) -> Result<Value> {
    let principal = ctx.authenticate(token)?;
    let record = TransferService::new(ctx)
        .transfer(&principal, to, amount, remarks)
        .await?;
    Ok(serde_json::to_value(record)?)
}
