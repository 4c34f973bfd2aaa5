//! Account commands: register, login, refresh, profile, balance

use anyhow::Result;
use paybank_core::Profile;
use paybank_ledger::{AccountService, LedgerContext};
use serde_json::{json, Value};

pub async fn register(
    ctx: &LedgerContext,
    phone: &str,
    pin: &str,
    profile: Profile,
) -> Result<Value> {
    let account = AccountService::new(ctx).register(phone, pin, profile).await?;
    Ok(serde_json::to_value(account)?)
}

pub async fn login(ctx: &LedgerContext, phone: &str, pin: &str) -> Result<Value> {
    let session = AccountService::new(ctx).login(phone, pin).await?;
    Ok(serde_json::to_value(session)?)
}

pub async fn refresh(ctx: &LedgerContext, refresh_token: &str) -> Result<Value> {
    let session = AccountService::new(ctx).refresh(refresh_token).await?;
    Ok(serde_json::to_value(session)?)
}

pub async fn update_profile(ctx: &LedgerContext, token: &str, profile: Profile) -> Result<Value> {
    let principal = ctx.authenticate(token)?;
    let account = AccountService::new(ctx)
        .update_profile(&principal, profile)
        .await?;
    Ok(serde_json::to_value(account)?)
}

pub async fn balance(ctx: &LedgerContext, token: &str) -> Result<Value> {
    let principal = ctx.authenticate(token)?;
    let account = AccountService::new(ctx).get(&principal).await?;
    Ok(json!({
        "account_id": account.id,
        "phone_number": account.phone_number,
        "balance": account.balance,
    }))
}
