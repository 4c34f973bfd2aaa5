//! Shared setup for ledger integration tests

#![allow(dead_code)]

use paybank_auth::{TokenConfig, TokenService};
use paybank_core::{Principal, Profile};
use paybank_ledger::{AccountService, LedgerConfig, LedgerContext, WalletService};
use paybank_persistence::{Database, DatabaseConfig};
use rust_decimal::Decimal;
use tempfile::TempDir;

pub const PIN: &str = "123456";

pub async fn setup() -> (TempDir, LedgerContext) {
    setup_with(LedgerConfig::default()).await
}

pub async fn setup_with(config: LedgerConfig) -> (TempDir, LedgerContext) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db = Database::init(&DatabaseConfig::for_path(temp_dir.path().join("ledger.db")))
        .await
        .expect("Failed to init database");
    let tokens = TokenService::new(TokenConfig {
        secret: "integration-test-secret".to_string(),
        ..TokenConfig::default()
    });
    (temp_dir, LedgerContext::new(db, tokens, config))
}

pub async fn register(ctx: &LedgerContext, phone: &str) -> Principal {
    let account = AccountService::new(ctx)
        .register(phone, PIN, Profile::new("Test", "User", "Hanoi"))
        .await
        .expect("register");
    Principal::from(&account)
}

/// Register and top up in one go
pub async fn funded(ctx: &LedgerContext, phone: &str, amount: Decimal) -> Principal {
    let principal = register(ctx, phone).await;
    WalletService::new(ctx)
        .top_up(&principal, amount)
        .await
        .expect("top up");
    principal
}

pub async fn balance(ctx: &LedgerContext, principal: &Principal) -> Decimal {
    AccountService::new(ctx)
        .get(principal)
        .await
        .expect("get account")
        .balance
}
