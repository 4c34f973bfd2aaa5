//! Single-account balance operations - top-up, payment
//!
//! Mỗi operation chạy trong một UnitOfWork:
//! lock account → đọc balance mới nhất → validate → ghi balance → ghi record → commit.

use crate::error::{LedgerError, LedgerResult, NotFoundTarget};
use crate::services::LedgerContext;
use paybank_core::{AccountId, Amount, PaymentRecord, Principal, TopUpRecord};
use paybank_persistence::UnitOfWork;
use rust_decimal::Decimal;

/// Wallet Service - handles top-up and payment operations
pub struct WalletService<'a> {
    ctx: &'a LedgerContext,
}

impl<'a> WalletService<'a> {
    pub fn new(ctx: &'a LedgerContext) -> Self {
        Self { ctx }
    }

    /// Credit the caller's account from outside the system
    pub async fn top_up(&self, principal: &Principal, amount: Decimal) -> LedgerResult<TopUpRecord> {
        let amount = Amount::new(amount)?;
        let account_id = principal.account_id;

        let _locks = self.ctx.lock(&[account_id]).await?;
        let mut uow = self.ctx.begin().await?;
        let outcome = apply_top_up(&mut uow, account_id, amount).await;
        let record = self.ctx.finish(uow, outcome).await?;

        tracing::info!(
            account_id = %account_id,
            amount = %record.amount,
            balance_after = %record.balance_after,
            "top-up applied"
        );
        Ok(record)
    }

    /// Debit the caller's account to an external merchant
    pub async fn pay(
        &self,
        principal: &Principal,
        amount: Decimal,
        remarks: &str,
    ) -> LedgerResult<PaymentRecord> {
        let amount = Amount::new(amount)?;
        let account_id = principal.account_id;

        let _locks = self.ctx.lock(&[account_id]).await?;
        let mut uow = self.ctx.begin().await?;
        let outcome = apply_payment(&mut uow, account_id, amount, remarks).await;
        let record = self.ctx.finish(uow, outcome).await.map_err(|e| {
            if let LedgerError::InsufficientFunds { required, available } = &e {
                tracing::warn!(%account_id, %required, %available, "payment rejected");
            }
            e
        })?;

        tracing::info!(
            account_id = %account_id,
            amount = %record.amount,
            balance_after = %record.balance_after,
            "payment applied"
        );
        Ok(record)
    }
}

async fn apply_top_up(
    uow: &mut UnitOfWork,
    account_id: AccountId,
    amount: Amount,
) -> LedgerResult<TopUpRecord> {
    let account = uow
        .lock_account(account_id)
        .await
        .map_err(|e| LedgerError::in_unit(e, NotFoundTarget::Account))?;

    let record = TopUpRecord::new(account_id, amount, account.balance);
    uow.apply_delta(account_id, amount.value(), Some(account.balance))
        .await
        .map_err(|e| LedgerError::in_unit(e, NotFoundTarget::Account))?;
    uow.insert_top_up(&record)
        .await
        .map_err(|e| LedgerError::in_unit(e, NotFoundTarget::Account))?;
    Ok(record)
}

async fn apply_payment(
    uow: &mut UnitOfWork,
    account_id: AccountId,
    amount: Amount,
    remarks: &str,
) -> LedgerResult<PaymentRecord> {
    let account = uow
        .lock_account(account_id)
        .await
        .map_err(|e| LedgerError::in_unit(e, NotFoundTarget::Account))?;

    if account.balance < amount.value() {
        return Err(LedgerError::insufficient_funds(amount.value(), account.balance));
    }

    let record = PaymentRecord::new(account_id, amount, remarks, account.balance);
    uow.apply_delta(account_id, -amount.value(), Some(account.balance))
        .await
        .map_err(|e| LedgerError::in_unit(e, NotFoundTarget::Account))?;
    uow.insert_payment(&record)
        .await
        .map_err(|e| LedgerError::in_unit(e, NotFoundTarget::Account))?;
    Ok(record)
}
