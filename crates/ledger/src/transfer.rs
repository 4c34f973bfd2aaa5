//! Transfer - the one operation touching two account rows.
//!
//! Lock order is ascending account id, both for the in-process locks and for
//! the row locks inside the unit of work. The debit, the credit and the
//! record insert commit together or not at all.
//!
//! Check order: amount, source exists, source != destination, destination
//! exists, funds.

use crate::error::{LedgerError, LedgerResult, NotFoundTarget};
use crate::services::LedgerContext;
use paybank_core::{Account, AccountId, Amount, Principal, TransferRecord};
use paybank_persistence::{AccountRepo, PersistenceError, UnitOfWork};
use rust_decimal::Decimal;

/// Transfer Service
pub struct TransferService<'a> {
    ctx: &'a LedgerContext,
}

impl<'a> TransferService<'a> {
    pub fn new(ctx: &'a LedgerContext) -> Self {
        Self { ctx }
    }

    /// Move `amount` from the caller's account to `to_account_id`
    pub async fn transfer(
        &self,
        principal: &Principal,
        to_account_id: AccountId,
        amount: Decimal,
        remarks: &str,
    ) -> LedgerResult<TransferRecord> {
        let amount = Amount::new(amount)?;
        let from_account_id = principal.account_id;

        if from_account_id == to_account_id {
            // source is resolved first, as on the normal path
            AccountRepo::get_by_id(self.ctx.pool(), from_account_id)
                .await
                .map_err(|e| match e {
                    PersistenceError::NotFound { id, .. } => {
                        LedgerError::not_found(NotFoundTarget::Source, id)
                    }
                    other => other.into(),
                })?;
            return Err(LedgerError::InvalidOperation(
                "Cannot transfer to the same account".to_string(),
            ));
        }

        let _locks = self.ctx.lock(&[from_account_id, to_account_id]).await?;
        let mut uow = self.ctx.begin().await?;
        let outcome =
            apply_transfer(&mut uow, from_account_id, to_account_id, amount, remarks).await;
        let record = self.ctx.finish(uow, outcome).await.map_err(|e| {
            if e.is_rejection() {
                tracing::warn!(
                    from = %from_account_id,
                    to = %to_account_id,
                    status = e.status(),
                    "transfer rejected: {e}"
                );
            }
            e
        })?;

        tracing::info!(
            transfer_id = %record.id,
            from = %from_account_id,
            to = %to_account_id,
            amount = %record.amount,
            balance_after = %record.balance_after,
            "transfer applied"
        );
        Ok(record)
    }
}

fn target_of(id: AccountId, from: AccountId) -> NotFoundTarget {
    if id == from {
        NotFoundTarget::Source
    } else {
        NotFoundTarget::Destination
    }
}

async fn apply_transfer(
    uow: &mut UnitOfWork,
    from: AccountId,
    to: AccountId,
    amount: Amount,
    remarks: &str,
) -> LedgerResult<TransferRecord> {
    let (first, second) = if from < to { (from, to) } else { (to, from) };

    let mut locked: Vec<Account> = Vec::with_capacity(2);
    for id in [first, second] {
        let account = uow
            .lock_account(id)
            .await
            .map_err(|e| LedgerError::in_unit(e, target_of(id, from)))?;
        locked.push(account);
    }
    let (source, destination) = if locked[0].id == from {
        (&locked[0], &locked[1])
    } else {
        (&locked[1], &locked[0])
    };

    if source.balance < amount.value() {
        return Err(LedgerError::insufficient_funds(amount.value(), source.balance));
    }

    let record = TransferRecord::new(
        from,
        to,
        amount,
        remarks,
        source.balance,
        destination.balance,
    );

    // debit first, then credit
    uow.apply_delta(from, -amount.value(), Some(source.balance))
        .await
        .map_err(|e| LedgerError::in_unit(e, NotFoundTarget::Source))?;
    uow.apply_delta(to, amount.value(), Some(destination.balance))
        .await
        .map_err(|e| LedgerError::in_unit(e, NotFoundTarget::Destination))?;
    uow.insert_transfer(&record)
        .await
        .map_err(|e| LedgerError::in_unit(e, NotFoundTarget::Source))?;

    Ok(record)
}
