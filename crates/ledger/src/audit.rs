//! Audit operations - ledger chain verification
//!
//! AuditService kiểm tra chain invariant của một account: các record sắp xếp
//! theo thời gian phải nối liền nhau từ opening balance (0) đến balance hiện tại.

use crate::error::LedgerResult;
use crate::services::LedgerContext;
use paybank_core::{verify_chain, Account, AccountId};
use paybank_persistence::{AccountRepo, LedgerRecordRepo, TransferRepo, TransferScope};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Outcome of a chain check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditReport {
    pub account_id: AccountId,
    pub stored_balance: Decimal,
    pub records_checked: usize,
    pub consistent: bool,
    /// First violation found, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub violation: Option<String>,
}

/// Store-wide counters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerStats {
    pub accounts: i64,
    pub transfers: i64,
}

/// Audit Service
pub struct AuditService<'a> {
    ctx: &'a LedgerContext,
}

impl<'a> AuditService<'a> {
    pub fn new(ctx: &'a LedgerContext) -> Self {
        Self { ctx }
    }

    /// Check the chain invariant for one account
    pub async fn verify_account(&self, account_id: AccountId) -> LedgerResult<AuditReport> {
        let (row, records) = LedgerRecordRepo::account_with_records(
            self.ctx.pool(),
            account_id,
            TransferScope::SentAndReceived,
        )
        .await?;
        let account = Account::try_from(row)?;
        let total = records.len();

        let report = match verify_chain(
            account_id,
            Account::opening_balance(),
            records,
            account.balance,
        ) {
            Ok(summary) => AuditReport {
                account_id,
                stored_balance: account.balance,
                records_checked: summary.records_checked,
                consistent: true,
                violation: None,
            },
            Err(e) if e.is_chain_error() => {
                tracing::warn!(%account_id, violation = %e, "ledger chain broken");
                AuditReport {
                    account_id,
                    stored_balance: account.balance,
                    records_checked: total,
                    consistent: false,
                    violation: Some(e.to_string()),
                }
            }
            Err(e) => return Err(e.into()),
        };

        tracing::info!(
            %account_id,
            records = report.records_checked,
            consistent = report.consistent,
            "account audited"
        );
        Ok(report)
    }

    pub async fn stats(&self) -> LedgerResult<LedgerStats> {
        Ok(LedgerStats {
            accounts: AccountRepo::count(self.ctx.pool()).await?,
            transfers: TransferRepo::count(self.ctx.pool()).await?,
        })
    }
}
