//! History query - read-only projection of an account's ledger records
//!
//! Thứ tự: tăng dần theo created_at, hòa thì theo record id.

use crate::error::LedgerResult;
use crate::services::LedgerContext;
use paybank_core::{HistoryEntry, Principal};
use paybank_persistence::{LedgerRecordRepo, TransferScope};

/// History Service
pub struct HistoryService<'a> {
    ctx: &'a LedgerContext,
}

impl<'a> HistoryService<'a> {
    pub fn new(ctx: &'a LedgerContext) -> Self {
        Self { ctx }
    }

    /// Top-ups (CREDIT), payments (DEBIT) and sent transfers (DEBIT) of the
    /// caller. Received transfers (CREDIT) are included only when
    /// `include_received_transfers` is set.
    pub async fn history(&self, principal: &Principal) -> LedgerResult<Vec<HistoryEntry>> {
        let account_id = principal.account_id;
        let scope = if self.ctx.config().include_received_transfers {
            TransferScope::SentAndReceived
        } else {
            TransferScope::Sent
        };

        // account check and record reads share one snapshot
        let (_, records) =
            LedgerRecordRepo::account_with_records(self.ctx.pool(), account_id, scope).await?;
        let entries: Vec<HistoryEntry> = records
            .iter()
            .filter_map(|record| HistoryEntry::project(record, account_id))
            .collect();

        tracing::debug!(%account_id, entries = entries.len(), "history loaded");
        Ok(entries)
    }
}
