//! Chain invariant for an account's ledger records.
//!
//! Sorted by `(created_at, id)`, every record affecting an account must start
//! where the previous one ended, the first one must start at the opening
//! balance, and the last one must end at the stored balance.

use crate::account::AccountId;
use crate::error::{CoreError, CoreResult};
use crate::record::LedgerRecord;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Result of a successful chain check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainSummary {
    pub account_id: AccountId,
    pub records_checked: usize,
    pub opening_balance: Decimal,
    pub closing_balance: Decimal,
}

/// Sort records into ledger order
pub fn sort_records(records: &mut [LedgerRecord]) {
    records.sort_by_key(|r| r.sort_key());
}

/// Verify the chain invariant for `account_id`.
///
/// Records not affecting the account are ignored.
pub fn verify_chain(
    account_id: AccountId,
    opening_balance: Decimal,
    mut records: Vec<LedgerRecord>,
    stored_balance: Decimal,
) -> CoreResult<ChainSummary> {
    sort_records(&mut records);

    let mut expected = opening_balance;
    let mut checked = 0;

    for record in &records {
        let Some(effect) = record.effect_on(account_id) else {
            continue;
        };
        record.check_consistency()?;

        if effect.balance_before != expected {
            return Err(CoreError::BrokenChain {
                account_id,
                record_id: record.id(),
                expected,
                found: effect.balance_before,
            });
        }
        expected = effect.balance_after;
        checked += 1;
    }

    if expected != stored_balance {
        return Err(CoreError::BalanceMismatch {
            account_id,
            stored: stored_balance,
            chain_end: expected,
        });
    }

    Ok(ChainSummary {
        account_id,
        records_checked: checked,
        opening_balance,
        closing_balance: expected,
    })
}
