//! # Paybank Core
//!
//! Domain types for the custodial balance ledger:
//! - `Amount`: strictly positive money amount
//! - `Account`, `Profile`, `Principal`
//! - Ledger records: `TopUpRecord`, `PaymentRecord`, `TransferRecord`
//! - `HistoryEntry` and the chain invariant check

pub mod account;
pub mod chain;
pub mod error;
pub mod money;
pub mod record;

pub use account::{Account, AccountId, Principal, Profile};
pub use chain::{sort_records, verify_chain, ChainSummary};
pub use error::{AmountError, CoreError, CoreResult};
pub use money::{Amount, MAX_SCALE};
pub use record::{
    BalanceEffect, HistoryEntry, LedgerRecord, PaymentRecord, RecordKind, TopUpRecord,
    TransactionType, TransferRecord,
};
