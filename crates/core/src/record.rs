//! # Ledger Record Module
//!
//! Ba loại record bất biến: TopUp, Payment, Transfer.
//! Mỗi record lưu snapshot balance_before / balance_after của account bị ảnh hưởng.

use crate::account::AccountId;
use crate::error::CoreError;
use crate::money::Amount;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Loại record trong ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecordKind {
    TopUp,
    Payment,
    Transfer,
}

impl RecordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::TopUp => "TOP_UP",
            RecordKind::Payment => "PAYMENT",
            RecordKind::Transfer => "TRANSFER",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Hướng của giao dịch nhìn từ account đang xem history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionType {
    Credit,
    Debit,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Credit => "CREDIT",
            TransactionType::Debit => "DEBIT",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "CREDIT" => Some(TransactionType::Credit),
            "DEBIT" => Some(TransactionType::Debit),
            _ => None,
        }
    }

    /// Delta có dấu áp vào balance
    pub fn signed(&self, amount: Decimal) -> Decimal {
        match self {
            TransactionType::Credit => amount,
            TransactionType::Debit => -amount,
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Credit from outside the system
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopUpRecord {
    pub id: Uuid,
    pub account_id: AccountId,
    pub amount: Decimal,
    pub balance_before: Decimal,
    pub balance_after: Decimal,
    pub created_at: DateTime<Utc>,
}

impl TopUpRecord {
    pub fn new(account_id: AccountId, amount: Amount, balance_before: Decimal) -> Self {
        Self {
            id: Uuid::new_v4(),
            account_id,
            amount: amount.value(),
            balance_before,
            balance_after: balance_before + amount.value(),
            created_at: Utc::now(),
        }
    }
}

/// Debit to an external merchant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub id: Uuid,
    pub account_id: AccountId,
    pub amount: Decimal,
    pub remarks: String,
    pub balance_before: Decimal,
    pub balance_after: Decimal,
    pub created_at: DateTime<Utc>,
}

impl PaymentRecord {
    pub fn new(
        account_id: AccountId,
        amount: Amount,
        remarks: &str,
        balance_before: Decimal,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            account_id,
            amount: amount.value(),
            remarks: remarks.to_string(),
            balance_before,
            balance_after: balance_before - amount.value(),
            created_at: Utc::now(),
        }
    }
}

/// Debit one account, credit another.
///
/// `balance_before`/`balance_after` là snapshot của source account;
/// `to_balance_before`/`to_balance_after` là snapshot của destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRecord {
    pub id: Uuid,
    pub from_account_id: AccountId,
    pub to_account_id: AccountId,
    pub amount: Decimal,
    pub remarks: String,
    pub balance_before: Decimal,
    pub balance_after: Decimal,
    pub to_balance_before: Decimal,
    pub to_balance_after: Decimal,
    pub created_at: DateTime<Utc>,
}

impl TransferRecord {
    pub fn new(
        from_account_id: AccountId,
        to_account_id: AccountId,
        amount: Amount,
        remarks: &str,
        balance_before: Decimal,
        to_balance_before: Decimal,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            from_account_id,
            to_account_id,
            amount: amount.value(),
            remarks: remarks.to_string(),
            balance_before,
            balance_after: balance_before - amount.value(),
            to_balance_before,
            to_balance_after: to_balance_before + amount.value(),
            created_at: Utc::now(),
        }
    }
}

/// Snapshot của một record lên một account cụ thể
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BalanceEffect {
    pub transaction_type: TransactionType,
    pub balance_before: Decimal,
    pub balance_after: Decimal,
}

/// Any of the three record kinds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LedgerRecord {
    TopUp(TopUpRecord),
    Payment(PaymentRecord),
    Transfer(TransferRecord),
}

impl LedgerRecord {
    pub fn id(&self) -> Uuid {
        match self {
            LedgerRecord::TopUp(r) => r.id,
            LedgerRecord::Payment(r) => r.id,
            LedgerRecord::Transfer(r) => r.id,
        }
    }

    pub fn kind(&self) -> RecordKind {
        match self {
            LedgerRecord::TopUp(_) => RecordKind::TopUp,
            LedgerRecord::Payment(_) => RecordKind::Payment,
            LedgerRecord::Transfer(_) => RecordKind::Transfer,
        }
    }

    pub fn amount(&self) -> Decimal {
        match self {
            LedgerRecord::TopUp(r) => r.amount,
            LedgerRecord::Payment(r) => r.amount,
            LedgerRecord::Transfer(r) => r.amount,
        }
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        match self {
            LedgerRecord::TopUp(r) => r.created_at,
            LedgerRecord::Payment(r) => r.created_at,
            LedgerRecord::Transfer(r) => r.created_at,
        }
    }

    /// Khóa sắp xếp ổn định: created_at, rồi id
    pub fn sort_key(&self) -> (DateTime<Utc>, Uuid) {
        (self.created_at(), self.id())
    }

    /// How this record moved the balance of `account_id`, if at all
    pub fn effect_on(&self, account_id: AccountId) -> Option<BalanceEffect> {
        match self {
            LedgerRecord::TopUp(r) if r.account_id == account_id => Some(BalanceEffect {
                transaction_type: TransactionType::Credit,
                balance_before: r.balance_before,
                balance_after: r.balance_after,
            }),
            LedgerRecord::Payment(r) if r.account_id == account_id => Some(BalanceEffect {
                transaction_type: TransactionType::Debit,
                balance_before: r.balance_before,
                balance_after: r.balance_after,
            }),
            LedgerRecord::Transfer(r) if r.from_account_id == account_id => {
                Some(BalanceEffect {
                    transaction_type: TransactionType::Debit,
                    balance_before: r.balance_before,
                    balance_after: r.balance_after,
                })
            }
            LedgerRecord::Transfer(r) if r.to_account_id == account_id => Some(BalanceEffect {
                transaction_type: TransactionType::Credit,
                balance_before: r.to_balance_before,
                balance_after: r.to_balance_after,
            }),
            _ => None,
        }
    }

    /// Kiểm tra balance_after = balance_before ± amount cho mọi account bị ảnh hưởng
    pub fn check_consistency(&self) -> Result<(), CoreError> {
        let amount = self.amount();
        let consistent = amount > Decimal::ZERO
            && match self {
                LedgerRecord::TopUp(r) => r.balance_after == r.balance_before + amount,
                LedgerRecord::Payment(r) => r.balance_after == r.balance_before - amount,
                LedgerRecord::Transfer(r) => {
                    r.balance_after == r.balance_before - amount
                        && r.to_balance_after == r.to_balance_before + amount
                }
            };

        if consistent {
            Ok(())
        } else {
            Err(CoreError::InconsistentRecord {
                record_id: self.id(),
            })
        }
    }
}

impl From<TopUpRecord> for LedgerRecord {
    fn from(record: TopUpRecord) -> Self {
        LedgerRecord::TopUp(record)
    }
}

impl From<PaymentRecord> for LedgerRecord {
    fn from(record: PaymentRecord) -> Self {
        LedgerRecord::Payment(record)
    }
}

impl From<TransferRecord> for LedgerRecord {
    fn from(record: TransferRecord) -> Self {
        LedgerRecord::Transfer(record)
    }
}

/// One row of the transaction-history view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub record_id: Uuid,
    pub record_kind: RecordKind,
    pub account_id: AccountId,
    pub transaction_type: TransactionType,
    pub amount: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
    pub balance_before: Decimal,
    pub balance_after: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub counterparty: Option<AccountId>,
    pub created_at: DateTime<Utc>,
}

impl HistoryEntry {
    /// Chiếu một record thành history entry nhìn từ `account_id`
    pub fn project(record: &LedgerRecord, account_id: AccountId) -> Option<Self> {
        let effect = record.effect_on(account_id)?;
        let (remarks, counterparty) = match record {
            LedgerRecord::TopUp(_) => (None, None),
            LedgerRecord::Payment(r) => (Some(r.remarks.clone()), None),
            LedgerRecord::Transfer(r) => {
                let other = if r.from_account_id == account_id {
                    r.to_account_id
                } else {
                    r.from_account_id
                };
                (Some(r.remarks.clone()), Some(other))
            }
        };

        Some(Self {
            record_id: record.id(),
            record_kind: record.kind(),
            account_id,
            transaction_type: effect.transaction_type,
            amount: record.amount(),
            remarks,
            balance_before: effect.balance_before,
            balance_after: effect.balance_after,
            counterparty,
            created_at: record.created_at(),
        })
    }
}
