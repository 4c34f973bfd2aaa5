//! Database schema definitions
//!
//! Row types cho sqlx mapping từ SQLite tables.
//! Schema được định nghĩa trong migrations/20261019000000_init.sql

use crate::error::{PersistenceError, PersistenceResult};
use chrono::{DateTime, Utc};
use paybank_core::{
    Account, PaymentRecord, Profile, TopUpRecord, TransferRecord,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// Row type cho bảng `accounts`
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct AccountRow {
    pub id: String,
    pub phone_number: String,
    pub first_name: String,
    pub last_name: String,
    pub address: String,
    pub pin_hash: String,
    pub balance: String, // Decimal stored as TEXT
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row type cho bảng `top_ups`
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct TopUpRow {
    pub id: String,
    pub account_id: String,
    pub amount: String,
    pub balance_before: String,
    pub balance_after: String,
    pub created_at: DateTime<Utc>,
}

/// Row type cho bảng `payments`
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct PaymentRow {
    pub id: String,
    pub account_id: String,
    pub amount: String,
    pub remarks: String,
    pub balance_before: String,
    pub balance_after: String,
    pub created_at: DateTime<Utc>,
}

/// Row type cho bảng `transfers`
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct TransferRow {
    pub id: String,
    pub from_account_id: String,
    pub to_account_id: String,
    pub amount: String,
    pub remarks: String,
    pub balance_before: String,
    pub balance_after: String,
    pub to_balance_before: String,
    pub to_balance_after: String,
    pub created_at: DateTime<Utc>,
}

// === Conversion helpers ===

pub(crate) fn parse_decimal(value: &str) -> PersistenceResult<Decimal> {
    Decimal::from_str(value).map_err(|e| PersistenceError::InvalidDecimal(format!("{value}: {e}")))
}

pub(crate) fn parse_id(value: &str) -> PersistenceResult<Uuid> {
    Uuid::parse_str(value).map_err(|e| PersistenceError::InvalidId(format!("{value}: {e}")))
}

// === Conversion implementations ===

impl TryFrom<AccountRow> for Account {
    type Error = PersistenceError;

    fn try_from(row: AccountRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_id(&row.id)?,
            phone_number: row.phone_number,
            profile: Profile {
                first_name: row.first_name,
                last_name: row.last_name,
                address: row.address,
            },
            pin_hash: row.pin_hash,
            balance: parse_decimal(&row.balance)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl From<&TopUpRecord> for TopUpRow {
    fn from(record: &TopUpRecord) -> Self {
        Self {
            id: record.id.to_string(),
            account_id: record.account_id.to_string(),
            amount: record.amount.to_string(),
            balance_before: record.balance_before.to_string(),
            balance_after: record.balance_after.to_string(),
            created_at: record.created_at,
        }
    }
}

impl TryFrom<TopUpRow> for TopUpRecord {
    type Error = PersistenceError;

    fn try_from(row: TopUpRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_id(&row.id)?,
            account_id: parse_id(&row.account_id)?,
            amount: parse_decimal(&row.amount)?,
            balance_before: parse_decimal(&row.balance_before)?,
            balance_after: parse_decimal(&row.balance_after)?,
            created_at: row.created_at,
        })
    }
}

impl From<&PaymentRecord> for PaymentRow {
    fn from(record: &PaymentRecord) -> Self {
        Self {
            id: record.id.to_string(),
            account_id: record.account_id.to_string(),
            amount: record.amount.to_string(),
            remarks: record.remarks.clone(),
            balance_before: record.balance_before.to_string(),
            balance_after: record.balance_after.to_string(),
            created_at: record.created_at,
        }
    }
}

impl TryFrom<PaymentRow> for PaymentRecord {
    type Error = PersistenceError;

    fn try_from(row: PaymentRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_id(&row.id)?,
            account_id: parse_id(&row.account_id)?,
            amount: parse_decimal(&row.amount)?,
            remarks: row.remarks,
            balance_before: parse_decimal(&row.balance_before)?,
            balance_after: parse_decimal(&row.balance_after)?,
            created_at: row.created_at,
        })
    }
}

impl From<&TransferRecord> for TransferRow {
    fn from(record: &TransferRecord) -> Self {
        Self {
            id: record.id.to_string(),
            from_account_id: record.from_account_id.to_string(),
            to_account_id: record.to_account_id.to_string(),
            amount: record.amount.to_string(),
            remarks: record.remarks.clone(),
            balance_before: record.balance_before.to_string(),
            balance_after: record.balance_after.to_string(),
            to_balance_before: record.to_balance_before.to_string(),
            to_balance_after: record.to_balance_after.to_string(),
            created_at: record.created_at,
        }
    }
}

impl TryFrom<TransferRow> for TransferRecord {
    type Error = PersistenceError;

    fn try_from(row: TransferRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_id(&row.id)?,
            from_account_id: parse_id(&row.from_account_id)?,
            to_account_id: parse_id(&row.to_account_id)?,
            amount: parse_decimal(&row.amount)?,
            remarks: row.remarks,
            balance_before: parse_decimal(&row.balance_before)?,
            balance_after: parse_decimal(&row.balance_after)?,
            to_balance_before: parse_decimal(&row.to_balance_before)?,
            to_balance_after: parse_decimal(&row.to_balance_after)?,
            created_at: row.created_at,
        })
    }
}
