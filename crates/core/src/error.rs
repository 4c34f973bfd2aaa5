//! # Error Module
//!
//! Định nghĩa các domain errors cho Paybank sử dụng thiserror.

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

/// Lỗi khi tạo `Amount`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    #[error("Amount must be positive: {0}")]
    NotPositive(Decimal),

    #[error("Amount {value} has more than {max_scale} decimal places")]
    TooPrecise { value: Decimal, max_scale: u32 },

    #[error("Amount is not a number: {0}")]
    Unparseable(String),
}

/// Core domain errors.
///
/// Các lỗi nghiệp vụ cốt lõi, không liên quan đến infrastructure.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Amount(#[from] AmountError),

    #[error("Invalid ID format: {0}")]
    InvalidIdFormat(String),

    #[error("Unknown {field}: {value}")]
    UnknownVariant { field: String, value: String },

    #[error(
        "Broken ledger chain for account {account_id} at record {record_id}: \
         expected balance_before {expected}, found {found}"
    )]
    BrokenChain {
        account_id: Uuid,
        record_id: Uuid,
        expected: Decimal,
        found: Decimal,
    },

    #[error("Record {record_id} does not satisfy balance_after = balance_before ± amount")]
    InconsistentRecord { record_id: Uuid },

    #[error(
        "Stored balance of account {account_id} is {stored}, ledger chain ends at {chain_end}"
    )]
    BalanceMismatch {
        account_id: Uuid,
        stored: Decimal,
        chain_end: Decimal,
    },
}

/// Result type alias với CoreError
pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    /// Kiểm tra có phải lỗi chain invariant không
    pub fn is_chain_error(&self) -> bool {
        matches!(
            self,
            CoreError::BrokenChain { .. }
                | CoreError::InconsistentRecord { .. }
                | CoreError::BalanceMismatch { .. }
        )
    }
}
