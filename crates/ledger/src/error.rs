//! Ledger errors
//!
//! Mỗi lỗi có một status ổn định (`status()`) và một message cho người dùng.
//! `Aborted`/`Internal` chỉ trả về message chung; nguyên nhân thật được log.

use paybank_auth::AuthError;
use paybank_core::{AmountError, CoreError};
use paybank_persistence::PersistenceError;
use rust_decimal::Decimal;
use std::fmt;
use thiserror::Error;

/// Which account a `NotFound` refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotFoundTarget {
    Account,
    Source,
    Destination,
}

impl fmt::Display for NotFoundTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Account => write!(f, "Account"),
            Self::Source => write!(f, "Source account"),
            Self::Destination => write!(f, "Destination account"),
        }
    }
}

/// Ledger operation errors
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    #[error("{target} not found: {id}")]
    NotFound { target: NotFoundTarget, id: String },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Insufficient funds: required {required}, available {available}")]
    InsufficientFunds {
        required: Decimal,
        available: Decimal,
    },

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Operation aborted, no changes were applied")]
    Aborted { cause: String },

    #[error("Internal error")]
    Internal { cause: String },
}

/// Result type alias for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Message for both unknown phone and wrong PIN
pub const LOGIN_FAILED: &str = "Phone Number and PIN doesn't match";

impl LedgerError {
    /// Stable machine-readable status
    pub fn status(&self) -> &'static str {
        match self {
            Self::Unauthenticated(_) => "UNAUTHENTICATED",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Conflict(_) => "CONFLICT",
            Self::InsufficientFunds { .. } => "INSUFFICIENT_FUNDS",
            Self::InvalidAmount(_) => "INVALID_AMOUNT",
            Self::InvalidOperation(_) => "INVALID_OPERATION",
            Self::Aborted { .. } => "ABORTED",
            Self::Internal { .. } => "INTERNAL",
        }
    }

    pub fn not_found(target: NotFoundTarget, id: impl fmt::Display) -> Self {
        Self::NotFound {
            target,
            id: id.to_string(),
        }
    }

    pub fn insufficient_funds(required: Decimal, available: Decimal) -> Self {
        Self::InsufficientFunds {
            required,
            available,
        }
    }

    pub fn aborted(cause: impl fmt::Display) -> Self {
        let cause = cause.to_string();
        tracing::error!(%cause, "ledger operation aborted");
        Self::Aborted { cause }
    }

    pub fn internal(cause: impl fmt::Display) -> Self {
        let cause = cause.to_string();
        tracing::error!(%cause, "internal ledger error");
        Self::Internal { cause }
    }

    /// Map a store failure raised while a unit of work is open.
    ///
    /// Missing rows keep their meaning; every other failure aborts the unit.
    pub fn in_unit(err: PersistenceError, target: NotFoundTarget) -> Self {
        match err {
            PersistenceError::NotFound { id, .. } => Self::NotFound { target, id },
            PersistenceError::AlreadyExists { entity, key } => {
                Self::Conflict(format!("{entity} with {key} already exists"))
            }
            other => Self::aborted(other),
        }
    }

    /// Business rejection, as opposed to a store or infrastructure fault
    pub fn is_rejection(&self) -> bool {
        !matches!(self, Self::Aborted { .. } | Self::Internal { .. })
    }
}

impl From<PersistenceError> for LedgerError {
    fn from(err: PersistenceError) -> Self {
        match err {
            PersistenceError::NotFound { id, .. } => Self::not_found(NotFoundTarget::Account, id),
            PersistenceError::AlreadyExists { entity, key } => {
                Self::Conflict(format!("{entity} with {key} already exists"))
            }
            err @ PersistenceError::BalanceConflict { .. } => Self::aborted(err),
            other => Self::internal(other),
        }
    }
}

impl From<AmountError> for LedgerError {
    fn from(err: AmountError) -> Self {
        Self::InvalidAmount(err.to_string())
    }
}

impl From<AuthError> for LedgerError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidPin(msg) => Self::InvalidOperation(format!("PIN {msg}")),
            AuthError::Signing(cause) | AuthError::InvalidConfig(cause) => Self::internal(cause),
            other => Self::Unauthenticated(other.to_string()),
        }
    }
}

impl From<CoreError> for LedgerError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Amount(e) => e.into(),
            other => Self::internal(other),
        }
    }
}
