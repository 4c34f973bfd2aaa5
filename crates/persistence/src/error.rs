//! # Persistence Errors
//!
//! Error types cho persistence layer, wrapping sqlx errors.

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

/// Persistence layer errors
#[derive(Debug, Error)]
pub enum PersistenceError {
    // === Database errors ===
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Record already exists: {entity} with {key}")]
    AlreadyExists { entity: String, key: String },

    // === Balance errors ===
    #[error("Balance of account {account_id} changed: expected {expected}, found {actual}")]
    BalanceConflict {
        account_id: Uuid,
        expected: Decimal,
        actual: Decimal,
    },

    #[error("Balance of account {account_id} would become negative: {balance}")]
    NegativeBalance { account_id: Uuid, balance: Decimal },

    #[error("Balance of account {0} written without holding its row lock")]
    UnlockedWrite(Uuid),

    // === Conversion errors ===
    #[error("Invalid decimal value: {0}")]
    InvalidDecimal(String),

    #[error("Invalid id value: {0}")]
    InvalidId(String),

    // === Configuration errors ===
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Result type alias cho PersistenceError
pub type PersistenceResult<T> = Result<T, PersistenceError>;

impl PersistenceError {
    /// Tạo NotFound error
    pub fn not_found(entity: &str, id: &str) -> Self {
        Self::NotFound {
            entity: entity.to_string(),
            id: id.to_string(),
        }
    }

    /// Tạo AlreadyExists error
    pub fn already_exists(entity: &str, key: &str) -> Self {
        Self::AlreadyExists {
            entity: entity.to_string(),
            key: key.to_string(),
        }
    }

    /// Kiểm tra có phải lỗi not found không
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Kiểm tra có phải lỗi database không
    pub fn is_database_error(&self) -> bool {
        matches!(self, Self::Database(_))
    }

    /// Lock contention or pool exhaustion; the unit of work can be retried by the caller
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Database(sqlx::Error::PoolTimedOut) => true,
            Self::Database(sqlx::Error::Database(db)) => matches!(
                db.code().as_deref(),
                // SQLITE_BUSY, SQLITE_LOCKED, SQLITE_BUSY_SNAPSHOT
                Some("5") | Some("6") | Some("517")
            ),
            Self::BalanceConflict { .. } => true,
            _ => false,
        }
    }
}

/// Map a unique-constraint failure to `AlreadyExists`
pub(crate) fn map_unique(err: sqlx::Error, entity: &str, key: &str) -> PersistenceError {
    match err {
        sqlx::Error::Database(ref db) if db.is_unique_violation() => {
            PersistenceError::already_exists(entity, key)
        }
        other => PersistenceError::Database(other),
    }
}
