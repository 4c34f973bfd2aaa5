//! # Paybank Persistence
//!
//! Persistence layer cho Paybank - SQLite account store + ledger record tables.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │                        Database                           │
//! │  ┌─────────────┐    ┌──────────────┐    ┌──────────────┐  │
//! │  │   SQLite    │    │  UnitOfWork  │    │    Repos     │  │
//! │  │ (WAL mode)  │    │ (atomic ops) │    │  (queries)   │  │
//! │  └─────────────┘    └──────────────┘    └──────────────┘  │
//! └───────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use paybank_persistence::{Database, DatabaseConfig};
//!
//! let db = Database::init(&DatabaseConfig::for_path("paybank.db")).await?;
//!
//! let mut uow = db.begin().await?;
//! let account = uow.lock_account(account_id).await?;
//! uow.apply_delta(account_id, amount, Some(account.balance)).await?;
//! uow.commit().await?;
//! ```

pub mod config;
pub mod error;
pub mod sqlite;
pub mod unit_of_work;

pub use config::DatabaseConfig;
pub use error::{PersistenceError, PersistenceResult};
pub use sqlite::schema::{AccountRow, PaymentRow, TopUpRow, TransferRow};
pub use sqlite::{
    create_pool, init_database, run_migrations, AccountRepo, LedgerRecordRepo, PaymentRepo,
    TopUpRepo, TransferRepo, TransferScope,
};
pub use sqlx::SqlitePool;
pub use unit_of_work::UnitOfWork;

/// Database facade - pool + unit of work factory
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open a connection pool without touching the schema
    pub async fn connect(config: &DatabaseConfig) -> PersistenceResult<Self> {
        let pool = create_pool(config).await?;
        Ok(Self { pool })
    }

    /// Open a connection pool and apply pending migrations
    pub async fn init(config: &DatabaseConfig) -> PersistenceResult<Self> {
        let pool = init_database(config).await?;
        Ok(Self { pool })
    }

    /// Wrap an existing pool
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get SQLite connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Start a unit of work
    pub async fn begin(&self) -> PersistenceResult<UnitOfWork> {
        UnitOfWork::begin(&self.pool).await
    }

    /// Close every pooled connection
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
