//! SQLite persistence module
//!
//! Repository pattern cho SQLite database access.

pub mod repos;
pub mod schema;

pub use repos::{
    create_pool, init_database, run_migrations, AccountRepo, LedgerRecordRepo, PaymentRepo,
    TopUpRepo, TransferRepo, TransferScope,
};
pub use schema::{AccountRow, PaymentRow, TopUpRow, TransferRow};
