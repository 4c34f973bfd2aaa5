//! # Paybank Ledger
//!
//! Ledger engine - mọi thay đổi balance đi qua đây.
//!
//! - `AccountService`: register, login, refresh, profile, balance lookup
//! - `WalletService`: top-up, payment
//! - `TransferService`: two-account transfer
//! - `HistoryService`: transaction history view
//! - `AuditService`: chain invariant check

pub mod account;
pub mod audit;
pub mod config;
pub mod error;
pub mod history;
pub mod locks;
pub mod services;
pub mod transfer;
pub mod wallet;

pub use account::{AccountService, Session};
pub use audit::{AuditReport, AuditService, LedgerStats};
pub use config::LedgerConfig;
pub use error::{LedgerError, LedgerResult, NotFoundTarget, LOGIN_FAILED};
pub use history::HistoryService;
pub use locks::{AccountLockSet, AccountLocks};
pub use services::LedgerContext;
pub use transfer::TransferService;
pub use wallet::WalletService;
