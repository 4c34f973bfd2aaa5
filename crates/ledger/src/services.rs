//! Service context
//!
//! `LedgerContext` là store handle được inject vào mọi service: pool,
//! bảng account lock, token service và config. Clone rẻ (Arc bên trong).

use crate::config::LedgerConfig;
use crate::error::{LedgerError, LedgerResult};
use crate::locks::{AccountLockSet, AccountLocks};
use paybank_auth::{IdentityVerifier, TokenService};
use paybank_core::{AccountId, Principal};
use paybank_persistence::{Database, SqlitePool, UnitOfWork};
use std::sync::Arc;

/// Context for ledger operations
#[derive(Debug, Clone)]
pub struct LedgerContext {
    db: Database,
    locks: Arc<AccountLocks>,
    tokens: Arc<TokenService>,
    config: LedgerConfig,
}

impl LedgerContext {
    pub fn new(db: Database, tokens: TokenService, config: LedgerConfig) -> Self {
        Self {
            db,
            locks: Arc::new(AccountLocks::new()),
            tokens: Arc::new(tokens),
            config,
        }
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    /// Get database pool
    pub fn pool(&self) -> &SqlitePool {
        self.db.pool()
    }

    pub fn locks(&self) -> &AccountLocks {
        &self.locks
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    pub fn verifier(&self) -> &dyn IdentityVerifier {
        self.tokens.as_ref()
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Resolve a bearer credential to the caller's principal
    pub fn authenticate(&self, credential: &str) -> LedgerResult<Principal> {
        self.verifier().verify(credential).map_err(|e| {
            tracing::debug!(error = %e, "credential rejected");
            LedgerError::from(e)
        })
    }

    /// Take the in-process locks for `ids`
    pub(crate) async fn lock(&self, ids: &[AccountId]) -> LedgerResult<AccountLockSet> {
        self.locks.acquire(ids, self.config.lock_timeout()).await
    }

    pub(crate) async fn begin(&self) -> LedgerResult<UnitOfWork> {
        self.db.begin().await.map_err(LedgerError::aborted)
    }

    /// Commit on success, roll back on failure
    pub(crate) async fn finish<T>(
        &self,
        uow: UnitOfWork,
        outcome: LedgerResult<T>,
    ) -> LedgerResult<T> {
        match outcome {
            Ok(value) => {
                uow.commit().await.map_err(LedgerError::aborted)?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = uow.rollback().await {
                    tracing::error!(error = %rollback_err, "rollback failed");
                }
                Err(err)
            }
        }
    }
}
