//! Unit of work - one SQLite transaction spanning balance writes and record inserts.
//!
//! Rules enforced here:
//! - a balance may only be written after `lock_account` on that row
//! - `lock_account` must be the first statement touching the row, so the
//!   write lock is held before the balance is read
//! - nothing is visible to other readers until `commit`

use crate::error::{PersistenceError, PersistenceResult};
use crate::sqlite::schema::{parse_decimal, PaymentRow, TopUpRow, TransferRow};
use crate::sqlite::{AccountRepo, PaymentRepo, TopUpRepo, TransferRepo};
use chrono::Utc;
use paybank_core::{Account, AccountId, PaymentRecord, Profile, TopUpRecord, TransferRecord};
use rust_decimal::Decimal;
use sqlx::{Sqlite, SqlitePool, Transaction};

/// Transactional scope over the account store
pub struct UnitOfWork {
    tx: Transaction<'static, Sqlite>,
    locked: Vec<AccountId>,
}

impl UnitOfWork {
    /// Begin a new transaction
    pub async fn begin(pool: &SqlitePool) -> PersistenceResult<Self> {
        let tx = pool.begin().await?;
        Ok(Self {
            tx,
            locked: Vec::new(),
        })
    }

    /// Take the row's write lock and return its current state
    pub async fn lock_account(&mut self, id: AccountId) -> PersistenceResult<Account> {
        if !self.locked.contains(&id) {
            AccountRepo::touch(&mut *self.tx, id).await?;
            self.locked.push(id);
        }
        self.get_account(id).await
    }

    /// Read an account inside this transaction
    pub async fn get_account(&mut self, id: AccountId) -> PersistenceResult<Account> {
        let row = AccountRepo::get_by_id(&mut *self.tx, id).await?;
        Account::try_from(row)
    }

    /// Apply a signed delta to a locked account's balance.
    ///
    /// With `expected_prior`, the write only happens if the stored balance
    /// still equals it. Returns the new balance.
    pub async fn apply_delta(
        &mut self,
        id: AccountId,
        delta: Decimal,
        expected_prior: Option<Decimal>,
    ) -> PersistenceResult<Decimal> {
        if !self.locked.contains(&id) {
            return Err(PersistenceError::UnlockedWrite(id));
        }

        let row = AccountRepo::get_by_id(&mut *self.tx, id).await?;
        let current = parse_decimal(&row.balance)?;

        if let Some(expected) = expected_prior {
            if expected != current {
                return Err(PersistenceError::BalanceConflict {
                    account_id: id,
                    expected,
                    actual: current,
                });
            }
        }

        let new_balance = current + delta;
        if new_balance < Decimal::ZERO {
            return Err(PersistenceError::NegativeBalance {
                account_id: id,
                balance: new_balance,
            });
        }

        let changed =
            AccountRepo::update_balance(&mut *self.tx, id, new_balance, &row.balance, Utc::now())
                .await?;
        if changed == 0 {
            let actual = AccountRepo::get_by_id(&mut *self.tx, id).await?;
            return Err(PersistenceError::BalanceConflict {
                account_id: id,
                expected: current,
                actual: parse_decimal(&actual.balance)?,
            });
        }

        Ok(new_balance)
    }

    /// Overwrite profile fields of an account
    pub async fn update_profile(
        &mut self,
        id: AccountId,
        profile: &Profile,
    ) -> PersistenceResult<Account> {
        AccountRepo::update_profile(&mut *self.tx, id, profile, Utc::now()).await?;
        self.get_account(id).await
    }

    pub async fn insert_top_up(&mut self, record: &TopUpRecord) -> PersistenceResult<()> {
        TopUpRepo::insert(&mut *self.tx, &TopUpRow::from(record)).await
    }

    pub async fn insert_payment(&mut self, record: &PaymentRecord) -> PersistenceResult<()> {
        PaymentRepo::insert(&mut *self.tx, &PaymentRow::from(record)).await
    }

    pub async fn insert_transfer(&mut self, record: &TransferRecord) -> PersistenceResult<()> {
        TransferRepo::insert(&mut *self.tx, &TransferRow::from(record)).await
    }

    /// Make every write of this unit visible atomically
    pub async fn commit(self) -> PersistenceResult<()> {
        self.tx.commit().await?;
        Ok(())
    }

    /// Discard every write of this unit
    pub async fn rollback(self) -> PersistenceResult<()> {
        self.tx.rollback().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatabaseConfig;
    use crate::sqlite::init_database;
    use paybank_core::Amount;
    use rust_decimal_macros::dec;
    use tempfile::TempDir;

    async fn setup() -> (TempDir, SqlitePool, Account) {
        let dir = TempDir::new().unwrap();
        let pool = init_database(&DatabaseConfig::for_path(dir.path().join("uow.db")))
            .await
            .unwrap();
        let account = Account::new("0800000001", Profile::default(), "h".to_string());
        AccountRepo::insert(&pool, &account).await.unwrap();
        (dir, pool, account)
    }

    async fn stored_balance(pool: &SqlitePool, id: AccountId) -> Decimal {
        let row = AccountRepo::get_by_id(pool, id).await.unwrap();
        parse_decimal(&row.balance).unwrap()
    }

    #[tokio::test]
    async fn test_commit_makes_writes_visible() {
        let (_dir, pool, account) = setup().await;

        let mut uow = UnitOfWork::begin(&pool).await.unwrap();
        let locked = uow.lock_account(account.id).await.unwrap();
        let new_balance = uow
            .apply_delta(account.id, dec!(100), Some(locked.balance))
            .await
            .unwrap();
        let record = TopUpRecord::new(account.id, Amount::new(dec!(100)).unwrap(), locked.balance);
        uow.insert_top_up(&record).await.unwrap();
        uow.commit().await.unwrap();

        assert_eq!(new_balance, dec!(100));
        assert_eq!(stored_balance(&pool, account.id).await, dec!(100));
        assert_eq!(
            TopUpRepo::get_by_account(&pool, account.id).await.unwrap().len(),
            1
        );
    }

    #[tokio::test]
    async fn test_rollback_discards_writes() {
        let (_dir, pool, account) = setup().await;

        let mut uow = UnitOfWork::begin(&pool).await.unwrap();
        uow.lock_account(account.id).await.unwrap();
        uow.apply_delta(account.id, dec!(50), None).await.unwrap();
        uow.rollback().await.unwrap();

        assert_eq!(stored_balance(&pool, account.id).await, dec!(0));
    }

    #[tokio::test]
    async fn test_write_requires_lock() {
        let (_dir, pool, account) = setup().await;

        let mut uow = UnitOfWork::begin(&pool).await.unwrap();
        let err = uow.apply_delta(account.id, dec!(1), None).await.unwrap_err();
        assert!(matches!(err, PersistenceError::UnlockedWrite(id) if id == account.id));
    }

    #[tokio::test]
    async fn test_expected_prior_mismatch_is_conflict() {
        let (_dir, pool, account) = setup().await;

        let mut uow = UnitOfWork::begin(&pool).await.unwrap();
        uow.lock_account(account.id).await.unwrap();
        let err = uow
            .apply_delta(account.id, dec!(10), Some(dec!(5)))
            .await
            .unwrap_err();
        assert!(matches!(err, PersistenceError::BalanceConflict { .. }));
    }

    #[tokio::test]
    async fn test_negative_balance_refused() {
        let (_dir, pool, account) = setup().await;

        let mut uow = UnitOfWork::begin(&pool).await.unwrap();
        uow.lock_account(account.id).await.unwrap();
        let err = uow.apply_delta(account.id, dec!(-1), None).await.unwrap_err();
        assert!(matches!(err, PersistenceError::NegativeBalance { .. }));
    }

    #[tokio::test]
    async fn test_lock_missing_account() {
        let (_dir, pool, _account) = setup().await;

        let mut uow = UnitOfWork::begin(&pool).await.unwrap();
        let err = uow.lock_account(uuid::Uuid::new_v4()).await.unwrap_err();
        assert!(err.is_not_found());
    }
}
