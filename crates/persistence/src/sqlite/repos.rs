//! Repository implementations cho SQLite
//!
//! Mỗi repo là một tập hàm tĩnh nhận một `sqlx::Executor`, nên cùng một
//! hàm dùng được với `&SqlitePool` (autocommit) hoặc với connection của
//! một `UnitOfWork` đang mở.

use crate::config::DatabaseConfig;
use crate::error::{map_unique, PersistenceError, PersistenceResult};
use crate::sqlite::schema::*;
use chrono::{DateTime, Utc};
use paybank_core::{
    sort_records, Account, AccountId, LedgerRecord, PaymentRecord, Profile, TopUpRecord,
    TransferRecord,
};
use rust_decimal::Decimal;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Executor, Sqlite, SqliteConnection, SqlitePool};
use std::str::FromStr;
use std::time::Duration;

// ============================================================================
// Account Repository
// ============================================================================

/// Repository cho accounts table
pub struct AccountRepo;

impl AccountRepo {
    /// Lấy account theo ID
    pub async fn get_by_id<'e, E>(executor: E, id: AccountId) -> PersistenceResult<AccountRow>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let key = id.to_string();
        sqlx::query_as::<_, AccountRow>("SELECT * FROM accounts WHERE id = ?")
            .bind(&key)
            .fetch_optional(executor)
            .await?
            .ok_or_else(|| PersistenceError::not_found("Account", &key))
    }

    /// Lấy account theo số điện thoại (login key)
    pub async fn get_by_phone<'e, E>(executor: E, phone: &str) -> PersistenceResult<AccountRow>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, AccountRow>("SELECT * FROM accounts WHERE phone_number = ?")
            .bind(phone)
            .fetch_optional(executor)
            .await?
            .ok_or_else(|| PersistenceError::not_found("Account", phone))
    }

    /// Thêm account mới
    pub async fn insert<'e, E>(executor: E, account: &Account) -> PersistenceResult<()>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query(
            r#"
            INSERT INTO accounts (id, phone_number, first_name, last_name, address, pin_hash, balance, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(account.id.to_string())
        .bind(&account.phone_number)
        .bind(&account.profile.first_name)
        .bind(&account.profile.last_name)
        .bind(&account.profile.address)
        .bind(&account.pin_hash)
        .bind(account.balance.to_string())
        .bind(account.created_at)
        .bind(account.updated_at)
        .execute(executor)
        .await
        .map_err(|e| map_unique(e, "Account", &format!("phone {}", account.phone_number)))?;
        Ok(())
    }

    /// Cập nhật profile, không đụng tới balance
    pub async fn update_profile<'e, E>(
        executor: E,
        id: AccountId,
        profile: &Profile,
        updated_at: DateTime<Utc>,
    ) -> PersistenceResult<()>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query(
            "UPDATE accounts SET first_name = ?, last_name = ?, address = ?, updated_at = ? WHERE id = ?",
        )
        .bind(&profile.first_name)
        .bind(&profile.last_name)
        .bind(&profile.address)
        .bind(updated_at)
        .bind(id.to_string())
        .execute(executor)
        .await?;

        if result.rows_affected() == 0 {
            return Err(PersistenceError::not_found("Account", &id.to_string()));
        }
        Ok(())
    }

    /// No-op write on the row; inside a transaction it takes the write lock
    /// before anything else is read.
    pub async fn touch<'e, E>(executor: E, id: AccountId) -> PersistenceResult<()>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("UPDATE accounts SET updated_at = updated_at WHERE id = ?")
            .bind(id.to_string())
            .execute(executor)
            .await?;

        if result.rows_affected() == 0 {
            return Err(PersistenceError::not_found("Account", &id.to_string()));
        }
        Ok(())
    }

    /// Conditional balance write. Returns the number of rows changed (0 or 1).
    pub async fn update_balance<'e, E>(
        executor: E,
        id: AccountId,
        new_balance: Decimal,
        prior_balance: &str,
        updated_at: DateTime<Utc>,
    ) -> PersistenceResult<u64>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query(
            "UPDATE accounts SET balance = ?, updated_at = ? WHERE id = ? AND balance = ?",
        )
        .bind(new_balance.to_string())
        .bind(updated_at)
        .bind(id.to_string())
        .bind(prior_balance)
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }

    /// Đếm accounts
    pub async fn count<'e, E>(executor: E) -> PersistenceResult<i64>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM accounts")
            .fetch_one(executor)
            .await?;
        Ok(row.0)
    }
}

// ============================================================================
// TopUp Repository
// ============================================================================

/// Repository cho top_ups table
pub struct TopUpRepo;

impl TopUpRepo {
    pub async fn insert<'e, E>(executor: E, row: &TopUpRow) -> PersistenceResult<()>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query(
            r#"
            INSERT INTO top_ups (id, account_id, amount, balance_before, balance_after, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&row.id)
        .bind(&row.account_id)
        .bind(&row.amount)
        .bind(&row.balance_before)
        .bind(&row.balance_after)
        .bind(row.created_at)
        .execute(executor)
        .await?;
        Ok(())
    }

    pub async fn get_by_account<'e, E>(
        executor: E,
        account_id: AccountId,
    ) -> PersistenceResult<Vec<TopUpRow>>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let rows = sqlx::query_as::<_, TopUpRow>(
            "SELECT * FROM top_ups WHERE account_id = ? ORDER BY created_at, id",
        )
        .bind(account_id.to_string())
        .fetch_all(executor)
        .await?;
        Ok(rows)
    }
}

// ============================================================================
// Payment Repository
// ============================================================================

/// Repository cho payments table
pub struct PaymentRepo;

impl PaymentRepo {
    pub async fn insert<'e, E>(executor: E, row: &PaymentRow) -> PersistenceResult<()>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query(
            r#"
            INSERT INTO payments (id, account_id, amount, remarks, balance_before, balance_after, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&row.id)
        .bind(&row.account_id)
        .bind(&row.amount)
        .bind(&row.remarks)
        .bind(&row.balance_before)
        .bind(&row.balance_after)
        .bind(row.created_at)
        .execute(executor)
        .await?;
        Ok(())
    }

    pub async fn get_by_account<'e, E>(
        executor: E,
        account_id: AccountId,
    ) -> PersistenceResult<Vec<PaymentRow>>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let rows = sqlx::query_as::<_, PaymentRow>(
            "SELECT * FROM payments WHERE account_id = ? ORDER BY created_at, id",
        )
        .bind(account_id.to_string())
        .fetch_all(executor)
        .await?;
        Ok(rows)
    }
}

// ============================================================================
// Transfer Repository
// ============================================================================

/// Repository cho transfers table
pub struct TransferRepo;

impl TransferRepo {
    pub async fn insert<'e, E>(executor: E, row: &TransferRow) -> PersistenceResult<()>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query(
            r#"
            INSERT INTO transfers (id, from_account_id, to_account_id, amount, remarks,
                                   balance_before, balance_after, to_balance_before, to_balance_after, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&row.id)
        .bind(&row.from_account_id)
        .bind(&row.to_account_id)
        .bind(&row.amount)
        .bind(&row.remarks)
        .bind(&row.balance_before)
        .bind(&row.balance_after)
        .bind(&row.to_balance_before)
        .bind(&row.to_balance_after)
        .bind(row.created_at)
        .execute(executor)
        .await?;
        Ok(())
    }

    /// Transfers where the account is the source
    pub async fn get_sent_by<'e, E>(
        executor: E,
        account_id: AccountId,
    ) -> PersistenceResult<Vec<TransferRow>>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let rows = sqlx::query_as::<_, TransferRow>(
            "SELECT * FROM transfers WHERE from_account_id = ? ORDER BY created_at, id",
        )
        .bind(account_id.to_string())
        .fetch_all(executor)
        .await?;
        Ok(rows)
    }

    /// Transfers where the account is the destination
    pub async fn get_received_by<'e, E>(
        executor: E,
        account_id: AccountId,
    ) -> PersistenceResult<Vec<TransferRow>>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let rows = sqlx::query_as::<_, TransferRow>(
            "SELECT * FROM transfers WHERE to_account_id = ? ORDER BY created_at, id",
        )
        .bind(account_id.to_string())
        .fetch_all(executor)
        .await?;
        Ok(rows)
    }

    /// Đếm transfers
    pub async fn count<'e, E>(executor: E) -> PersistenceResult<i64>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM transfers")
            .fetch_one(executor)
            .await?;
        Ok(row.0)
    }
}

// ============================================================================
// Ledger Record Repository
// ============================================================================

/// Which transfers count as part of an account's records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferScope {
    /// Only transfers the account sent
    Sent,
    /// Sent and received transfers
    SentAndReceived,
}

/// Read-side union of the three record tables.
///
/// Mọi lần đọc của một lời gọi chạy trong một read transaction, nên dưới WAL
/// chúng thấy cùng một snapshot: không có record nào commit xen giữa các query.
pub struct LedgerRecordRepo;

impl LedgerRecordRepo {
    /// Every record affecting `account_id`, in ledger order
    pub async fn for_account(
        pool: &SqlitePool,
        account_id: AccountId,
        scope: TransferScope,
    ) -> PersistenceResult<Vec<LedgerRecord>> {
        let mut tx = pool.begin().await?;
        let records = Self::read_records(&mut tx, account_id, scope).await?;
        tx.commit().await?;
        Ok(records)
    }

    /// Account row plus its records, both from one snapshot
    pub async fn account_with_records(
        pool: &SqlitePool,
        account_id: AccountId,
        scope: TransferScope,
    ) -> PersistenceResult<(AccountRow, Vec<LedgerRecord>)> {
        let mut tx = pool.begin().await?;
        let account = AccountRepo::get_by_id(&mut *tx, account_id).await?;
        let records = Self::read_records(&mut tx, account_id, scope).await?;
        tx.commit().await?;
        Ok((account, records))
    }

    async fn read_records(
        conn: &mut SqliteConnection,
        account_id: AccountId,
        scope: TransferScope,
    ) -> PersistenceResult<Vec<LedgerRecord>> {
        let mut records: Vec<LedgerRecord> = Vec::new();

        for row in TopUpRepo::get_by_account(&mut *conn, account_id).await? {
            records.push(TopUpRecord::try_from(row)?.into());
        }
        for row in PaymentRepo::get_by_account(&mut *conn, account_id).await? {
            records.push(PaymentRecord::try_from(row)?.into());
        }
        for row in TransferRepo::get_sent_by(&mut *conn, account_id).await? {
            records.push(TransferRecord::try_from(row)?.into());
        }
        if scope == TransferScope::SentAndReceived {
            for row in TransferRepo::get_received_by(&mut *conn, account_id).await? {
                records.push(TransferRecord::try_from(row)?.into());
            }
        }

        sort_records(&mut records);
        Ok(records)
    }
}

// ============================================================================
// Database initialization
// ============================================================================

/// Khởi tạo database connection pool
pub async fn create_pool(config: &DatabaseConfig) -> PersistenceResult<SqlitePool> {
    let options = SqliteConnectOptions::from_str(&config.url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .foreign_keys(true)
        .busy_timeout(Duration::from_millis(config.busy_timeout_ms));

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(options)
        .await?;
    Ok(pool)
}

/// Chạy migrations
pub async fn run_migrations(pool: &SqlitePool) -> PersistenceResult<()> {
    sqlx::migrate!("../../migrations").run(pool).await?;
    Ok(())
}

/// Tạo database mới với schema
pub async fn init_database(config: &DatabaseConfig) -> PersistenceResult<SqlitePool> {
    let pool = create_pool(config).await?;
    run_migrations(&pool).await?;
    tracing::debug!(url = %config.url, "database migrated");
    Ok(pool)
}
