//! Patient and caregiver accounts.
//!
//! The two roles are disjoint namespaces backed by separate tables, each
//! with a case-insensitive unique username key (`COLLATE NOCASE`). Accounts
//! are created at registration and never deleted.

use sqlx::{Row, SqliteConnection, SqlitePool};

use crate::error::{SchedulerError, SchedulerResult};
use crate::model::{Account, Role};

/// Store for account rows in both role tables.
pub struct AccountStore {
    pool: SqlitePool,
}

impl AccountStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new account. Fails with `DuplicateName` when the username is
    /// already taken within the role, ignoring case.
    pub async fn create(
        &self,
        role: Role,
        username: &str,
        salt: &[u8],
        hash: &[u8],
    ) -> SchedulerResult<()> {
        let mut conn = self.pool.acquire().await?;
        create_in(&mut conn, role, username, salt, hash).await
    }

    /// Look up an account by username, ignoring case.
    pub async fn find(&self, role: Role, username: &str) -> SchedulerResult<Option<Account>> {
        let mut conn = self.pool.acquire().await?;
        find_in(&mut conn, role, username).await
    }
}

pub async fn create_in(
    conn: &mut SqliteConnection,
    role: Role,
    username: &str,
    salt: &[u8],
    hash: &[u8],
) -> SchedulerResult<()> {
    let sql = format!(
        "INSERT INTO {} (username, salt, hash) VALUES (?, ?, ?)",
        role.account_table()
    );

    let result = sqlx::query(&sql)
        .bind(username)
        .bind(salt)
        .bind(hash)
        .execute(&mut *conn)
        .await;

    match result {
        Ok(_) => Ok(()),
        Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
            Err(SchedulerError::duplicate_name(username))
        }
        Err(err) => Err(err.into()),
    }
}

pub async fn find_in(
    conn: &mut SqliteConnection,
    role: Role,
    username: &str,
) -> SchedulerResult<Option<Account>> {
    let sql = format!(
        "SELECT username, salt, hash FROM {} WHERE username = ?",
        role.account_table()
    );

    let row = sqlx::query(&sql)
        .bind(username)
        .fetch_optional(&mut *conn)
        .await?;

    match row {
        Some(row) => Ok(Some(Account {
            username: row.try_get("username")?,
            salt: row.try_get("salt")?,
            hash: row.try_get("hash")?,
        })),
        None => Ok(None),
    }
}
