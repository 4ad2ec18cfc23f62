//! SQLite pool setup and schema.
//!
//! [`create_pool`] connects, enables foreign keys, and applies the schema
//! idempotently; there is no separate migration step for a four-table
//! scheduler. The pool is capped at one connection: the scheduler serves a
//! single interactive session, and a one-connection pool means every
//! coordinator transaction runs fully serialized against the database.

use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

/// Tables backing the scheduler.
///
/// - account usernames are case-insensitive unique keys within their role
/// - `availabilities` carries a composite (caregiver, date) primary key, so
///   a duplicate slot upload fails at the database even if a caller skips
///   the coordinator's pre-check
/// - `vaccines.doses` carries a `CHECK (doses >= 0)` backstop
/// - appointment ids use `AUTOINCREMENT`: ids stay monotonic and are never
///   reused, even after the highest-numbered appointment is cancelled
const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS patients (
        username TEXT PRIMARY KEY COLLATE NOCASE,
        salt     BLOB NOT NULL,
        hash     BLOB NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS caregivers (
        username TEXT PRIMARY KEY COLLATE NOCASE,
        salt     BLOB NOT NULL,
        hash     BLOB NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS vaccines (
        name  TEXT PRIMARY KEY,
        doses INTEGER NOT NULL DEFAULT 0 CHECK (doses >= 0)
    )",
    "CREATE TABLE IF NOT EXISTS availabilities (
        caregiver TEXT NOT NULL COLLATE NOCASE,
        date      TEXT NOT NULL,
        PRIMARY KEY (caregiver, date)
    )",
    "CREATE TABLE IF NOT EXISTS appointments (
        id        INTEGER PRIMARY KEY AUTOINCREMENT,
        patient   TEXT NOT NULL COLLATE NOCASE,
        caregiver TEXT NOT NULL COLLATE NOCASE,
        date      TEXT NOT NULL,
        vaccine   TEXT NOT NULL
    )",
];

/// Connect to `database_url` and apply the schema.
///
/// Use `sqlite::memory:` for tests and `sqlite://scheduler.db?mode=rwc`
/// (or similar) for a persistent database.
pub async fn create_pool(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    // The single connection must live as long as the pool: recycling it
    // would wipe an in-memory database out from under the stores.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None::<std::time::Duration>)
        .max_lifetime(None::<std::time::Duration>)
        .connect(database_url)
        .await?;

    sqlx::query("PRAGMA foreign_keys = ON").execute(&pool).await?;
    for statement in SCHEMA {
        sqlx::query(statement).execute(&pool).await?;
    }

    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_pool_applies_schema() {
        let pool = create_pool("sqlite::memory:").await.unwrap();
        for table in ["patients", "caregivers", "vaccines", "availabilities", "appointments"] {
            sqlx::query(&format!("SELECT COUNT(*) FROM {table}"))
                .fetch_one(&pool)
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn create_pool_is_idempotent_on_an_existing_schema() {
        let pool = create_pool("sqlite::memory:").await.unwrap();
        sqlx::query("INSERT INTO vaccines (name, doses) VALUES ('Pfizer', 3)")
            .execute(&pool)
            .await
            .unwrap();

        // Re-applying the DDL must not drop data.
        for statement in SCHEMA {
            sqlx::query(statement).execute(&pool).await.unwrap();
        }
        let row: (i64,) = sqlx::query_as("SELECT doses FROM vaccines WHERE name = 'Pfizer'")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(row.0, 3);
    }

    #[tokio::test]
    async fn dose_counts_cannot_go_negative_at_the_database() {
        let pool = create_pool("sqlite::memory:").await.unwrap();
        sqlx::query("INSERT INTO vaccines (name, doses) VALUES ('Moderna', 1)")
            .execute(&pool)
            .await
            .unwrap();

        let result = sqlx::query("UPDATE vaccines SET doses = doses - 2 WHERE name = 'Moderna'")
            .execute(&pool)
            .await;
        assert!(result.is_err());
    }
}
