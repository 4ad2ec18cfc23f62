//! Vaccine inventory: persistent dose counters per vaccine name.
//!
//! Increase and decrease are single guarded UPDATE statements, so the
//! read-modify-write on a counter is atomic with respect to other mutations
//! of the same vaccine: two callers racing for the last dose cannot both
//! win.

use sqlx::{Row, SqliteConnection, SqlitePool};

use crate::error::{SchedulerError, SchedulerResult};
use crate::model::Vaccine;

/// Store for reading and writing vaccine dose counts.
pub struct InventoryStore {
    pool: SqlitePool,
}

impl InventoryStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// All vaccines with their remaining doses, ordered by name.
    pub async fn list_all(&self) -> SchedulerResult<Vec<Vaccine>> {
        let mut conn = self.pool.acquire().await?;
        list_all_in(&mut conn).await
    }

    pub async fn find_by_name(&self, name: &str) -> SchedulerResult<Option<Vaccine>> {
        let mut conn = self.pool.acquire().await?;
        find_by_name_in(&mut conn, name).await
    }

    /// Register a new vaccine. Fails with `DuplicateName` if it exists.
    pub async fn create(&self, name: &str, initial_doses: i64) -> SchedulerResult<()> {
        let mut conn = self.pool.acquire().await?;
        create_in(&mut conn, name, initial_doses).await
    }

    /// Add `amount` doses. `amount` must be positive.
    pub async fn increase(&self, name: &str, amount: i64) -> SchedulerResult<()> {
        let mut conn = self.pool.acquire().await?;
        increase_in(&mut conn, name, amount).await
    }

    /// Remove `amount` doses. Fails with `InsufficientStock` rather than
    /// letting the counter go negative.
    pub async fn decrease(&self, name: &str, amount: i64) -> SchedulerResult<()> {
        let mut conn = self.pool.acquire().await?;
        decrease_in(&mut conn, name, amount).await
    }
}

pub async fn list_all_in(conn: &mut SqliteConnection) -> SchedulerResult<Vec<Vaccine>> {
    let rows = sqlx::query("SELECT name, doses FROM vaccines ORDER BY name ASC")
        .fetch_all(&mut *conn)
        .await?;

    rows.into_iter()
        .map(|row| {
            Ok(Vaccine {
                name: row.try_get("name")?,
                doses: row.try_get("doses")?,
            })
        })
        .collect()
}

pub async fn find_by_name_in(
    conn: &mut SqliteConnection,
    name: &str,
) -> SchedulerResult<Option<Vaccine>> {
    let row = sqlx::query("SELECT name, doses FROM vaccines WHERE name = ?")
        .bind(name)
        .fetch_optional(&mut *conn)
        .await?;

    match row {
        Some(row) => Ok(Some(Vaccine {
            name: row.try_get("name")?,
            doses: row.try_get("doses")?,
        })),
        None => Ok(None),
    }
}

pub async fn create_in(
    conn: &mut SqliteConnection,
    name: &str,
    initial_doses: i64,
) -> SchedulerResult<()> {
    if initial_doses < 0 {
        return Err(SchedulerError::invalid_argument(
            "initial dose count cannot be negative",
        ));
    }

    let result = sqlx::query("INSERT INTO vaccines (name, doses) VALUES (?, ?)")
        .bind(name)
        .bind(initial_doses)
        .execute(&mut *conn)
        .await;

    match result {
        Ok(_) => Ok(()),
        Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
            Err(SchedulerError::duplicate_name(name))
        }
        Err(err) => Err(err.into()),
    }
}

pub async fn increase_in(
    conn: &mut SqliteConnection,
    name: &str,
    amount: i64,
) -> SchedulerResult<()> {
    if amount <= 0 {
        return Err(SchedulerError::invalid_argument(
            "dose amount must be a positive number",
        ));
    }

    let result = sqlx::query("UPDATE vaccines SET doses = doses + ? WHERE name = ?")
        .bind(amount)
        .bind(name)
        .execute(&mut *conn)
        .await?;

    if result.rows_affected() == 0 {
        return Err(SchedulerError::unknown_vaccine(name));
    }
    Ok(())
}

pub async fn decrease_in(
    conn: &mut SqliteConnection,
    name: &str,
    amount: i64,
) -> SchedulerResult<()> {
    if amount <= 0 {
        return Err(SchedulerError::invalid_argument(
            "dose amount must be a positive number",
        ));
    }

    // The `doses >= ?` guard makes check-and-decrement one atomic statement.
    let result = sqlx::query("UPDATE vaccines SET doses = doses - ? WHERE name = ? AND doses >= ?")
        .bind(amount)
        .bind(name)
        .bind(amount)
        .execute(&mut *conn)
        .await?;

    if result.rows_affected() == 0 {
        return match find_by_name_in(conn, name).await? {
            None => Err(SchedulerError::unknown_vaccine(name)),
            Some(_) => Err(SchedulerError::insufficient_stock(name)),
        };
    }
    Ok(())
}
