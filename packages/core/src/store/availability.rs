//! Caregiver availability: the set of (caregiver, date) pairs open for
//! booking.
//!
//! The composite primary key on `availabilities` means `add` fails at the
//! database on a duplicate pair, and `remove` deletes exactly one row or
//! reports `NotFound`. It is deliberately not idempotent, so a double
//! consume of the same slot surfaces as an error instead of silently
//! succeeding.

use chrono::NaiveDate;
use sqlx::{Row, SqliteConnection, SqlitePool};

use crate::error::{SchedulerError, SchedulerResult};
use crate::model::AvailabilitySlot;

/// Store for reading and writing availability slots.
pub struct AvailabilityStore {
    pool: SqlitePool,
}

impl AvailabilityStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open slots on `date`, ordered by caregiver name for stable display.
    pub async fn list_by_date(&self, date: NaiveDate) -> SchedulerResult<Vec<AvailabilitySlot>> {
        let mut conn = self.pool.acquire().await?;
        list_by_date_in(&mut conn, date).await
    }

    /// Open a slot. Fails with `DuplicateSlot` if the pair already exists.
    pub async fn add(&self, caregiver: &str, date: NaiveDate) -> SchedulerResult<()> {
        let mut conn = self.pool.acquire().await?;
        add_in(&mut conn, caregiver, date).await
    }

    /// Consume a slot. Fails with `NotFound` if the pair does not exist.
    pub async fn remove(&self, caregiver: &str, date: NaiveDate) -> SchedulerResult<()> {
        let mut conn = self.pool.acquire().await?;
        remove_in(&mut conn, caregiver, date).await
    }
}

pub async fn list_by_date_in(
    conn: &mut SqliteConnection,
    date: NaiveDate,
) -> SchedulerResult<Vec<AvailabilitySlot>> {
    let rows = sqlx::query(
        "SELECT caregiver, date FROM availabilities WHERE date = ? ORDER BY caregiver ASC",
    )
    .bind(date)
    .fetch_all(&mut *conn)
    .await?;

    rows.into_iter()
        .map(|row| {
            Ok(AvailabilitySlot {
                caregiver: row.try_get("caregiver")?,
                date: row.try_get("date")?,
            })
        })
        .collect()
}

pub async fn add_in(
    conn: &mut SqliteConnection,
    caregiver: &str,
    date: NaiveDate,
) -> SchedulerResult<()> {
    let result = sqlx::query("INSERT INTO availabilities (caregiver, date) VALUES (?, ?)")
        .bind(caregiver)
        .bind(date)
        .execute(&mut *conn)
        .await;

    match result {
        Ok(_) => Ok(()),
        Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
            Err(SchedulerError::DuplicateSlot {
                caregiver: caregiver.to_string(),
                date,
            })
        }
        Err(err) => Err(err.into()),
    }
}

pub async fn remove_in(
    conn: &mut SqliteConnection,
    caregiver: &str,
    date: NaiveDate,
) -> SchedulerResult<()> {
    let result = sqlx::query("DELETE FROM availabilities WHERE caregiver = ? AND date = ?")
        .bind(caregiver)
        .bind(date)
        .execute(&mut *conn)
        .await?;

    if result.rows_affected() == 0 {
        return Err(SchedulerError::not_found(format!(
            "no open slot for {caregiver} on {date}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_pool;

    async fn make_store() -> AvailabilityStore {
        let pool = create_pool("sqlite::memory:").await.unwrap();
        AvailabilityStore::new(pool)
    }

    fn date(raw: &str) -> NaiveDate {
        raw.parse().unwrap()
    }

    #[tokio::test]
    async fn add_and_list_roundtrip() {
        let store = make_store().await;
        store.add("c1", date("2024-06-01")).await.unwrap();

        let slots = store.list_by_date(date("2024-06-01")).await.unwrap();
        assert_eq!(slots.len(), 1);
        assert_eq!(slots[0].caregiver, "c1");
        assert_eq!(slots[0].date, date("2024-06-01"));
    }

    #[tokio::test]
    async fn list_is_ordered_by_caregiver_name() {
        let store = make_store().await;
        store.add("zoe", date("2024-06-01")).await.unwrap();
        store.add("amy", date("2024-06-01")).await.unwrap();
        store.add("mia", date("2024-06-01")).await.unwrap();

        let names: Vec<String> = store
            .list_by_date(date("2024-06-01"))
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.caregiver)
            .collect();
        assert_eq!(names, ["amy", "mia", "zoe"]);
    }

    #[tokio::test]
    async fn list_only_returns_the_requested_date() {
        let store = make_store().await;
        store.add("c1", date("2024-06-01")).await.unwrap();
        store.add("c1", date("2024-06-02")).await.unwrap();

        let slots = store.list_by_date(date("2024-06-01")).await.unwrap();
        assert_eq!(slots.len(), 1);
    }

    #[tokio::test]
    async fn duplicate_slot_fails() {
        let store = make_store().await;
        store.add("c1", date("2024-06-01")).await.unwrap();

        let err = store.add("c1", date("2024-06-01")).await.unwrap_err();
        assert!(matches!(err, SchedulerError::DuplicateSlot { .. }));
    }

    #[tokio::test]
    async fn duplicate_slot_check_ignores_username_case() {
        let store = make_store().await;
        store.add("Carol", date("2024-06-01")).await.unwrap();

        let err = store.add("carol", date("2024-06-01")).await.unwrap_err();
        assert!(matches!(err, SchedulerError::DuplicateSlot { .. }));
    }

    #[tokio::test]
    async fn remove_deletes_exactly_that_row() {
        let store = make_store().await;
        store.add("c1", date("2024-06-01")).await.unwrap();
        store.add("c2", date("2024-06-01")).await.unwrap();

        store.remove("c1", date("2024-06-01")).await.unwrap();

        let slots = store.list_by_date(date("2024-06-01")).await.unwrap();
        assert_eq!(slots.len(), 1);
        assert_eq!(slots[0].caregiver, "c2");
    }

    #[tokio::test]
    async fn remove_missing_slot_fails() {
        let store = make_store().await;
        let err = store.remove("c1", date("2024-06-01")).await.unwrap_err();
        assert!(matches!(err, SchedulerError::NotFound { .. }));
    }

    #[tokio::test]
    async fn remove_is_not_idempotent() {
        let store = make_store().await;
        store.add("c1", date("2024-06-01")).await.unwrap();

        store.remove("c1", date("2024-06-01")).await.unwrap();
        let err = store.remove("c1", date("2024-06-01")).await.unwrap_err();
        assert!(matches!(err, SchedulerError::NotFound { .. }));
    }
}
