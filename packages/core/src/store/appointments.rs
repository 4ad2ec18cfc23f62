//! Confirmed bookings.
//!
//! Ids come from the `AUTOINCREMENT` column: monotonically assigned and
//! never reused, even after the highest-numbered appointment is cancelled.

use chrono::NaiveDate;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};

use crate::error::{SchedulerError, SchedulerResult};
use crate::model::{Appointment, Role};

/// Store for creating, looking up, and deleting appointments.
pub struct AppointmentStore {
    pool: SqlitePool,
}

impl AppointmentStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a booking and return its newly assigned id.
    pub async fn create(
        &self,
        patient: &str,
        caregiver: &str,
        date: NaiveDate,
        vaccine: &str,
    ) -> SchedulerResult<i64> {
        let mut conn = self.pool.acquire().await?;
        create_in(&mut conn, patient, caregiver, date, vaccine).await
    }

    /// All appointments where `username` fills the given role, ordered by id.
    pub async fn find_by_user(
        &self,
        role: Role,
        username: &str,
    ) -> SchedulerResult<Vec<Appointment>> {
        let mut conn = self.pool.acquire().await?;
        find_by_user_in(&mut conn, role, username).await
    }

    pub async fn find_by_id(&self, id: i64) -> SchedulerResult<Option<Appointment>> {
        let mut conn = self.pool.acquire().await?;
        find_by_id_in(&mut conn, id).await
    }

    /// Delete a booking. Fails with `NotFound` if the id is absent.
    pub async fn delete(&self, id: i64) -> SchedulerResult<()> {
        let mut conn = self.pool.acquire().await?;
        delete_in(&mut conn, id).await
    }

    /// Every live appointment id; used to validate caller-supplied ids.
    pub async fn list_all_ids(&self) -> SchedulerResult<Vec<i64>> {
        let mut conn = self.pool.acquire().await?;
        list_all_ids_in(&mut conn).await
    }
}

fn row_to_appointment(row: &SqliteRow) -> SchedulerResult<Appointment> {
    Ok(Appointment {
        id: row.try_get("id")?,
        patient: row.try_get("patient")?,
        caregiver: row.try_get("caregiver")?,
        date: row.try_get("date")?,
        vaccine: row.try_get("vaccine")?,
    })
}

pub async fn create_in(
    conn: &mut SqliteConnection,
    patient: &str,
    caregiver: &str,
    date: NaiveDate,
    vaccine: &str,
) -> SchedulerResult<i64> {
    let result = sqlx::query(
        "INSERT INTO appointments (patient, caregiver, date, vaccine) VALUES (?, ?, ?, ?)",
    )
    .bind(patient)
    .bind(caregiver)
    .bind(date)
    .bind(vaccine)
    .execute(&mut *conn)
    .await?;

    Ok(result.last_insert_rowid())
}

pub async fn find_by_user_in(
    conn: &mut SqliteConnection,
    role: Role,
    username: &str,
) -> SchedulerResult<Vec<Appointment>> {
    let sql = match role {
        Role::Patient => {
            "SELECT id, patient, caregiver, date, vaccine FROM appointments
             WHERE patient = ? ORDER BY id ASC"
        }
        Role::Caregiver => {
            "SELECT id, patient, caregiver, date, vaccine FROM appointments
             WHERE caregiver = ? ORDER BY id ASC"
        }
    };

    let rows = sqlx::query(sql).bind(username).fetch_all(&mut *conn).await?;
    rows.iter().map(row_to_appointment).collect()
}

pub async fn find_by_id_in(
    conn: &mut SqliteConnection,
    id: i64,
) -> SchedulerResult<Option<Appointment>> {
    let row = sqlx::query("SELECT id, patient, caregiver, date, vaccine FROM appointments WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    row.as_ref().map(row_to_appointment).transpose()
}

pub async fn delete_in(conn: &mut SqliteConnection, id: i64) -> SchedulerResult<()> {
    let result = sqlx::query("DELETE FROM appointments WHERE id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;

    if result.rows_affected() == 0 {
        return Err(SchedulerError::not_found(format!("appointment id {id}")));
    }
    Ok(())
}

pub async fn list_all_ids_in(conn: &mut SqliteConnection) -> SchedulerResult<Vec<i64>> {
    let rows = sqlx::query("SELECT id FROM appointments ORDER BY id ASC")
        .fetch_all(&mut *conn)
        .await?;

    rows.into_iter().map(|row| Ok(row.try_get("id")?)).collect()
}
