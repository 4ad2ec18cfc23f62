//! Reservation coordinator: the transaction logic across the inventory,
//! availability, and appointment stores.
//!
//! Every mutating operation runs as one SQLite transaction. `reserve` and
//! `cancel` touch three stores and must land together or not at all: an
//! error anywhere before `commit` drops the transaction and rolls every
//! write back, so a failed booking can never leave a dose decremented
//! without its appointment or a consumed slot without its booking.

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::credentials;
use crate::error::{SchedulerError, SchedulerResult};
use crate::model::{self, Appointment, Reservation, Role, ScheduleView};
use crate::selector::{CaregiverSelector, UniformSelector};
use crate::session::Session;
use crate::store::{self, AccountStore, AppointmentStore, AvailabilityStore, InventoryStore};

/// Orchestrates registration, login, and the booking state machine.
pub struct Coordinator {
    pool: SqlitePool,
    accounts: AccountStore,
    inventory: InventoryStore,
    availability: AvailabilityStore,
    appointments: AppointmentStore,
    selector: Arc<dyn CaregiverSelector>,
}

impl Coordinator {
    /// Coordinator with uniform random caregiver assignment.
    pub fn new(pool: SqlitePool) -> Self {
        Self::with_selector(pool, Arc::new(UniformSelector))
    }

    /// Coordinator with an injected caregiver selector (seeded runs, tests).
    pub fn with_selector(pool: SqlitePool, selector: Arc<dyn CaregiverSelector>) -> Self {
        Self {
            accounts: AccountStore::new(pool.clone()),
            inventory: InventoryStore::new(pool.clone()),
            availability: AvailabilityStore::new(pool.clone()),
            appointments: AppointmentStore::new(pool.clone()),
            pool,
            selector,
        }
    }

    /// Create an account and log straight into it.
    ///
    /// Requires the logged-out state, a strong enough password, and a
    /// username that is free within the role, ignoring case.
    pub async fn register(
        &self,
        session: &Session,
        role: Role,
        username: &str,
        password: &str,
    ) -> SchedulerResult<Session> {
        session.require_logged_out("creating a new account")?;
        credentials::check_strength(password)?;

        if self.accounts.find(role, username).await?.is_some() {
            return Err(SchedulerError::duplicate_name(username));
        }

        let salt = credentials::generate_salt();
        let hash = credentials::hash_password(password, &salt);
        // A racing registration still fails cleanly here on the unique key.
        self.accounts.create(role, username, &salt, &hash).await?;

        tracing::info!(role = role.as_str(), username, "account created");
        Ok(Session::logged_in(role, username))
    }

    /// Verify credentials and return the logged-in session.
    pub async fn login(
        &self,
        session: &Session,
        role: Role,
        username: &str,
        password: &str,
    ) -> SchedulerResult<Session> {
        session.require_logged_out("logging in")?;

        let account = self.accounts.find(role, username).await?;
        match account {
            Some(account)
                if credentials::verify_password(password, &account.salt, &account.hash) =>
            {
                tracing::info!(role = role.as_str(), username = %account.username, "login");
                Ok(Session::logged_in(role, &account.username))
            }
            // Same message whether the username or the password was wrong.
            _ => Err(SchedulerError::not_found(
                "no matching account, please check your username and password",
            )),
        }
    }

    /// The day's open slots plus the full vaccine inventory listing.
    pub async fn search_schedule(
        &self,
        session: &Session,
        date_raw: &str,
    ) -> SchedulerResult<ScheduleView> {
        session.require_logged_in()?;
        let date = model::parse_date(date_raw)?;

        let slots = self.availability.list_by_date(date).await?;
        let vaccines = self.inventory.list_all().await?;
        Ok(ScheduleView { date, slots, vaccines })
    }

    /// Open a (caregiver, date) slot for the logged-in caregiver.
    ///
    /// Rejected when the slot already exists, and also when the caregiver
    /// already holds an appointment that day: a booked date and an open
    /// date are two representations of the same calendar slot, and a
    /// caregiver can occupy at most one of them.
    pub async fn upload_availability(
        &self,
        session: &Session,
        date_raw: &str,
    ) -> SchedulerResult<()> {
        let caregiver = session.require_caregiver()?;
        let date = model::parse_date(date_raw)?;

        let mut tx = self.pool.begin().await?;

        let slots = store::availability::list_by_date_in(&mut *tx, date).await?;
        if slots.iter().any(|s| s.caregiver.eq_ignore_ascii_case(caregiver)) {
            return Err(SchedulerError::DuplicateSlot {
                caregiver: caregiver.to_string(),
                date,
            });
        }

        let booked =
            store::appointments::find_by_user_in(&mut *tx, Role::Caregiver, caregiver).await?;
        if booked.iter().any(|a| a.date == date) {
            return Err(SchedulerError::DuplicateSlot {
                caregiver: caregiver.to_string(),
                date,
            });
        }

        store::availability::add_in(&mut *tx, caregiver, date).await?;
        tx.commit().await?;

        tracing::info!(caregiver, %date, "availability uploaded");
        Ok(())
    }

    /// Book an appointment for the logged-in patient.
    ///
    /// Gates, in order: an existing appointment (`AlreadyBooked`), a
    /// malformed date (`InvalidDate`), an empty day (`NoAvailability`), an
    /// unknown vaccine (`UnknownVaccine`), an empty counter (`OutOfStock`).
    /// The first failing gate aborts with nothing written. On success the
    /// dose decrement, slot removal, and appointment insert commit as one
    /// transaction, and the caregiver is drawn uniformly from the day's
    /// open slots.
    pub async fn reserve(
        &self,
        session: &Session,
        date_raw: &str,
        vaccine_name: &str,
    ) -> SchedulerResult<Reservation> {
        let patient = session.require_patient()?;

        let mut tx = self.pool.begin().await?;

        let existing =
            store::appointments::find_by_user_in(&mut *tx, Role::Patient, patient).await?;
        if !existing.is_empty() {
            return Err(SchedulerError::AlreadyBooked);
        }

        let date = model::parse_date(date_raw)?;

        let slots = store::availability::list_by_date_in(&mut *tx, date).await?;
        if slots.is_empty() {
            return Err(SchedulerError::NoAvailability { date });
        }

        let vaccine = store::inventory::find_by_name_in(&mut *tx, vaccine_name)
            .await?
            .ok_or_else(|| SchedulerError::unknown_vaccine(vaccine_name))?;
        if vaccine.doses == 0 {
            return Err(SchedulerError::out_of_stock(vaccine_name));
        }

        let caregiver = slots[self.selector.pick(slots.len())].caregiver.clone();

        store::inventory::decrease_in(&mut *tx, &vaccine.name, 1).await?;
        store::availability::remove_in(&mut *tx, &caregiver, date).await?;
        let id =
            store::appointments::create_in(&mut *tx, patient, &caregiver, date, &vaccine.name)
                .await?;

        tx.commit().await?;

        tracing::info!(patient, caregiver = %caregiver, %date, vaccine = %vaccine.name, id, "reservation committed");
        Ok(Reservation { id, caregiver })
    }

    /// Cancel an appointment owned by the logged-in user.
    ///
    /// The appointment is deleted, the caregiver's slot restored, and one
    /// dose returned to the vaccine counter, all as one transaction.
    pub async fn cancel(&self, session: &Session, id: i64) -> SchedulerResult<Appointment> {
        let (role, username) = session.require_logged_in()?;

        let mut tx = self.pool.begin().await?;

        let ids = store::appointments::list_all_ids_in(&mut *tx).await?;
        if !ids.contains(&id) {
            return Err(SchedulerError::not_found(format!("appointment id {id}")));
        }

        let appointment = store::appointments::find_by_id_in(&mut *tx, id)
            .await?
            .ok_or_else(|| SchedulerError::not_found(format!("appointment id {id}")))?;

        let owned = match role {
            Role::Patient => appointment.patient.eq_ignore_ascii_case(username),
            Role::Caregiver => appointment.caregiver.eq_ignore_ascii_case(username),
        };
        if !owned {
            return Err(SchedulerError::NotOwned);
        }

        store::appointments::delete_in(&mut *tx, id).await?;
        store::availability::add_in(&mut *tx, &appointment.caregiver, appointment.date).await?;
        store::inventory::increase_in(&mut *tx, &appointment.vaccine, 1).await?;

        tx.commit().await?;

        tracing::info!(role = role.as_str(), username, id, "appointment cancelled");
        Ok(appointment)
    }

    /// Add doses for a vaccine, registering the name first if it is new.
    pub async fn add_doses(
        &self,
        session: &Session,
        vaccine_name: &str,
        amount: i64,
    ) -> SchedulerResult<()> {
        let caregiver = session.require_caregiver()?;
        if amount <= 0 {
            return Err(SchedulerError::invalid_argument(
                "please provide a positive dose count",
            ));
        }

        let mut tx = self.pool.begin().await?;

        if store::inventory::find_by_name_in(&mut *tx, vaccine_name)
            .await?
            .is_none()
        {
            store::inventory::create_in(&mut *tx, vaccine_name, 0).await?;
        }
        store::inventory::increase_in(&mut *tx, vaccine_name, amount).await?;

        tx.commit().await?;

        tracing::info!(caregiver, vaccine = vaccine_name, amount, "doses added");
        Ok(())
    }

    /// The logged-in user's appointments, in booking order.
    pub async fn list_appointments(&self, session: &Session) -> SchedulerResult<Vec<Appointment>> {
        let (role, username) = session.require_logged_in()?;
        self.appointments.find_by_user(role, username).await
    }
}
