//! Domain rows shared across the store, coordinator, and command layers.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::SchedulerError;

/// The two account kinds. Patients book appointments; caregivers offer
/// availability and manage vaccine stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Patient,
    Caregiver,
}

impl Role {
    /// Account table backing this role. Patients and caregivers are
    /// disjoint namespaces, so each role gets its own table.
    pub fn account_table(self) -> &'static str {
        match self {
            Role::Patient => "patients",
            Role::Caregiver => "caregivers",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Patient => "patient",
            Role::Caregiver => "caregiver",
        }
    }
}

/// A stored account. The salt and hash come from the credential
/// collaborator; the scheduler never sees a raw password beyond
/// the verify call.
#[derive(Debug, Clone)]
pub struct Account {
    pub username: String,
    pub salt: Vec<u8>,
    pub hash: Vec<u8>,
}

/// A vaccine and its remaining dose count. `doses` never goes negative.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vaccine {
    pub name: String,
    pub doses: i64,
}

/// An open (caregiver, date) booking slot. At most one row per pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilitySlot {
    pub caregiver: String,
    pub date: NaiveDate,
}

/// A confirmed booking linking one patient, one caregiver, one date,
/// and one vaccine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: i64,
    pub patient: String,
    pub caregiver: String,
    pub date: NaiveDate,
    pub vaccine: String,
}

impl Appointment {
    /// Line shown by `show_appointments`. The viewer's own name is
    /// omitted: patients see their caregiver, caregivers see their patient.
    pub fn describe_for(&self, role: Role) -> String {
        match role {
            Role::Patient => format!(
                "appointment {}: {} on {} with caregiver {}",
                self.id, self.vaccine, self.date, self.caregiver
            ),
            Role::Caregiver => format!(
                "appointment {}: {} on {} for patient {}",
                self.id, self.vaccine, self.date, self.patient
            ),
        }
    }
}

/// Result of a successful reservation.
#[derive(Debug, Clone)]
pub struct Reservation {
    pub id: i64,
    pub caregiver: String,
}

/// What a schedule search returns: the day's open slots plus the full
/// vaccine inventory listing.
#[derive(Debug, Clone)]
pub struct ScheduleView {
    pub date: NaiveDate,
    pub slots: Vec<AvailabilitySlot>,
    pub vaccines: Vec<Vaccine>,
}

/// Parse an ISO `yyyy-mm-dd` date at the command boundary.
pub fn parse_date(raw: &str) -> Result<NaiveDate, SchedulerError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| SchedulerError::InvalidDate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_date_accepts_iso_dates() {
        let date = parse_date("2024-06-01").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
    }

    #[test]
    fn parse_date_rejects_malformed_input() {
        for raw in ["06/01/2024", "2024-13-01", "2024-06-32", "tomorrow", ""] {
            assert!(
                matches!(parse_date(raw), Err(SchedulerError::InvalidDate)),
                "{raw:?} should not parse"
            );
        }
    }

    #[test]
    fn describe_for_omits_the_viewers_own_name() {
        let appointment = Appointment {
            id: 7,
            patient: "p1".into(),
            caregiver: "c1".into(),
            date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            vaccine: "Moderna".into(),
        };

        let patient_view = appointment.describe_for(Role::Patient);
        assert!(patient_view.contains("c1"));
        assert!(!patient_view.contains("p1"));

        let caregiver_view = appointment.describe_for(Role::Caregiver);
        assert!(caregiver_view.contains("p1"));
        assert!(!caregiver_view.contains("c1"));
    }
}
