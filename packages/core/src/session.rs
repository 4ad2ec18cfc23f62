//! The active identity for one interactive session.
//!
//! At most one role is ever logged in at a time. The session is an explicit
//! value owned by the command loop and passed into every coordinator call,
//! rather than hidden global current-user state.

use crate::error::SchedulerError;
use crate::model::Role;

/// Current login state: nobody, one patient, or one caregiver.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Session {
    #[default]
    LoggedOut,
    Patient(String),
    Caregiver(String),
}

impl Session {
    /// Build the logged-in state for a role.
    pub fn logged_in(role: Role, username: &str) -> Self {
        match role {
            Role::Patient => Session::Patient(username.to_string()),
            Role::Caregiver => Session::Caregiver(username.to_string()),
        }
    }

    pub fn role(&self) -> Option<Role> {
        match self {
            Session::LoggedOut => None,
            Session::Patient(_) => Some(Role::Patient),
            Session::Caregiver(_) => Some(Role::Caregiver),
        }
    }

    pub fn username(&self) -> Option<&str> {
        match self {
            Session::LoggedOut => None,
            Session::Patient(name) | Session::Caregiver(name) => Some(name),
        }
    }

    /// Require a logged-in patient and return their username.
    pub fn require_patient(&self) -> Result<&str, SchedulerError> {
        match self {
            Session::Patient(name) => Ok(name),
            _ => Err(SchedulerError::wrong_session(
                "please login as a patient first",
            )),
        }
    }

    /// Require a logged-in caregiver and return their username.
    pub fn require_caregiver(&self) -> Result<&str, SchedulerError> {
        match self {
            Session::Caregiver(name) => Ok(name),
            _ => Err(SchedulerError::wrong_session(
                "please login as a caregiver first",
            )),
        }
    }

    /// Require any logged-in identity.
    pub fn require_logged_in(&self) -> Result<(Role, &str), SchedulerError> {
        match self {
            Session::Patient(name) => Ok((Role::Patient, name)),
            Session::Caregiver(name) => Ok((Role::Caregiver, name)),
            Session::LoggedOut => Err(SchedulerError::wrong_session(
                "please login to your account first",
            )),
        }
    }

    /// Require the logged-out state; `action` names what the caller is
    /// about to do so the message reads naturally.
    pub fn require_logged_out(&self, action: &str) -> Result<(), SchedulerError> {
        match self {
            Session::LoggedOut => Ok(()),
            _ => Err(SchedulerError::wrong_session(format!(
                "already logged in, please logout before {action}"
            ))),
        }
    }
}
