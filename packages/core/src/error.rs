//! Error types for scheduling operations.
//!
//! Every failure the scheduler can produce, from bad input and session
//! misuse to exhausted stock and underlying SQL errors, travels through
//! [`SchedulerError`]. The command boundary renders the
//! `Display` form to the user; nothing in this taxonomy terminates the
//! process.

use chrono::NaiveDate;
use thiserror::Error;

/// Unified scheduling error.
#[derive(Error, Debug)]
pub enum SchedulerError {
    #[error("invalid input: {message}")]
    InvalidInput { message: String },

    #[error("please enter a valid date in yyyy-mm-dd form")]
    InvalidDate,

    #[error("{message}")]
    WrongSessionState { message: String },

    #[error("the name \"{name}\" is already taken")]
    DuplicateName { name: String },

    #[error("{caregiver} already has {date} occupied")]
    DuplicateSlot { caregiver: String, date: NaiveDate },

    #[error("not found: {what}")]
    NotFound { what: String },

    #[error("that appointment belongs to a different user")]
    NotOwned,

    #[error("one patient can hold at most one appointment at a time")]
    AlreadyBooked,

    #[error("no caregiver is available on {date}")]
    NoAvailability { date: NaiveDate },

    #[error("no vaccine named \"{name}\" is on the market")]
    UnknownVaccine { name: String },

    #[error("\"{name}\" is out of stock, please choose another vaccine")]
    OutOfStock { name: String },

    #[error("not enough doses of \"{name}\" left")]
    InsufficientStock { name: String },

    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error(
        "password not strong enough: use at least 8 characters with upper and \
         lower case letters, a digit, and one of ! @ # ?"
    )]
    WeakPassword,

    #[error("storage error: {0}")]
    Store(#[from] sqlx::Error),
}

impl SchedulerError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput { message: message.into() }
    }

    pub fn wrong_session(message: impl Into<String>) -> Self {
        Self::WrongSessionState { message: message.into() }
    }

    pub fn duplicate_name(name: impl Into<String>) -> Self {
        Self::DuplicateName { name: name.into() }
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    pub fn unknown_vaccine(name: impl Into<String>) -> Self {
        Self::UnknownVaccine { name: name.into() }
    }

    pub fn out_of_stock(name: impl Into<String>) -> Self {
        Self::OutOfStock { name: name.into() }
    }

    pub fn insufficient_stock(name: impl Into<String>) -> Self {
        Self::InsufficientStock { name: name.into() }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument { message: message.into() }
    }
}

/// Result alias used across the store and coordinator layers.
pub type SchedulerResult<T> = Result<T, SchedulerError>;
