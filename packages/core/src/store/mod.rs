//! SQL-backed stores.
//!
//! Each store owns a pool handle and exposes its operations twice: as
//! methods for standalone use, and as `*_in` functions taking a
//! `&mut SqliteConnection` so the coordinator can compose several stores
//! inside one transaction. Multi-store commits never go through the
//! standalone methods.

pub mod accounts;
pub mod appointments;
pub mod availability;
pub mod inventory;

pub use accounts::AccountStore;
pub use appointments::AppointmentStore;
pub use availability::AvailabilityStore;
pub use inventory::InventoryStore;
