//! Domain rules for the reservation backend.
//!
//! Everything here is pure logic with no database or HTTP dependencies so it
//! can be shared by the repository layer, the API server, and tests.

pub mod analytics;
pub mod catalog;
pub mod error;
pub mod forms;
pub mod notes;
pub mod reservation;
pub mod roles;
pub mod search;
pub mod snapshot;
pub mod status;
pub mod types;
pub mod uploads;
