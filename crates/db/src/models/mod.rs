//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - A `Deserialize` update DTO (all `Option` fields) for patches
//!
//! Input DTOs derive `validator::Validate` for shape checks (lengths,
//! ranges); domain rules live in `mindak_core`.

pub mod analytics;
pub mod form_question;
pub mod form_question_answer;
pub mod reservation;
pub mod reservation_note;
pub mod service;
pub mod service_category;
pub mod status_history;
