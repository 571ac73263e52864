pub mod analytics;
pub mod categories;
pub mod client_forms;
pub mod form_answers;
pub mod forms;
pub mod reservations;
pub mod services;
