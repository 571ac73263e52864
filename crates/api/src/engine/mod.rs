//! Multi-step use cases.
//!
//! Each function here opens one transaction, calls the pure rules in
//! `mindak_core` and the repositories in `mindak_db`, and commits only when
//! every step succeeded. Handlers stay thin: extract, call, wrap.

pub mod catalog;
pub mod forms;
pub mod submission;
pub mod transition;
