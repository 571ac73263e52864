//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods.
//! Read-only and single-statement methods accept `&PgPool`; methods that take
//! part in a multi-step use case are generic over [`sqlx::PgExecutor`] (or
//! take `&mut PgConnection`) so the caller can run them inside a transaction.

pub mod analytics_repo;
pub mod form_question_answer_repo;
pub mod form_question_repo;
pub mod reservation_note_repo;
pub mod reservation_repo;
pub mod service_category_repo;
pub mod service_repo;
pub mod status_history_repo;

pub use analytics_repo::AnalyticsRepo;
pub use form_question_answer_repo::FormQuestionAnswerRepo;
pub use form_question_repo::FormQuestionRepo;
pub use reservation_note_repo::ReservationNoteRepo;
pub use reservation_repo::ReservationRepo;
pub use service_category_repo::ServiceCategoryRepo;
pub use service_repo::ServiceRepo;
pub use status_history_repo::StatusHistoryRepo;
